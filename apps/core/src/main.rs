use campusfind_core::runtime::RuntimeError;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match campusfind_core::runtime::parse_cli_args(&args) {
        Ok(options) => options,
        Err(RuntimeError::Cli(error)) => error.exit(),
        Err(error) => {
            eprintln!("[campusfind-core] {error}");
            std::process::exit(2);
        }
    };

    if let Err(error) = campusfind_core::runtime::run_with_options(options) {
        eprintln!("[campusfind-core] runtime failed: {error}");
        std::process::exit(1);
    }
}
