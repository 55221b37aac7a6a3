use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::{self, Config, ConfigError};
use crate::controller::SearchController;
use crate::history_store::HistoryStore;
use crate::keyboard::Key;
use crate::kv_store::SqliteStore;
use crate::model::EntityFilter;
use crate::navigator::{Destination, Router};
use crate::ranking::SortKey;
use crate::session::{Callbacks, SearchSession, SessionEvent};
use crate::source::SourceError;
use crate::transport::HttpSearchClient;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("search service error: {0}")]
    Source(#[from] SourceError),
    #[error("console io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Cli(#[from] clap::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Parser)]
#[command(
    name = "campusfind-core",
    about = "Interactive campus search from the terminal"
)]
pub struct CliOptions {
    /// Config file (.toml, .json or .json5).
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Overrides `service_url` from the config file.
    #[arg(long)]
    pub service_url: Option<String>,
    #[arg(long)]
    pub role: Option<String>,
}

pub fn parse_cli_args(args: &[String]) -> Result<CliOptions, RuntimeError> {
    let argv = std::iter::once("campusfind-core").chain(args.iter().map(String::as_str));
    Ok(CliOptions::try_parse_from(argv)?)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Query(String),
    Key(Key),
    Clear,
    Submit,
    Outside,
    Pick(usize),
    Sort(SortKey),
    Filter(EntityFilter),
    Quit,
    Invalid(String),
}

pub fn parse_console_line(line: &str) -> ConsoleCommand {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(command) = line.strip_prefix(':') else {
        return ConsoleCommand::Query(line.to_string());
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default().to_ascii_lowercase();
    let argument = parts.next();
    match (name.as_str(), argument) {
        ("down", None) => ConsoleCommand::Key(Key::Down),
        ("up", None) => ConsoleCommand::Key(Key::Up),
        ("enter", None) => ConsoleCommand::Key(Key::Enter),
        ("esc" | "escape", None) => ConsoleCommand::Key(Key::Escape),
        ("clear", None) => ConsoleCommand::Clear,
        ("submit", None) => ConsoleCommand::Submit,
        ("outside", None) => ConsoleCommand::Outside,
        ("quit" | "q", None) => ConsoleCommand::Quit,
        ("pick", Some(index)) => index
            .parse()
            .map(ConsoleCommand::Pick)
            .unwrap_or_else(|_| ConsoleCommand::Invalid(format!("not a row number: {index}"))),
        ("sort", Some(key)) => SortKey::parse(key)
            .map(ConsoleCommand::Sort)
            .unwrap_or_else(|| ConsoleCommand::Invalid(format!("unknown sort: {key}"))),
        ("filter", Some(filter)) => EntityFilter::parse(filter)
            .map(ConsoleCommand::Filter)
            .unwrap_or_else(|| ConsoleCommand::Invalid(format!("unknown type: {filter}"))),
        _ => ConsoleCommand::Invalid(format!("unknown command: {line}")),
    }
}

#[derive(Debug, Default)]
pub struct StdoutRouter;

impl Router for StdoutRouter {
    fn navigate(&mut self, destination: &Destination) {
        println!("[campusfind-core] navigate {destination}");
    }
}

pub fn run_with_options(options: CliOptions) -> Result<(), RuntimeError> {
    if let Err(error) = crate::logging::init() {
        eprintln!("[campusfind-core] file logging disabled: {error}");
    }

    let mut config = config::load(options.config.as_deref())?;
    if !config.config_path.exists() {
        config::save(&config)?;
        tracing::info!(path = %config.config_path.display(), "wrote default config");
        println!(
            "[campusfind-core] wrote default config to {}",
            config.config_path.display()
        );
    }
    if let Some(service_url) = options.service_url {
        config.service_url = service_url;
    }
    if let Some(role) = options.role {
        config.role = Some(role);
    }
    config::validate(&config)?;

    println!(
        "[campusfind-core] startup service_url={} config_path={} history_db_path={}",
        config.service_url,
        config.config_path.display(),
        config.history_db_path.display(),
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(console_loop(config))
}

enum Step {
    Line(std::io::Result<Option<String>>),
    Event(Option<SessionEvent>),
}

async fn console_loop(config: Config) -> Result<(), RuntimeError> {
    let client = Arc::new(HttpSearchClient::from_config(&config)?);
    let controller = SearchController::new(config.controller_settings(), open_history(&config));
    let callbacks = Callbacks::default().on_search(|query, filters| {
        println!(
            "[campusfind-core] search query={query:?} type={} sort={}",
            filters.entity, filters.sort
        );
    });
    let mut session = SearchSession::new(controller, Arc::clone(&client), client, StdoutRouter)
        .with_fetch_timeout(config.fetch_timeout())
        .with_callbacks(callbacks);

    println!("[campusfind-core] type to search, :quit to exit");
    session.open();
    render(&session, &config.placeholder);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let step = tokio::select! {
            line = lines.next_line() => Step::Line(line),
            event = session.next_event() => Step::Event(event),
        };

        match step {
            Step::Line(line) => {
                let Some(line) = line? else {
                    break;
                };
                match parse_console_line(&line) {
                    ConsoleCommand::Quit => break,
                    ConsoleCommand::Invalid(message) => {
                        println!("[campusfind-core] {message}");
                        continue;
                    }
                    command => apply(&mut session, command),
                }
                render(&session, &config.placeholder);
            }
            Step::Event(Some(event)) => {
                if session.handle_event(event) {
                    render(&session, &config.placeholder);
                }
            }
            Step::Event(None) => break,
        }
    }

    session.unmount();
    Ok(())
}

fn apply(session: &mut SearchSession<HttpSearchClient, HttpSearchClient>, command: ConsoleCommand) {
    match command {
        ConsoleCommand::Query(text) => session.input(&text),
        ConsoleCommand::Key(key) => session.key(key),
        ConsoleCommand::Clear => session.clear(),
        ConsoleCommand::Submit => session.commit(),
        ConsoleCommand::Outside => session.click_outside(),
        ConsoleCommand::Pick(index) => session.activate(index),
        ConsoleCommand::Sort(key) => session.set_sort(key),
        ConsoleCommand::Filter(filter) => session.set_entity_filter(filter),
        ConsoleCommand::Quit | ConsoleCommand::Invalid(_) => {}
    }
}

fn render(session: &SearchSession<HttpSearchClient, HttpSearchClient>, placeholder: &str) {
    print!("{}", session.controller().view_with_placeholder(placeholder));
}

fn open_history(config: &Config) -> HistoryStore {
    match SqliteStore::open_from_config(config) {
        Ok(store) => HistoryStore::new(store, config.history_limit),
        Err(error) => {
            tracing::warn!(
                path = %config.history_db_path.display(),
                error = %error,
                "history database unavailable; keeping history for this session only"
            );
            println!("[campusfind-core] search history will not be saved: {error}");
            HistoryStore::in_memory(config.history_limit)
        }
    }
}
