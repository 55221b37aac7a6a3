pub mod config;
pub mod contract;
pub mod controller;
pub mod history_store;
pub mod keyboard;
pub mod kv_store;
pub mod logging;
pub mod model;
pub mod navigator;
pub mod query_dsl;
pub mod ranking;
pub mod runtime;
pub mod session;
pub mod source;
pub mod transport;
pub mod view;

#[cfg(test)]
mod tests {
    mod sort_latency_test {
        include!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../../tests/perf/sort_latency_test.rs"
        ));
    }
}
