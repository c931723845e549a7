use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `RMISTUB_LOG=debug`.
pub const LOG_ENV: &str = "RMISTUB_LOG";

pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    // a subscriber may already be installed when embedded or under test
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
