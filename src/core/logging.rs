//! Diagnostic logging setup

use tracing_subscriber::EnvFilter;

const DEFAULT_LEVEL: &str = "warn";

/// Pick the filter directive for this run
///
/// `-v`/`-q` win, then `RUST_LOG`, then the configured level (which already
/// carries `HANGAR_LOG`), then `warn`.
pub fn filter_directive(
    configured: Option<&str>,
    rust_log: Option<&str>,
    verbose: bool,
    quiet: bool,
) -> String {
    if verbose {
        return "debug".to_string();
    }
    if quiet {
        return "error".to_string();
    }
    rust_log
        .or(configured)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_LEVEL)
        .to_string()
}

/// Install the stderr subscriber; a second call is a no-op
pub fn init_tracing(configured: Option<&str>, verbose: bool, quiet: bool) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let directive = filter_directive(configured, rust_log.as_deref(), verbose, quiet);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
