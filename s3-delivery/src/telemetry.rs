//! Logging setup for the CLI.

use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

/// Level filter for this workspace's crates. SDK and transport crates stay at WARN.
pub fn log_filter(verbose: bool) -> EnvFilter {
    let level = if verbose { "debug" } else { "info" };
    EnvFilter::new(format!("warn,s3_delivery={level},s3_delivery_core={level}"))
}

/// Installs the process-wide subscriber: timestamped lines on stdout.
/// Call once, before any command runs.
pub fn init_tracing(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose))
        .with_writer(std::io::stdout)
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(false)
        .with_ansi(false)
        .init();
}
