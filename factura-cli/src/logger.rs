//! Logging Infrastructure
//!
//! stderr output for interactive use, or a daily rolling file when a log
//! directory is configured.

use std::path::Path;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "factura=info,factura_client=info";
const LOG_FILE_PREFIX: &str = "factura";

/// Filter from `RUST_LOG`, or the CLI default
fn env_filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("factura=debug,factura_client=debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into())
}

/// Initialize the logger
///
/// Logs go to `log_dir` (rolled daily) when it names an existing
/// directory, to stderr otherwise so stdout stays clean for output.
pub fn init_logger(verbose: bool, log_dir: Option<&str>) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.is_dir() {
            let file_appender = tracing_appender::rolling::daily(log_path, LOG_FILE_PREFIX);
            subscriber.with_ansi(false).with_writer(file_appender).init();
            return;
        }
        eprintln!("log directory {dir} does not exist, logging to stderr");
    }

    subscriber.with_writer(std::io::stderr).init();
}
