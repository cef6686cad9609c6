//! Logging setup for the `docschema` binary.

use anyhow::{anyhow, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "docschema=info,docschema_profile=info,docschema_ingest_json=info";
const VERBOSE_LOG_FILTER: &str =
    "docschema=debug,docschema_profile=debug,docschema_ingest_json=debug";

/// Filter precedence: `RUST_LOG`, then `--verbose`, then the default.
fn log_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            VERBOSE_LOG_FILTER
        } else {
            DEFAULT_LOG_FILTER
        })
    })
}

/// Install a stderr subscriber. stdout stays free for command output.
pub fn init_logging(verbose: bool) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(log_filter(verbose)),
        )
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {e}"))
}
