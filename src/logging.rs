use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging for the keystamp CLI
///
/// Logs go to stderr so token output on stdout stays pipeable. The level is
/// controlled with RUST_LOG:
/// - RUST_LOG=debug keystamp decode <token>  (shows why a token was rejected)
/// - RUST_LOG=info keystamp mint ...         (default level)
pub fn init(verbose: bool) -> Result<()> {
    let default_filter = if verbose { "keystamp=debug" } else { "keystamp=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    Ok(())
}
