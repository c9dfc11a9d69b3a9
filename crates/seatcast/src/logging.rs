use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging to stderr.
///
/// stdout is reserved for the printed summary, so log lines go to stderr
/// without ANSI colours. The level can be controlled via the `level` parameter
/// or the `RUST_LOG` environment variable.
pub fn init_logging(level: &str) -> color_eyre::Result<()> {
    // Build filter from RUST_LOG env var or use provided level
    let default_filter = format!("seatcast={level},seatcast_core=warn");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false),
        )
        .try_init()?;

    tracing::debug!("SeatCast logging initialized (level={level})");
    Ok(())
}
