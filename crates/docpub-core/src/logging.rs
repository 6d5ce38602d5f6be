use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install a process-wide tracing subscriber for hosts without their own.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Output uses the
/// compact formatter. Calling this a second time returns an error.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer().with_target(true).with_level(true).compact();

    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
