use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global JSON subscriber.
///
/// Level comes from `RUST_LOG`, defaulting to `info`. Records emitted through
/// the `log` facade (actix's `Logger`, `LoggerMiddleware`) are forwarded by
/// tracing-subscriber's `tracing-log` bridge.
pub fn init_telemetry() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let formatting_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .json();

    // A second call (tests spawning several apps) keeps the first subscriber
    if tracing_subscriber::registry()
        .with(env_filter)
        .with(formatting_layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("Telemetry already initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_telemetry_is_idempotent() {
        init_telemetry();
        init_telemetry();
        tracing::info!("still logging");
    }
}
