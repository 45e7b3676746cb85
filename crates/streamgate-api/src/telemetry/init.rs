use streamgate_core::LogFormat;
use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

const DEFAULT_FILTER: &str = "streamgate=debug,tower_http=debug";

/// Initialize tracing. `LOG_FORMAT=json` switches the console layer to JSON lines.
pub fn init_telemetry(format: LogFormat) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
                .try_init()?;
        }
        LogFormat::Text => {
            // Console: compact format (message string for convenience).
            let console_fmt = tracing_subscriber::fmt::layer()
                .event_format(Format::default().compact().with_target(false));
            tracing_subscriber::registry()
                .with(filter)
                .with(console_fmt)
                .try_init()?;
        }
    }

    tracing::debug!(format = ?format, "Tracing initialized");
    Ok(())
}
