use crate::cli::TracingFormat;
use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt::format::JsonFields};

/// Configure and initialize logging for the application.
///
/// `RUST_LOG` wins when set; otherwise everything is held to `warn` except
/// this crate, which logs at `log_level`. The HTTP middleware stays at
/// `warn` unless asked for explicitly since it logs every request.
pub fn setup_logging(log_level: &str, tracing_format: TracingFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,seatwatch={log_level},seatwatch::usf::middleware=warn"
        ))
    });

    // Console status lines are colored; keep escape codes out of JSON logs and pipes.
    if matches!(tracing_format, TracingFormat::Json) || !std::io::stdout().is_terminal() {
        yansi::disable();
    }

    match tracing_format {
        TracingFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_target(true).compact())
                .init();
        }
        TracingFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(true)
                        .json()
                        .fmt_fields(JsonFields::new()),
                )
                .init();
        }
    }
}
