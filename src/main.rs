use clap::Parser;
use seatwatch::app::App;
use seatwatch::cli::{Args, TracingFormat};
use seatwatch::config::{self, Config, ConfigError};
use seatwatch::logging::setup_logging;
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let format = TracingFormat::resolve(args.tracing);

    let config = match config::load(&args.config) {
        Ok(config) => config,
        Err(ConfigError::Missing(path)) => {
            setup_logging(&Config::default().log_level, format);
            return match config::write_default(&path) {
                Ok(()) => {
                    info!(path = %path.display(), "Config file not found, wrote a default one. Fill it in and run again");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    error!(path = %path.display(), error = ?e, "Failed to write default config");
                    ExitCode::FAILURE
                }
            };
        }
        Err(e) => {
            setup_logging(&Config::default().log_level, format);
            error!(path = %args.config.display(), error = %e, "Failed to load config");
            return ExitCode::FAILURE;
        }
    };

    // Logging comes up before App::new() so startup errors are never dropped
    setup_logging(&config.log_level, format);

    let app = match App::new(config) {
        Ok(app) => app,
        Err(e) => {
            error!(error = ?e, "Failed to initialize application");
            return ExitCode::FAILURE;
        }
    };
    app.log_startup();

    if args.once {
        app.run_once().await
    } else {
        app.run().await
    }
}
