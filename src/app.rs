use crate::config::Config;
use crate::tracker::{Scheduler, TickOutcome, Tracker};
use crate::utils::fmt_duration;
use anyhow::Context;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Main application struct: a scheduler wired to the loaded configuration.
pub struct App {
    config: Arc<Config>,
    scheduler: Scheduler,
}

impl App {
    pub fn new(config: Config) -> Result<Self, anyhow::Error> {
        let config = Arc::new(config);
        let tracker =
            Tracker::from_config(config.clone()).context("Failed to set up course tracker")?;
        let scheduler = Scheduler::new(tracker, config.period());
        Ok(Self { config, scheduler })
    }

    /// Log the startup context once, before the first tick.
    pub fn log_startup(&self) {
        let proxy = self
            .config
            .proxy()
            .map(|(host, port)| format!("{host}:{port}"));

        info!(
            version = env!("CARGO_PKG_VERSION"),
            commit = env!("GIT_COMMIT_SHORT"),
            courses = self.config.courses.len(),
            period = fmt_duration(self.config.period()),
            proxy = proxy.as_deref().unwrap_or("none"),
            notifications = self.config.notifications_enabled(),
            "starting seatwatch"
        );

        if self.config.courses.is_empty() {
            warn!("No courses configured; ticks will do nothing");
        }
        if self.config.ping_discord && !self.config.notifications_enabled() {
            warn!("pingDiscord is set but discordWebhook is empty; notifications are disabled");
        }
    }

    /// Run until Ctrl-C. The current tick is allowed to finish.
    pub async fn run(self) -> ExitCode {
        let token = self.scheduler.cancellation_token();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C, shutting down");
                    token.cancel();
                }
                Err(e) => error!(error = ?e, "Failed to listen for Ctrl+C"),
            }
        });

        self.scheduler.run().await;
        info!("Shutdown complete");
        ExitCode::SUCCESS
    }

    /// Run exactly one tick and report whether it got through every course.
    pub async fn run_once(self) -> ExitCode {
        let summary = self.scheduler.run_once().await;
        match summary.outcome {
            TickOutcome::Completed => ExitCode::SUCCESS,
            outcome => {
                warn!(?outcome, "Tick ended early");
                ExitCode::FAILURE
            }
        }
    }
}
