//! The poll pipeline: search each tracked course, parse the results, report
//! and notify.
//!
//! A tick walks the configured courses in order. The first course that
//! can't be checked ends the tick; the scheduler simply tries again next
//! period.

pub mod evaluator;
pub mod scheduler;

pub use scheduler::Scheduler;

use crate::config::{Config, ConfigError};
use crate::notify::{DiscordWebhook, NotificationPayload, Notifier};
use crate::usf::{self, SearchError, SearchSession, Section, Term, TrackedCourse};
use crate::utils::{fmt_duration, log_if_slow};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use url::Url;

const SLOW_TICK_THRESHOLD: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("invalid term ID for CRN {crn}: {term}")]
    InvalidTerm { crn: u32, term: i64 },
    #[error(transparent)]
    Search(#[from] SearchError),
}

/// How one course's check ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseCheck {
    Checked(CourseReport),
    /// The search answered with something other than an HTML page.
    NoPage,
    /// The page had no search form or results table.
    NotFound,
}

/// Sections seen for one course and what was sent about them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseReport {
    pub course: TrackedCourse,
    pub sections: Vec<Section>,
    pub notified: usize,
    pub notify_failures: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Every course was checked.
    Completed,
    NoPage {
        course: TrackedCourse,
    },
    NotFound {
        course: TrackedCourse,
    },
    /// An error ended the tick. `course` is `None` when the session itself
    /// couldn't be set up.
    Failed {
        course: Option<TrackedCourse>,
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickSummary {
    pub reports: Vec<CourseReport>,
    pub outcome: TickOutcome,
}

impl TickSummary {
    pub fn courses_checked(&self) -> usize {
        self.reports.len()
    }

    pub fn sections_found(&self) -> usize {
        self.reports.iter().map(|r| r.sections.len()).sum()
    }

    pub fn notifications_sent(&self) -> usize {
        self.reports.iter().map(|r| r.notified).sum()
    }

    pub fn notifications_failed(&self) -> usize {
        self.reports.iter().map(|r| r.notify_failures).sum()
    }
}

/// Runs ticks against an immutable configuration snapshot.
pub struct Tracker {
    config: Arc<Config>,
    search_url: Url,
    notifier: Option<Arc<dyn Notifier>>,
}

impl Tracker {
    pub fn new(
        config: Arc<Config>,
        notifier: Option<Arc<dyn Notifier>>,
    ) -> Result<Self, ConfigError> {
        let search_url = config.search_url()?;
        Ok(Self {
            config,
            search_url,
            notifier,
        })
    }

    /// Build a tracker that posts to the configured Discord webhook when
    /// notifications are enabled.
    pub fn from_config(config: Arc<Config>) -> anyhow::Result<Self> {
        let notifier: Option<Arc<dyn Notifier>> = if config.notifications_enabled() {
            Some(Arc::new(DiscordWebhook::new(config.discord_webhook.trim())?))
        } else {
            None
        };
        Ok(Self::new(config, notifier)?)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// One pass over every tracked course. Never fails; problems are logged
    /// and reflected in the returned outcome.
    pub async fn run_tick(&self) -> TickSummary {
        let start = Instant::now();
        let mut reports = Vec::new();

        let outcome = match SearchSession::new(self.config.proxy()) {
            Ok(session) => self.check_all(&session, &mut reports).await,
            Err(e) => {
                error!(error = ?e, "Failed to open search session");
                TickOutcome::Failed {
                    course: None,
                    error: e.to_string(),
                }
            }
        };

        let summary = TickSummary { reports, outcome };
        let elapsed = log_if_slow(start, SLOW_TICK_THRESHOLD, "tick");
        info!(
            duration = fmt_duration(elapsed),
            courses_checked = summary.courses_checked(),
            sections = summary.sections_found(),
            notified = summary.notifications_sent(),
            notify_failures = summary.notifications_failed(),
            complete = summary.outcome == TickOutcome::Completed,
            "Tick finished"
        );
        summary
    }

    async fn check_all(
        &self,
        session: &SearchSession,
        reports: &mut Vec<CourseReport>,
    ) -> TickOutcome {
        for course in &self.config.courses {
            match self.check_course(session, course).await {
                Ok(CourseCheck::Checked(report)) => reports.push(report),
                Ok(CourseCheck::NoPage) => {
                    warn!(%course, "Course retrieval returned nothing");
                    return TickOutcome::NoPage { course: *course };
                }
                Ok(CourseCheck::NotFound) => {
                    warn!(%course, "Couldn't find course");
                    return TickOutcome::NotFound { course: *course };
                }
                Err(TrackError::Search(e)) if e.is_http_status() => {
                    error!(%course, error = %e, "Couldn't retrieve information due to HTTP status error");
                    return TickOutcome::Failed {
                        course: Some(*course),
                        error: e.to_string(),
                    };
                }
                Err(e) => {
                    error!(%course, error = ?e, "Course check failed");
                    return TickOutcome::Failed {
                        course: Some(*course),
                        error: e.to_string(),
                    };
                }
            }
        }
        TickOutcome::Completed
    }

    /// Search one course, parse what came back, report and notify.
    #[tracing::instrument(skip_all, fields(crn = course.crn, term = course.term))]
    pub async fn check_course(
        &self,
        session: &SearchSession,
        course: &TrackedCourse,
    ) -> Result<CourseCheck, TrackError> {
        let term = u32::try_from(course.term)
            .ok()
            .and_then(Term::from_id)
            .ok_or(TrackError::InvalidTerm {
                crn: course.crn,
                term: course.term,
            })?;

        let response = match usf::search(session, &self.search_url, course, term).await {
            Ok(response) => response,
            Err(e) if e.is_page_structure() => {
                debug!(error = %e, "search form not usable");
                return Ok(CourseCheck::NotFound);
            }
            Err(e) => return Err(e.into()),
        };
        if !response.is_expected_page {
            return Ok(CourseCheck::NoPage);
        }

        let outcome = usf::parse_results(&response.document.html(), course)?;
        if !outcome.success {
            return Ok(CourseCheck::NotFound);
        }
        debug!(sections = outcome.sections.len(), "parsed results");

        if self.config.log_course_info {
            evaluator::report(&outcome.sections);
        }

        let (notified, notify_failures) = self.notify_open(&outcome.sections).await;

        Ok(CourseCheck::Checked(CourseReport {
            course: *course,
            sections: outcome.sections,
            notified,
            notify_failures,
        }))
    }

    /// Send one notification per open section. A failed send doesn't stop
    /// the others.
    async fn notify_open(&self, sections: &[Section]) -> (usize, usize) {
        let Some(notifier) = &self.notifier else {
            return (0, 0);
        };

        let mut sent = 0;
        let mut failed = 0;
        for section in evaluator::sections_to_notify(sections) {
            let payload = NotificationPayload::course_open(
                section,
                &self.config.discord_users,
                &self.config.registration_url,
            );
            match notifier.send(&payload).await {
                Ok(()) => {
                    info!(crn = section.crn.as_str(), course_name = section.course_name.as_str(), "Sent open-seat notification");
                    sent += 1;
                }
                Err(e) => {
                    warn!(crn = section.crn.as_str(), error = %e, "Failed to send notification");
                    failed += 1;
                }
            }
        }
        (sent, failed)
    }
}
