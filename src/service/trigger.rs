use crate::api::EnovaBackend;
use crate::config::WorkerConfig;
use crate::error::PrintoutError;
use crate::service::report_pipeline::ReportPipeline;
use crate::service::session_manager::SessionManager;
use chrono::Utc;
use std::fmt;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// When report runs happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// A single run at startup.
    Once,
    /// A run every `period`, the first one immediately when `run_on_startup`.
    Every {
        period: Duration,
        run_on_startup: bool,
    },
}

impl Schedule {
    pub fn from_worker(cfg: &WorkerConfig) -> Self {
        if cfg.execution_time.is_zero() {
            Schedule::Once
        } else {
            Schedule::Every {
                period: cfg.execution_time,
                run_on_startup: cfg.execute_on_startup,
            }
        }
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schedule::Once => write!(f, "once"),
            Schedule::Every {
                period,
                run_on_startup,
            } => write!(
                f,
                "every {}s (run on startup: {})",
                period.as_secs(),
                run_on_startup
            ),
        }
    }
}

/// Invokes the report pipeline according to a [`Schedule`].
pub struct Trigger {
    schedule: Schedule,
    cancel: CancellationToken,
}

impl Trigger {
    pub fn new(schedule: Schedule, cancel: CancellationToken) -> Self {
        Self { schedule, cancel }
    }

    /// Build from `[worker]`, warning about settings that have no effect.
    pub fn from_worker(cfg: &WorkerConfig, cancel: CancellationToken) -> Self {
        let schedule = Schedule::from_worker(cfg);
        if schedule == Schedule::Once && !cfg.execute_on_startup {
            warn!(
                "worker.execute_on_startup is false but worker.execution_time is zero; running once at startup"
            );
        }
        Self::new(schedule, cancel)
    }

    pub fn schedule(&self) -> Schedule {
        self.schedule
    }

    /// Log in, drive the pipeline, then dispose the session on every exit,
    /// including a failed login and a cancelled run.
    pub async fn serve<B: EnovaBackend>(
        &self,
        sessions: &mut SessionManager<B>,
        pipeline: &ReportPipeline,
    ) -> Result<(), PrintoutError> {
        let mut result = sessions.initialize().await.map(|_| ());
        if result.is_ok() {
            result = self.run(sessions, pipeline).await;
        }
        sessions.dispose().await;
        result
    }

    /// Drive the pipeline. In `Once` mode the run's error is returned; in
    /// periodic mode failures are logged and the loop continues until cancelled.
    pub async fn run<B: EnovaBackend>(
        &self,
        sessions: &SessionManager<B>,
        pipeline: &ReportPipeline,
    ) -> Result<(), PrintoutError> {
        let session = sessions.session()?;

        match self.schedule {
            Schedule::Once => {
                info!("Running in 'once' mode - single report run");
                pipeline
                    .run(sessions.backend(), session, &self.cancel)
                    .await?;
                info!("Report run completed");
                Ok(())
            }
            Schedule::Every {
                period,
                run_on_startup,
            } => {
                info!(
                    period_secs = period.as_secs(),
                    run_on_startup, "Running in 'periodic' mode"
                );
                let mut interval = time::interval(period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                if !run_on_startup {
                    // The first tick completes immediately.
                    interval.tick().await;
                    log_next_run(period);
                }

                loop {
                    tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => {
                            info!("Trigger stopped");
                            return Ok(());
                        }
                        _ = interval.tick() => {}
                    }

                    if let Err(e) = pipeline
                        .run(sessions.backend(), session, &self.cancel)
                        .await
                    {
                        error!(error = %e, "Report run failed");
                    }
                    log_next_run(period);
                }
            }
        }
    }
}

fn log_next_run(period: Duration) {
    let next = chrono::Duration::from_std(period)
        .ok()
        .and_then(|delta| Utc::now().checked_add_signed(delta));
    if let Some(next) = next {
        info!(next_run = %next.to_rfc3339(), "Next report run scheduled");
    }
}
