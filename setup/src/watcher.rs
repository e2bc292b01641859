use std::sync::Arc;
use std::time::Duration;

use anyhow::Error;
use tokio::time::MissedTickBehavior;

use prescreen_application::{ArchiveUseCase, TriageBatchRequest, TriageUseCase};
use prescreen_domain::SubmissionSurfacePort;

#[derive(Debug, Clone)]
pub struct WatcherSettings {
    pub poll_interval: Duration,
    pub poll_size_limit: usize,
}

/// Polls the submission surface on a fixed interval and dispatches one
/// batch at a time: triage, then archive. A failed batch is quarantined to
/// the error directory and the loop keeps running; only an unreadable
/// surface aborts.
pub struct SubmissionWatcher {
    surface: Arc<dyn SubmissionSurfacePort>,
    triage: Arc<dyn TriageUseCase>,
    archive: Arc<dyn ArchiveUseCase>,
    settings: WatcherSettings,
}

impl SubmissionWatcher {
    pub fn new(
        surface: Arc<dyn SubmissionSurfacePort>,
        triage: Arc<dyn TriageUseCase>,
        archive: Arc<dyn ArchiveUseCase>,
        settings: WatcherSettings,
    ) -> Self {
        Self {
            surface,
            triage,
            archive,
            settings,
        }
    }

    pub async fn run(&self) -> Result<(), Error> {
        let mut ticker = tokio::time::interval(self.settings.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(
            poll_interval_secs = self.settings.poll_interval.as_secs_f64(),
            poll_size_limit = self.settings.poll_size_limit,
            "entering watch loop"
        );

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("shutdown signal received");
                    return Ok(());
                }
                _ = ticker.tick() => {}
            }

            let names = self.surface.poll(self.settings.poll_size_limit).await?;
            if names.is_empty() {
                continue;
            }

            tracing::info!(submission_count = names.len(), "dispatching batch");
            if let Err(error) = self.process_batch(&names).await {
                tracing::error!(error = %error, "batch failed, quarantining submissions");
                for name in &names {
                    if let Err(error) = self.surface.quarantine(name).await {
                        tracing::error!(
                            submission = %name,
                            error = %error,
                            "could not quarantine submission"
                        );
                    }
                }
            }
        }
    }

    async fn process_batch(&self, names: &[String]) -> Result<(), Error> {
        let report = self
            .triage
            .triage_batch(TriageBatchRequest::new(names.to_vec()))
            .await?;
        let summary = self.archive.archive_batch(&report).await?;
        tracing::info!(
            triaged = report.len(),
            archived = summary.archived.len(),
            persistence_faults = summary.persistence_faults.len(),
            "batch complete"
        );
        Ok(())
    }
}
