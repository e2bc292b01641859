use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use prescreen_domain::{
    BlobStorePort, RecordingDocument, RecordingRef, RecordingStorePort, RecordingType,
    SubmissionMetadata, SubmissionSurfacePort, TriageResult,
};

use crate::usecase::CatalogUseCase;
use crate::{ApplicationError, ArchiveSummary, BatchReport};

/// Persists a triaged batch: audio blobs stored one bulk call per recording
/// type, recording documents written per destination partition, user
/// histories updated in bulk through the catalog, and accepted submissions
/// removed from the surface only after hand-off. Rejected submissions were
/// already deleted during triage; errored ones stay behind for inspection.
#[async_trait]
pub trait ArchiveUseCase: Send + Sync {
    async fn archive_batch(&self, report: &BatchReport) -> Result<ArchiveSummary, ApplicationError>;
}

pub struct ArchiveUseCaseImpl {
    blobs: Arc<dyn BlobStorePort>,
    recordings: Arc<dyn RecordingStorePort>,
    catalog: Arc<dyn CatalogUseCase>,
    surface: Arc<dyn SubmissionSurfacePort>,
}

struct AcceptedSubmission<'a> {
    name: &'a str,
    metadata: &'a SubmissionMetadata,
    vtt: Option<&'a str>,
    accuracy: Option<f64>,
}

impl ArchiveUseCaseImpl {
    pub fn new(
        blobs: Arc<dyn BlobStorePort>,
        recordings: Arc<dyn RecordingStorePort>,
        catalog: Arc<dyn CatalogUseCase>,
        surface: Arc<dyn SubmissionSurfacePort>,
    ) -> Self {
        Self {
            blobs,
            recordings,
            catalog,
            surface,
        }
    }

    async fn store_blobs(
        &self,
        accepted: &[AcceptedSubmission<'_>],
    ) -> Result<HashMap<String, String>, ApplicationError> {
        // Grouped by recording type in first-seen order so every blob-store
        // call covers one destination.
        let mut groups: Vec<(RecordingType, Vec<(String, PathBuf)>)> = Vec::new();
        for submission in accepted {
            let entry = (
                submission.name.to_string(),
                self.surface.audio_path(submission.name),
            );
            match groups
                .iter_mut()
                .find(|(rec_type, _)| *rec_type == submission.metadata.rec_type)
            {
                Some((_, entries)) => entries.push(entry),
                None => groups.push((submission.metadata.rec_type.clone(), vec![entry])),
            }
        }

        let mut name_to_blob = HashMap::new();
        for (rec_type, entries) in &groups {
            tracing::debug!(
                rec_type = rec_type.as_str(),
                count = entries.len(),
                "storing audio blobs"
            );
            name_to_blob.extend(self.blobs.store_many(entries, rec_type).await?);
        }
        Ok(name_to_blob)
    }
}

#[async_trait]
impl ArchiveUseCase for ArchiveUseCaseImpl {
    async fn archive_batch(&self, report: &BatchReport) -> Result<ArchiveSummary, ApplicationError> {
        let accepted: Vec<AcceptedSubmission<'_>> = report
            .accepted()
            .filter_map(|outcome| match &outcome.result {
                TriageResult::Accepted {
                    metadata,
                    vtt,
                    accuracy,
                } => Some(AcceptedSubmission {
                    name: &outcome.name,
                    metadata,
                    vtt: vtt.as_deref(),
                    accuracy: *accuracy,
                }),
                _ => None,
            })
            .collect();

        if accepted.is_empty() {
            tracing::info!("no accepted submissions in batch, nothing to archive");
            return Ok(ArchiveSummary::default());
        }

        let name_to_blob = self.store_blobs(&accepted).await?;

        let mut pending = Vec::new();
        let mut processed = Vec::new();
        let mut user_updates = Vec::new();
        let mut archived = Vec::new();
        for submission in &accepted {
            let Some(blob_id) = name_to_blob.get(submission.name) else {
                tracing::error!(submission = submission.name, "no blob stored for submission");
                continue;
            };
            let document = RecordingDocument {
                id: blob_id.clone(),
                metadata: submission.metadata.clone(),
                vtt: submission.vtt.map(str::to_string),
                accuracy: submission.accuracy,
            };
            if submission.metadata.rec_type == RecordingType::Normal {
                pending.push(document);
            } else {
                user_updates.push((
                    submission.metadata.user_id.clone(),
                    RecordingRef {
                        id: blob_id.clone(),
                        rec_type: submission.metadata.rec_type.clone(),
                    },
                ));
                processed.push(document);
            }
            archived.push(submission.name.to_string());
        }

        let mut persistence_faults = Vec::new();
        if pending.is_empty() {
            tracing::info!("no documents for the pending partition, skipping insert");
        } else {
            tracing::info!(count = pending.len(), "inserting pending recordings");
            self.recordings.insert_pending(pending).await?;
        }
        if processed.is_empty() {
            tracing::info!("no documents for the processed partition, skipping insert");
        } else {
            tracing::info!(count = processed.len(), "inserting processed recordings");
            self.recordings.insert_processed(processed).await?;
            persistence_faults.extend(self.catalog.attach_recordings_to_users(user_updates).await?);
        }

        // Hand-off complete: the archived submissions are consumed.
        for name in &archived {
            tracing::info!(submission = %name, "removing archived submission");
            self.surface.delete(name).await?;
        }

        Ok(ArchiveSummary {
            archived,
            persistence_faults,
        })
    }
}
