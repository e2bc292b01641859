use std::sync::Arc;

use async_trait::async_trait;
use validator::Validate;

use prescreen_domain::{
    alignment_accuracy, words_to_vtt, DomainError, ForcedAlignerPort, QuestionQuery,
    QuestionStorePort, RecordingType, ScoringPolicy, SubmissionMetadata, SubmissionSurfacePort,
    TimestampReconciler, TriageFault, TriageResult, VTT_HEADER,
};

use crate::{ApplicationError, BatchReport, SubmissionOutcome, TriageBatchRequest};

/// Pre-screens a batch of submissions into accepted, rejected, and errored
/// entries. Failures attach to the offending submission only; the batch
/// aborts solely on infrastructure errors.
#[async_trait]
pub trait TriageUseCase: Send + Sync {
    async fn triage_batch(
        &self,
        request: TriageBatchRequest,
    ) -> Result<BatchReport, ApplicationError>;
}

pub struct TriageUseCaseImpl {
    aligner: Arc<dyn ForcedAlignerPort>,
    questions: Arc<dyn QuestionStorePort>,
    surface: Arc<dyn SubmissionSurfacePort>,
    reconciler: TimestampReconciler,
    policy: ScoringPolicy,
    min_accuracy: f64,
}

impl TriageUseCaseImpl {
    pub fn new(
        aligner: Arc<dyn ForcedAlignerPort>,
        questions: Arc<dyn QuestionStorePort>,
        surface: Arc<dyn SubmissionSurfacePort>,
        reconciler: TimestampReconciler,
        policy: ScoringPolicy,
        min_accuracy: f64,
    ) -> Self {
        Self {
            aligner,
            questions,
            surface,
            reconciler,
            policy,
            min_accuracy,
        }
    }

    async fn triage_one(&self, name: &str) -> Result<TriageResult, ApplicationError> {
        let metadata = match self.surface.metadata(name).await {
            Ok(Some(metadata)) => metadata,
            Ok(None) => {
                tracing::error!(submission = name, "no metadata record found");
                return Ok(TriageResult::Error {
                    fault: TriageFault::MetaNotFound,
                });
            }
            Err(error) => {
                tracing::warn!(submission = name, error = %error, "metadata unreadable");
                return Ok(TriageResult::Error {
                    fault: TriageFault::MetaNotFound,
                });
            }
        };

        if metadata.rec_type == RecordingType::Normal {
            self.screen_recording(name, metadata).await
        } else {
            // Interaction signals carry no speech to score.
            Ok(TriageResult::Accepted {
                metadata: self.with_duration(name, metadata).await,
                vtt: None,
                accuracy: None,
            })
        }
    }

    async fn screen_recording(
        &self,
        name: &str,
        metadata: SubmissionMetadata,
    ) -> Result<TriageResult, ApplicationError> {
        let Some(question_id) = metadata.question_id else {
            tracing::error!(submission = name, "metadata carries no question reference");
            return Ok(TriageResult::Error {
                fault: TriageFault::QidNotFound,
            });
        };
        let query = QuestionQuery {
            question_id,
            sentence_id: metadata.sentence_id,
        };

        let question = match self.questions.find_unrecorded(&query).await? {
            Some(question) => Some(question),
            None => {
                tracing::debug!(
                    question_id,
                    "question not in unrecorded partition, searching recorded"
                );
                self.questions.find_recorded(&query).await?
            }
        };
        let Some(question) = question else {
            tracing::error!(submission = name, question_id, "question not found");
            return Ok(TriageResult::Error {
                fault: TriageFault::SentenceNotFound,
            });
        };
        let Some(mut transcript) = question.transcript else {
            tracing::error!(submission = name, question_id, "question has no transcript");
            return Ok(TriageResult::Error {
                fault: TriageFault::TranscriptNotFound,
            });
        };

        if let Some(tokenization_id) = metadata.tokenization_id {
            match question.tokenizations.get(tokenization_id) {
                Some(&(slice_start, slice_end)) => {
                    transcript = slice_chars(&transcript, slice_start, slice_end);
                    tracing::info!(submission = name, tokenization_id, "transcript segmented");
                }
                None => tracing::info!(
                    submission = name,
                    tokenization_id,
                    "could not segment transcript; submission may not pass pre-screening"
                ),
            }
        }

        let audio = self.surface.audio_path(name);
        let raw_words = match self.aligner.align(&audio, &transcript).await {
            Ok(words) => words,
            Err(error) => {
                tracing::error!(submission = name, error = %error, "forced alignment failed");
                return Ok(TriageResult::Error {
                    fault: TriageFault::RuntimeError,
                });
            }
        };

        let reconciled = self.reconciler.reconcile(&transcript, &raw_words);
        let vtt = words_to_vtt(&reconciled, VTT_HEADER);
        let accuracy = match alignment_accuracy(&raw_words, &self.policy) {
            Ok(accuracy) => accuracy,
            Err(DomainError::EmptyAlignment) => {
                tracing::error!(submission = name, "engine produced no words");
                return Ok(TriageResult::Error {
                    fault: TriageFault::RuntimeError,
                });
            }
            Err(error) => return Err(error.into()),
        };
        tracing::debug!(submission = name, accuracy, "alignment scored");

        if accuracy < self.min_accuracy {
            // Rejection is terminal; the backing files go with it.
            self.surface.delete(name).await?;
            return Ok(TriageResult::Rejected { accuracy });
        }

        Ok(TriageResult::Accepted {
            metadata: self.with_duration(name, metadata).await,
            vtt: Some(vtt),
            accuracy: Some(accuracy),
        })
    }

    async fn with_duration(
        &self,
        name: &str,
        mut metadata: SubmissionMetadata,
    ) -> SubmissionMetadata {
        match self.surface.audio_duration(name).await {
            Ok(duration) => metadata.duration = Some(duration),
            Err(error) => {
                tracing::warn!(submission = name, error = %error, "audio duration unavailable");
            }
        }
        metadata
    }
}

#[async_trait]
impl TriageUseCase for TriageUseCaseImpl {
    async fn triage_batch(
        &self,
        request: TriageBatchRequest,
    ) -> Result<BatchReport, ApplicationError> {
        request
            .validate()
            .map_err(|error| ApplicationError::Validation(error.to_string()))?;

        tracing::info!(
            submission_count = request.submissions.len(),
            "gathering metadata and pre-screening submissions"
        );

        let mut outcomes = Vec::with_capacity(request.submissions.len());
        for name in &request.submissions {
            let result = self.triage_one(name).await?;
            outcomes.push(SubmissionOutcome {
                name: name.clone(),
                result,
            });
        }

        let accepted = outcomes
            .iter()
            .filter(|outcome| outcome.result.is_accepted())
            .count();
        tracing::info!(
            accepted,
            total = outcomes.len(),
            "finished pre-screening batch"
        );

        Ok(BatchReport { outcomes })
    }
}

/// Character-indexed transcript slice, clamped to the transcript bounds.
fn slice_chars(transcript: &str, start: usize, end: usize) -> String {
    transcript
        .chars()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect()
}
