use std::sync::Arc;

use async_trait::async_trait;

use prescreen_domain::{
    QuestionQuery, QuestionStorePort, RecordingRef, TriageFault, UserStorePort,
};

use crate::{ApplicationError, IdCache};

/// Links processed recordings to their question and user records and owns
/// the process-local identifier caches. A question gaining its first
/// recording moves from the unrecorded to the recorded partition.
#[async_trait]
pub trait CatalogUseCase: Send + Sync {
    /// Returns a fault instead of erroring so one bad linkage never stops
    /// its siblings.
    async fn attach_recording_to_question(
        &self,
        question_id: Option<i64>,
        recording: RecordingRef,
    ) -> Result<Option<TriageFault>, ApplicationError>;

    async fn attach_recording_to_user(
        &self,
        user_id: Option<&str>,
        recording: RecordingRef,
    ) -> Result<Option<TriageFault>, ApplicationError>;

    async fn attach_recordings_to_users(
        &self,
        updates: Vec<(Option<String>, RecordingRef)>,
    ) -> Result<Vec<TriageFault>, ApplicationError>;

    fn known_unrecorded_question_ids(&self) -> Vec<i64>;

    fn known_recorded_question_ids(&self) -> Vec<i64>;

    fn known_user_ids(&self) -> Vec<String>;
}

pub struct CatalogUseCaseImpl {
    questions: Arc<dyn QuestionStorePort>,
    users: Arc<dyn UserStorePort>,
    unrecorded_question_ids: IdCache<i64>,
    recorded_question_ids: IdCache<i64>,
    user_ids: IdCache<String>,
}

impl CatalogUseCaseImpl {
    /// Snapshots the identifier caches from the stores.
    pub async fn bootstrap(
        questions: Arc<dyn QuestionStorePort>,
        users: Arc<dyn UserStorePort>,
    ) -> Result<Self, ApplicationError> {
        let unrecorded_question_ids = IdCache::new(questions.unrecorded_ids().await?);
        let recorded_question_ids = IdCache::new(questions.recorded_ids().await?);
        let user_ids = IdCache::new(users.ids().await?);
        tracing::info!(
            unrecorded = unrecorded_question_ids.len(),
            recorded = recorded_question_ids.len(),
            users = user_ids.len(),
            "identifier caches snapshotted"
        );
        Ok(Self {
            questions,
            users,
            unrecorded_question_ids,
            recorded_question_ids,
            user_ids,
        })
    }
}

#[async_trait]
impl CatalogUseCase for CatalogUseCaseImpl {
    async fn attach_recording_to_question(
        &self,
        question_id: Option<i64>,
        recording: RecordingRef,
    ) -> Result<Option<TriageFault>, ApplicationError> {
        let Some(question_id) = question_id else {
            tracing::warn!("missing question identifier, skipping update");
            return Ok(Some(TriageFault::UndefinedQuestionId));
        };
        let query = QuestionQuery {
            question_id,
            sentence_id: None,
        };

        if let Some(mut question) = self.questions.find_unrecorded(&query).await? {
            tracing::debug!(question_id, "first recording, moving question to recorded");
            question.recordings.push(recording);
            self.questions.insert_recorded(question).await?;
            self.questions.delete_unrecorded(question_id).await?;
            self.recorded_question_ids.append(question_id);
            self.unrecorded_question_ids
                .refresh(self.questions.unrecorded_ids().await?);
            return Ok(None);
        }

        let matched = self.questions.push_recording(question_id, recording).await?;
        if matched == 0 {
            tracing::warn!(question_id, "could not update question");
            return Ok(Some(TriageFault::QuestionUpdateFailure));
        }
        Ok(None)
    }

    async fn attach_recording_to_user(
        &self,
        user_id: Option<&str>,
        recording: RecordingRef,
    ) -> Result<Option<TriageFault>, ApplicationError> {
        let Some(user_id) = user_id else {
            tracing::warn!("missing user identifier, skipping update");
            return Ok(Some(TriageFault::UndefinedUserId));
        };
        let matched = self.users.push_recording(user_id, recording).await?;
        if matched == 0 {
            tracing::warn!(user_id, "could not update user");
            return Ok(Some(TriageFault::UserUpdateFailure));
        }
        Ok(None)
    }

    async fn attach_recordings_to_users(
        &self,
        updates: Vec<(Option<String>, RecordingRef)>,
    ) -> Result<Vec<TriageFault>, ApplicationError> {
        let mut faults = Vec::new();
        let mut batch = Vec::with_capacity(updates.len());
        for (user_id, recording) in updates {
            match user_id {
                Some(user_id) => batch.push((user_id, recording)),
                None => {
                    tracing::warn!("missing user identifier, skipping update");
                    faults.push(TriageFault::UndefinedUserId);
                }
            }
        }
        if batch.is_empty() {
            return Ok(faults);
        }

        let matched = self.users.bulk_push_recordings(&batch).await?;
        tracing::info!(matched, requested = batch.len(), "updated user documents");
        let missed = batch.len() as u64 - matched.min(batch.len() as u64);
        faults.extend(std::iter::repeat(TriageFault::UserUpdateFailure).take(missed as usize));
        Ok(faults)
    }

    fn known_unrecorded_question_ids(&self) -> Vec<i64> {
        self.unrecorded_question_ids.snapshot()
    }

    fn known_recorded_question_ids(&self) -> Vec<i64> {
        self.recorded_question_ids.snapshot()
    }

    fn known_user_ids(&self) -> Vec<String> {
        self.user_ids.snapshot()
    }
}
