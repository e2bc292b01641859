use async_trait::async_trait;
use tokio::sync::RwLock;

use prescreen_domain::{
    DomainError, QuestionQuery, QuestionRecord, QuestionStorePort, RecordingRef,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuestionStatus {
    Unrecorded,
    Recorded,
}

#[derive(Debug, Clone)]
struct StoredQuestion {
    status: QuestionStatus,
    record: QuestionRecord,
}

/// In-memory question store. One table with a status flag per record; the
/// port keeps the two-partition contract, so moving a question between
/// partitions is a status update behind a single lock.
#[derive(Debug, Default)]
pub struct InMemoryQuestionStore {
    questions: RwLock<Vec<StoredQuestion>>,
}

impl InMemoryQuestionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_unrecorded(&self, record: QuestionRecord) {
        self.questions.write().await.push(StoredQuestion {
            status: QuestionStatus::Unrecorded,
            record,
        });
    }

    pub async fn seed_recorded(&self, record: QuestionRecord) {
        self.questions.write().await.push(StoredQuestion {
            status: QuestionStatus::Recorded,
            record,
        });
    }

    async fn find(
        &self,
        query: &QuestionQuery,
        status: QuestionStatus,
    ) -> Option<QuestionRecord> {
        self.questions
            .read()
            .await
            .iter()
            .find(|stored| stored.status == status && stored.record.matches(query))
            .map(|stored| stored.record.clone())
    }

    async fn ids(&self, status: QuestionStatus) -> Vec<i64> {
        self.questions
            .read()
            .await
            .iter()
            .filter(|stored| stored.status == status)
            .map(|stored| stored.record.question_id)
            .collect()
    }
}

#[async_trait]
impl QuestionStorePort for InMemoryQuestionStore {
    async fn find_unrecorded(
        &self,
        query: &QuestionQuery,
    ) -> Result<Option<QuestionRecord>, DomainError> {
        Ok(self.find(query, QuestionStatus::Unrecorded).await)
    }

    async fn find_recorded(
        &self,
        query: &QuestionQuery,
    ) -> Result<Option<QuestionRecord>, DomainError> {
        Ok(self.find(query, QuestionStatus::Recorded).await)
    }

    async fn insert_recorded(&self, question: QuestionRecord) -> Result<(), DomainError> {
        self.questions.write().await.push(StoredQuestion {
            status: QuestionStatus::Recorded,
            record: question,
        });
        Ok(())
    }

    async fn delete_unrecorded(&self, question_id: i64) -> Result<(), DomainError> {
        self.questions.write().await.retain(|stored| {
            stored.status != QuestionStatus::Unrecorded
                || stored.record.question_id != question_id
        });
        Ok(())
    }

    async fn push_recording(
        &self,
        question_id: i64,
        recording: RecordingRef,
    ) -> Result<u64, DomainError> {
        let mut questions = self.questions.write().await;
        match questions.iter_mut().find(|stored| {
            stored.status == QuestionStatus::Recorded && stored.record.question_id == question_id
        }) {
            Some(stored) => {
                stored.record.recordings.push(recording);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn bulk_push_recordings(
        &self,
        updates: &[(i64, RecordingRef)],
    ) -> Result<u64, DomainError> {
        let mut questions = self.questions.write().await;
        let mut matched = 0;
        for (question_id, recording) in updates {
            if let Some(stored) = questions.iter_mut().find(|stored| {
                stored.status == QuestionStatus::Recorded
                    && stored.record.question_id == *question_id
            }) {
                stored.record.recordings.push(recording.clone());
                matched += 1;
            }
        }
        Ok(matched)
    }

    async fn unrecorded_ids(&self) -> Result<Vec<i64>, DomainError> {
        Ok(self.ids(QuestionStatus::Unrecorded).await)
    }

    async fn recorded_ids(&self) -> Result<Vec<i64>, DomainError> {
        Ok(self.ids(QuestionStatus::Recorded).await)
    }
}
