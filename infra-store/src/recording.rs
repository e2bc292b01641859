use async_trait::async_trait;
use tokio::sync::RwLock;

use prescreen_domain::{DomainError, RecordingDocument, RecordingStorePort};

/// In-memory recording-document store with a pending partition for normal
/// recordings awaiting downstream processing and a processed partition for
/// interaction recordings.
#[derive(Debug, Default)]
pub struct InMemoryRecordingStore {
    pending: RwLock<Vec<RecordingDocument>>,
    processed: RwLock<Vec<RecordingDocument>>,
}

impl InMemoryRecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn pending(&self) -> Vec<RecordingDocument> {
        self.pending.read().await.clone()
    }

    pub async fn processed(&self) -> Vec<RecordingDocument> {
        self.processed.read().await.clone()
    }
}

#[async_trait]
impl RecordingStorePort for InMemoryRecordingStore {
    async fn insert_pending(&self, documents: Vec<RecordingDocument>) -> Result<(), DomainError> {
        tracing::debug!(count = documents.len(), "inserting pending documents");
        self.pending.write().await.extend(documents);
        Ok(())
    }

    async fn insert_processed(&self, documents: Vec<RecordingDocument>) -> Result<(), DomainError> {
        tracing::debug!(count = documents.len(), "inserting processed documents");
        self.processed.write().await.extend(documents);
        Ok(())
    }
}
