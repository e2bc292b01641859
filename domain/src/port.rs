use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::entity::{
    QuestionQuery, QuestionRecord, RawWord, RecordingDocument, RecordingRef, RecordingType,
    SubmissionMetadata,
};
use crate::error::DomainError;

/// Opaque forced-alignment engine: audio plus expected transcript in, one
/// raw word per transcript token out. Engine-level failures surface as
/// `DomainError::AlignerRuntime`.
#[async_trait]
pub trait ForcedAlignerPort: Send + Sync {
    async fn align(&self, audio: &Path, transcript: &str) -> Result<Vec<RawWord>, DomainError>;
}

/// Question store with two logical partitions: questions still awaiting a
/// recording and questions that already have one. The two-partition
/// contract is preserved at this boundary even when an adapter stores a
/// single record with a status flag.
#[async_trait]
pub trait QuestionStorePort: Send + Sync {
    async fn find_unrecorded(
        &self,
        query: &QuestionQuery,
    ) -> Result<Option<QuestionRecord>, DomainError>;

    async fn find_recorded(
        &self,
        query: &QuestionQuery,
    ) -> Result<Option<QuestionRecord>, DomainError>;

    async fn insert_recorded(&self, question: QuestionRecord) -> Result<(), DomainError>;

    async fn delete_unrecorded(&self, question_id: i64) -> Result<(), DomainError>;

    /// Appends a recording reference to a recorded question. Returns the
    /// matched document count; zero signals a lost update.
    async fn push_recording(
        &self,
        question_id: i64,
        recording: RecordingRef,
    ) -> Result<u64, DomainError>;

    /// Bulk variant of `push_recording`, one store round trip per batch.
    async fn bulk_push_recordings(
        &self,
        updates: &[(i64, RecordingRef)],
    ) -> Result<u64, DomainError>;

    async fn unrecorded_ids(&self) -> Result<Vec<i64>, DomainError>;

    async fn recorded_ids(&self) -> Result<Vec<i64>, DomainError>;
}

#[async_trait]
pub trait UserStorePort: Send + Sync {
    /// Appends a recording reference to a user's history. Returns the
    /// matched document count.
    async fn push_recording(
        &self,
        user_id: &str,
        recording: RecordingRef,
    ) -> Result<u64, DomainError>;

    /// Bulk variant, one store round trip per batch.
    async fn bulk_push_recordings(
        &self,
        updates: &[(String, RecordingRef)],
    ) -> Result<u64, DomainError>;

    async fn ids(&self) -> Result<Vec<String>, DomainError>;
}

/// Recording-document store: normal recordings land in a pending partition
/// until downstream processing picks them up, interaction recordings go
/// straight to the processed partition.
#[async_trait]
pub trait RecordingStorePort: Send + Sync {
    async fn insert_pending(&self, documents: Vec<RecordingDocument>) -> Result<(), DomainError>;

    async fn insert_processed(&self, documents: Vec<RecordingDocument>) -> Result<(), DomainError>;
}

/// Blob storage for submission audio, one bulk call per recording type.
/// Returns a submission-name to blob-id mapping.
#[async_trait]
pub trait BlobStorePort: Send + Sync {
    async fn store_many(
        &self,
        entries: &[(String, PathBuf)],
        rec_type: &RecordingType,
    ) -> Result<HashMap<String, String>, DomainError>;
}

/// The watched input surface: named submissions, each backed by an audio
/// file and a metadata sidecar.
#[async_trait]
pub trait SubmissionSurfacePort: Send + Sync {
    /// Up to `limit` submission names, deduplicated and sorted.
    async fn poll(&self, limit: usize) -> Result<Vec<String>, DomainError>;

    /// Decoded metadata, or `None` when no sidecar exists.
    async fn metadata(&self, name: &str) -> Result<Option<SubmissionMetadata>, DomainError>;

    fn audio_path(&self, name: &str) -> PathBuf;

    /// Duration of the backing audio in seconds.
    async fn audio_duration(&self, name: &str) -> Result<f64, DomainError>;

    /// Removes every backing file of the submission.
    async fn delete(&self, name: &str) -> Result<(), DomainError>;

    /// Moves the submission's backing files to the error directory for
    /// manual inspection.
    async fn quarantine(&self, name: &str) -> Result<(), DomainError>;
}
