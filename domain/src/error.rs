use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("alignment engine failure: {0}")]
    AlignerRuntime(String),

    #[error("accuracy is undefined for an empty word sequence")]
    EmptyAlignment,

    #[error("store operation failed: {0}")]
    Store(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn invalid_input(message: &str) -> Self {
        DomainError::InvalidInput(message.to_string())
    }

    pub fn internal_error(message: &str) -> Self {
        DomainError::Internal(message.to_string())
    }

    pub fn store(message: impl Into<String>) -> Self {
        DomainError::Store(message.into())
    }
}

/// Machine-readable per-submission failure codes. Each attaches to the
/// offending submission only; none abort a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriageFault {
    /// No metadata record exists for the submission.
    #[error("meta_not_found")]
    MetaNotFound,
    /// Metadata is present but carries no question reference.
    #[error("qid_not_found")]
    QidNotFound,
    /// Neither store partition holds a matching question record.
    #[error("sentence_not_found")]
    SentenceNotFound,
    /// The matched question record has no transcript field.
    #[error("transcript_not_found")]
    TranscriptNotFound,
    /// The alignment engine failed internally.
    #[error("runtime_error")]
    RuntimeError,
    /// A linkage call was made without a question identifier.
    #[error("undefined_question_id")]
    UndefinedQuestionId,
    /// A linkage call was made without a user identifier.
    #[error("undefined_user_id")]
    UndefinedUserId,
    /// A question update matched zero documents.
    #[error("question_update_failure")]
    QuestionUpdateFailure,
    /// A user update matched zero documents.
    #[error("user_update_failure")]
    UserUpdateFailure,
}
