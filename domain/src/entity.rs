use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::TriageFault;

/// Outcome reported by the alignment engine for a single word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WordCase {
    #[serde(rename = "success")]
    Success,
    #[serde(rename = "not-found-in-audio")]
    NotFoundInAudio,
    #[serde(rename = "not-found-in-transcript")]
    NotFoundInTranscript,
}

impl WordCase {
    pub fn is_success(&self) -> bool {
        matches!(self, WordCase::Success)
    }
}

/// Phoneme timing entry. Carried through untouched, never reprocessed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phone {
    pub phone: String,
    pub duration: f64,
}

/// One token as produced by the alignment engine, immutable once decoded.
///
/// Offsets are byte offsets into the transcript the engine was given, with
/// `0 <= start_offset <= end_offset <= transcript.len()`. The timing fields
/// are meaningful only when `case` is `Success`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawWord {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aligned_text: Option<String>,
    pub case: WordCase,
    pub start_offset: usize,
    pub end_offset: usize,
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub end: f64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phones: Vec<Phone>,
}

impl RawWord {
    /// A successfully aligned word with engine-reported timings.
    pub fn aligned(
        text: impl Into<String>,
        aligned_text: impl Into<String>,
        offsets: (usize, usize),
        start: f64,
        end: f64,
    ) -> Self {
        Self {
            text: text.into(),
            aligned_text: Some(aligned_text.into()),
            case: WordCase::Success,
            start_offset: offsets.0,
            end_offset: offsets.1,
            start,
            end,
            duration: end - start,
            phones: Vec::new(),
        }
    }

    /// A word the engine could not align; timings are zeroed.
    pub fn unaligned(text: impl Into<String>, case: WordCase, offsets: (usize, usize)) -> Self {
        Self {
            text: text.into(),
            aligned_text: None,
            case,
            start_offset: offsets.0,
            end_offset: offsets.1,
            start: 0.0,
            end: 0.0,
            duration: 0.0,
            phones: Vec::new(),
        }
    }
}

/// A repaired word: every entry is resolved, with recomputed timings and
/// offsets widened to the surrounding non-whitespace run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledWord {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aligned_text: Option<String>,
    pub case: WordCase,
    pub start_offset: usize,
    pub end_offset: usize,
    pub start: f64,
    pub end: f64,
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phones: Vec<Phone>,
}

impl ReconciledWord {
    /// The recognized form when the engine produced one, the display text
    /// otherwise (estimated words carry no recognized form).
    pub fn recognized_text(&self) -> &str {
        self.aligned_text.as_deref().unwrap_or(&self.text)
    }
}

/// Recording type carried in submission metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordingType {
    Normal,
    Buzz,
    Answer,
    Other(String),
}

impl RecordingType {
    pub fn as_str(&self) -> &str {
        match self {
            RecordingType::Normal => "normal",
            RecordingType::Buzz => "buzz",
            RecordingType::Answer => "answer",
            RecordingType::Other(tag) => tag,
        }
    }
}

impl From<String> for RecordingType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "normal" => RecordingType::Normal,
            "buzz" => RecordingType::Buzz,
            "answer" => RecordingType::Answer,
            _ => RecordingType::Other(raw),
        }
    }
}

impl From<RecordingType> for String {
    fn from(rec_type: RecordingType) -> Self {
        rec_type.as_str().to_string()
    }
}

/// Metadata sidecar of a submission. Unknown fields round-trip via `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionMetadata {
    #[serde(rename = "recType")]
    pub rec_type: RecordingType,
    #[serde(default, rename = "qb_id", skip_serializing_if = "Option::is_none")]
    pub question_id: Option<i64>,
    #[serde(default, rename = "sentenceId", skip_serializing_if = "Option::is_none")]
    pub sentence_id: Option<i64>,
    #[serde(default, rename = "tokenizationId", skip_serializing_if = "Option::is_none")]
    pub tokenization_id: Option<usize>,
    #[serde(default, rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SubmissionMetadata {
    pub fn new(rec_type: RecordingType) -> Self {
        Self {
            rec_type,
            question_id: None,
            sentence_id: None,
            tokenization_id: None,
            user_id: None,
            duration: None,
            extra: Map::new(),
        }
    }
}

/// Lookup key for the question store: question reference plus an optional
/// sentence sub-reference. A query without a sentence matches any sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionQuery {
    pub question_id: i64,
    pub sentence_id: Option<i64>,
}

/// A question document as held by either store partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(rename = "qb_id")]
    pub question_id: i64,
    #[serde(default, rename = "sentenceId", skip_serializing_if = "Option::is_none")]
    pub sentence_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    /// Character intervals splitting the transcript into independently
    /// recordable sentences.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tokenizations: Vec<(usize, usize)>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recordings: Vec<RecordingRef>,
}

impl QuestionRecord {
    pub fn matches(&self, query: &QuestionQuery) -> bool {
        self.question_id == query.question_id
            && query
                .sentence_id
                .map_or(true, |sentence_id| self.sentence_id == Some(sentence_id))
    }
}

/// Reference pushed onto question and user recording histories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingRef {
    pub id: String,
    #[serde(rename = "recType")]
    pub rec_type: RecordingType,
}

/// Persisted record of one accepted submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingDocument {
    pub id: String,
    #[serde(flatten)]
    pub metadata: SubmissionMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vtt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    #[serde(default, rename = "recordedAudios")]
    pub recorded_audios: Vec<RecordingRef>,
}

/// Per-submission triage decision, produced once and never revised.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "case", rename_all = "snake_case")]
pub enum TriageResult {
    Accepted {
        metadata: SubmissionMetadata,
        #[serde(skip_serializing_if = "Option::is_none")]
        vtt: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        accuracy: Option<f64>,
    },
    Rejected {
        accuracy: f64,
    },
    Error {
        #[serde(rename = "err")]
        fault: TriageFault,
    },
}

impl TriageResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, TriageResult::Accepted { .. })
    }
}
