pub mod captions;
pub mod entity;
pub mod error;
pub mod port;
pub mod reconcile;
pub mod scoring;

pub use captions::{format_timestamp, words_to_vtt, VTT_HEADER};
pub use entity::*;
pub use error::{DomainError, TriageFault};
pub use port::*;
pub use reconcile::{ReconcilerConfig, TimestampReconciler, DEFAULT_CHAR_SPEAK_RATE};
pub use scoring::{alignment_accuracy, ScoringPolicy};
