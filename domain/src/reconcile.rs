use crate::entity::{RawWord, ReconciledWord, WordCase};

/// Estimated speaking rate used for words the engine could not align.
pub const DEFAULT_CHAR_SPEAK_RATE: f64 = 0.075;

#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Synthetic seconds per character for unaligned words.
    pub char_speak_rate: f64,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            char_speak_rate: DEFAULT_CHAR_SPEAK_RATE,
        }
    }
}

/// Repairs a raw engine alignment into a temporally consistent sequence.
///
/// Unaligned words get a synthetic duration estimated from their length and
/// are chained onto the previous word's end. Aligned words are shifted by
/// the lag accumulated whenever an engine timing collides with an estimated
/// predecessor. Offsets are widened over the adjacent non-whitespace run so
/// punctuation next to a word stays attached to it.
#[derive(Debug, Clone, Default)]
pub struct TimestampReconciler {
    config: ReconcilerConfig,
}

impl TimestampReconciler {
    pub fn new(config: ReconcilerConfig) -> Self {
        Self { config }
    }

    pub fn reconcile(&self, transcript: &str, words: &[RawWord]) -> Vec<ReconciledWord> {
        let mut reconciled = Vec::with_capacity(words.len());
        let mut prev_end = 0.0_f64;
        let mut prev_end_unaligned = 0.0_f64;
        let mut total_lag = 0.0_f64;

        for word in words {
            let new_start;
            let new_end;
            if word.case.is_success() {
                let mut start = word.start + total_lag;
                let mut end = word.end + total_lag;
                if start < prev_end_unaligned {
                    // Engine timing collides with an estimated predecessor.
                    let lag = prev_end_unaligned - start;
                    total_lag += lag;
                    start += lag;
                    end += lag;
                }
                new_start = start;
                new_end = end;
            } else {
                let estimated = self.config.char_speak_rate * word.text.chars().count() as f64;
                new_start = prev_end;
                new_end = new_start + estimated;
                prev_end_unaligned = new_end;
            }

            let start_offset = widen_start(transcript, word.start_offset);
            let end_offset = widen_end(transcript, word.end_offset);
            reconciled.push(ReconciledWord {
                text: transcript[start_offset..end_offset].to_string(),
                aligned_text: word.aligned_text.clone(),
                case: WordCase::Success,
                start_offset,
                end_offset,
                start: new_start,
                end: new_end,
                duration: new_end - new_start,
                phones: word.phones.clone(),
            });
            prev_end = new_end;
        }

        merge_duplicate_hyphenations(reconciled)
    }
}

/// Collapses adjacent duplicate emissions of the same hyphenated compound.
/// The successor inherits the predecessor's start and accumulates its
/// duration; non-adjacent repeats are untouched.
pub fn merge_duplicate_hyphenations(mut words: Vec<ReconciledWord>) -> Vec<ReconciledWord> {
    let mut index = 1;
    while index < words.len() {
        let duplicate =
            words[index].text == words[index - 1].text && words[index].text.contains('-');
        if duplicate {
            let predecessor = words.remove(index - 1);
            words[index - 1].start = predecessor.start;
            words[index - 1].duration += predecessor.duration;
        } else {
            index += 1;
        }
    }
    words
}

fn floor_char_boundary(transcript: &str, offset: usize) -> usize {
    let mut offset = offset.min(transcript.len());
    while !transcript.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

fn widen_start(transcript: &str, offset: usize) -> usize {
    let mut offset = floor_char_boundary(transcript, offset);
    while let Some(previous) = transcript[..offset].chars().next_back() {
        if previous.is_whitespace() {
            break;
        }
        offset -= previous.len_utf8();
    }
    offset
}

fn widen_end(transcript: &str, offset: usize) -> usize {
    let mut offset = floor_char_boundary(transcript, offset);
    while let Some(next) = transcript[offset..].chars().next() {
        if next.is_whitespace() {
            break;
        }
        offset += next.len_utf8();
    }
    offset
}
