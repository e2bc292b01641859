use crate::entity::ReconciledWord;

/// Default caption block header.
pub const VTT_HEADER: &str = "WEBVTT Kind: captions; Language: en";

const RANGE_SEPARATOR: &str = " --> ";
const SPEAKER_NAME: &str = "Speaker X";

/// Encodes a reconciled word sequence into caption text: one two-line cue
/// per resolved word, cues joined by blank lines, the whole block prefixed
/// by `header`.
pub fn words_to_vtt(words: &[ReconciledWord], header: &str) -> String {
    let mut vtt = header.to_string();
    for word in words {
        if let Some(cue) = word_to_cue(word) {
            vtt.push_str("\n\n");
            vtt.push_str(&cue);
        }
    }
    vtt
}

fn word_to_cue(word: &ReconciledWord) -> Option<String> {
    // Post-reconciliation every word is resolved; kept for defensiveness.
    if !word.case.is_success() {
        return None;
    }
    let range = format!(
        "{}{}{}",
        format_timestamp(word.start),
        RANGE_SEPARATOR,
        format_timestamp(word.end)
    );
    let caption = format!(
        "<v {SPEAKER_NAME}>{}",
        word.recognized_text().to_uppercase()
    );
    Some(format!("{range}\n{caption}"))
}

/// Formats non-negative seconds as `MM:SS.mmm` with millisecond rounding.
/// Known limitation: hours beyond 59 minutes wrap silently.
pub fn format_timestamp(seconds: f64) -> String {
    let minutes = (seconds / 60.0).floor() as u64 % 60;
    let whole_seconds = seconds.floor() as u64 % 60;
    let millis = (seconds * 1000.0).round() as u64 % 1000;
    format!("{minutes:02}:{whole_seconds:02}.{millis:03}")
}
