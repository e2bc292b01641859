use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use prescreen_domain::{DomainError, ForcedAlignerPort, Phone, RawWord, WordCase};

/// Connection settings for the forced-alignment sidecar.
#[derive(Debug, Clone)]
pub struct HttpAlignerConfig {
    pub endpoint: String,
    pub request_timeout_secs: u64,
}

/// HTTP adapter for a Gentle-compatible forced-alignment service: audio and
/// transcript go out as a multipart form, a per-word JSON alignment comes
/// back. Every failure past the input check is an engine runtime failure
/// from the caller's point of view.
pub struct HttpForcedAligner {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpForcedAligner {
    pub fn new(config: &HttpAlignerConfig) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|error| DomainError::internal_error(&error.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct WireAlignment {
    #[serde(default)]
    words: Vec<WireWord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireWord {
    case: WordCase,
    word: String,
    #[serde(default)]
    aligned_word: Option<String>,
    #[serde(default)]
    start: Option<f64>,
    #[serde(default)]
    end: Option<f64>,
    start_offset: usize,
    end_offset: usize,
    #[serde(default)]
    phones: Vec<WirePhone>,
}

#[derive(Debug, Deserialize)]
struct WirePhone {
    phone: String,
    duration: f64,
}

impl WireWord {
    fn into_raw_word(self) -> RawWord {
        let start = self.start.unwrap_or(0.0);
        let end = self.end.unwrap_or(start);
        RawWord {
            text: self.word,
            aligned_text: self.aligned_word,
            case: self.case,
            start_offset: self.start_offset,
            end_offset: self.end_offset,
            start,
            end,
            duration: end - start,
            phones: self
                .phones
                .into_iter()
                .map(|phone| Phone {
                    phone: phone.phone,
                    duration: phone.duration,
                })
                .collect(),
        }
    }
}

#[async_trait]
impl ForcedAlignerPort for HttpForcedAligner {
    async fn align(&self, audio: &Path, transcript: &str) -> Result<Vec<RawWord>, DomainError> {
        let audio_bytes = tokio::fs::read(audio).await.map_err(|error| {
            DomainError::invalid_input(&format!(
                "cannot read audio file {}: {error}",
                audio.display()
            ))
        })?;
        let file_name = audio
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.wav".to_string());

        tracing::debug!(
            audio = %audio.display(),
            transcript_len = transcript.len(),
            "requesting forced alignment"
        );

        let form = Form::new()
            .part("audio", Part::bytes(audio_bytes).file_name(file_name))
            .text("transcript", transcript.to_string());
        let response = self
            .client
            .post(format!("{}/transcriptions?async=false", self.endpoint))
            .multipart(form)
            .send()
            .await
            .map_err(|error| DomainError::AlignerRuntime(error.to_string()))?;

        if !response.status().is_success() {
            return Err(DomainError::AlignerRuntime(format!(
                "aligner returned status {}",
                response.status()
            )));
        }

        let alignment: WireAlignment = response
            .json()
            .await
            .map_err(|error| DomainError::AlignerRuntime(format!("undecodable response: {error}")))?;

        tracing::debug!(word_count = alignment.words.len(), "forced alignment completed");
        Ok(alignment
            .words
            .into_iter()
            .map(WireWord::into_raw_word)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_words_decode_and_map_into_raw_words() {
        let raw = r#"
        {
            "transcript": "Hello, world!",
            "words": [
                {
                    "case": "success",
                    "word": "Hello",
                    "alignedWord": "hello",
                    "start": 0.12,
                    "end": 0.55,
                    "startOffset": 0,
                    "endOffset": 5,
                    "phones": [{"phone": "hh_B", "duration": 0.1}]
                },
                {
                    "case": "not-found-in-audio",
                    "word": "world",
                    "startOffset": 7,
                    "endOffset": 12
                }
            ]
        }"#;

        let alignment: WireAlignment = serde_json::from_str(raw).expect("wire format decodes");
        let words: Vec<RawWord> = alignment
            .words
            .into_iter()
            .map(WireWord::into_raw_word)
            .collect();

        assert_eq!(words.len(), 2);
        assert!(words[0].case.is_success());
        assert_eq!(words[0].aligned_text.as_deref(), Some("hello"));
        assert!((words[0].duration - 0.43).abs() < 1e-9);
        assert_eq!(words[0].phones.len(), 1);
        assert_eq!(words[1].case, WordCase::NotFoundInAudio);
        assert_eq!(words[1].aligned_text, None);
        assert_eq!(words[1].start, 0.0);
        assert_eq!((words[1].start_offset, words[1].end_offset), (7, 12));
    }
}
