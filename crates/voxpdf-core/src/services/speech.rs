//! Text-to-speech through the Google Translate TTS endpoint.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use super::translate::split_words;
use crate::error::SpeechError;
use crate::models::config::SpeechConfig;
use crate::models::language::LanguageCode;

/// Synthesized speech as MP3 data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechAudio {
    pub language: LanguageCode,
    pub mp3: Vec<u8>,
}

impl SpeechAudio {
    pub fn len(&self) -> usize {
        self.mp3.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mp3.is_empty()
    }
}

/// Maps text to audio.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Short service name for logs.
    fn name(&self) -> &'static str;

    /// Speak `text` in `language`.
    async fn synthesize(&self, text: &str, language: &LanguageCode) -> Result<SpeechAudio, SpeechError>;
}

/// Client for the `translate_tts` endpoint.
///
/// The service accepts short inputs only, so text is sent in chunks and the
/// returned MP3 streams are concatenated in order.
pub struct GoogleSpeech {
    client: reqwest::Client,
    config: SpeechConfig,
}

impl GoogleSpeech {
    pub fn new(config: SpeechConfig) -> Result<Self, SpeechError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleSpeech {
    fn name(&self) -> &'static str {
        "google-tts"
    }

    async fn synthesize(&self, text: &str, language: &LanguageCode) -> Result<SpeechAudio, SpeechError> {
        let chunks = split_for_speech(text, self.config.max_chunk_chars);
        if chunks.is_empty() {
            return Err(SpeechError::EmptyText);
        }
        info!("Synthesizing {} chunks in {}", chunks.len(), language);

        let total = chunks.len().to_string();
        let mut mp3 = Vec::new();

        for (idx, chunk) in chunks.iter().enumerate() {
            let response = self
                .client
                .get(&self.config.endpoint)
                .query(&[
                    ("ie", "UTF-8"),
                    ("q", chunk.as_str()),
                    ("tl", language.as_str()),
                    ("client", "tw-ob"),
                    ("ttsspeed", "1"),
                    ("total", total.as_str()),
                    ("idx", idx.to_string().as_str()),
                    ("textlen", chunk.chars().count().to_string().as_str()),
                ])
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(SpeechError::Status {
                    status: status.as_u16(),
                    chunk: idx,
                });
            }

            let bytes = response.bytes().await?;
            debug!("Chunk {}/{}: {} bytes", idx + 1, chunks.len(), bytes.len());
            mp3.extend_from_slice(&bytes);
        }

        Ok(SpeechAudio {
            language: language.clone(),
            mp3,
        })
    }
}

/// Characters after which a spoken chunk may end when followed by
/// whitespace or the end of the text.
const SENTENCE_BREAKS: &[char] = &['.', '!', '?', ';', ':', ',', '…'];

/// Full-width marks that end a chunk even without following whitespace.
const CJK_BREAKS: &[char] = &['。', '！', '？', '、'];

/// Split text into speakable chunks of at most `max_chars` characters.
///
/// Text that already fits is returned as one trimmed chunk. Longer text is
/// cut at sentence punctuation, pieces that are still too long are split
/// between words, and neighbouring short pieces are merged back together
/// while they fit.
pub fn split_for_speech(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let text = text.trim();
    if !is_speakable(text) {
        return Vec::new();
    }
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut pieces = Vec::new();
    for sentence in sentences(text) {
        let sentence = sentence.trim();
        if !is_speakable(sentence) {
            continue;
        }
        if sentence.chars().count() > max_chars {
            pieces.extend(split_words(sentence, max_chars));
        } else {
            pieces.push(sentence.to_string());
        }
    }

    let mut chunks: Vec<String> = Vec::new();
    for piece in pieces {
        match chunks.last_mut() {
            Some(last) if last.chars().count() + 1 + piece.chars().count() <= max_chars => {
                last.push(' ');
                last.push_str(&piece);
            }
            _ => chunks.push(piece),
        }
    }
    chunks
}

/// Sentence slices of `text`, each ending with its break character.
///
/// Punctuation inside a token (`3.14`, `3,000`, `10:30`) does not end a
/// sentence.
fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let ends_sentence = c == '\n'
            || CJK_BREAKS.contains(&c)
            || (SENTENCE_BREAKS.contains(&c) && chars.peek().is_none_or(|(_, next)| next.is_whitespace()));
        if ends_sentence {
            let end = i + c.len_utf8();
            out.push(&text[start..end]);
            start = end;
        }
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}

/// Anything besides whitespace and punctuation.
fn is_speakable(text: &str) -> bool {
    text.chars()
        .any(|c| !c.is_whitespace() && !SENTENCE_BREAKS.contains(&c) && !CJK_BREAKS.contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_short_text_is_one_chunk() {
        assert_eq!(split_for_speech("Hello world.", 100), vec!["Hello world."]);
    }

    #[test]
    fn test_splits_on_sentences_then_merges() {
        let text = "One. Two! Three? Four.";
        assert_eq!(split_for_speech(text, 10), vec!["One. Two!", "Three?", "Four."]);
    }

    #[test]
    fn test_long_sentence_split_on_words() {
        let text = "the quick brown fox jumps over the lazy dog";
        let chunks = split_for_speech(text, 15);
        assert!(chunks.iter().all(|c| c.chars().count() <= 15));
        assert_eq!(chunks.join(" "), text);
    }

    #[test]
    fn test_numbers_and_times_pass_through_unchanged() {
        let text = "Pi is 3.14 and it costs 3,000 dollars at 10:30.";
        assert_eq!(split_for_speech(text, 100), vec![text]);
    }

    #[test]
    fn test_inner_punctuation_survives_chunking() {
        let text = "Pi is 3.14 and it costs 3,000 dollars.";
        let chunks = split_for_speech(text, 20);
        assert_eq!(chunks, vec!["Pi is 3.14 and it", "costs 3,000 dollars."]);
    }

    #[test]
    fn test_cjk_marks_split_without_spaces() {
        assert_eq!(split_for_speech("你好。世界！", 3), vec!["你好。", "世界！"]);
    }

    #[test]
    fn test_blank_and_punctuation_only_yield_nothing() {
        assert!(split_for_speech("   \n\n ", 100).is_empty());
        assert!(split_for_speech("... !!", 100).is_empty());
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected() {
        let speech = GoogleSpeech::new(SpeechConfig::default()).unwrap();
        let err = speech.synthesize("  ", &LanguageCode::new("en")).await.unwrap_err();
        assert!(matches!(err, SpeechError::EmptyText));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error() {
        let speech = GoogleSpeech::new(SpeechConfig {
            endpoint: "http://127.0.0.1:9/tts".to_string(),
            timeout_secs: 2,
            ..SpeechConfig::default()
        })
        .unwrap();
        let err = speech.synthesize("Xin chào", &LanguageCode::new("vi")).await.unwrap_err();
        assert!(matches!(err, SpeechError::Http(_)));
    }
}
