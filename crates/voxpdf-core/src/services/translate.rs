//! Translation through the Google Translate web endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::TranslateError;
use crate::models::config::TranslationConfig;
use crate::models::language::LanguageCode;

/// Maps text to another language.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Short service name for logs.
    fn name(&self) -> &'static str;

    /// Translate `text` into `dest`. Empty input yields empty output.
    async fn translate(&self, text: &str, dest: &LanguageCode) -> Result<String, TranslateError>;
}

/// Client for the `translate_a/single` endpoint.
pub struct GoogleTranslator {
    client: reqwest::Client,
    config: TranslationConfig,
}

impl GoogleTranslator {
    pub fn new(config: TranslationConfig) -> Result<Self, TranslateError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    async fn translate_chunk(&self, chunk: &str, dest: &LanguageCode) -> Result<String, TranslateError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", self.config.source_language.as_str()),
                ("tl", dest.as_str()),
                ("dt", "t"),
            ])
            .form(&[("q", chunk)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslateError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_response(&body)
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn translate(&self, text: &str, dest: &LanguageCode) -> Result<String, TranslateError> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let chunks = split_for_translation(text, self.config.max_chunk_chars);
        info!("Translating {} chars to {} in {} requests", text.len(), dest, chunks.len());

        let mut translated = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            debug!("Translating chunk {}/{} ({} chars)", i + 1, chunks.len(), chunk.len());
            translated.push(self.translate_chunk(chunk, dest).await?);
        }

        Ok(translated.join("\n\n"))
    }
}

/// Concatenate the translated segments of a `dt=t` response.
///
/// The body is a nested array whose first element lists
/// `[translated, original, ...]` segments.
fn parse_response(body: &str) -> Result<String, TranslateError> {
    let value: Value = serde_json::from_str(body).map_err(|e| TranslateError::Parse(e.to_string()))?;

    let segments = value
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslateError::Parse("missing segment list".to_string()))?;

    Ok(segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect())
}

/// Split text into request-sized chunks of at most `max_chars` characters.
///
/// Paragraphs (blank-line separated) are packed together while they fit;
/// a paragraph that is too long on its own is split between words, and a
/// single over-long word is split by characters.
pub fn split_for_translation(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();

    let paragraphs = text.split("\n\n").map(str::trim).filter(|p| !p.is_empty());
    for paragraph in paragraphs {
        let pieces = if paragraph.chars().count() > max_chars {
            split_words(paragraph, max_chars)
        } else {
            vec![paragraph.to_string()]
        };

        for piece in pieces {
            let needed = if current.is_empty() { 0 } else { 2 } + piece.chars().count();
            if !current.is_empty() && current.chars().count() + needed > max_chars {
                chunks.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push_str("\n\n");
            }
            current.push_str(&piece);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Greedy word packing; words longer than `max_chars` are cut.
pub(crate) fn split_words(text: &str, max_chars: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            pieces.extend(chars.chunks(max_chars).map(|c| c.iter().collect::<String>()));
            continue;
        }

        let needed = if current.is_empty() { word_len } else { word_len + 1 };
        if current_len + needed > max_chars {
            pieces.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}
