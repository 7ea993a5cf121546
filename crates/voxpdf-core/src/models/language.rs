//! Language codes shared by OCR hinting, translation and speech.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Two-letter or regional language code (`en`, `vi`, `zh-CN`).
///
/// The code is passed through to collaborators as-is; it is not checked
/// against any list of supported languages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageCode(String);

/// ISO 639-1 codes and the Tesseract traineddata name for each.
const TESSERACT_CODES: &[(&str, &str)] = &[
    ("ar", "ara"),
    ("cs", "ces"),
    ("de", "deu"),
    ("en", "eng"),
    ("es", "spa"),
    ("fr", "fra"),
    ("hi", "hin"),
    ("id", "ind"),
    ("it", "ita"),
    ("ja", "jpn"),
    ("ko", "kor"),
    ("nl", "nld"),
    ("pl", "pol"),
    ("pt", "por"),
    ("ru", "rus"),
    ("th", "tha"),
    ("tr", "tur"),
    ("uk", "ukr"),
    ("vi", "vie"),
    ("zh-cn", "chi_sim"),
    ("zh-tw", "chi_tra"),
    ("zh", "chi_sim"),
];

impl LanguageCode {
    /// Wrap a code without validation.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// The code as given.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Tesseract traineddata name for this language, if known.
    ///
    /// Regional codes fall back to their primary subtag (`pt-BR` -> `por`).
    pub fn tesseract_code(&self) -> Option<&'static str> {
        let lower = self.0.to_ascii_lowercase();
        let primary = lower.split(['-', '_']).next().unwrap_or_default();

        TESSERACT_CODES
            .iter()
            .find(|(iso, _)| *iso == lower)
            .or_else(|| TESSERACT_CODES.iter().find(|(iso, _)| *iso == primary))
            .map(|(_, tess)| *tess)
    }
}

impl Default for LanguageCode {
    fn default() -> Self {
        Self::new("en")
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LanguageCode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s.trim()))
    }
}

/// Build a combined Tesseract language hint.
///
/// English is always included first; unknown codes are skipped and
/// duplicates collapsed, so `[vi, en]` yields `eng+vie`.
pub fn ocr_hint_for(languages: &[LanguageCode]) -> String {
    let mut codes = vec!["eng"];
    for code in languages.iter().filter_map(LanguageCode::tesseract_code) {
        if !codes.contains(&code) {
            codes.push(code);
        }
    }
    codes.join("+")
}
