//! Clients for the external translation and speech services.

mod speech;
mod translate;

pub use speech::{GoogleSpeech, SpeechAudio, SpeechSynthesizer, split_for_speech};
pub use translate::{GoogleTranslator, Translator, split_for_translation};
