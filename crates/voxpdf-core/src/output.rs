//! Writing results to user-chosen files.

use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::services::SpeechAudio;

/// Write text as UTF-8.
pub fn save_text(text: &str, path: &Path) -> Result<()> {
    std::fs::write(path, text)?;
    info!("Wrote {} bytes of text to {}", text.len(), path.display());
    Ok(())
}

/// Write synthesized speech as an MP3 file.
pub fn save_audio(audio: &SpeechAudio, path: &Path) -> Result<()> {
    std::fs::write(path, &audio.mp3)?;
    info!("Wrote {} bytes of audio to {}", audio.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VoxError;
    use crate::models::LanguageCode;

    #[test]
    fn test_save_text_is_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        save_text("Xin chào thế giới", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Xin chào thế giới");
    }

    #[test]
    fn test_save_audio_writes_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp3");
        let audio = SpeechAudio {
            language: LanguageCode::new("vi"),
            mp3: vec![0xFF, 0xFB, 0x90, 0x00],
        };
        save_audio(&audio, &path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), audio.mp3);
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.txt");
        assert!(matches!(save_text("x", &path), Err(VoxError::Io(_))));
    }
}
