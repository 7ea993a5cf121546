//! Configuration and shared value types.

pub mod config;
pub mod language;

pub use config::VoxConfig;
pub use language::LanguageCode;
