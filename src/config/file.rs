//! TOML configuration file loading
//!
//! Supports `~/.config/voiceletter/config.toml` as a persistent config
//! source. All fields are optional — the file is a partial overlay on top of
//! defaults.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct VoiceletterConfigFile {
    /// Capture/recognition configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Speech-to-text configuration
    #[serde(default)]
    pub stt: SttFileConfig,

    /// Text-to-speech configuration
    #[serde(default)]
    pub tts: TtsFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,
}

/// Capture/recognition configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Language tag sent to the recognition backend (e.g. "en-US")
    pub language: Option<String>,

    /// Per-turn capture window in seconds
    pub phrase_seconds: Option<f64>,
}

/// Speech-to-text configuration
#[derive(Debug, Default, Deserialize)]
pub struct SttFileConfig {
    /// Backend provider ("whisper" or "deepgram")
    pub provider: Option<String>,

    /// Model identifier (e.g. "whisper-1", "nova-2")
    pub model: Option<String>,
}

/// Text-to-speech configuration
#[derive(Debug, Default, Deserialize)]
pub struct TtsFileConfig {
    /// Provider ("openai" or "elevenlabs")
    pub provider: Option<String>,

    /// Voice identifier (e.g. "alloy")
    pub voice: Option<String>,

    /// Model identifier (e.g. "tts-1")
    pub model: Option<String>,

    /// Speaking rate in words per minute
    pub rate_wpm: Option<u32>,

    /// Playback volume, 0.0 to 1.0
    pub volume: Option<f32>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
    pub deepgram: Option<String>,
    pub elevenlabs: Option<String>,
}

/// Path to the user's config file, if a home directory can be determined
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "voiceletter")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load the config file, returning defaults if absent or unreadable
///
/// A malformed file is reported and ignored rather than aborting startup.
#[must_use]
pub fn load_config_file() -> VoiceletterConfigFile {
    let Some(path) = config_file_path() else {
        return VoiceletterConfigFile::default();
    };

    let Ok(contents) = std::fs::read_to_string(&path) else {
        return VoiceletterConfigFile::default();
    };

    match toml::from_str(&contents) {
        Ok(file) => {
            tracing::debug!(path = %path.display(), "loaded config file");
            file
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config file");
            VoiceletterConfigFile::default()
        }
    }
}
