//! Voiceletter - push-to-talk speech capture and transcription assistant
//!
//! This library provides the core pipeline for converting short spoken
//! utterances into text:
//! - Fixed-duration audio capture from the default microphone
//! - Encoding into a recognizer-compatible payload
//! - Dispatch to a remote transcription backend
//! - Optional spoken feedback via a text-to-speech collaborator
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                  SessionLoop                      │
//! │   Assistant  │  SimpleText  │  SingleShot        │
//! └────────────────────┬─────────────────────────────┘
//!                      │  one turn at a time
//! ┌────────────────────▼─────────────────────────────┐
//! │  AudioCapture → PayloadEncoder → RecognitionClient│
//! │                          └──────→ Synthesizer     │
//! └──────────────────────────────────────────────────┘
//! ```

pub mod audio;
pub mod config;
pub mod error;
pub mod session;
pub mod stt;
pub mod tts;

pub use audio::{AudioBuffer, AudioCapture, AudioPlayback, RecognitionPayload, SAMPLE_RATE};
pub use config::Config;
pub use error::{Error, Result};
pub use session::{Mode, Prompt, SessionLoop, SessionState, StdinPrompt};
pub use stt::{RecognitionClient, RecognitionOutcome, Recognizer};
pub use tts::{SpeechSynthesizer, SynthOptions, Synthesizer};
