//! Session orchestration: repeated capture→recognize turns per mode
//!
//! Each mode is its own runner function; in particular, exit-by-spoken-word
//! belongs to Assistant alone and must not leak into the other modes.

use std::io::{BufRead, Write};
use std::time::Duration;

use crate::audio::{self, CaptureSource};
use crate::stt::{RecognitionOutcome, Recognizer};
use crate::tts::Synthesizer;
use crate::{Error, Result};

/// Spoken words that end an Assistant session (matched case-insensitively
/// against the whole transcript)
const EXIT_WORDS: [&str; 3] = ["exit", "quit", "stop"];

/// Maximum utterance window per turn; longer speech is truncated.
///
/// There is deliberately no early stop on silence: fixed-window capture
/// trades latency for simplicity.
pub const PHRASE_WINDOW: Duration = Duration::from_secs(10);

/// Interaction mode for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Speaks every transcript back and exits on a spoken exit word
    Assistant,
    /// Prints transcripts; exits on a typed `q`
    SimpleText,
    /// One capture+recognize cycle, then done
    SingleShot,
}

/// Mode-scoped session state; `active = false` is the absorbing terminal
#[derive(Debug, Clone, Copy)]
pub struct SessionState {
    /// The interaction mode this session was entered with
    pub mode: Mode,
    /// Whether the loop keeps taking turns
    pub active: bool,
}

impl SessionState {
    fn new(mode: Mode) -> Self {
        Self { mode, active: true }
    }
}

/// Per-turn input trigger for `SimpleText` mode
///
/// A seam over the terminal so the state machine is testable with scripted
/// input.
pub trait Prompt {
    /// Show `message` and read one line of input
    ///
    /// # Errors
    ///
    /// Returns error if input cannot be read
    fn read_line(&mut self, message: &str) -> Result<String>;
}

/// Reads input lines from stdin
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn read_line(&mut self, message: &str) -> Result<String> {
        println!("{message}");
        std::io::stdout().flush()?;

        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        Ok(line)
    }
}

/// Orchestrates capture→encode→recognize(→synthesize) turns
///
/// Collaborators are constructed once at startup and passed in; the loop owns
/// no hidden global state. At most one buffer and one in-flight backend
/// request exist per turn. The synthesizer is optional — only Assistant mode
/// requires one.
pub struct SessionLoop<C, R, S, P> {
    capture: C,
    recognizer: R,
    synthesizer: Option<S>,
    prompt: P,
    window: Duration,
    state: SessionState,
}

impl<C, R, S, P> SessionLoop<C, R, S, P>
where
    C: CaptureSource,
    R: Recognizer,
    S: Synthesizer,
    P: Prompt,
{
    /// Create a session loop over the given collaborators
    pub fn new(capture: C, recognizer: R, synthesizer: Option<S>, prompt: P) -> Self {
        Self {
            capture,
            recognizer,
            synthesizer,
            prompt,
            window: PHRASE_WINDOW,
            state: SessionState::new(Mode::SingleShot),
        }
    }

    /// Override the per-turn capture window (mainly for tests)
    #[must_use]
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Run the session in `mode` until its terminal state
    ///
    /// # Errors
    ///
    /// Returns error only for unrecoverable startup conditions (e.g.
    /// Assistant mode without a synthesizer); turn failures are reported and
    /// absorbed here.
    pub async fn run(&mut self, mode: Mode) -> Result<()> {
        self.state = SessionState::new(mode);
        match mode {
            Mode::Assistant => self.run_assistant().await,
            Mode::SimpleText => self.run_simple_text().await,
            Mode::SingleShot => self.run_single_shot().await,
        }
    }

    /// One full turn: capture, encode, recognize
    ///
    /// # Errors
    ///
    /// Returns [`Error::Device`] if the microphone is unavailable this turn.
    async fn take_turn(&mut self) -> Result<RecognitionOutcome> {
        println!("  Adjusting for ambient noise... Please wait.");
        println!("  Speak now! (listening...)");
        let buffer = self.capture.record(self.window)?;
        let payload = audio::encode(&buffer);
        Ok(self.recognizer.recognize(&payload).await)
    }

    /// Vocalize `text` if a synthesizer is attached
    ///
    /// Synthesis failures are reported and absorbed: they never end the
    /// session.
    async fn speak(&mut self, text: &str) {
        if let Some(synth) = self.synthesizer.as_mut() {
            if let Err(e) = synth.say(text).await {
                tracing::warn!(error = %e, "speech synthesis failed");
                eprintln!("  Speech output error: {e}");
            }
        }
    }

    async fn run_assistant(&mut self) -> Result<()> {
        if self.synthesizer.is_none() {
            return Err(Error::Config(
                "assistant mode requires a speech synthesizer".to_string(),
            ));
        }

        self.speak("Hello! I'm your voice assistant. Say something and I'll convert it to text.")
            .await;

        println!("\n{}", "=".repeat(50));
        println!("  VOICE ASSISTANT MODE");
        println!("  Say 'exit' or 'quit' to stop");
        println!("{}\n", "=".repeat(50));

        while self.state.active {
            println!("\n  Listening...");
            match self.take_turn().await {
                Ok(RecognitionOutcome::Transcript(text)) => {
                    println!("\n  >> You said: {text}");
                    self.speak(&format!("You said: {text}")).await;

                    if is_exit_word(&text) {
                        self.speak("Goodbye!").await;
                        println!("\n  Assistant stopped.");
                        self.state.active = false;
                    }
                }
                Ok(RecognitionOutcome::NoSpeechDetected) => {
                    println!("  Could not understand audio.");
                }
                Ok(RecognitionOutcome::BackendError(msg)) => {
                    println!("  Speech service error: {msg}");
                }
                Err(e) => report_device_error(&e),
            }
        }

        Ok(())
    }

    async fn run_simple_text(&mut self) -> Result<()> {
        println!("\n{}", "=".repeat(50));
        println!("  SIMPLE VOICE-TO-TEXT MODE");
        println!("  Speak and see the text appear");
        println!("{}\n", "=".repeat(50));

        while self.state.active {
            let line = self
                .prompt
                .read_line("\n  [Press Enter to listen, or type 'q' to quit]")?;

            if line.trim().eq_ignore_ascii_case("q") {
                self.state.active = false;
                break;
            }

            match self.take_turn().await {
                Ok(RecognitionOutcome::Transcript(text)) => println!("\n  >> {text}\n"),
                Ok(RecognitionOutcome::NoSpeechDetected) => {
                    println!("  Could not understand audio.");
                }
                Ok(RecognitionOutcome::BackendError(msg)) => {
                    println!("  Speech service error: {msg}");
                }
                Err(e) => report_device_error(&e),
            }
        }

        Ok(())
    }

    async fn run_single_shot(&mut self) -> Result<()> {
        println!("\n  Speak when ready...");

        match self.take_turn().await {
            Ok(RecognitionOutcome::Transcript(text)) => println!("\n  >> {text}\n"),
            Ok(RecognitionOutcome::NoSpeechDetected) => {
                println!("  Could not understand audio.");
                println!("  No text recognized.");
            }
            Ok(RecognitionOutcome::BackendError(msg)) => {
                println!("  Speech service error: {msg}");
                println!("  No text recognized.");
            }
            Err(e) => {
                report_device_error(&e);
                println!("  No text recognized.");
            }
        }

        self.state.active = false;
        Ok(())
    }
}

/// Whether a transcript is one of the Assistant exit words
fn is_exit_word(text: &str) -> bool {
    EXIT_WORDS
        .iter()
        .any(|w| text.trim().eq_ignore_ascii_case(w))
}

fn report_device_error(e: &Error) {
    tracing::error!(error = %e, "audio capture failed");
    println!("  Microphone error: {e}");
}
