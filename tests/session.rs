//! Session state-machine tests with mock collaborators
//!
//! Exercises the three interaction modes without audio hardware or network.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use voiceletter::audio::{AudioBuffer, CaptureSource, RecognitionPayload};
use voiceletter::{
    Error, Mode, Prompt, RecognitionOutcome, Recognizer, Result, SessionLoop, Synthesizer,
};

/// Capture stub that counts calls and optionally fails like a missing device
struct FakeCapture {
    calls: Arc<Mutex<usize>>,
    fail: bool,
}

impl FakeCapture {
    fn new() -> (Self, Arc<Mutex<usize>>) {
        let calls = Arc::new(Mutex::new(0));
        (
            Self {
                calls: Arc::clone(&calls),
                fail: false,
            },
            calls,
        )
    }

    fn failing() -> (Self, Arc<Mutex<usize>>) {
        let calls = Arc::new(Mutex::new(0));
        (
            Self {
                calls: Arc::clone(&calls),
                fail: true,
            },
            calls,
        )
    }
}

impl CaptureSource for FakeCapture {
    fn record(&mut self, duration: Duration) -> Result<AudioBuffer> {
        *self.calls.lock().unwrap() += 1;
        if self.fail {
            return Err(Error::Device("input device unavailable".to_string()));
        }
        Ok(AudioBuffer::from_samples(Vec::new(), duration))
    }
}

/// Recognizer stub that replays a scripted sequence of outcomes
struct FakeRecognizer {
    outcomes: Mutex<VecDeque<RecognitionOutcome>>,
}

impl FakeRecognizer {
    fn scripted(outcomes: Vec<RecognitionOutcome>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
        }
    }
}

#[async_trait]
impl Recognizer for FakeRecognizer {
    async fn recognize(&self, _payload: &RecognitionPayload) -> RecognitionOutcome {
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(RecognitionOutcome::NoSpeechDetected)
    }
}

/// Synthesizer stub that records every utterance it is asked to speak
struct FakeSynth {
    spoken: Arc<Mutex<Vec<String>>>,
}

impl FakeSynth {
    fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
        let spoken = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                spoken: Arc::clone(&spoken),
            },
            spoken,
        )
    }
}

#[async_trait]
impl Synthesizer for FakeSynth {
    async fn say(&mut self, text: &str) -> Result<()> {
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Prompt stub that replays scripted input lines
struct FakePrompt {
    lines: VecDeque<String>,
}

impl FakePrompt {
    fn scripted(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| (*l).to_string()).collect(),
        }
    }

    fn unused() -> Self {
        Self {
            lines: VecDeque::new(),
        }
    }
}

impl Prompt for FakePrompt {
    fn read_line(&mut self, _message: &str) -> Result<String> {
        // Running out of scripted input quits rather than hanging the test
        Ok(self.lines.pop_front().unwrap_or_else(|| "q".to_string()))
    }
}

fn session<C, R>(
    capture: C,
    recognizer: R,
    synth: Option<FakeSynth>,
    prompt: FakePrompt,
) -> SessionLoop<C, R, FakeSynth, FakePrompt>
where
    C: CaptureSource,
    R: Recognizer,
{
    SessionLoop::new(capture, recognizer, synth, prompt)
        .with_window(Duration::from_millis(10))
}

#[tokio::test]
async fn single_shot_performs_exactly_one_cycle() {
    let (capture, calls) = FakeCapture::new();
    let recognizer = FakeRecognizer::scripted(vec![RecognitionOutcome::Transcript(
        "hello world".to_string(),
    )]);

    let mut s = session(capture, recognizer, None, FakePrompt::unused());
    s.run(Mode::SingleShot).await.unwrap();

    assert_eq!(*calls.lock().unwrap(), 1);
}

#[tokio::test]
async fn single_shot_ends_after_backend_error() {
    let (capture, calls) = FakeCapture::new();
    let recognizer = FakeRecognizer::scripted(vec![RecognitionOutcome::BackendError(
        "service timeout".to_string(),
    )]);

    let mut s = session(capture, recognizer, None, FakePrompt::unused());
    s.run(Mode::SingleShot).await.unwrap();

    assert_eq!(*calls.lock().unwrap(), 1);
}

#[tokio::test]
async fn single_shot_absorbs_device_error() {
    let (capture, calls) = FakeCapture::failing();
    let recognizer = FakeRecognizer::scripted(vec![]);

    let mut s = session(capture, recognizer, None, FakePrompt::unused());
    s.run(Mode::SingleShot).await.unwrap();

    assert_eq!(*calls.lock().unwrap(), 1);
}

#[tokio::test]
async fn simple_text_listens_twice_then_quits() {
    let (capture, calls) = FakeCapture::new();
    let recognizer = FakeRecognizer::scripted(vec![
        RecognitionOutcome::Transcript("first".to_string()),
        RecognitionOutcome::Transcript("second".to_string()),
    ]);

    let mut s = session(
        capture,
        recognizer,
        None,
        FakePrompt::scripted(&["\n", "\n", "q\n"]),
    );
    s.run(Mode::SimpleText).await.unwrap();

    assert_eq!(*calls.lock().unwrap(), 2);
}

#[tokio::test]
async fn simple_text_quit_is_case_insensitive() {
    let (capture, calls) = FakeCapture::new();
    let recognizer = FakeRecognizer::scripted(vec![]);

    let mut s = session(capture, recognizer, None, FakePrompt::scripted(&["Q\n"]));
    s.run(Mode::SimpleText).await.unwrap();

    assert_eq!(*calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn simple_text_continues_after_failures() {
    let (capture, calls) = FakeCapture::new();
    let recognizer = FakeRecognizer::scripted(vec![
        RecognitionOutcome::NoSpeechDetected,
        RecognitionOutcome::BackendError("quota exceeded".to_string()),
        RecognitionOutcome::Transcript("still here".to_string()),
    ]);

    let mut s = session(
        capture,
        recognizer,
        None,
        FakePrompt::scripted(&["\n", "\n", "\n", "q\n"]),
    );
    s.run(Mode::SimpleText).await.unwrap();

    // All three turns ran; no failure ended the loop early
    assert_eq!(*calls.lock().unwrap(), 3);
}

#[tokio::test]
async fn simple_text_spoken_exit_words_do_not_leak() {
    let (capture, calls) = FakeCapture::new();
    let recognizer = FakeRecognizer::scripted(vec![
        RecognitionOutcome::Transcript("exit".to_string()),
        RecognitionOutcome::Transcript("carry on".to_string()),
    ]);

    let mut s = session(
        capture,
        recognizer,
        None,
        FakePrompt::scripted(&["\n", "\n", "q\n"]),
    );
    s.run(Mode::SimpleText).await.unwrap();

    // "exit" as a transcript is just text here; only 'q' quits
    assert_eq!(*calls.lock().unwrap(), 2);
}

#[tokio::test]
async fn simple_text_survives_device_error() {
    let (capture, calls) = FakeCapture::failing();
    let recognizer = FakeRecognizer::scripted(vec![]);

    let mut s = session(
        capture,
        recognizer,
        None,
        FakePrompt::scripted(&["\n", "\n", "q\n"]),
    );
    s.run(Mode::SimpleText).await.unwrap();

    assert_eq!(*calls.lock().unwrap(), 2);
}

#[tokio::test]
async fn assistant_requires_a_synthesizer() {
    let (capture, _) = FakeCapture::new();
    let recognizer = FakeRecognizer::scripted(vec![]);

    let mut s = session(capture, recognizer, None, FakePrompt::unused());
    assert!(s.run(Mode::Assistant).await.is_err());
}

#[tokio::test]
async fn assistant_exits_on_spoken_exit_word() {
    let (capture, calls) = FakeCapture::new();
    let (synth, spoken) = FakeSynth::new();
    let recognizer = FakeRecognizer::scripted(vec![RecognitionOutcome::Transcript(
        "exit".to_string(),
    )]);

    let mut s = session(capture, recognizer, Some(synth), FakePrompt::unused());
    s.run(Mode::Assistant).await.unwrap();

    assert_eq!(*calls.lock().unwrap(), 1);

    let spoken = spoken.lock().unwrap();
    assert!(spoken.iter().any(|u| u.contains("You said: exit")));
    assert_eq!(spoken.last().map(String::as_str), Some("Goodbye!"));
}

#[tokio::test]
async fn assistant_exit_match_ignores_case() {
    for word in ["EXIT", "Quit", "sToP"] {
        let (capture, calls) = FakeCapture::new();
        let (synth, spoken) = FakeSynth::new();
        let recognizer = FakeRecognizer::scripted(vec![RecognitionOutcome::Transcript(
            word.to_string(),
        )]);

        let mut s = session(capture, recognizer, Some(synth), FakePrompt::unused());
        s.run(Mode::Assistant).await.unwrap();

        assert_eq!(*calls.lock().unwrap(), 1, "word {word:?}");
        assert_eq!(
            spoken.lock().unwrap().last().map(String::as_str),
            Some("Goodbye!"),
            "word {word:?}"
        );
    }
}

#[tokio::test]
async fn assistant_keeps_going_on_ordinary_transcripts() {
    let (capture, calls) = FakeCapture::new();
    let (synth, spoken) = FakeSynth::new();
    let recognizer = FakeRecognizer::scripted(vec![
        RecognitionOutcome::Transcript("hello there".to_string()),
        RecognitionOutcome::Transcript("stop".to_string()),
    ]);

    let mut s = session(capture, recognizer, Some(synth), FakePrompt::unused());
    s.run(Mode::Assistant).await.unwrap();

    // "hello there" did not terminate; "stop" did
    assert_eq!(*calls.lock().unwrap(), 2);
    assert!(spoken
        .lock()
        .unwrap()
        .iter()
        .any(|u| u.contains("hello there")));
}

#[tokio::test]
async fn assistant_survives_backend_error_and_no_speech() {
    let (capture, calls) = FakeCapture::new();
    let (synth, spoken) = FakeSynth::new();
    let recognizer = FakeRecognizer::scripted(vec![
        RecognitionOutcome::BackendError("connection reset".to_string()),
        RecognitionOutcome::NoSpeechDetected,
        RecognitionOutcome::Transcript("quit".to_string()),
    ]);

    let mut s = session(capture, recognizer, Some(synth), FakePrompt::unused());
    s.run(Mode::Assistant).await.unwrap();

    assert_eq!(*calls.lock().unwrap(), 3);

    // Failed turns produce no acknowledgment utterances
    let spoken = spoken.lock().unwrap();
    let acknowledgments = spoken.iter().filter(|u| u.starts_with("You said:")).count();
    assert_eq!(acknowledgments, 1);
}
