use std::io::{BufRead, Write};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use voiceletter::audio::CaptureSource;
use voiceletter::{
    AudioCapture, AudioPlayback, Config, Mode, RecognitionClient, SessionLoop, SpeechSynthesizer,
    StdinPrompt, Synthesizer, SAMPLE_RATE,
};

/// Voiceletter - convert your voice into text, assistant-style
#[derive(Parser)]
#[command(name = "voiceletter", version, about)]
struct Cli {
    /// Interaction mode: 1 = assistant, 2 = text-only, 3 = single-shot
    /// (omit to choose interactively)
    #[arg(short, long, env = "VOICELETTER_MODE")]
    mode: Option<u8>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test speaker output
    TestSpeaker,
    /// Test TTS output
    TestTts {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn,voiceletter=info",
        1 => "info,voiceletter=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(cmd) = cli.command {
        return match cmd {
            Command::TestMic { duration } => test_mic(duration),
            Command::TestSpeaker => test_speaker(),
            Command::TestTts { text } => test_tts(&text).await,
        };
    }

    let config = Config::load()?;
    tracing::debug!(?config, "loaded configuration");

    let mode = match cli.mode {
        Some(n) => parse_mode(&n.to_string())
            .ok_or_else(|| anyhow::anyhow!("invalid mode {n}, expected 1, 2, or 3"))?,
        None => choose_mode()?,
    };

    let capture = AudioCapture::new()?;
    let recognizer = build_recognizer(&config)?;

    // Only the assistant speaks back; the other modes never touch TTS
    let synthesizer = if mode == Mode::Assistant {
        Some(build_synthesizer(&config)?)
    } else {
        None
    };

    let mut session = SessionLoop::new(capture, recognizer, synthesizer, StdinPrompt)
        .with_window(config.phrase_window);

    tracing::info!(?mode, "starting session");
    session.run(mode).await?;

    Ok(())
}

/// Show the mode menu and read a choice (empty defaults to single-shot)
fn choose_mode() -> anyhow::Result<Mode> {
    println!("\n  Voice-to-Letter Assistant");
    println!("  -------------------------");
    println!("  1. Voice Assistant (speaks back)");
    println!("  2. Simple Voice-to-Text (only converts to text)");
    println!("  3. Single conversion (one-time)");
    print!("\n  Choose (1/2/3): ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;

    Ok(parse_mode(line.trim()).unwrap_or(Mode::SingleShot))
}

fn parse_mode(choice: &str) -> Option<Mode> {
    match choice {
        "1" => Some(Mode::Assistant),
        "2" => Some(Mode::SimpleText),
        "3" => Some(Mode::SingleShot),
        _ => None,
    }
}

fn build_recognizer(config: &Config) -> anyhow::Result<RecognitionClient> {
    let client = match config.stt.provider.as_str() {
        "whisper" => RecognitionClient::new_whisper(
            config.api_keys.openai.clone().unwrap_or_default(),
            config.stt.model.clone(),
            config.language.clone(),
        )?,
        "deepgram" => RecognitionClient::new_deepgram(
            config.api_keys.deepgram.clone().unwrap_or_default(),
            config.stt.model.clone(),
            config.language.clone(),
        )?,
        other => anyhow::bail!("unknown STT provider: {other}"),
    };
    Ok(client)
}

fn build_synthesizer(config: &Config) -> anyhow::Result<SpeechSynthesizer> {
    let synth = match config.tts.provider.as_str() {
        "openai" => SpeechSynthesizer::new_openai(
            config.api_keys.openai.clone().unwrap_or_default(),
            config.tts.voice.clone(),
            config.tts.model.clone(),
            config.tts.options,
        )?,
        "elevenlabs" => SpeechSynthesizer::new_elevenlabs(
            config.api_keys.elevenlabs.clone().unwrap_or_default(),
            config.tts.voice.clone(),
            config.tts.model.clone(),
            config.tts.options,
        )?,
        other => anyhow::bail!("unknown TTS provider: {other}"),
    };
    Ok(synth)
}

/// Test microphone input
fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let mut capture = AudioCapture::new()?;
    println!("Sample rate: {SAMPLE_RATE} Hz");
    println!("---");

    let buffer = capture.record(Duration::from_secs(duration))?;

    for (i, chunk) in buffer.samples().chunks(SAMPLE_RATE as usize).enumerate() {
        let energy = calculate_rms(chunk);
        let peak = chunk
            .iter()
            .map(|&s| f32::from(s).abs() / 32768.0)
            .fold(0.0f32, f32::max);

        // Visual meter
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter: String = "#".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!(
            "[{:2}s] RMS: {:.4} | Peak: {:.4} | [{}]",
            i + 1,
            energy,
            peak,
            meter
        );
    }

    println!("\n---");
    println!("If you saw movement in the meter, your mic is working!");
    println!("If RMS stayed near 0, check:");
    println!("  1. Is your mic plugged in?");
    println!("  2. Run: pactl info | grep 'Default Source'");
    println!("  3. Run: arecord -l (to list devices)");

    Ok(())
}

/// Calculate RMS energy of normalized i16 samples
#[allow(clippy::cast_precision_loss)]
fn calculate_rms(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples
        .iter()
        .map(|&s| {
            let v = f32::from(s) / 32768.0;
            v * v
        })
        .sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Test speaker output with a sine wave
fn test_speaker() -> anyhow::Result<()> {
    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    let mut playback = AudioPlayback::new()?;

    let sample_rate = 24000_u32;
    let frequency = 440.0_f32;
    let num_samples = sample_rate as usize * 2;

    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.3
        })
        .collect();

    println!("Playing {} samples at {} Hz...", samples.len(), sample_rate);
    playback.play(samples)?;

    println!("\n---");
    println!("If you heard the tone, your speakers are working!");

    Ok(())
}

/// Test TTS output
async fn test_tts(text: &str) -> anyhow::Result<()> {
    println!("Testing TTS with text: \"{text}\"\n");

    let config = Config::load()?;
    let mut synth = build_synthesizer(&config)?;

    println!("Synthesizing and playing...");
    synth.say(text).await?;

    println!("\n---");
    println!("If you heard the speech, TTS is working!");

    Ok(())
}
