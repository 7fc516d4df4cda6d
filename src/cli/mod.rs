//! CLI surface for the concierge binary.

use clap::{Parser, ValueEnum};

/// Voice-driven hotel customer support assistant.
#[derive(Parser, Debug)]
#[command(name = "concierge", version, about = "Hotel customer support voice assistant")]
pub struct Cli {
    /// Speech input strategy
    #[arg(long, value_enum, default_value_t = SttStrategy::Terminal)]
    pub stt: SttStrategy,

    /// Speech output strategies; the reply is spoken through each, in order
    #[arg(long, value_enum, num_args = 1.., default_values_t = [TtsStrategy::Console])]
    pub tts: Vec<TtsStrategy>,

    /// Gemini model backing the agent runtime
    #[arg(long, default_value = "gemini-2.0-flash")]
    pub model: String,

    /// Language hint for transcription (e.g. en-US, ar-EG)
    #[arg(long)]
    pub language: Option<String>,

    /// Print the session state around every turn
    #[arg(short, long)]
    pub verbose: bool,
}

/// Available speech-to-text strategies.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SttStrategy {
    /// Keyboard input (no transcription)
    Terminal,
    /// Google Cloud Speech-to-Text
    Google,
    /// Groq-hosted Whisper
    Groq,
}

/// Available text-to-speech strategies.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtsStrategy {
    /// No audio; reply is only printed
    Console,
    /// Google Cloud Text-to-Speech
    Google,
    /// PlayAI streaming TTS
    Playai,
}
