//! Speech capabilities: input/output strategies and cloud providers.

pub mod device;
pub mod google;
pub mod groq;
pub mod input;
pub mod output;
pub mod playai;
pub mod synthesis;
pub mod transcription;
pub mod types;

pub use device::{AudioSink, AudioSource, FileSink};
pub use google::{GoogleSttProvider, GoogleTtsProvider};
pub use groq::GroqWhisperProvider;
pub use input::{SpeechInput, SttClient, TerminalInput, VoiceInput};
pub use output::{ConsoleOutput, SpeechOutput, TtsClient, VoiceOutput};
pub use playai::PlayAiTtsProvider;
pub use synthesis::SynthesisProvider;
pub use transcription::TranscriptionProvider;
pub use types::*;
