//! Concierge CLI binary entry point.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use concierge::agent::GeminiAgentRunner;
use concierge::cli::{Cli, SttStrategy, TtsStrategy};
use concierge::config::ConciergeConfig;
use concierge::context::AppContext;
use concierge::conversation::ConversationLoop;
use concierge::error::{ConciergeError, Result};
use concierge::session::{
    render_state, ConversationState, InMemorySessionService, SessionRef, SessionService,
};
use concierge::speech::{
    AudioSink, AudioSource, ConsoleOutput, GoogleSttProvider, GoogleTtsProvider,
    GroqWhisperProvider, PlayAiTtsProvider, SpeechInput, SpeechOutput, SttClient, TerminalInput,
    AudioEncoding, Voice, VoiceInput, VoiceOutput,
};

const APP_NAME: &str = "Hotel Customer Support";
const DEFAULT_GOOGLE_VOICE: &str = "en-US-Neural2-C";
const DEFAULT_PLAYAI_VOICE: &str = "jennifer";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("concierge=info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = ConciergeConfig::from_env();
    let sessions = Arc::new(InMemorySessionService::new());

    let runner = Arc::new(
        GeminiAgentRunner::from_config(&config, sessions.clone())?.with_model(cli.model.clone()),
    );

    let input = SttClient::new(build_input(&cli, &config)?);
    let outputs = build_outputs(&cli, &config)?;

    let ctx = AppContext {
        sessions: sessions.clone(),
        runner,
        input,
        outputs,
        verbose: cli.verbose,
    };

    let user_id = uuid::Uuid::new_v4().to_string();
    let session = sessions
        .create_session(APP_NAME, &user_id, ConversationState::initial())
        .await?;
    println!("Created new session: {}", session.id);

    let session_ref = SessionRef {
        app_name: APP_NAME.to_string(),
        user_id,
        session_id: session.id,
    };

    println!("\nWelcome to Customer Service Chat!");
    println!("Type 'exit' or 'quit' to end the conversation.\n");

    ConversationLoop::new(ctx).run(&session_ref).await;

    let final_session = sessions.get_session(&session_ref).await?;
    println!("\nFinal Session State:");
    print!("{}", render_state(&final_session.state));

    Ok(())
}

fn build_input(cli: &Cli, config: &ConciergeConfig) -> Result<Arc<dyn SpeechInput>> {
    let input: Arc<dyn SpeechInput> = match cli.stt {
        SttStrategy::Terminal => Arc::new(TerminalInput::new()),
        SttStrategy::Google => {
            let api_key = require_key(config, "google", "GOOGLE_API_KEY")?;
            let provider = match config.get_base_url("google-stt") {
                Some(url) => GoogleSttProvider::new_with_base_url(api_key, url),
                None => GoogleSttProvider::new(api_key),
            };
            let mut voice = VoiceInput::new("google-stt", audio_source()?, Arc::new(provider));
            if let Some(lang) = &cli.language {
                voice = voice.with_language(lang.clone());
            }
            Arc::new(voice)
        }
        SttStrategy::Groq => {
            let api_key = require_key(config, "groq", "GROQ_API_KEY")?;
            let provider = match config.get_base_url("groq") {
                Some(url) => GroqWhisperProvider::new_with_base_url(api_key, url),
                None => GroqWhisperProvider::new(api_key),
            };
            let mut voice = VoiceInput::new("groq-whisper", audio_source()?, Arc::new(provider));
            if let Some(lang) = &cli.language {
                voice = voice.with_language(lang.clone());
            }
            Arc::new(voice)
        }
    };
    Ok(input)
}

fn build_outputs(cli: &Cli, config: &ConciergeConfig) -> Result<Vec<Arc<dyn SpeechOutput>>> {
    let mut outputs: Vec<Arc<dyn SpeechOutput>> = Vec::with_capacity(cli.tts.len());

    for strategy in &cli.tts {
        let output: Arc<dyn SpeechOutput> = match strategy {
            TtsStrategy::Console => Arc::new(ConsoleOutput::new()),
            TtsStrategy::Google => {
                let api_key = require_key(config, "google", "GOOGLE_API_KEY")?;
                let provider = match config.get_base_url("google-tts") {
                    Some(url) => GoogleTtsProvider::new_with_base_url(api_key, url),
                    None => GoogleTtsProvider::new(api_key),
                };
                let language = cli.language.clone().unwrap_or_else(|| "en-US".to_string());
                Arc::new(VoiceOutput::new(
                    "google-tts",
                    Arc::new(provider),
                    audio_sink(),
                    Voice::new(DEFAULT_GOOGLE_VOICE).with_language(language),
                    AudioEncoding::Linear16,
                ))
            }
            TtsStrategy::Playai => {
                let api_key = require_key(config, "playai", "PLAYAI_API_KEY")?;
                let user_id = config.get_account_id("playai").ok_or_else(|| {
                    ConciergeError::Configuration(
                        "Missing PlayAI user id (set PLAYAI_USER_ID)".to_string(),
                    )
                })?;
                let provider = match config.get_base_url("playai") {
                    Some(url) => PlayAiTtsProvider::new_with_base_url(api_key, user_id, url),
                    None => PlayAiTtsProvider::new(api_key, user_id),
                };
                Arc::new(VoiceOutput::new(
                    "playai-tts",
                    Arc::new(provider),
                    audio_sink(),
                    Voice::new(DEFAULT_PLAYAI_VOICE),
                    AudioEncoding::Linear16,
                ))
            }
        };
        outputs.push(output);
    }

    Ok(outputs)
}

fn require_key(config: &ConciergeConfig, provider: &str, env_var: &str) -> Result<String> {
    config.get_api_key(provider).ok_or_else(|| {
        ConciergeError::Configuration(format!(
            "Missing {provider} API key for the selected strategy (set {env_var})"
        ))
    })
}

#[cfg(feature = "audio-io")]
fn audio_source() -> Result<Arc<dyn AudioSource>> {
    Ok(Arc::new(concierge::speech::device::Microphone::default()))
}

#[cfg(not(feature = "audio-io"))]
fn audio_source() -> Result<Arc<dyn AudioSource>> {
    Err(ConciergeError::Configuration(
        "Microphone capture requires the 'audio-io' feature; rebuild with --features audio-io \
         or use --stt terminal"
            .to_string(),
    ))
}

#[cfg(feature = "audio-io")]
fn audio_sink() -> Arc<dyn AudioSink> {
    Arc::new(concierge::speech::device::Speaker::new())
}

#[cfg(not(feature = "audio-io"))]
fn audio_sink() -> Arc<dyn AudioSink> {
    Arc::new(concierge::speech::FileSink::temp())
}
