//! Configuration (layered: code > env > .env file).

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Layered configuration for the assistant.
///
/// Keys are set explicitly via `set_api_key` or loaded from the
/// environment (a `.env` file is honored if present).
#[derive(Debug, Clone, Default)]
pub struct ConciergeConfig {
    api_keys: Arc<RwLock<HashMap<String, String>>>,
    base_urls: Arc<RwLock<HashMap<String, String>>>,
    account_ids: Arc<RwLock<HashMap<String, String>>>,
}

impl ConciergeConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from environment variables (GOOGLE_API_KEY, GROQ_API_KEY, etc.).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let config = Self::new();

        let env_mappings = [
            ("GOOGLE_API_KEY", "google"),
            ("GEMINI_API_KEY", "google"),
            ("GROQ_API_KEY", "groq"),
            ("PLAYAI_API_KEY", "playai"),
        ];

        for (env_var, provider) in &env_mappings {
            if let Ok(key) = std::env::var(env_var) {
                config.set_api_key(provider, key);
            }
        }

        // Base URL overrides
        let url_mappings = [
            ("GEMINI_BASE_URL", "gemini"),
            ("GOOGLE_STT_BASE_URL", "google-stt"),
            ("GOOGLE_TTS_BASE_URL", "google-tts"),
            ("GROQ_BASE_URL", "groq"),
            ("PLAYAI_BASE_URL", "playai"),
        ];

        for (env_var, provider) in &url_mappings {
            if let Ok(url) = std::env::var(env_var) {
                config.set_base_url(provider, url);
            }
        }

        if let Ok(user_id) = std::env::var("PLAYAI_USER_ID") {
            config.set_account_id("playai", user_id);
        }

        config
    }

    pub fn set_api_key(&self, provider: &str, key: String) {
        self.api_keys
            .write()
            .unwrap()
            .insert(provider.to_string(), key);
    }

    pub fn get_api_key(&self, provider: &str) -> Option<String> {
        self.api_keys.read().unwrap().get(provider).cloned()
    }

    pub fn set_base_url(&self, provider: &str, url: String) {
        self.base_urls
            .write()
            .unwrap()
            .insert(provider.to_string(), url);
    }

    pub fn get_base_url(&self, provider: &str) -> Option<String> {
        self.base_urls.read().unwrap().get(provider).cloned()
    }

    pub fn set_account_id(&self, provider: &str, account_id: String) {
        self.account_ids
            .write()
            .unwrap()
            .insert(provider.to_string(), account_id);
    }

    pub fn get_account_id(&self, provider: &str) -> Option<String> {
        self.account_ids.read().unwrap().get(provider).cloned()
    }

    /// Check if a provider has credentials configured.
    pub fn has_credentials(&self, provider: &str) -> bool {
        self.get_api_key(provider).is_some()
    }
}
