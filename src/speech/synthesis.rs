//! Text-to-speech trait.

use async_trait::async_trait;

use super::types::SynthesisRequest;
use crate::error::ConciergeError;

/// Trait for text-to-speech providers.
#[async_trait]
pub trait SynthesisProvider: Send + Sync {
    /// Generate speech audio from text.
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, ConciergeError>;
}
