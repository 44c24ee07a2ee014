pub mod client;
pub mod prompts;

pub use client::GeminiClient;

use async_trait::async_trait;

use crate::error::AppResult;

/// Seam between the composer and the model provider. A single blocking round
/// trip: the prompt goes out, the raw text comes back. Transport failures
/// propagate; there is no retry layer.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> AppResult<String>;
}
