use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::config::Config;

mod gemini;

pub use gemini::Gemini;

#[derive(Clone, Copy, Debug)]
pub enum ProviderKind {
    Gemini,
}

impl ProviderKind {
    pub fn from_env() -> Self {
        // Only Gemini is wired up; the enum is the seam for adding others.
        ProviderKind::Gemini
    }

    pub fn build(self, cfg: &Config) -> Result<Box<dyn TextProvider + Send + Sync>> {
        match self {
            ProviderKind::Gemini => Ok(Box::new(Gemini::new(cfg)?)),
        }
    }
}

/// A hosted generative-text endpoint. Each call is independent and
/// at-most-once: no retry, no caching, no backoff. Timeouts, if any, belong
/// to the underlying transport.
#[async_trait]
pub trait TextProvider {
    /// Whether a credential is configured. Callers check this before
    /// issuing a request so the credential-absent path never touches the
    /// network.
    fn is_configured(&self) -> bool;

    /// Free-text completion; returns the provider's raw text.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// JSON-mode completion constrained by a response-schema hint. The
    /// returned payload is expected to be JSON but is untrusted text.
    async fn generate_structured(&self, prompt: &str, schema: &Value) -> Result<String>;
}
