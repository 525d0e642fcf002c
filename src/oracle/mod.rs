//! Text-generation oracle boundary
//!
//! The oracle is an opaque, unreliable service that turns a prompt into free
//! text. Transport failures surface as `TeamUpError::Oracle`; turning the text
//! into typed data is a separate step (`decode`) that fails with
//! `TeamUpError::Parse`.

pub mod decode;
pub mod gemini;
pub mod scripted;

use std::sync::Arc;

use crate::types::Result;

pub use decode::{decode_json, strip_fences};
pub use gemini::{GeminiConfig, GeminiOracle};
pub use scripted::ScriptedOracle;

/// Shared handle to an oracle
pub type SharedOracle = Arc<dyn Oracle>;

#[async_trait::async_trait]
pub trait Oracle: Send + Sync {
    /// Send a prompt and return the raw text answer
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Model label for logs
    fn model(&self) -> &str;
}
