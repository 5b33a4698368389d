//! Inference engine boundary
//!
//! The gateway only knows the token-generation runtime through the
//! [`InferenceEngine`] trait: load a model, produce text, synchronously or as
//! a lazy stream. The engine is assumed to serialize actual compute
//! internally (one resident model, one generation in flight); the gateway
//! adds no lock of its own and tolerates the resulting latency.

use crate::integrity::validate_model_file;
use crate::models::catalog::LlmModel;
use async_trait::async_trait;
use futures::stream::Stream;
use std::pin::Pin;
use thiserror::Error;
use tracing::{debug, info};

/// Error types for engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to load model {model}: {reason}")]
    LoadFailed { model: String, reason: String },

    #[error("Model {model} failed integrity validation")]
    ModelRejected { model: String },

    #[error("Generation failed: {0}")]
    Generation(String),
}

/// Lazy sequence of text increments; dropped to cancel generation.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, EngineError>> + Send>>;

/// On-device text-generation runtime
#[async_trait]
pub trait InferenceEngine: Send + Sync {
    /// Ensure `model` is resident. Idempotent: loading the already-resident
    /// model is a cheap no-op.
    async fn load_model(&self, model: &LlmModel) -> Result<(), EngineError>;

    /// Generate one complete response for `prompt`.
    async fn generate(&self, prompt: &str, model: &LlmModel) -> Result<String, EngineError>;

    /// Generate a response as a lazy stream of text increments. Single
    /// traversal per call; dropping the stream cancels generation at the
    /// next suspension point.
    async fn generate_stream(
        &self,
        prompt: &str,
        model: &LlmModel,
    ) -> Result<TextStream, EngineError>;
}

/// Stand-in engine used when no real runtime is linked
///
/// Validates model files on load and answers with a deterministic echo of
/// the last user turn, which keeps the binary runnable and the HTTP surface
/// smoke-testable end to end.
pub struct EchoEngine {
    resident: tokio::sync::Mutex<Option<String>>,
}

impl EchoEngine {
    pub fn new() -> Self {
        Self {
            resident: tokio::sync::Mutex::new(None),
        }
    }

    fn reply_for(prompt: &str) -> String {
        // The prompt ends with the "assistant: " cue; echo the last user turn.
        let last_user = prompt
            .lines()
            .rev()
            .find_map(|line| line.strip_prefix("user: "))
            .unwrap_or("");
        format!("You said: {}", last_user)
    }
}

impl Default for EchoEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceEngine for EchoEngine {
    async fn load_model(&self, model: &LlmModel) -> Result<(), EngineError> {
        let mut resident = self.resident.lock().await;
        if resident.as_deref() == Some(model.name.as_str()) {
            debug!("Model {} already resident", model.name);
            return Ok(());
        }

        if let Some(path) = &model.path {
            if !validate_model_file(path, &model.format, model.size_bytes) {
                return Err(EngineError::ModelRejected {
                    model: model.name.clone(),
                });
            }
        }

        info!("Loading model {}", model.name);
        *resident = Some(model.name.clone());
        Ok(())
    }

    async fn generate(&self, prompt: &str, _model: &LlmModel) -> Result<String, EngineError> {
        Ok(Self::reply_for(prompt))
    }

    async fn generate_stream(
        &self,
        prompt: &str,
        _model: &LlmModel,
    ) -> Result<TextStream, EngineError> {
        let reply = Self::reply_for(prompt);
        let stream = async_stream::stream! {
            // Word-sized increments approximate real token cadence.
            let mut rest = reply.as_str();
            while !rest.is_empty() {
                let cut = match rest.find(' ') {
                    Some(idx) => idx + 1,
                    None => rest.len(),
                };
                let (chunk, tail) = rest.split_at(cut);
                yield Ok(chunk.to_string());
                rest = tail;
            }
        };
        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn model(name: &str) -> LlmModel {
        LlmModel {
            name: name.to_string(),
            category: "text".to_string(),
            source: "test".to_string(),
            format: "task".to_string(),
            path: None,
            size_bytes: 0,
        }
    }

    #[tokio::test]
    async fn test_load_is_idempotent() {
        let engine = EchoEngine::new();
        let m = model("gemma");
        engine.load_model(&m).await.unwrap();
        engine.load_model(&m).await.unwrap();
    }

    #[tokio::test]
    async fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.task");
        std::fs::write(&path, b"tiny").unwrap();

        let mut m = model("broken");
        m.path = Some(path);
        m.size_bytes = 100 * 1024 * 1024;

        let err = EchoEngine::new().load_model(&m).await.unwrap_err();
        assert!(matches!(err, EngineError::ModelRejected { .. }));
    }

    #[tokio::test]
    async fn test_echo_answers_last_user_turn() {
        let engine = EchoEngine::new();
        let reply = engine
            .generate("system: s\nuser: first\nassistant: a\nuser: second\nassistant: ", &model("m"))
            .await
            .unwrap();
        assert_eq!(reply, "You said: second");
    }

    #[tokio::test]
    async fn test_stream_concatenates_to_full_reply() {
        let engine = EchoEngine::new();
        let m = model("m");
        let stream = engine
            .generate_stream("user: hello there\nassistant: ", &m)
            .await
            .unwrap();
        let chunks: Vec<String> = stream.map(|c| c.unwrap()).collect().await;
        assert!(chunks.len() > 1);
        assert_eq!(chunks.concat(), "You said: hello there");
    }
}
