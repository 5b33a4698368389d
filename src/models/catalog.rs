//! On-device model catalog
//!
//! Catalog entries describe the models installed on the device. The gateway
//! only reads the catalog; downloading and removal are handled elsewhere.

use serde::Deserialize;
use std::path::PathBuf;

/// One installed (or bundled) on-device model
#[derive(Debug, Clone, Deserialize)]
pub struct LlmModel {
    pub name: String,
    /// `text`, `multimodal`, or anything else (embedding, audio, ...).
    /// Only text and multimodal models are served over the chat API.
    pub category: String,
    /// Provenance string, rendered as `owned_by` in the model listing.
    pub source: String,
    /// On-disk format: gguf, bin, task, litertlm, onnx, ...
    #[serde(default)]
    pub format: String,
    /// Model file or directory. Absent for engine-bundled models.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Declared download size, used by the integrity validator. 0 = unknown.
    #[serde(default)]
    pub size_bytes: u64,
}

impl LlmModel {
    /// Whether this model can serve chat completions.
    pub fn is_chat_capable(&self) -> bool {
        self.category == "text" || self.category == "multimodal"
    }
}

/// Read-only view of the installed models
pub trait ModelCatalog: Send + Sync {
    fn available_models(&self) -> Vec<LlmModel>;
}

/// Catalog backed by a fixed list, typically the `[[models]]` config entries
pub struct StaticCatalog {
    models: Vec<LlmModel>,
}

impl StaticCatalog {
    pub fn new(models: Vec<LlmModel>) -> Self {
        Self { models }
    }
}

impl ModelCatalog for StaticCatalog {
    fn available_models(&self) -> Vec<LlmModel> {
        self.models.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_capable_categories() {
        let mut model = LlmModel {
            name: "gemma-2b".to_string(),
            category: "text".to_string(),
            source: "Google".to_string(),
            format: "task".to_string(),
            path: None,
            size_bytes: 0,
        };
        assert!(model.is_chat_capable());

        model.category = "multimodal".to_string();
        assert!(model.is_chat_capable());

        model.category = "embedding".to_string();
        assert!(!model.is_chat_capable());
    }
}
