//! Serving-model resolution
//!
//! Picking which installed model serves a request is an ordered policy kept
//! in one pure function so the precedence is testable on its own.

use crate::models::catalog::LlmModel;

/// Resolve the model that should serve a request.
///
/// Precedence, first match wins:
/// 1. exact name match against the administrator override,
/// 2. exact name match of the client's requested model,
/// 3. an installed model whose name contains the requested name
///    (case-insensitive),
/// 4. the first text or multimodal model as the default fallback.
///
/// Returns `None` when nothing matches; the caller maps that to 404.
pub fn resolve_model<'a>(
    configured_override: Option<&str>,
    requested_model: &str,
    available: &'a [LlmModel],
) -> Option<&'a LlmModel> {
    if let Some(pinned) = configured_override {
        if let Some(model) = available.iter().find(|m| m.name == pinned) {
            return Some(model);
        }
    }

    if let Some(model) = available.iter().find(|m| m.name == requested_model) {
        return Some(model);
    }

    let requested_lower = requested_model.to_lowercase();
    if let Some(model) = available
        .iter()
        .find(|m| m.name.to_lowercase().contains(&requested_lower))
    {
        return Some(model);
    }

    available.iter().find(|m| m.is_chat_capable())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(name: &str, category: &str) -> LlmModel {
        LlmModel {
            name: name.to_string(),
            category: category.to_string(),
            source: "test".to_string(),
            format: "task".to_string(),
            path: None,
            size_bytes: 0,
        }
    }

    #[test]
    fn test_override_wins_over_request() {
        let available = vec![model("A", "text"), model("B", "text")];
        let resolved = resolve_model(Some("A"), "B", &available).unwrap();
        assert_eq!(resolved.name, "A");
    }

    #[test]
    fn test_exact_request_match() {
        let available = vec![model("A", "text"), model("B", "text")];
        let resolved = resolve_model(None, "B", &available).unwrap();
        assert_eq!(resolved.name, "B");
    }

    #[test]
    fn test_substring_match_is_case_insensitive() {
        let available = vec![model("Gemma 3n E2B", "multimodal")];
        let resolved = resolve_model(None, "gemma", &available).unwrap();
        assert_eq!(resolved.name, "Gemma 3n E2B");
    }

    #[test]
    fn test_fallback_to_first_chat_capable() {
        let available = vec![model("embedder", "embedding"), model("C", "text")];
        let resolved = resolve_model(None, "gpt-4o", &available).unwrap();
        assert_eq!(resolved.name, "C");
    }

    #[test]
    fn test_unmatched_override_falls_through() {
        let available = vec![model("B", "text")];
        let resolved = resolve_model(Some("gone"), "B", &available).unwrap();
        assert_eq!(resolved.name, "B");
    }

    #[test]
    fn test_no_candidate() {
        assert!(resolve_model(None, "anything", &[]).is_none());
        let only_embeddings = vec![model("embedder", "embedding")];
        assert!(resolve_model(None, "anything", &only_embeddings).is_none());
    }
}
