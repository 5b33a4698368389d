//! API endpoint handlers
//!
//! This module implements the HTTP surface of the local inference gateway:
//! a liveness probe, the model listing, and the OpenAI-compatible chat
//! completions endpoint with SSE streaming.

use crate::core::config::ConfigProvider;
use crate::core::constants::{finish, object, role, stream as stream_const};
use crate::core::engine::InferenceEngine;
use crate::core::prompt::build_prompt;
use crate::core::resolver::resolve_model;
use crate::core::tool_calls::extract_tool_calls;
use crate::models::catalog::{LlmModel, ModelCatalog};
use crate::models::openai::{
    ChatChoice, ChatCompletionRequest, ChatCompletionResponse, ChatCompletionStreamResponse,
    ChatMessage, ChatMessageDelta, ChatStreamChoice, Usage,
};
use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response, Sse, sse::Event},
    routing::{get, post},
};
use futures::StreamExt;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, error, info};
use tower_http::cors::{Any, CorsLayer};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<dyn ConfigProvider>,
    pub catalog: Arc<dyn ModelCatalog>,
    pub engine: Arc<dyn InferenceEngine>,
}

/// Create the API router with all endpoints
///
/// The primary client is a separate device on the same network, so CORS
/// permits any origin plus the Content-Type and Authorization headers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/", get(root))
        .route("/v1/chat/completions", post(chat_completions))
        .route("/v1/models", get(list_models))
        .layer(cors)
        .with_state(state)
}

/// GET / - liveness probe
async fn root() -> &'static str {
    "LLM Hub Local Server is running!"
}

/// GET /v1/models - list installed chat-capable models
async fn list_models(State(state): State<AppState>) -> impl IntoResponse {
    let data: Vec<_> = state
        .catalog
        .available_models()
        .into_iter()
        .filter(|m| m.is_chat_capable())
        .map(|m| {
            json!({
                "id": m.name,
                "object": object::MODEL,
                "created": 1677610602,
                "owned_by": m.source,
            })
        })
        .collect();

    Json(json!({
        "object": object::LIST,
        "data": data,
    }))
}

/// POST /v1/chat/completions - the primary handler
///
/// Resolves the serving model against a per-request config snapshot, ensures
/// it is loaded, builds the flat prompt, and branches on `stream`.
async fn chat_completions(
    State(state): State<AppState>,
    Json(request): Json<ChatCompletionRequest>,
) -> Response {
    info!(
        "Chat completion request: model={}, stream={}, messages={}",
        request.model,
        request.stream,
        request.messages.len()
    );

    let snapshot = state.config.snapshot();
    let available = state.catalog.available_models();

    let model = match resolve_model(
        snapshot.selected_model.as_deref(),
        &request.model,
        &available,
    ) {
        Some(model) => model.clone(),
        None => {
            debug!("No installed model matches {:?}", request.model);
            return (
                StatusCode::NOT_FOUND,
                format!("Model not found: {}", request.model),
            )
                .into_response();
        }
    };

    if let Err(e) = state.engine.load_model(&model).await {
        error!("Failed to load model {}: {}", model.name, e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to load model {}", model.name),
        )
            .into_response();
    }

    let prompt = build_prompt(&request);

    if request.stream {
        stream_completion(state, model, prompt).await
    } else {
        complete(state, request, model, prompt).await
    }
}

/// Streaming branch: one SSE frame per engine increment, then a terminal
/// `finish_reason=stop` frame and the `[DONE]` sentinel.
///
/// Tool-call extraction is not performed in streaming mode; content is
/// relayed verbatim as produced. When the client disconnects, axum drops the
/// response stream, which drops the engine stream and cancels generation at
/// its next suspension point.
async fn stream_completion(state: AppState, model: LlmModel, prompt: String) -> Response {
    let mut increments = match state.engine.generate_stream(&prompt, &model).await {
        Ok(stream) => stream,
        Err(e) => {
            error!("Failed to start generation on {}: {}", model.name, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Generation failed on model {}", model.name),
            )
                .into_response();
        }
    };

    let id = format!("chatcmpl-{}", uuid::Uuid::new_v4());
    let created = chrono::Utc::now().timestamp();
    let model_name = model.name;

    let sse_stream = async_stream::stream! {
        while let Some(item) = increments.next().await {
            match item {
                Ok(chunk) => {
                    let frame = stream_frame(
                        &id,
                        created,
                        &model_name,
                        ChatMessageDelta {
                            content: Some(chunk),
                            ..Default::default()
                        },
                        None,
                    );
                    yield Ok::<_, Infallible>(Event::default().data(frame));
                }
                Err(e) => {
                    error!("Generation error on {}: {}", model_name, e);
                    break;
                }
            }
        }

        let terminal = stream_frame(
            &id,
            created,
            &model_name,
            ChatMessageDelta::default(),
            Some(finish::STOP.to_string()),
        );
        yield Ok(Event::default().data(terminal));
        yield Ok(Event::default().data(stream_const::DONE));
    };

    Sse::new(sse_stream).into_response()
}

fn stream_frame(
    id: &str,
    created: i64,
    model: &str,
    delta: ChatMessageDelta,
    finish_reason: Option<String>,
) -> String {
    let frame = ChatCompletionStreamResponse {
        id: id.to_string(),
        object: object::CHAT_COMPLETION_CHUNK.to_string(),
        created,
        model: model.to_string(),
        choices: vec![ChatStreamChoice {
            index: 0,
            delta,
            finish_reason,
        }],
    };
    serde_json::to_string(&frame).unwrap_or_default()
}

/// Non-streaming branch: full generation, tool-call extraction when tools
/// were requested, char/4 usage estimate, one JSON response.
async fn complete(
    state: AppState,
    request: ChatCompletionRequest,
    model: LlmModel,
    prompt: String,
) -> Response {
    let text = match state.engine.generate(&prompt, &model).await {
        Ok(text) => text,
        Err(e) => {
            error!("Generation error on {}: {}", model.name, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Generation failed on model {}", model.name),
            )
                .into_response();
        }
    };

    let tool_calls = if request.tools.is_some() {
        extract_tool_calls(&text)
    } else {
        None
    };

    let (content, finish_reason) = if tool_calls.is_some() {
        (None, finish::TOOL_CALLS)
    } else {
        (Some(text.clone()), finish::STOP)
    };

    let response = ChatCompletionResponse {
        id: format!("chatcmpl-{}", uuid::Uuid::new_v4()),
        object: object::CHAT_COMPLETION.to_string(),
        created: chrono::Utc::now().timestamp(),
        model: model.name,
        choices: vec![ChatChoice {
            index: 0,
            message: ChatMessage {
                role: role::ASSISTANT.to_string(),
                content,
                tool_calls,
                tool_call_id: None,
                name: None,
            },
            finish_reason: Some(finish_reason.to_string()),
        }],
        usage: Some(Usage::estimate(&prompt, &text)),
    };

    Json(response).into_response()
}
