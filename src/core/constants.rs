//! Constants for API roles and response tagging
//!
//! This module defines string constants used throughout the application for
//! message roles, finish reasons, object tags, and tool types.

/// Message role constants
pub mod role {
    /// User role identifier
    pub const USER: &str = "user";

    /// Assistant role identifier
    pub const ASSISTANT: &str = "assistant";

    /// System role identifier
    pub const SYSTEM: &str = "system";

    /// Tool role identifier
    pub const TOOL: &str = "tool";
}

/// Finish reason constants
pub mod finish {
    /// Normal completion
    pub const STOP: &str = "stop";

    /// Completion ended in one or more tool invocations
    pub const TOOL_CALLS: &str = "tool_calls";
}

/// Response object tags
pub mod object {
    /// Non-streaming completion tag
    pub const CHAT_COMPLETION: &str = "chat.completion";

    /// Streaming frame tag
    pub const CHAT_COMPLETION_CHUNK: &str = "chat.completion.chunk";

    /// Model listing entry tag
    pub const MODEL: &str = "model";

    /// Collection tag
    pub const LIST: &str = "list";
}

/// Tool type constants
pub mod tool {
    /// Function tool type
    pub const FUNCTION: &str = "function";
}

/// Streaming sentinel
pub mod stream {
    /// Terminal SSE frame payload
    pub const DONE: &str = "[DONE]";
}
