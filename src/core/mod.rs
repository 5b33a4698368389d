//! Core application modules
//!
//! Configuration, constants, logging, the inference-engine boundary, and the
//! pure request-shaping helpers (model resolution, prompt building, tool-call
//! extraction).

pub mod config;
pub mod constants;
pub mod engine;
pub mod logging;
pub mod prompt;
pub mod resolver;
pub mod tool_calls;
