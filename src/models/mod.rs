//! API data models
//!
//! This module contains the OpenAI wire types and the on-device model catalog.

pub mod catalog;
pub mod openai;
