//! askdb-ai: OpenAI chat-completions client
//!
//! This crate provides the message/content types shared across the
//! workspace and a non-streaming chat-completions client with function
//! calling, used by the agent runtime to drive the SQL analyst loop.

pub mod client;
pub mod error;
pub mod types;

pub use client::OpenAIClient;
pub use error::{Error, Result};
pub use types::*;
