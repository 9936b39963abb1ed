//! askdb-agent: tool-calling agent runtime
//!
//! This crate provides the loop that turns one natural-language
//! question into one answer: request a completion, execute the tool
//! calls it asks for, feed the results back, and repeat until the
//! model produces a final text.

pub mod agent;
pub mod error;
pub mod tool;
pub mod transport;

pub use agent::{Agent, AgentConfig};
pub use error::{Error, Result};
pub use tool::{BoxedTool, Tool, ToolResult};
pub use transport::{ClientTransport, Transport};
