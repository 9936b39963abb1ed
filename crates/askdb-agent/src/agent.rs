//! Agent state and the question-answering loop

use std::collections::HashMap;
use std::sync::Arc;

use askdb_ai::{ChatOptions, Context, Message, Usage};

use crate::{
    error::{Error, Result},
    tool::{BoxedTool, ToolResult, to_api_tool},
    transport::Transport,
};

/// Agent configuration
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// System prompt
    pub system_prompt: String,
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens per response
    pub max_tokens: Option<u32>,
    /// Maximum completion/tool rounds per question
    pub max_turns: u32,
}

impl AgentConfig {
    /// Config for a model at temperature zero with the default turn cap
    pub fn new(system_prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            model: model.into(),
            temperature: 0.0,
            max_tokens: None,
            max_turns: 15,
        }
    }
}

/// The agent that answers one question per invocation.
///
/// Each call to [`Agent::ask`] builds a fresh context from the system
/// prompt and the raw question; nothing carries over between calls.
pub struct Agent {
    config: AgentConfig,
    tools: Vec<BoxedTool>,
    transport: Arc<dyn Transport>,

    /// Cached compiled JSON schema validators keyed by tool name
    schema_cache: HashMap<String, Arc<jsonschema::Validator>>,
}

impl Agent {
    /// Create a new agent
    pub fn new(config: AgentConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            tools: vec![],
            transport,
            schema_cache: HashMap::new(),
        }
    }

    /// Get the agent config
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Add a tool
    pub fn add_tool(&mut self, tool: BoxedTool) {
        self.cache_tool_schema(&tool);
        self.tools.push(tool);
    }

    /// Get tool names
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Compile and cache the JSON schema validator for a tool.
    fn cache_tool_schema(&mut self, tool: &BoxedTool) {
        let schema = tool.parameters_schema();
        match jsonschema::validator_for(&schema) {
            Ok(validator) => {
                self.schema_cache
                    .insert(tool.name().to_string(), Arc::new(validator));
            }
            Err(e) => {
                tracing::warn!(
                    "Invalid tool parameter schema for '{}', skipping validation: {}",
                    tool.name(),
                    e
                );
            }
        }
    }

    /// Answer one natural-language question.
    ///
    /// Runs the completion/tool loop until the model produces a final
    /// text answer. Malformed tool calls are fed back to the model as
    /// error results rather than aborting the question.
    pub async fn ask(&self, question: &str) -> Result<String> {
        let options = ChatOptions {
            model: self.config.model.clone(),
            temperature: Some(self.config.temperature),
            max_tokens: self.config.max_tokens,
        };

        let mut context = Context::with_system(self.config.system_prompt.clone());
        context.tools = self.tools.iter().map(|t| to_api_tool(t.as_ref())).collect();
        context.push(Message::user(question));

        let mut total_usage = Usage::default();

        for turn in 1..=self.config.max_turns {
            let (message, usage) = self.transport.complete(&options, &context).await?;
            total_usage.input += usage.input;
            total_usage.output += usage.output;

            let tool_calls: Vec<(String, String, serde_json::Value)> = message
                .tool_calls()
                .into_iter()
                .map(|(id, name, args)| (id.to_string(), name.to_string(), args.clone()))
                .collect();

            let answer = message.text();
            context.push(message);

            if tool_calls.is_empty() {
                if answer.trim().is_empty() {
                    return Err(Error::EmptyResponse);
                }
                tracing::debug!(
                    turns = turn,
                    input_tokens = total_usage.input,
                    output_tokens = total_usage.output,
                    "question answered"
                );
                return Ok(answer);
            }

            for (id, name, args) in tool_calls {
                let result = self.execute_tool_call(&name, args).await;
                tracing::debug!(
                    tool = %name,
                    is_error = result.is_error,
                    "tool call finished: {}",
                    result.text_content()
                );
                context.push(Message::tool_result(id, name, result.content, result.is_error));
            }
        }

        Err(Error::TurnLimit(self.config.max_turns))
    }

    /// Execute one tool call, validating arguments first.
    async fn execute_tool_call(&self, name: &str, args: serde_json::Value) -> ToolResult {
        let tool = match self.tools.iter().find(|t| t.name() == name) {
            Some(t) => t,
            None => return ToolResult::error(format!("Tool not found: {}", name)),
        };

        let validation_error = self
            .schema_cache
            .get(name)
            .and_then(|validator| validate_with_validator(&args, validator));

        if let Some(err) = validation_error {
            return ToolResult::error(err);
        }

        tool.execute(args).await
    }
}

/// Validate tool arguments using a pre-compiled validator.
/// Returns `Some(error_message)` if validation fails, `None` if valid.
fn validate_with_validator(
    args: &serde_json::Value,
    validator: &jsonschema::Validator,
) -> Option<String> {
    let errors: Vec<String> = validator
        .iter_errors(args)
        .map(|e| {
            let path = e.instance_path.to_string();
            if path.is_empty() {
                e.to_string()
            } else {
                format!("{}: {}", path, e)
            }
        })
        .collect();

    if errors.is_empty() {
        None
    } else {
        Some(format!(
            "Tool argument validation failed:\n{}",
            errors.join("\n")
        ))
    }
}
