//! OpenAI Chat Completions API client (non-streaming)

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    types::{AssistantMetadata, ChatOptions, Content, Context, Message, StopReason, Usage},
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI API client
pub struct OpenAIClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAIClient {
    /// Create a new client with an API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create from the OPENAI_API_KEY environment variable
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| Error::InvalidApiKey)?;
        Ok(Self::new(api_key))
    }

    /// Override the base URL (for proxies or compatible endpoints)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Request one completion for the given context.
    ///
    /// Returns the assistant message (text and/or tool calls) along
    /// with token usage for the request.
    pub async fn complete(
        &self,
        options: &ChatOptions,
        context: &Context,
    ) -> Result<(Message, Usage)> {
        let request = build_request(options, context);
        let url = format!("{}/chat/completions", self.base_url);

        tracing::debug!(model = %options.model, messages = context.messages.len(), "requesting completion");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(Error::Auth(extract_error_message(&body)));
            }
            let parsed: std::result::Result<ErrorResponse, _> = serde_json::from_str(&body);
            return Err(match parsed {
                Ok(e) => Error::api(e.error.error_type.unwrap_or_default(), e.error.message),
                Err(_) => Error::api(status.as_str(), body),
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        parse_response(completion, &options.model)
    }
}

fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

fn build_request(options: &ChatOptions, context: &Context) -> ChatCompletionRequest {
    let mut messages = Vec::new();

    if let Some(ref system_prompt) = context.system_prompt {
        messages.push(OpenAIMessage {
            role: "system".to_string(),
            content: Some(system_prompt.clone()),
            tool_calls: None,
            tool_call_id: None,
        });
    }

    for msg in &context.messages {
        messages.push(convert_message(msg));
    }

    let tools = if context.tools.is_empty() {
        None
    } else {
        Some(
            context
                .tools
                .iter()
                .map(|t| OpenAITool {
                    tool_type: "function".to_string(),
                    function: OpenAIFunction {
                        name: t.name.clone(),
                        description: Some(t.description.clone()),
                        parameters: Some(t.parameters.clone()),
                    },
                })
                .collect(),
        )
    };

    let has_tools = tools.is_some();
    ChatCompletionRequest {
        model: options.model.clone(),
        messages,
        temperature: options.temperature,
        max_tokens: options.max_tokens,
        tools,
        tool_choice: if has_tools {
            Some(serde_json::json!("auto"))
        } else {
            None
        },
    }
}

fn convert_message(msg: &Message) -> OpenAIMessage {
    match msg {
        Message::User { content, .. } => OpenAIMessage {
            role: "user".to_string(),
            content: Some(joined_text(content)),
            tool_calls: None,
            tool_call_id: None,
        },
        Message::Assistant { content, .. } => {
            let mut text_parts = Vec::new();
            let mut tool_calls = Vec::new();

            for c in content {
                match c {
                    Content::Text { text } => text_parts.push(text.clone()),
                    Content::ToolCall {
                        id,
                        name,
                        arguments,
                    } => {
                        tool_calls.push(OpenAIToolCall {
                            id: id.clone(),
                            call_type: "function".to_string(),
                            function: OpenAIFunctionCall {
                                name: name.clone(),
                                arguments: serde_json::to_string(arguments).unwrap_or_default(),
                            },
                        });
                    }
                }
            }

            OpenAIMessage {
                role: "assistant".to_string(),
                content: if text_parts.is_empty() {
                    None
                } else {
                    Some(text_parts.join(""))
                },
                tool_calls: if tool_calls.is_empty() {
                    None
                } else {
                    Some(tool_calls)
                },
                tool_call_id: None,
            }
        }
        Message::ToolResult {
            tool_call_id,
            content,
            ..
        } => OpenAIMessage {
            role: "tool".to_string(),
            content: Some(joined_text(content)),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.clone()),
        },
    }
}

fn joined_text(content: &[Content]) -> String {
    content
        .iter()
        .filter_map(|c| c.as_text())
        .collect::<Vec<_>>()
        .join("")
}

fn parse_response(response: ChatCompletionResponse, model: &str) -> Result<(Message, Usage)> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Error::UnexpectedResponse("response carried no choices".to_string()))?;

    let mut content = Vec::new();

    if let Some(text) = choice.message.content {
        if !text.is_empty() {
            content.push(Content::Text { text });
        }
    }

    for tc in choice.message.tool_calls.unwrap_or_default() {
        let arguments =
            serde_json::from_str(&tc.function.arguments).unwrap_or(serde_json::json!({}));
        content.push(Content::ToolCall {
            id: tc.id,
            name: tc.function.name,
            arguments,
        });
    }

    let stop_reason = match choice.finish_reason.as_deref() {
        Some("stop") => Some(StopReason::Stop),
        Some("length") => Some(StopReason::Length),
        Some("tool_calls") => Some(StopReason::ToolUse),
        _ => None,
    };

    let usage = response
        .usage
        .map(|u| Usage {
            input: u.prompt_tokens,
            output: u.completion_tokens,
        })
        .unwrap_or_default();

    let message = Message::Assistant {
        content,
        metadata: AssistantMetadata {
            model: Some(model.to_string()),
            usage: usage.clone(),
            stop_reason,
            timestamp: chrono::Utc::now().timestamp_millis(),
        },
    };

    Ok((message, usage))
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAITool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAIToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct OpenAITool {
    #[serde(rename = "type")]
    tool_type: String,
    function: OpenAIFunction,
}

#[derive(Debug, Serialize)]
struct OpenAIFunction {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIToolCall {
    id: String,
    #[serde(rename = "type")]
    call_type: String,
    function: OpenAIFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ResponseChoice>,
    #[serde(default)]
    usage: Option<ResponseUsage>,
}

#[derive(Debug, Deserialize)]
struct ResponseChoice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<OpenAIToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Tool;

    fn sample_context() -> Context {
        let mut ctx = Context::with_system("you answer questions about a database");
        ctx.add_tool(Tool::new(
            "sql_db_query",
            "Run a read-only SQL query",
            serde_json::json!({
                "type": "object",
                "properties": { "query": { "type": "string" } },
                "required": ["query"]
            }),
        ));
        ctx.push(Message::user("How many customers are there?"));
        ctx
    }

    #[test]
    fn test_build_request_includes_system_and_tools() {
        let opts = ChatOptions::deterministic("gpt-4o-mini");
        let request = build_request(&opts, &sample_context());

        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.temperature, Some(0.0));
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[1].role, "user");
        assert_eq!(request.tools.as_ref().map(Vec::len), Some(1));
        assert!(request.tool_choice.is_some());
    }

    #[test]
    fn test_build_request_no_tools_no_tool_choice() {
        let opts = ChatOptions::deterministic("gpt-4o-mini");
        let mut ctx = Context::default();
        ctx.push(Message::user("hi"));
        let request = build_request(&opts, &ctx);
        assert!(request.tools.is_none());
        assert!(request.tool_choice.is_none());
    }

    #[test]
    fn test_convert_tool_result_carries_call_id() {
        let msg = Message::tool_result("call_7", "sql_db_query", vec![Content::text("59")], false);
        let converted = convert_message(&msg);
        assert_eq!(converted.role, "tool");
        assert_eq!(converted.tool_call_id.as_deref(), Some("call_7"));
        assert_eq!(converted.content.as_deref(), Some("59"));
    }

    #[test]
    fn test_convert_assistant_with_tool_calls() {
        let msg = Message::Assistant {
            content: vec![Content::tool_call(
                "call_1",
                "sql_db_list_tables",
                serde_json::json!({}),
            )],
            metadata: AssistantMetadata::default(),
        };
        let converted = convert_message(&msg);
        assert_eq!(converted.role, "assistant");
        assert!(converted.content.is_none());
        let calls = converted.tool_calls.expect("tool calls present");
        assert_eq!(calls[0].function.name, "sql_db_list_tables");
    }

    #[test]
    fn test_parse_response_text_answer() {
        let response = ChatCompletionResponse {
            choices: vec![ResponseChoice {
                message: ResponseMessage {
                    content: Some("There are 59 customers.".to_string()),
                    tool_calls: None,
                },
                finish_reason: Some("stop".to_string()),
            }],
            usage: Some(ResponseUsage {
                prompt_tokens: 120,
                completion_tokens: 8,
            }),
        };

        let (message, usage) = parse_response(response, "gpt-4o-mini").unwrap();
        assert_eq!(message.text(), "There are 59 customers.");
        assert!(message.tool_calls().is_empty());
        assert_eq!(usage.input, 120);
        assert_eq!(usage.output, 8);
    }

    #[test]
    fn test_parse_response_tool_call_with_malformed_arguments() {
        // Arguments that fail to parse as JSON fall back to an empty
        // object so the agent can surface a validation error instead of
        // the whole request failing.
        let response = ChatCompletionResponse {
            choices: vec![ResponseChoice {
                message: ResponseMessage {
                    content: None,
                    tool_calls: Some(vec![OpenAIToolCall {
                        id: "call_1".to_string(),
                        call_type: "function".to_string(),
                        function: OpenAIFunctionCall {
                            name: "sql_db_query".to_string(),
                            arguments: "{not json".to_string(),
                        },
                    }]),
                },
                finish_reason: Some("tool_calls".to_string()),
            }],
            usage: None,
        };

        let (message, _) = parse_response(response, "gpt-4o-mini").unwrap();
        let calls = message.tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].2, &serde_json::json!({}));
    }

    #[test]
    fn test_parse_response_empty_choices_is_error() {
        let response = ChatCompletionResponse {
            choices: vec![],
            usage: None,
        };
        assert!(parse_response(response, "gpt-4o-mini").is_err());
    }
}
