//! Transport abstraction over the model client

use async_trait::async_trait;

use askdb_ai::{ChatOptions, Context, Message, OpenAIClient, Usage};

/// Transport for requesting completions
#[async_trait]
pub trait Transport: Send + Sync {
    /// Request one completion for the given context
    async fn complete(
        &self,
        options: &ChatOptions,
        context: &Context,
    ) -> askdb_ai::Result<(Message, Usage)>;
}

/// Direct transport backed by the OpenAI client
pub struct ClientTransport {
    client: OpenAIClient,
}

impl ClientTransport {
    /// Create a transport around an existing client
    pub fn new(client: OpenAIClient) -> Self {
        Self { client }
    }

    /// Create a transport with a specific API key
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            client: OpenAIClient::new(api_key),
        }
    }
}

#[async_trait]
impl Transport for ClientTransport {
    async fn complete(
        &self,
        options: &ChatOptions,
        context: &Context,
    ) -> askdb_ai::Result<(Message, Usage)> {
        self.client.complete(options, context).await
    }
}
