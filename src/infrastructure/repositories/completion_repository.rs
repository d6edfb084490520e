use super::upstream_client::{UpstreamClient, UpstreamError};
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
};
use async_trait::async_trait;
use std::sync::Arc;

/// One system + user exchange sent to the text-generation service
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Repository for text generation.
/// Abstracts the upstream language model so the story pipeline can be
/// exercised without network access.
#[async_trait]
pub trait CompletionRepository: Send + Sync {
    /// Returns the generated text of the first choice
    async fn complete(&self, request: CompletionRequest) -> Result<String, UpstreamError>;
}

/// OpenAI chat-completions implementation
pub struct OpenAiCompletionRepository {
    client: Arc<UpstreamClient>,
    model: String,
}

impl OpenAiCompletionRepository {
    pub fn new(client: Arc<UpstreamClient>, model: String) -> Self {
        Self { client, model }
    }

    fn build_request(
        &self,
        request: &CompletionRequest,
    ) -> Result<CreateChatCompletionRequest, UpstreamError> {
        let invalid = |e: async_openai::error::OpenAIError| UpstreamError::InvalidRequest(e.to_string());

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(request.system.as_str())
                .build()
                .map_err(invalid)?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(request.user.as_str())
                .build()
                .map_err(invalid)?
                .into(),
        ];

        CreateChatCompletionRequestArgs::default()
            .model(self.model.as_str())
            .messages(messages)
            .max_tokens(request.max_tokens)
            .temperature(request.temperature)
            .build()
            .map_err(invalid)
    }
}

#[async_trait]
impl CompletionRepository for OpenAiCompletionRepository {
    async fn complete(&self, request: CompletionRequest) -> Result<String, UpstreamError> {
        let start_time = std::time::Instant::now();
        let body = self.build_request(&request)?;

        tracing::debug!(
            model = %self.model,
            max_tokens = request.max_tokens,
            temperature = request.temperature,
            "Calling chat completions API"
        );

        let bytes = self.client.post_json("chat/completions", &body).await?;
        let response: CreateChatCompletionResponse = serde_json::from_slice(&bytes)
            .map_err(|e| UpstreamError::Malformed(e.to_string()))?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                UpstreamError::Malformed("response contained no completion text".to_string())
            })?;

        tracing::info!(
            provider = "openai",
            model = %self.model,
            latency_ms = start_time.elapsed().as_millis(),
            output_length = text.len(),
            "Chat completion received"
        );

        Ok(text)
    }
}
