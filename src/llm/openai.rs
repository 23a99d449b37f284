use crate::llm::client::LLMClient;
use crate::types::{AppError, Result};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestUserMessage, CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;

pub struct OpenAIClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAIClient {
    pub fn new(api_key: String, api_base: String, model: String) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base);

        Self {
            client: Client::with_config(config),
            model,
        }
    }

    async fn complete(&self, messages: Vec<ChatCompletionRequestMessage>) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()
            .map_err(|e| AppError::Collaborator(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AppError::Collaborator(format!("OpenAI API error: {}", e)))?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| AppError::Collaborator("No response from OpenAI".to_string()))
    }
}

#[async_trait]
impl LLMClient for OpenAIClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.complete(vec![ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessage::from(prompt.to_string()),
        )])
        .await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.complete(vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage::from(
                system.to_string(),
            )),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage::from(
                prompt.to_string(),
            )),
        ])
        .await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
