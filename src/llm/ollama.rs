use crate::llm::client::LLMClient;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use ollama_rs::{
    Ollama,
    generation::chat::{ChatMessage, request::ChatMessageRequest},
};

pub struct OllamaClient {
    client: Ollama,
    model: String,
}

impl OllamaClient {
    pub async fn new(base_url: String, model: String) -> Result<Self> {
        let url_parts: Vec<&str> = base_url.split("://").collect();
        let (host, port) = if url_parts.len() == 2 {
            let host_port: Vec<&str> = url_parts[1].split(':').collect();
            let host = host_port[0].to_string();
            let port = if host_port.len() == 2 {
                host_port[1].parse().unwrap_or(11434)
            } else {
                11434
            };
            (host, port)
        } else {
            ("localhost".to_string(), 11434)
        };

        let client = Ollama::new(host, port);

        Ok(Self { client, model })
    }

    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let request = ChatMessageRequest::new(self.model.clone(), messages);

        let response = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|e| AppError::Collaborator(format!("Ollama error: {}", e)))?;

        Ok(response.message.content)
    }
}

#[async_trait]
impl LLMClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.complete(vec![ChatMessage::user(prompt.to_string())]).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.complete(vec![
            ChatMessage::system(system.to_string()),
            ChatMessage::user(prompt.to_string()),
        ])
        .await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_url_parsing_full() {
        let base_url = "http://localhost:11434";
        let url_parts: Vec<&str> = base_url.split("://").collect();
        assert_eq!(url_parts.len(), 2);

        let host_port: Vec<&str> = url_parts[1].split(':').collect();
        assert_eq!(host_port[0], "localhost");
        assert_eq!(host_port[1], "11434");
    }

    #[test]
    fn test_url_parsing_no_port() {
        let base_url = "http://localhost";
        let url_parts: Vec<&str> = base_url.split("://").collect();
        let host_port: Vec<&str> = url_parts[1].split(':').collect();

        let port = if host_port.len() == 2 {
            host_port[1].parse().unwrap_or(11434)
        } else {
            11434
        };

        assert_eq!(host_port[0], "localhost");
        assert_eq!(port, 11434);
    }
}
