use crate::engine::{GenerationEngine, PromptContext};
use crate::parse::parse_action_tags;
use async_trait::async_trait;
use murmur_core::{ActionIntent, CoreError, GenerationError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

const PROVIDER: &str = "openai";

const ACTION_FOOTER: &str = "Respond only with the action tags that apply: \
[LIKE] [RETWEET] [QUOTE] [REPLY]. Respond with none of them to skip.";

/// Chat-completion provider speaking the OpenAI-compatible JSON surface.
/// Any service exposing `/chat/completions` works through the same
/// struct; only the base URL and model differ.
#[derive(Debug)]
pub struct OpenAiEngine {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl OpenAiEngine {
    pub fn new(base_url: &str, api_key: Option<String>, model: &str) -> Result<Self, CoreError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
        })
    }

    fn render_prompt(&self, context: &PromptContext, instruction: &str) -> String {
        let mut sections = vec![format!("You are {}.", context.agent_name)];
        if !context.thread_history.is_empty() {
            sections.push(format!(
                "Conversation so far, oldest first:\n{}",
                context.thread_history.join("\n")
            ));
        }
        if !context.focus.is_empty() {
            sections.push(format!("Current post:\n{}", context.focus));
        }
        sections.push(instruction.to_string());
        sections.join("\n\n")
    }

    async fn complete(&self, prompt: String) -> Result<String, CoreError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
        };

        let mut builder = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Generation request failed: {}", e);
                if e.is_timeout() {
                    return Err(CoreError::Generation(GenerationError::RequestTimeout {
                        provider: PROVIDER.to_string(),
                    }));
                }
                return Err(CoreError::Network(e));
            }
        };

        if !response.status().is_success() {
            error!("Generation provider returned {}", response.status());
            return Err(CoreError::Generation(GenerationError::ServiceUnavailable {
                provider: PROVIDER.to_string(),
            }));
        }

        let parsed: ChatResponse = response.json().await.map_err(|_| {
            CoreError::Generation(GenerationError::InvalidResponseFormat {
                provider: PROVIDER.to_string(),
            })
        })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(CoreError::Generation(GenerationError::EmptyCompletion));
        }

        debug!("Generated {} characters", text.len());
        Ok(text)
    }
}

#[async_trait]
impl GenerationEngine for OpenAiEngine {
    async fn generate_text(&self, context: &PromptContext) -> Result<String, CoreError> {
        let prompt = self.render_prompt(
            context,
            "Write the post text now. Do not add commentary, just the post.",
        );
        self.complete(prompt).await
    }

    async fn decide_actions(&self, context: &PromptContext) -> Result<ActionIntent, CoreError> {
        let prompt = self.render_prompt(context, ACTION_FOOTER);
        let response = self.complete(prompt).await?;
        Ok(parse_action_tags(&response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_prompt_includes_thread_and_focus() {
        let engine = OpenAiEngine::new("http://localhost:9090", None, "test-model").unwrap();
        let context = PromptContext {
            agent_name: "murmur".to_string(),
            focus: "ID: p2\nText: hi\n---".to_string(),
            thread_history: vec!["ID: p1\nText: root\n---".to_string()],
        };

        let prompt = engine.render_prompt(&context, "Decide.");
        assert!(prompt.contains("You are murmur."));
        assert!(prompt.contains("ID: p1"));
        assert!(prompt.contains("Current post:"));
        assert!(prompt.ends_with("Decide."));
    }

    #[test]
    fn test_render_prompt_for_new_post_is_bare() {
        let engine = OpenAiEngine::new("http://localhost:9090", None, "test-model").unwrap();
        let context = PromptContext::for_new_post("murmur");

        let prompt = engine.render_prompt(&context, "Write.");
        assert!(!prompt.contains("Conversation so far"));
        assert!(!prompt.contains("Current post:"));
    }
}
