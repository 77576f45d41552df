//! Model port for OpenAI-compatible chat completion endpoints.
//!
//! Sends the rendered prompt as a single user message and returns the first
//! choice's content. Streaming is not used.

use crate::config::HttpConfig;
use crate::lm::{non_empty_response, ModelPort};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::{Duration, Instant};

pub struct HttpModel {
    agent: ureq::Agent,
    url: String,
    model: String,
    temperature: f32,
    api_key: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl HttpModel {
    /// Build a client from config, reading the API key from the environment.
    pub fn from_config(config: &HttpConfig) -> Result<Self> {
        let api_key = env::var(&config.api_key_env)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| anyhow!("{} is not set", config.api_key_env))?;
        Ok(Self::new(config, api_key))
    }

    fn new(config: &HttpConfig, api_key: String) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(agent_config),
            url: completions_url(&config.base_url),
            model: config.model.clone(),
            temperature: config.temperature,
            api_key,
        }
    }
}

impl ModelPort for HttpModel {
    fn invoke(&self, prompt: &str) -> Result<String> {
        let start = Instant::now();
        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };
        let mut response = self
            .agent
            .post(self.url.as_str())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send_json(&request)
            .with_context(|| format!("POST {}", self.url))?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.body_mut().read_to_string().unwrap_or_default();
            return Err(anyhow!(
                "POST {} returned {}: {}",
                self.url,
                status,
                detail.trim()
            ));
        }
        let body: ChatResponse = response
            .body_mut()
            .read_json()
            .context("decode chat completion response")?;
        let text = first_choice_content(body)?;

        tracing::info!(
            elapsed_ms = start.elapsed().as_millis(),
            prompt_bytes = prompt.len(),
            response_bytes = text.len(),
            model = %self.model,
            "lm invoke complete"
        );
        Ok(text)
    }
}

fn completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

fn first_choice_content(response: ChatResponse) -> Result<String> {
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| anyhow!("chat completion response has no message content"))?;
    non_empty_response(content)
}
