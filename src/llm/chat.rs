// src/llm/chat.rs

use crate::config::LlmConfig;
use crate::llm::{GatewayError, ModelGateway, check_request};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

// OpenAI-compatible request/response
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: MessageContent<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatMessageResponse>,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
    // Some reasoning-model servers leave `content` null and put the text here.
    #[serde(default)]
    reasoning_content: Option<String>,
}

/// Gateway to an OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatCompletionGateway {
    config: LlmConfig,
    client: reqwest::blocking::Client,
}

impl ChatCompletionGateway {
    pub fn new(config: LlmConfig) -> Result<Self, GatewayError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Model ids advertised by the server's `/models` endpoint.
    pub fn list_models(&self) -> Result<Vec<String>, GatewayError> {
        let url = self.config.models_url();
        let mut request = self.client.get(&url).header("Accept", "application/json");
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let body: Value = send(request)?;
        let ids = body
            .get("data")
            .and_then(Value::as_array)
            .map(|models| {
                models
                    .iter()
                    .filter_map(|m| m.get("id").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Ok(ids)
    }

    fn post(
        &self,
        system: &str,
        user: &str,
        image_b64: Option<&str>,
        max_tokens: u32,
    ) -> Result<String, GatewayError> {
        check_request(system, user, max_tokens)?;

        let user_content = match image_b64.filter(|_| self.config.send_images) {
            Some(image) => MessageContent::Parts(vec![
                ContentPart::Text { text: user },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: data_url(image),
                    },
                },
            ]),
            None => MessageContent::Text(user),
        };

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(system),
                },
                ChatMessage {
                    role: "user",
                    content: user_content,
                },
            ],
            max_tokens,
        };

        debug!(
            url = %self.config.api_url,
            model = %self.config.model,
            max_tokens,
            "posting chat completion"
        );

        let mut request = self
            .client
            .post(&self.config.api_url)
            .header("Accept", "application/json")
            .json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let parsed: ChatResponse = send(request)?;
        first_completion(parsed)
    }
}

impl ModelGateway for ChatCompletionGateway {
    fn complete(&self, system: &str, user: &str, max_tokens: u32) -> Result<String, GatewayError> {
        self.post(system, user, None, max_tokens)
    }

    fn complete_with_image(
        &self,
        system: &str,
        user: &str,
        image_b64: Option<&str>,
        max_tokens: u32,
    ) -> Result<String, GatewayError> {
        self.post(system, user, image_b64, max_tokens)
    }
}

fn send<T: for<'de> Deserialize<'de>>(
    request: reqwest::blocking::RequestBuilder,
) -> Result<T, GatewayError> {
    let response = request
        .send()
        .map_err(|e| GatewayError::Transport(format!("request failed: {e}")))?;

    let status = response.status();
    debug!(%status, "model endpoint responded");
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(GatewayError::Transport(format!("HTTP {status}: {body}")));
    }

    response
        .json::<T>()
        .map_err(|e| GatewayError::Transport(format!("undecodable response body: {e}")))
}

fn first_completion(response: ChatResponse) -> Result<String, GatewayError> {
    let message = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .ok_or(GatewayError::EmptyResponse)?;

    [message.content, message.reasoning_content]
        .into_iter()
        .flatten()
        .find(|text| !text.trim().is_empty())
        .ok_or(GatewayError::EmptyResponse)
}

fn data_url(image_b64: &str) -> String {
    if image_b64.starts_with("data:") {
        image_b64.to_string()
    } else {
        format!("data:image/png;base64,{image_b64}")
    }
}
