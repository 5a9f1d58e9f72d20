//! Engine configuration loaded from the environment (and `.env`, when the binary loads it).
//!
//! | Env | Default | Description |
//! |-----|---------|-------------|
//! | LLM_API_URL | http://localhost:8080/api/chat/completions | OpenAI-compatible chat endpoint. |
//! | LLM_API_KEY | unset | Bearer token. Header omitted when unset or blank. |
//! | LLM_MODEL | openai/gpt-oss-20b | Model id sent with every request. |
//! | LLM_REQUEST_TIMEOUT | 30 | Seconds before a request is abandoned. |
//! | LLM_MAX_TOKENS | 256 | Completion budget per call. |
//! | LLM_SEND_IMAGES | false | Attach the bird's-eye image as an `image_url` content part. |
//! | LLM_DEBUG | false | Default the log filter to `debug`. |
//! | HOUSE_ROOMS_PATH | configs/rooms.json | Room registry file. |
//! | HOUSE_DEVICES_PATH | configs/devices.json | Device registry file. |
//! | HOUSE_MAX_STEPS | 50 | Step horizon reported to the vision navigator. |

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/chat/completions";
pub const DEFAULT_MODEL: &str = "openai/gpt-oss-20b";
pub const DEFAULT_TIMEOUT_SECS: f64 = 30.0;
pub const DEFAULT_MAX_TOKENS: u32 = 256;
pub const DEFAULT_MAX_STEPS: u32 = 50;

/// Settings for the chat-completion gateway.
#[derive(Clone, Debug, PartialEq)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
    pub max_tokens: u32,
    pub send_images: bool,
    pub debug: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS),
            max_tokens: DEFAULT_MAX_TOKENS,
            send_images: false,
            debug: false,
        }
    }
}

impl LlmConfig {
    pub fn with_url(mut self, url: &str) -> Self {
        self.api_url = url.to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `/models` sibling of the chat endpoint.
    pub fn models_url(&self) -> String {
        match self.api_url.split_once("/chat/completions") {
            Some((base, _)) => format!("{base}/models"),
            None => self.api_url.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    pub llm: LlmConfig,
    pub rooms_path: PathBuf,
    pub devices_path: PathBuf,
    pub max_steps: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            rooms_path: PathBuf::from("configs/rooms.json"),
            devices_path: PathBuf::from("configs/devices.json"),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl EngineConfig {
    /// Load from process environment. Unset or invalid values fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`EngineConfig::from_env`] over an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let timeout = get("LLM_REQUEST_TIMEOUT")
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .map(Duration::from_secs_f64)
            .unwrap_or(defaults.llm.timeout);

        let llm = LlmConfig {
            api_url: get("LLM_API_URL").unwrap_or(defaults.llm.api_url),
            api_key: get("LLM_API_KEY"),
            model: get("LLM_MODEL").unwrap_or(defaults.llm.model),
            timeout,
            max_tokens: get("LLM_MAX_TOKENS")
                .and_then(|v| v.parse::<u32>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.llm.max_tokens),
            send_images: get("LLM_SEND_IMAGES").map(|v| parse_bool(&v)).unwrap_or(false),
            debug: get("LLM_DEBUG").map(|v| parse_bool(&v)).unwrap_or(false),
        };

        Self {
            llm,
            rooms_path: get("HOUSE_ROOMS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.rooms_path),
            devices_path: get("HOUSE_DEVICES_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.devices_path),
            max_steps: get("HOUSE_MAX_STEPS")
                .and_then(|v| v.parse::<u32>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_steps),
        }
    }
}

fn parse_bool(raw: &str) -> bool {
    !matches!(
        raw.to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
