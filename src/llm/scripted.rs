use crate::llm::{GatewayError, ModelGateway, check_request};
use std::collections::VecDeque;
use std::sync::Mutex;

/// In-process gateway that replays canned replies in order. Once the script
/// runs out every call fails with `Transport`, which makes it a usable offline
/// gateway too: the engine simply runs its heuristics.
#[derive(Default)]
pub struct ScriptedGateway {
    replies: Mutex<VecDeque<Result<String, GatewayError>>>,
    prompts: Mutex<Vec<(String, String)>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: &str) -> Self {
        self.push(Ok(text.to_string()))
    }

    pub fn fail(self, error: GatewayError) -> Self {
        self.push(Err(error))
    }

    /// Number of completions requested so far.
    pub fn calls(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// `(system, user)` pairs in call order.
    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn push(self, reply: Result<String, GatewayError>) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
        self
    }
}

impl ModelGateway for ScriptedGateway {
    fn complete(&self, system: &str, user: &str, max_tokens: u32) -> Result<String, GatewayError> {
        check_request(system, user, max_tokens)?;
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push((system.to_string(), user.to_string()));
        }
        self.replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.pop_front())
            .unwrap_or_else(|| Err(GatewayError::Transport("no scripted reply left".into())))
    }
}
