// src/protocol/navigator.rs

use crate::config::DEFAULT_MAX_TOKENS;
use crate::context::HouseContext;
use crate::extract::extract_json;
use crate::heuristics::{NavPolicy, fallback_step};
use crate::llm::ModelGateway;
use crate::model::{AgentState, NavStep};
use crate::protocol::{FallbackReason, Outcome, log_violations};
use crate::validation::validate_nav_step;
use tracing::{debug, info, warn};

/// Per-tick choice of target room and one grid step.
pub trait Navigator: Send + Sync {
    fn decide(&self, state: &AgentState, house: &HouseContext) -> NavStep;
}

const SYSTEM_PROMPT: &str = r#"You are a navigation module for a top-down house sim.
Return STRICT JSON only. No prose. Keys: room, direction.
direction is one of ["UP","DOWN","LEFT","RIGHT","STAY"].
Pick the room where the next task progress should happen, then a single-step direction from the actor's coordinates toward that room center (grid-like motion)."#;

pub struct LlmNavigator<G> {
    gateway: G,
    max_tokens: u32,
}

impl<G: ModelGateway> LlmNavigator<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn attempt(&self, state: &AgentState, house: &HouseContext) -> Outcome<NavStep> {
        self.try_model(state, house).into()
    }

    fn try_model(
        &self,
        state: &AgentState,
        house: &HouseContext,
    ) -> Result<NavStep, FallbackReason> {
        let user = user_prompt(state, house);
        let raw = self.gateway.complete(SYSTEM_PROMPT, &user, self.max_tokens)?;
        debug!(raw = %raw, "navigator model output");

        let parsed = extract_json(&raw)?;
        validate_nav_step(&parsed, &house.rooms).map_err(|violations| {
            log_violations("navigator", &violations);
            FallbackReason::Schema(violations)
        })
    }
}

impl<G: ModelGateway> Navigator for LlmNavigator<G> {
    fn decide(&self, state: &AgentState, house: &HouseContext) -> NavStep {
        let step = self.attempt(state, house).or_fallback(|reason| {
            warn!(%reason, "navigator falling back to dominant-axis heuristic");
            fallback_step(state, &house.rooms)
        });
        info!(room = %step.room, direction = %step.direction, "navigation step");
        step
    }
}

fn user_prompt(state: &AgentState, house: &HouseContext) -> String {
    let tasks = serde_json::to_string(&state.tasks).unwrap_or_default();
    let rooms = serde_json::to_string(&house.rooms).unwrap_or_default();
    let last_room = state.last_room.as_deref().unwrap_or("None");
    let has_image = if state.bird_eye_b64.is_some() { "yes" } else { "no" };
    let deadband = NavPolicy::TEXT.deadband;

    format!(
        r#"
STATE:
- Tasks: {tasks}
- Actor: {{"x": {x}, "y": {y}}}
- Rooms: {rooms}
- LastRoom: {last_room}
- BirdEyeImagePresent: {has_image}

Rules:
1) Choose the room that helps progress the current tasks (lights -> LivingRoom, coffee -> Kitchen, etc.).
2) Compute the primary axis from actor to that room's center; output one of: UP/DOWN/LEFT/RIGHT (single step).
3) If already near the target (<{deadband}m on both axes), use STAY.

Return JSON ONLY:
{{"room":"<RoomName>","direction":"UP|DOWN|LEFT|RIGHT|STAY"}}
"#,
        x = state.position.x,
        y = state.position.y,
    )
}
