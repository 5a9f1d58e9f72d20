// src/protocol/vision.rs

use crate::config::DEFAULT_MAX_TOKENS;
use crate::context::HouseContext;
use crate::extract::extract_json;
use crate::heuristics::{NavPolicy, fallback_decision};
use crate::llm::ModelGateway;
use crate::model::{AgentState, Decision, RoomDistance};
use crate::protocol::{FallbackReason, Outcome, log_violations};
use crate::validation::repair_decision;
use tracing::{debug, info, warn};

/// Navigator that also sees a bird's-eye image and reports task completion.
pub trait VisionNavigator: Send + Sync {
    fn decide_with_vision(
        &self,
        state: &AgentState,
        distances: &[RoomDistance],
        house: &HouseContext,
    ) -> Decision;
}

const SYSTEM_PROMPT: &str = r#"You are a navigation AI for a virtual character in an open-top house simulation.

The house has no ceilings, so a bird's-eye image shows every room. The character
is rendered as a bright red glowing figure with a yellow marker above it and a
green circle on the floor beneath it.

You will receive:
1. An optional bird's-eye image
2. The character's exact position
3. The list of tasks to complete
4. Room locations and distances

Rules:
- Return STRICT JSON only, no markdown or explanations.
- Move ONE step at a time toward the target room.
- direction must be exactly one of: "UP", "DOWN", "LEFT", "RIGHT", "STAY".
- Mark task_complete=true only when the character has reached the target room.

JSON response format:
{
  "direction": "UP|DOWN|LEFT|RIGHT|STAY",
  "room": "<target_room_name>",
  "reasoning": "<what you see and why this move>",
  "task_complete": false,
  "next_action": "<optional: device interaction>"
}"#;

pub struct LlmVisionNavigator<G> {
    gateway: G,
    max_tokens: u32,
    policy: NavPolicy,
}

impl<G: ModelGateway> LlmVisionNavigator<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            max_tokens: DEFAULT_MAX_TOKENS,
            policy: NavPolicy::VISION,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_policy(mut self, policy: NavPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn attempt(
        &self,
        state: &AgentState,
        distances: &[RoomDistance],
        house: &HouseContext,
    ) -> Outcome<Decision> {
        self.try_model(state, distances, house).into()
    }

    fn try_model(
        &self,
        state: &AgentState,
        distances: &[RoomDistance],
        house: &HouseContext,
    ) -> Result<Decision, FallbackReason> {
        let user = user_prompt(state, distances, house.max_steps);
        let raw = self.gateway.complete_with_image(
            SYSTEM_PROMPT,
            &user,
            state.bird_eye_b64.as_deref(),
            self.max_tokens,
        )?;
        debug!(raw = %raw, "vision navigator model output");

        let parsed = extract_json(&raw)?;
        let repaired = repair_decision(&parsed, &house.rooms).map_err(|violation| {
            log_violations("vision", std::slice::from_ref(&violation));
            FallbackReason::Schema(vec![violation])
        })?;
        log_violations("vision", &repaired.violations);
        Ok(repaired.value)
    }
}

impl<G: ModelGateway> VisionNavigator for LlmVisionNavigator<G> {
    fn decide_with_vision(
        &self,
        state: &AgentState,
        distances: &[RoomDistance],
        house: &HouseContext,
    ) -> Decision {
        let decision = self.attempt(state, distances, house).or_fallback(|reason| {
            warn!(%reason, "vision navigator falling back to dominant-axis heuristic");
            fallback_decision(state, &house.rooms, &self.policy)
        });
        info!(
            room = %decision.room,
            direction = %decision.direction,
            task_complete = decision.task_complete,
            "vision decision"
        );
        decision
    }
}

fn user_prompt(state: &AgentState, distances: &[RoomDistance], max_steps: u32) -> String {
    let tasks = state.tasks.join(", ");
    let last_room = state.last_room.as_deref().unwrap_or("Starting area");
    let image = match &state.bird_eye_b64 {
        Some(b64) => format!("attached ({} base64 chars)", b64.len()),
        None => "not available, rely on coordinates".to_string(),
    };
    let rooms = distances
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "VISUAL NAVIGATION REQUEST

## CURRENT TASK: {tasks}

## CHARACTER STATUS:
- Position: {position}
- Last Room: {last_room}
- Step: {step}/{max_steps}

## BIRD'S-EYE IMAGE: {image}

## AVAILABLE ROOMS & DISTANCES:
{rooms}

## NAVIGATION INSTRUCTIONS:
1. LOCATE the red character in the image (or use the position above).
2. TARGET the room the current task needs.
3. DECIDE one direction that moves the character closer.

## MOVEMENT DIRECTIONS:
- UP: positive Y
- DOWN: negative Y
- LEFT: negative X
- RIGHT: positive X
- STAY: already at the target or blocked",
        position = state.position,
        step = state.step_count + 1,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedGateway;
    use crate::model::Direction;

    #[test]
    fn prompt_lists_distances_and_step() {
        let house = HouseContext::default_house().with_max_steps(40);
        let state = AgentState::at(0.0, 0.0)
            .with_task("make coffee")
            .with_task("turn off lights")
            .with_step_count(4);
        let distances = RoomDistance::summarize(state.position, &house.rooms);

        let prompt = user_prompt(&state, &distances, house.max_steps);
        assert!(prompt.contains("## CURRENT TASK: make coffee, turn off lights"));
        assert!(prompt.contains("- Position: (0.00, 0.00)"));
        assert!(prompt.contains("- Step: 5/40"));
        assert!(prompt.contains("- Kitchen: 4.0 units away (center at 3, -1)"));
        assert!(prompt.contains("not available"));
    }

    #[test]
    fn wrapped_model_answer_is_repaired() {
        let gateway = ScriptedGateway::new().reply(
            "```json\n{\"room\": \"Garage\", \"direction\": \"left\", \"task_complete\": \"no\"}\n```",
        );
        let navigator = LlmVisionNavigator::new(&gateway);
        let house = HouseContext::default_house();
        let state = AgentState::at(0.0, 0.0).with_task("tidy up");

        let decision = navigator.decide_with_vision(&state, &[], &house);
        assert_eq!(decision.room, "Kitchen");
        assert_eq!(decision.direction, Direction::Left);
        assert!(!decision.task_complete);
    }

    #[test]
    fn unusable_direction_triggers_fallback() {
        let gateway = ScriptedGateway::new().reply(r#"{"room": "Kitchen"}"#);
        let navigator = LlmVisionNavigator::new(&gateway);
        let house = HouseContext::default_house();
        let state = AgentState::at(2.9, -1.1).with_task("make coffee");

        let decision = navigator.decide_with_vision(&state, &[], &house);
        assert_eq!(decision.direction, Direction::Stay);
        assert!(decision.task_complete);
        assert_eq!(decision.next_action.as_deref(), Some("interact_with_objects"));
    }

    #[test]
    fn policy_controls_arrival_reporting() {
        let policy = NavPolicy {
            complete_on_arrival: false,
            ..NavPolicy::VISION
        };
        let gateway = ScriptedGateway::new();
        let navigator = LlmVisionNavigator::new(&gateway).with_policy(policy);
        let house = HouseContext::default_house();
        let state = AgentState::at(2.9, -1.1).with_task("make coffee");

        let decision = navigator.decide_with_vision(&state, &[], &house);
        assert_eq!(decision.room, "Kitchen");
        assert_eq!(decision.direction, Direction::Stay);
        assert!(!decision.task_complete);
        assert_eq!(decision.next_action, None);
    }
}
