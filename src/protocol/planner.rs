// src/protocol/planner.rs

use crate::config::DEFAULT_MAX_TOKENS;
use crate::context::HouseContext;
use crate::extract::extract_json;
use crate::heuristics::fallback_plan;
use crate::llm::ModelGateway;
use crate::model::{Plan, Task};
use crate::protocol::{FallbackReason, Outcome, log_violations};
use crate::validation::{audit_plan, repair_plan};
use tracing::{debug, info, warn};

/// Trait for turning one natural-language task into a plan.
pub trait Planner: Send + Sync {
    fn plan(&self, task: &Task, house: &HouseContext) -> Plan;
}

const SYSTEM_PROMPT: &str = "You are a planning module for a home simulation.
You must output ONLY a JSON object that conforms to the schema shown in the user message.
Do not include any prose or code fences. No explanations, JSON only.";

const SCHEMA_BLOCK: &str = r#"Return a JSON object:

{
  "steps": [
    {
      "room": "<NameOfRoom, exact match from ROOMS>",
      "waypoints": [[x, y], ...],
      "actions": [
        {
          "type": "interact",
          "target_device_id": "<id from DEVICES map>",
          "op": "ON" | "OFF"
        }
      ]
    }
  ]
}

Rules:
- Rooms MUST be chosen from ROOMS keys.
- target_device_id MUST be a key from DEVICES.
- waypoints MUST be realistic positions inside the chosen room.
- If the task doesn't need an action in some room, you may still include a waypoint-only step.
- If no device action is implied, return a single step to the most relevant room and an empty actions list."#;

/// Planner backed by a chat model, with the keyword planner as backstop.
pub struct LlmPlanner<G> {
    gateway: G,
    max_tokens: u32,
}

impl<G: ModelGateway> LlmPlanner<G> {
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

    /// The model path alone: prompt, complete, extract, repair.
    pub fn attempt(&self, task: &Task, house: &HouseContext) -> Outcome<Plan> {
        self.try_model(task, house).into()
    }

    fn try_model(&self, task: &Task, house: &HouseContext) -> Result<Plan, FallbackReason> {
        let user = user_prompt(task, house);
        debug!(chars = user.len(), "planner prompt built");

        let raw = self.gateway.complete(SYSTEM_PROMPT, &user, self.max_tokens)?;
        debug!(raw = %raw, "planner model output");

        let parsed = extract_json(&raw)?;
        let repaired = audit_plan(&parsed, &house.rooms, &house.devices);
        log_violations("planner", &repaired.violations);
        Ok(repaired.value)
    }
}

impl<G: ModelGateway> Planner for LlmPlanner<G> {
    fn plan(&self, task: &Task, house: &HouseContext) -> Plan {
        let plan = self.attempt(task, house).or_fallback(|reason| {
            warn!(%reason, "planner falling back to keyword heuristic");
            HeuristicPlanner.plan(task, house)
        });
        info!(steps = plan.steps.len(), "plan ready");
        plan
    }
}

/// Keyword planner over the registries. Its output is passed through the
/// same repair as model output.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicPlanner;

impl Planner for HeuristicPlanner {
    fn plan(&self, task: &Task, house: &HouseContext) -> Plan {
        let plan = fallback_plan(&task.text, &house.rooms, &house.devices);
        match serde_json::to_value(&plan) {
            Ok(raw) => repair_plan(&raw, &house.rooms, &house.devices),
            Err(_) => plan,
        }
    }
}

fn user_prompt(task: &Task, house: &HouseContext) -> String {
    let context = pretty(&task.context);
    let rooms = pretty(&house.rooms);
    let devices = pretty(&house.devices);

    format!(
        "You convert natural tasks into a stepwise plan.

NATURAL_TASK:
{task}

CONTEXT:
{context}

ROOMS (dictionary):
{rooms}

DEVICES (dictionary):
{devices}

{SCHEMA_BLOCK}
",
        task = task.text,
    )
}

fn pretty<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}
