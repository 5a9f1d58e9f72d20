// src/agent/mod.rs

use crate::config::EngineConfig;
use crate::context::HouseContext;
use crate::llm::{ChatCompletionGateway, GatewayError, ModelGateway};
use crate::model::{AgentState, Decision, NavStep, Plan, RegistryError, RoomDistance, Task};
use crate::protocol::{
    LlmNavigator, LlmPlanner, LlmVisionNavigator, Navigator, Planner, VisionNavigator,
};
use std::sync::Arc;
use thiserror::Error;

/// What callers of the engine see. None of these can fail.
pub trait Agent {
    fn plan(&self, task: &Task) -> Plan;
    fn decide(&self, state: &AgentState) -> NavStep;
    fn decide_with_vision(&self, state: &AgentState) -> Decision;
}

#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Planner and both navigators over one shared gateway and house.
pub struct HouseholdAgent<G> {
    house: HouseContext,
    planner: LlmPlanner<Arc<G>>,
    navigator: LlmNavigator<Arc<G>>,
    vision: LlmVisionNavigator<Arc<G>>,
}

impl<G: ModelGateway> HouseholdAgent<G> {
    pub fn new(gateway: G, house: HouseContext) -> Self {
        let gateway = Arc::new(gateway);
        Self {
            house,
            planner: LlmPlanner::new(Arc::clone(&gateway)),
            navigator: LlmNavigator::new(Arc::clone(&gateway)),
            vision: LlmVisionNavigator::new(gateway),
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.planner = self.planner.with_max_tokens(max_tokens);
        self.navigator = self.navigator.with_max_tokens(max_tokens);
        self.vision = self.vision.with_max_tokens(max_tokens);
        self
    }

    pub fn house(&self) -> &HouseContext {
        &self.house
    }

    /// Vision decision with caller-supplied room distance summaries.
    pub fn decide_with_distances(
        &self,
        state: &AgentState,
        distances: &[RoomDistance],
    ) -> Decision {
        self.vision.decide_with_vision(state, distances, &self.house)
    }
}

impl HouseholdAgent<ChatCompletionGateway> {
    /// Agent talking to the configured chat endpoint over the configured house.
    pub fn from_config(config: &EngineConfig) -> Result<Self, SetupError> {
        let gateway = ChatCompletionGateway::new(config.llm.clone())?;
        let house = HouseContext::load(config)?;
        Ok(Self::new(gateway, house).with_max_tokens(config.llm.max_tokens))
    }
}

impl<G: ModelGateway> Agent for HouseholdAgent<G> {
    fn plan(&self, task: &Task) -> Plan {
        self.planner.plan(task, &self.house)
    }

    fn decide(&self, state: &AgentState) -> NavStep {
        self.navigator.decide(state, &self.house)
    }

    fn decide_with_vision(&self, state: &AgentState) -> Decision {
        let distances = RoomDistance::summarize(state.position, &self.house.rooms);
        self.decide_with_distances(state, &distances)
    }
}
