pub mod agent;
pub mod config;
pub mod context;
pub mod extract;
pub mod heuristics;
pub mod llm;
pub mod model;
pub mod protocol;
pub mod validation;

pub use agent::{Agent, HouseholdAgent};
pub use context::HouseContext;
pub use model::{AgentState, Decision, Direction, NavStep, Plan, Task};
