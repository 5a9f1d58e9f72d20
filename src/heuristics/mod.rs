// src/heuristics/mod.rs

//! Deterministic, registry-only stand-ins for the model. Used whenever the
//! model path cannot produce a result, and built so their output already
//! satisfies the same invariants the validators enforce.

pub mod navigation;
pub mod plan;

pub use navigation::{
    NavPolicy, RoomRoute, fallback_decision, fallback_step, step_toward, target_room,
};
pub use plan::{PLAN_RULES, PlanRule, fallback_plan};

/// True when any keyword occurs in the (already lower-cased) text.
pub(crate) fn mentions(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}
