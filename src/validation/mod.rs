// src/validation/mod.rs

pub mod decision;
pub mod plan;

pub use decision::{repair_decision, validate_nav_step};
pub use plan::{audit_plan, repair_plan};

use serde_json::{Value, json};

/// Something in model output that broke the contract and was dropped or
/// substituted. Never surfaced to callers as an error.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaViolation {
    MissingField(&'static str),
    WrongType { field: &'static str, found: Value },
    UnknownRoom(String),
    InvalidWaypoint { room: String, found: Value },
    WaypointsSubstituted(String),
    UnknownActionType(String),
    UnknownDevice(String),
    InvalidOp(String),
    EmptyPlan,
    InvalidDirection(String),
    RoomSubstituted { found: Option<String>, used: String },
}

impl SchemaViolation {
    pub fn hint(&self) -> (String, Option<Value>) {
        match self {
            SchemaViolation::MissingField(field) => (
                format!("Missing required field '{field}'."),
                Some(json!({ field.to_string(): "<required>" })),
            ),
            SchemaViolation::WrongType { field, found } => (
                format!("Field '{field}' has the wrong type."),
                Some(json!({ "field": field, "found": found })),
            ),
            SchemaViolation::UnknownRoom(room) => (
                "Step dropped: room is not in the room registry.".to_string(),
                Some(json!({ "room": room })),
            ),
            SchemaViolation::InvalidWaypoint { room, found } => (
                "Waypoint dropped: expected [x, y].".to_string(),
                Some(json!({ "room": room, "found": found })),
            ),
            SchemaViolation::WaypointsSubstituted(room) => (
                "No usable waypoints; using the room center.".to_string(),
                Some(json!({ "room": room })),
            ),
            SchemaViolation::UnknownActionType(kind) => (
                "Action dropped: only 'interact' is supported.".to_string(),
                Some(json!({ "type": kind })),
            ),
            SchemaViolation::UnknownDevice(id) => (
                "Action dropped: device is not in the device registry.".to_string(),
                Some(json!({ "target_device_id": id })),
            ),
            SchemaViolation::InvalidOp(op) => (
                "Action dropped: op must be ON or OFF.".to_string(),
                Some(json!({ "op": op })),
            ),
            SchemaViolation::EmptyPlan => (
                "No valid steps survived; synthesized a visit to the first room.".to_string(),
                None,
            ),
            SchemaViolation::InvalidDirection(direction) => (
                "Direction must be one of UP, DOWN, LEFT, RIGHT, STAY.".to_string(),
                Some(json!({ "direction": direction })),
            ),
            SchemaViolation::RoomSubstituted { found, used } => (
                "Declared room unknown; substituted the first registry room.".to_string(),
                Some(json!({ "found": found, "used": used })),
            ),
        }
    }
}

/// A repaired value plus everything that had to be fixed to get it.
#[derive(Debug, Clone, PartialEq)]
pub struct Repaired<T> {
    pub value: T,
    pub violations: Vec<SchemaViolation>,
}

impl<T> Repaired<T> {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Lenient string read: present strings are returned as-is, anything else is `None`.
pub(crate) fn str_field<'a>(value: &'a Value, field: &str) -> Option<&'a str> {
    value.get(field).and_then(Value::as_str)
}
