// src/validation/plan.rs

use crate::model::{Action, DeviceRegistry, Op, Plan, Point, Room, RoomRegistry, Step};
use crate::validation::{Repaired, SchemaViolation, str_field};
use serde_json::Value;

/// Turn arbitrary JSON into a plan that satisfies every plan invariant.
/// Never fails: offending steps and actions are dropped, missing waypoints
/// are filled in, and an empty result becomes a visit to the first room.
pub fn repair_plan(raw: &Value, rooms: &RoomRegistry, devices: &DeviceRegistry) -> Plan {
    audit_plan(raw, rooms, devices).value
}

/// [`repair_plan`] with the list of violations it fixed.
pub fn audit_plan(raw: &Value, rooms: &RoomRegistry, devices: &DeviceRegistry) -> Repaired<Plan> {
    let mut violations = Vec::new();

    let candidates: &[Value] = match raw.get("steps") {
        Some(Value::Array(steps)) => steps.as_slice(),
        Some(other) => {
            violations.push(SchemaViolation::WrongType {
                field: "steps",
                found: other.clone(),
            });
            &[]
        }
        None => {
            violations.push(SchemaViolation::MissingField("steps"));
            &[]
        }
    };

    let mut steps: Vec<Step> = candidates
        .iter()
        .filter_map(|candidate| repair_step(candidate, rooms, devices, &mut violations))
        .collect();

    if steps.is_empty() {
        violations.push(SchemaViolation::EmptyPlan);
        steps.push(visit(rooms.first(), Vec::new()));
    }

    Repaired {
        value: Plan { steps },
        violations,
    }
}

/// A single-waypoint step to the room center.
pub(crate) fn visit(room: &Room, actions: Vec<Action>) -> Step {
    Step {
        room: room.name.clone(),
        waypoints: vec![room.center_or_origin()],
        actions,
    }
}

fn repair_step(
    candidate: &Value,
    rooms: &RoomRegistry,
    devices: &DeviceRegistry,
    violations: &mut Vec<SchemaViolation>,
) -> Option<Step> {
    let Some(room_name) = str_field(candidate, "room") else {
        violations.push(SchemaViolation::MissingField("room"));
        return None;
    };
    let Some(room) = rooms.get(room_name) else {
        violations.push(SchemaViolation::UnknownRoom(room_name.to_string()));
        return None;
    };

    let mut waypoints: Vec<Point> = match candidate.get("waypoints") {
        Some(Value::Array(points)) => points
            .iter()
            .filter_map(|p| {
                let point = parse_point(p);
                if point.is_none() {
                    violations.push(SchemaViolation::InvalidWaypoint {
                        room: room.name.clone(),
                        found: p.clone(),
                    });
                }
                point
            })
            .collect(),
        _ => Vec::new(),
    };
    if waypoints.is_empty() {
        violations.push(SchemaViolation::WaypointsSubstituted(room.name.clone()));
        waypoints.push(room.center_or_origin());
    }

    let actions = match candidate.get("actions") {
        Some(Value::Array(actions)) => actions
            .iter()
            .filter_map(|a| repair_action(a, devices, violations))
            .collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => {
            violations.push(SchemaViolation::WrongType {
                field: "actions",
                found: other.clone(),
            });
            Vec::new()
        }
    };

    Some(Step {
        room: room.name.clone(),
        waypoints,
        actions,
    })
}

fn repair_action(
    candidate: &Value,
    devices: &DeviceRegistry,
    violations: &mut Vec<SchemaViolation>,
) -> Option<Action> {
    let kind = str_field(candidate, "type").unwrap_or_default();
    if kind != "interact" {
        violations.push(SchemaViolation::UnknownActionType(kind.to_string()));
        return None;
    }

    let Some(device_id) = str_field(candidate, "target_device_id") else {
        violations.push(SchemaViolation::MissingField("target_device_id"));
        return None;
    };
    if !devices.contains(device_id) {
        violations.push(SchemaViolation::UnknownDevice(device_id.to_string()));
        return None;
    }

    let raw_op = match candidate.get("op") {
        Some(Value::String(op)) => op.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    let Some(op) = Op::parse(&raw_op) else {
        violations.push(SchemaViolation::InvalidOp(raw_op));
        return None;
    };

    Some(Action::interact(device_id, op))
}

/// Accepts `[x, y]` or `{"x": .., "y": ..}` with finite numbers.
fn parse_point(value: &Value) -> Option<Point> {
    let (x, y) = match value {
        Value::Array(pair) if pair.len() == 2 => (pair[0].as_f64()?, pair[1].as_f64()?),
        Value::Object(map) => (map.get("x")?.as_f64()?, map.get("y")?.as_f64()?),
        _ => return None,
    };
    (x.is_finite() && y.is_finite()).then(|| Point::new(x, y))
}
