// src/validation/decision.rs

use crate::model::{Decision, Direction, NavStep, RoomRegistry};
use crate::validation::{Repaired, SchemaViolation, str_field};
use serde_json::Value;

pub const DEFAULT_REASONING: &str = "Visual navigation decision";

/// Strict check for the text navigator: the room must be known and the
/// direction one of the five values. Any violation means fall back.
pub fn validate_nav_step(
    raw: &Value,
    rooms: &RoomRegistry,
) -> Result<NavStep, Vec<SchemaViolation>> {
    let mut violations = Vec::new();

    let room = match str_field(raw, "room") {
        Some(room) if rooms.contains(room) => Some(room.to_string()),
        Some(room) => {
            violations.push(SchemaViolation::UnknownRoom(room.to_string()));
            None
        }
        None => {
            violations.push(SchemaViolation::MissingField("room"));
            None
        }
    };

    let direction = parse_direction(raw).map_err(|v| violations.push(v)).ok();

    match (room, direction) {
        (Some(room), Some(direction)) => Ok(NavStep { room, direction }),
        _ => Err(violations),
    }
}

/// Lenient repair for the vision navigator. An unknown or missing room is
/// replaced by the first registry room and `task_complete` is coerced to a
/// bool; only an unusable direction rejects the decision.
pub fn repair_decision(
    raw: &Value,
    rooms: &RoomRegistry,
) -> Result<Repaired<Decision>, SchemaViolation> {
    let direction = parse_direction(raw)?;
    let mut violations = Vec::new();

    let declared = str_field(raw, "room");
    let room = match declared {
        Some(room) if rooms.contains(room) => room.to_string(),
        _ => {
            let used = rooms.first().name.clone();
            violations.push(SchemaViolation::RoomSubstituted {
                found: declared.map(str::to_string),
                used: used.clone(),
            });
            used
        }
    };

    let reasoning = str_field(raw, "reasoning")
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_REASONING)
        .to_string();

    let task_complete = match raw.get("task_complete") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(done)) => *done,
        Some(other) => {
            violations.push(SchemaViolation::WrongType {
                field: "task_complete",
                found: other.clone(),
            });
            truthy(other)
        }
    };

    let next_action = match raw.get("next_action") {
        None | Some(Value::Null) => None,
        Some(Value::String(action)) => Some(action.trim().to_string()).filter(|a| !a.is_empty()),
        Some(other) => {
            violations.push(SchemaViolation::WrongType {
                field: "next_action",
                found: other.clone(),
            });
            None
        }
    };

    Ok(Repaired {
        value: Decision {
            room,
            direction,
            reasoning,
            task_complete,
            next_action,
        },
        violations,
    })
}

fn parse_direction(raw: &Value) -> Result<Direction, SchemaViolation> {
    match raw.get("direction") {
        Some(Value::String(direction)) => Direction::parse(direction)
            .ok_or_else(|| SchemaViolation::InvalidDirection(direction.clone())),
        Some(other) => Err(SchemaViolation::InvalidDirection(other.to_string())),
        None => Err(SchemaViolation::MissingField("direction")),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "1"
        ),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Room;
    use serde_json::json;

    fn rooms() -> RoomRegistry {
        RoomRegistry::new(vec![
            Room::new("Kitchen", 3.0, -1.0),
            Room::new("LivingRoom", -2.0, 1.5),
        ])
        .unwrap()
    }

    #[test]
    fn nav_step_normalizes_direction_case() {
        let step = validate_nav_step(&json!({"room": "Kitchen", "direction": "right"}), &rooms());
        assert_eq!(
            step,
            Ok(NavStep {
                room: "Kitchen".into(),
                direction: Direction::Right
            })
        );
    }

    #[test]
    fn nav_step_rejects_unknown_room_and_direction() {
        let err = validate_nav_step(&json!({"room": "Garage", "direction": "north"}), &rooms())
            .unwrap_err();
        assert_eq!(
            err,
            vec![
                SchemaViolation::UnknownRoom("Garage".into()),
                SchemaViolation::InvalidDirection("north".into()),
            ]
        );

        assert!(validate_nav_step(&json!({"room": "Kitchen"}), &rooms()).is_err());
    }

    #[test]
    fn decision_substitutes_unknown_room() {
        let raw = json!({"room": "Garage", "direction": "UP"});
        let repaired = repair_decision(&raw, &rooms()).unwrap();
        let decision = repaired.value;
        assert_eq!(decision.room, "Kitchen");
        assert_eq!(decision.direction, Direction::Up);
        assert_eq!(decision.reasoning, DEFAULT_REASONING);
        assert!(!decision.task_complete);
        assert_eq!(decision.next_action, None);
        assert_eq!(
            repaired.violations,
            vec![SchemaViolation::RoomSubstituted {
                found: Some("Garage".into()),
                used: "Kitchen".into()
            }]
        );
    }

    #[test]
    fn decision_coerces_task_complete() {
        let cases = [
            (json!(true), true),
            (json!("yes"), true),
            (json!("false"), false),
            (json!(1), true),
            (json!(0), false),
            (json!([true]), false),
        ];
        for (value, expected) in cases {
            let raw = json!({"room": "LivingRoom", "direction": "stay", "task_complete": value});
            let decision = repair_decision(&raw, &rooms()).unwrap().value;
            assert_eq!(decision.task_complete, expected, "{raw}");
        }
    }

    #[test]
    fn decision_keeps_reasoning_and_next_action() {
        let raw = json!({
            "room": "LivingRoom",
            "direction": "LEFT",
            "reasoning": "red figure is east of the sofa",
            "task_complete": false,
            "next_action": "toggle living_light_1"
        });
        let repaired = repair_decision(&raw, &rooms()).unwrap();
        assert!(repaired.is_clean());
        assert_eq!(repaired.value.reasoning, "red figure is east of the sofa");
        assert_eq!(repaired.value.next_action.as_deref(), Some("toggle living_light_1"));
    }

    #[test]
    fn decision_without_direction_is_rejected() {
        assert_eq!(
            repair_decision(&json!({"room": "Kitchen"}), &rooms()),
            Err(SchemaViolation::MissingField("direction"))
        );
        assert!(repair_decision(&json!({"room": "Kitchen", "direction": 3}), &rooms()).is_err());
    }
}
