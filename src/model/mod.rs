// src/model/mod.rs

pub mod registry;

pub use registry::{Bounds, Device, DeviceRegistry, RegistryError, Room, RoomRegistry};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A position on the house floor plan. Serialized as `[x, y]`.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// L1 distance, the metric the navigation grid moves in.
    pub fn manhattan(&self, other: Point) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// One natural-language request handed to the planner.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Task {
    pub text: String,
    #[serde(default)]
    pub context: Map<String, Value>,
}

impl Task {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            context: Map::new(),
        }
    }

    pub fn with_context(mut self, key: &str, value: Value) -> Self {
        self.context.insert(key.to_string(), value);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Op {
    On,
    Off,
}

impl Op {
    /// Case-insensitive parse of `"on"` / `"OFF"` etc.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ON" => Some(Op::On),
            "OFF" => Some(Op::Off),
            _ => None,
        }
    }
}

/// A device interaction inside a plan step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Interact { target_device_id: String, op: Op },
}

impl Action {
    pub fn interact(device_id: &str, op: Op) -> Self {
        Action::Interact {
            target_device_id: device_id.to_string(),
            op,
        }
    }

    pub fn target_device_id(&self) -> &str {
        match self {
            Action::Interact {
                target_device_id, ..
            } => target_device_id,
        }
    }
}

/// One room visit: where to walk and what to switch once there.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub room: String,
    pub waypoints: Vec<Point>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

/// Ordered steps for one task. Never empty once it leaves the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub steps: Vec<Step>,
}

impl Plan {
    /// Checks the invariants every plan handed to callers must hold.
    pub fn is_valid_for(&self, rooms: &RoomRegistry, devices: &DeviceRegistry) -> bool {
        !self.steps.is_empty()
            && self.steps.iter().all(|step| {
                rooms.contains(&step.room)
                    && !step.waypoints.is_empty()
                    && step
                        .actions
                        .iter()
                        .all(|action| devices.contains(action.target_device_id()))
            })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    Stay,
}

impl Direction {
    pub const ALL: [Direction; 5] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
        Direction::Stay,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "UP" => Some(Direction::Up),
            "DOWN" => Some(Direction::Down),
            "LEFT" => Some(Direction::Left),
            "RIGHT" => Some(Direction::Right),
            "STAY" => Some(Direction::Stay),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
            Direction::Stay => "STAY",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Live state of the agent for one tick.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AgentState {
    pub position: Point,
    #[serde(default)]
    pub tasks: Vec<String>,
    #[serde(default)]
    pub last_room: Option<String>,
    /// Base64-encoded bird's-eye image of the house.
    #[serde(default)]
    pub bird_eye_b64: Option<String>,
    #[serde(default)]
    pub step_count: u32,
}

impl AgentState {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            ..Self::default()
        }
    }

    pub fn with_task(mut self, task: &str) -> Self {
        self.tasks.push(task.to_string());
        self
    }

    pub fn with_last_room(mut self, room: &str) -> Self {
        self.last_room = Some(room.to_string());
        self
    }

    pub fn with_image(mut self, b64: &str) -> Self {
        self.bird_eye_b64 = Some(b64.to_string());
        self
    }

    pub fn with_step_count(mut self, step_count: u32) -> Self {
        self.step_count = step_count;
        self
    }

    /// All active tasks joined and lower-cased, the form keyword routes match on.
    pub fn task_text(&self) -> String {
        self.tasks.join(" ").to_lowercase()
    }
}

/// Text-variant output: target room plus one grid step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavStep {
    pub room: String,
    pub direction: Direction,
}

/// Vision-variant output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub room: String,
    pub direction: Direction,
    /// Advisory only.
    pub reasoning: String,
    pub task_complete: bool,
    pub next_action: Option<String>,
}

/// Manhattan distance from the agent to one room center, for prompts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomDistance {
    pub room: String,
    pub center: Point,
    pub distance: f64,
}

impl RoomDistance {
    /// Distances to every room, in registry order.
    pub fn summarize(position: Point, rooms: &RoomRegistry) -> Vec<RoomDistance> {
        rooms
            .iter()
            .map(|room| {
                let center = room.center_or_origin();
                RoomDistance {
                    room: room.name.clone(),
                    center,
                    distance: position.manhattan(center),
                }
            })
            .collect()
    }
}

impl fmt::Display for RoomDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "- {}: {:.1} units away (center at {}, {})",
            self.room, self.distance, self.center.x, self.center.y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plan_serializes_to_wire_shape() {
        let plan = Plan {
            steps: vec![Step {
                room: "Kitchen".into(),
                waypoints: vec![Point::new(3.0, -1.0)],
                actions: vec![Action::interact("coffee_maker_1", Op::On)],
            }],
        };

        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(
            value,
            json!({
                "steps": [{
                    "room": "Kitchen",
                    "waypoints": [[3.0, -1.0]],
                    "actions": [{
                        "type": "interact",
                        "target_device_id": "coffee_maker_1",
                        "op": "ON"
                    }]
                }]
            })
        );
    }

    #[test]
    fn decision_serializes_null_next_action() {
        let decision = Decision {
            room: "Kitchen".into(),
            direction: Direction::Left,
            reasoning: "walk".into(),
            task_complete: false,
            next_action: None,
        };
        let value = serde_json::to_value(&decision).unwrap();
        assert_eq!(value["direction"], "LEFT");
        assert!(value["next_action"].is_null());
    }

    #[test]
    fn direction_and_op_parse_case_insensitively() {
        assert_eq!(Direction::parse(" right "), Some(Direction::Right));
        assert_eq!(Direction::parse("Stay"), Some(Direction::Stay));
        assert_eq!(Direction::parse("north"), None);
        assert_eq!(Op::parse("off"), Some(Op::Off));
        assert_eq!(Op::parse("toggle"), None);
    }

    #[test]
    fn task_text_is_joined_and_lowercased() {
        let state = AgentState::at(0.0, 0.0)
            .with_task("Make Coffee")
            .with_task("Turn off TV");
        assert_eq!(state.task_text(), "make coffee turn off tv");
    }
}
