use crate::heuristics::mentions;
use crate::model::{AgentState, Decision, Direction, NavStep, Point, Room, RoomRegistry};

pub const ARRIVAL_ACTION: &str = "interact_with_objects";

/// Keyword → target room for navigation.
#[derive(Clone, Copy, Debug)]
pub struct RoomRoute {
    pub keywords: &'static [&'static str],
    pub room: &'static str,
}

/// How the fallback navigator picks a target and decides it has arrived.
#[derive(Clone, Copy, Debug)]
pub struct NavPolicy {
    /// Both axis offsets must be strictly below this to count as arrived.
    pub deadband: f64,
    /// Checked in order; the first route whose room exists wins. With no
    /// match the nearest room (Manhattan) is the target.
    pub routes: &'static [RoomRoute],
    /// Report `task_complete` and an interaction hint on arrival.
    pub complete_on_arrival: bool,
}

impl NavPolicy {
    pub const TEXT: NavPolicy = NavPolicy {
        deadband: 0.2,
        routes: &[
            RoomRoute {
                keywords: &["coffee"],
                room: "Kitchen",
            },
            RoomRoute {
                keywords: &["light", "tv"],
                room: "LivingRoom",
            },
        ],
        complete_on_arrival: false,
    };

    pub const VISION: NavPolicy = NavPolicy {
        deadband: 0.3,
        routes: &[
            RoomRoute {
                keywords: &["coffee"],
                room: "Kitchen",
            },
            RoomRoute {
                keywords: &["light", "tv", "living"],
                room: "LivingRoom",
            },
            RoomRoute {
                keywords: &["sleep"],
                room: "Bedroom",
            },
        ],
        complete_on_arrival: true,
    };
}

/// Dominant-axis single grid step from `from` toward `to`.
///
/// Ties between the axes go horizontal.
pub fn step_toward(from: Point, to: Point, deadband: f64) -> Direction {
    let dx = to.x - from.x;
    let dy = to.y - from.y;

    if dx.abs() < deadband && dy.abs() < deadband {
        Direction::Stay
    } else if dx.abs() >= dy.abs() {
        if dx > 0.0 {
            Direction::Right
        } else {
            Direction::Left
        }
    } else if dy > 0.0 {
        Direction::Up
    } else {
        Direction::Down
    }
}

/// Room the tasks point at, or the nearest room when no route applies.
pub fn target_room<'a>(
    task_text: &str,
    position: Point,
    rooms: &'a RoomRegistry,
    routes: &[RoomRoute],
) -> &'a Room {
    let text = task_text.to_lowercase();
    routes
        .iter()
        .filter(|route| mentions(&text, route.keywords))
        .find_map(|route| rooms.get(route.room))
        .unwrap_or_else(|| nearest_room(position, rooms))
}

/// Nearest room by Manhattan distance; earlier rooms win ties.
pub fn nearest_room(position: Point, rooms: &RoomRegistry) -> &Room {
    rooms.iter().fold(rooms.first(), |best, room| {
        let distance = position.manhattan(room.center_or_origin());
        if distance < position.manhattan(best.center_or_origin()) {
            room
        } else {
            best
        }
    })
}

/// Text-variant fallback.
pub fn fallback_step(state: &AgentState, rooms: &RoomRegistry) -> NavStep {
    let policy = NavPolicy::TEXT;
    let room = target_room(&state.task_text(), state.position, rooms, policy.routes);
    NavStep {
        room: room.name.clone(),
        direction: step_toward(state.position, room.center_or_origin(), policy.deadband),
    }
}

/// Vision-variant fallback.
pub fn fallback_decision(state: &AgentState, rooms: &RoomRegistry, policy: &NavPolicy) -> Decision {
    let room = target_room(&state.task_text(), state.position, rooms, policy.routes);
    let direction = step_toward(state.position, room.center_or_origin(), policy.deadband);
    let arrived = direction == Direction::Stay;

    if arrived && policy.complete_on_arrival {
        Decision {
            room: room.name.clone(),
            direction,
            reasoning: format!("Reached {} - task area", room.name),
            task_complete: true,
            next_action: Some(ARRIVAL_ACTION.to_string()),
        }
    } else {
        Decision {
            room: room.name.clone(),
            direction,
            reasoning: format!("Heuristic navigation toward {}", room.name),
            task_complete: false,
            next_action: None,
        }
    }
}
