use crate::heuristics::mentions;
use crate::model::{Action, Device, DeviceRegistry, Op, Plan, RoomRegistry, Step};
use crate::validation::plan::visit;

/// Keyword → room → device action. New mappings are additive.
#[derive(Clone, Copy, Debug)]
pub struct PlanRule {
    pub keywords: &'static [&'static str],
    pub room: &'static str,
    /// Substring matched against device id and type.
    pub device_hint: &'static str,
    pub op: Op,
}

pub const PLAN_RULES: &[PlanRule] = &[
    PlanRule {
        keywords: &["coffee"],
        room: "Kitchen",
        device_hint: "coffee",
        op: Op::On,
    },
    PlanRule {
        keywords: &["living", "light"],
        room: "LivingRoom",
        device_hint: "light",
        op: Op::Off,
    },
];

/// Keyword plan built from the registries alone.
pub fn fallback_plan(task_text: &str, rooms: &RoomRegistry, devices: &DeviceRegistry) -> Plan {
    fallback_plan_with(PLAN_RULES, task_text, rooms, devices)
}

pub fn fallback_plan_with(
    rules: &[PlanRule],
    task_text: &str,
    rooms: &RoomRegistry,
    devices: &DeviceRegistry,
) -> Plan {
    let text = task_text.to_lowercase();
    let mut steps: Vec<Step> = Vec::new();

    for rule in rules.iter().filter(|rule| mentions(&text, rule.keywords)) {
        let Some(room) = rooms.get(rule.room) else {
            continue;
        };
        let action = find_device(devices, rule.room, rule.device_hint)
            .map(|device| Action::interact(&device.id, rule.op));

        match steps.iter_mut().find(|s| s.room == room.name) {
            Some(step) => step.actions.extend(action),
            None => steps.push(visit(room, action.into_iter().collect())),
        }
    }

    if steps.is_empty() {
        steps.push(visit(rooms.first(), Vec::new()));
    }

    Plan { steps }
}

fn find_device<'a>(devices: &'a DeviceRegistry, room: &'a str, hint: &str) -> Option<&'a Device> {
    devices.in_room(room).find(|device| {
        device.id.to_lowercase().contains(hint) || device.kind.to_lowercase().contains(hint)
    })
}
