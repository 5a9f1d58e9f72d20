use household_agent::context::HouseContext;
use household_agent::extract::extract_json;
use household_agent::heuristics::{NavPolicy, fallback_decision, fallback_plan};
use household_agent::llm::{GatewayError, ScriptedGateway};
use household_agent::model::{
    Action, Device, DeviceRegistry, Direction, Op, Point, Room, RoomRegistry,
};
use household_agent::validation::{repair_decision, validate_nav_step};
use household_agent::{Agent, AgentState, HouseholdAgent, Task};
use serde_json::json;

fn scenario_house() -> HouseContext {
    HouseContext::new(
        RoomRegistry::new(vec![
            Room::new("Kitchen", 3.0, -1.0),
            Room::new("LivingRoom", -2.0, 1.5),
        ])
        .unwrap(),
        DeviceRegistry::new(vec![
            Device::new("coffee_maker_1", "coffee_maker", "Kitchen"),
            Device::new("living_light_1", "light", "LivingRoom").switched_on(),
        ])
        .unwrap(),
    )
    .unwrap()
}

const MALFORMED_REPLIES: &[&str] = &[
    "",
    "I cannot help with that.",
    "```json\n{\"steps\": \n```",
    "[1, 2, 3]",
    r#"{"steps": "kitchen"}"#,
    r#"{"steps": []}"#,
    r#"{"steps": [{"room": "Garage", "waypoints": [[0, 0]]}]}"#,
    r#"{"steps": [{"room": "Kitchen", "waypoints": "here", "actions": [{"type": "interact", "target_device_id": "toaster_9", "op": "ON"}]}]}"#,
    r#"{"steps": [{"room": "LivingRoom", "waypoints": [], "actions": [{"type": "push", "target_device_id": "living_light_1", "op": "dim"}]}]}"#,
    r#"{"room": "Kitchen", "direction": "SIDEWAYS", "task_complete": "maybe"}"#,
    "<think>the user wants coffee</think>",
    "{\"steps\": [{\"room\": null}]} trailing {",
];

#[test]
fn fallback_plan_covers_coffee_and_lights() {
    let house = scenario_house();
    let plan = fallback_plan(
        "Make coffee and turn off living room lights",
        &house.rooms,
        &house.devices,
    );

    let kitchen = plan.steps.iter().find(|s| s.room == "Kitchen").unwrap();
    assert_eq!(kitchen.actions, vec![Action::interact("coffee_maker_1", Op::On)]);
    assert_eq!(kitchen.waypoints, vec![Point::new(3.0, -1.0)]);

    let living = plan.steps.iter().find(|s| s.room == "LivingRoom").unwrap();
    assert_eq!(living.actions, vec![Action::interact("living_light_1", Op::Off)]);
}

#[test]
fn fenced_navigation_reply_is_extracted_and_normalized() {
    let raw = "Sure! ```json\n{\"room\":\"Kitchen\",\"direction\":\"right\"}\n```";
    let value = extract_json(raw).unwrap();
    assert_eq!(value, json!({"room": "Kitchen", "direction": "right"}));

    let step = validate_nav_step(&value, &scenario_house().rooms).unwrap();
    assert_eq!(step.direction, Direction::Right);

    let gateway = ScriptedGateway::new().reply(raw);
    let agent = HouseholdAgent::new(&gateway, scenario_house());
    let step = agent.decide(&AgentState::at(0.0, 0.0).with_task("make coffee"));
    assert_eq!(step.room, "Kitchen");
    assert_eq!(step.direction, Direction::Right);
}

#[test]
fn unknown_vision_room_becomes_first_registry_room() {
    let rooms = scenario_house().rooms;
    let raw = json!({"room": "Garage", "direction": "UP"});
    let repaired = repair_decision(&raw, &rooms).unwrap();
    assert_eq!(repaired.value.room, "Kitchen");
    assert_eq!(repaired.value.direction, Direction::Up);
    assert!(!repaired.is_clean());

    let gateway = ScriptedGateway::new().reply(r#"{"room":"Garage","direction":"UP"}"#);
    let agent = HouseholdAgent::new(&gateway, scenario_house());
    let decision = agent.decide_with_vision(&AgentState::at(0.0, 0.0).with_task("tidy"));
    assert_eq!(decision.room, "Kitchen");
    assert_eq!(decision.direction, Direction::Up);
    assert!(!decision.task_complete);
}

#[test]
fn dominant_axis_fallback_heads_for_kitchen() {
    let house = HouseContext::new(
        RoomRegistry::new(vec![Room::new("Kitchen", 5.0, 0.0)]).unwrap(),
        DeviceRegistry::default(),
    )
    .unwrap();
    let agent = HouseholdAgent::new(ScriptedGateway::new(), house);
    let state = AgentState::at(0.0, 0.0).with_task("brew some coffee");

    let step = agent.decide(&state);
    assert_eq!(step.room, "Kitchen");
    assert_eq!(step.direction, Direction::Right);

    let decision = agent.decide_with_vision(&state);
    assert_eq!(decision.room, "Kitchen");
    assert_eq!(decision.direction, Direction::Right);
    assert!(!decision.task_complete);
}

#[test]
fn transport_failure_still_yields_a_valid_plan() {
    let gateway = ScriptedGateway::new().fail(GatewayError::Transport("timed out".into()));
    let house = scenario_house();
    let agent = HouseholdAgent::new(&gateway, house.clone());

    let plan = agent.plan(&Task::new("Make coffee and turn off living room lights"));
    assert!(plan.is_valid_for(&house.rooms, &house.devices));
    assert_eq!(plan.steps.len(), 2);
    assert_eq!(gateway.calls(), 1);
}

#[test]
fn every_plan_is_valid_whatever_the_model_says() {
    let house = scenario_house();
    for reply in MALFORMED_REPLIES {
        let gateway = ScriptedGateway::new().reply(reply);
        let agent = HouseholdAgent::new(&gateway, house.clone());

        for task in ["make coffee", "lights off please", "water the plants", ""] {
            let plan = agent.plan(&Task::new(task));
            assert!(
                plan.is_valid_for(&house.rooms, &house.devices),
                "invalid plan for reply {reply:?} and task {task:?}: {plan:?}"
            );
        }
    }
}

#[test]
fn every_decision_is_valid_whatever_the_model_says() {
    let house = scenario_house();
    for reply in MALFORMED_REPLIES {
        let gateway = ScriptedGateway::new().reply(reply).reply(reply);
        let agent = HouseholdAgent::new(&gateway, house.clone());
        let state = AgentState::at(-0.5, 4.0).with_task("turn on the tv");

        let step = agent.decide(&state);
        assert!(house.rooms.contains(&step.room), "reply {reply:?} gave {step:?}");

        let decision = agent.decide_with_vision(&state);
        assert!(house.rooms.contains(&decision.room), "reply {reply:?} gave {decision:?}");
        assert!(!decision.reasoning.is_empty());
    }
}

#[test]
fn fallbacks_are_deterministic() {
    let house = scenario_house();
    let state = AgentState::at(1.0, 1.0).with_task("turn off the lights");
    let text = "Make coffee and turn off living room lights";

    let first_plan = fallback_plan(text, &house.rooms, &house.devices);
    let first_decision = fallback_decision(&state, &house.rooms, &NavPolicy::VISION);
    for _ in 0..10 {
        assert_eq!(fallback_plan(text, &house.rooms, &house.devices), first_plan);
        assert_eq!(
            fallback_decision(&state, &house.rooms, &NavPolicy::VISION),
            first_decision
        );
    }
}

#[test]
fn text_deadband_is_strict() {
    let house = HouseContext::new(
        RoomRegistry::new(vec![Room::new("Kitchen", 0.0, 0.0)]).unwrap(),
        DeviceRegistry::default(),
    )
    .unwrap();
    let agent = HouseholdAgent::new(ScriptedGateway::new(), house);

    let near = agent.decide(&AgentState::at(0.19, 0.0).with_task("coffee"));
    assert_eq!(near.direction, Direction::Stay);

    let far = agent.decide(&AgentState::at(0.21, 0.0).with_task("coffee"));
    assert_eq!(far.direction, Direction::Left);
}

#[test]
fn vision_arrival_marks_task_complete() {
    let agent = HouseholdAgent::new(ScriptedGateway::new(), scenario_house());
    let state = AgentState::at(-1.75, 1.3).with_task("turn off the lights");
    let decision = agent.decide_with_vision(&state);

    assert_eq!(decision.room, "LivingRoom");
    assert_eq!(decision.direction, Direction::Stay);
    assert!(decision.task_complete);
    assert_eq!(decision.next_action.as_deref(), Some("interact_with_objects"));
}

#[test]
fn vision_prompt_lists_room_distances() {
    let gateway = ScriptedGateway::new()
        .reply(r#"{"room": "LivingRoom", "direction": "LEFT", "reasoning": "lights are on"}"#);
    let agent = HouseholdAgent::new(&gateway, scenario_house());

    let decision = agent.decide_with_vision(&AgentState::at(0.0, 0.0).with_task("lights"));
    assert_eq!(decision.reasoning, "lights are on");

    let prompts = gateway.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].1.contains("- Kitchen: 4.0 units away (center at 3, -1)"));
    assert!(prompts[0].1.contains("- LivingRoom: 3.5 units away (center at -2, 1.5)"));
}
