use colored::Colorize;
use household_agent::agent::{Agent, HouseholdAgent};
use household_agent::config::EngineConfig;
use household_agent::model::{AgentState, Task};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage:
  household-agent plan <task...>
  household-agent decide <x> <y> <task...>
  household-agent vision <x> <y> <task...>
  household-agent models";

fn main() {
    dotenvy::dotenv().ok();
    let config = EngineConfig::from_env();

    let default_filter = if config.llm.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(message) = run(&config, &args) {
        eprintln!("{} {}", "error:".red().bold(), message);
        eprintln!("{USAGE}");
        std::process::exit(2);
    }
}

fn run(config: &EngineConfig, args: &[String]) -> Result<(), String> {
    let agent = HouseholdAgent::from_config(config).map_err(|e| e.to_string())?;

    match args.split_first() {
        Some((cmd, rest)) if cmd == "plan" && !rest.is_empty() => {
            let plan = agent.plan(&Task::new(&rest.join(" ")));
            show("PLAN", &plan);
        }
        Some((cmd, rest)) if cmd == "decide" => {
            let state = parse_state(rest)?;
            show("DECISION", &agent.decide(&state));
        }
        Some((cmd, rest)) if cmd == "vision" => {
            let state = parse_state(rest)?;
            show("VISION DECISION", &agent.decide_with_vision(&state));
        }
        Some((cmd, _)) if cmd == "models" => {
            let gateway = household_agent::llm::ChatCompletionGateway::new(config.llm.clone())
                .map_err(|e| e.to_string())?;
            let models = gateway.list_models().map_err(|e| e.to_string())?;
            show("MODELS", &models);
        }
        _ => return Err("missing or unknown command".to_string()),
    }
    Ok(())
}

fn parse_state(args: &[String]) -> Result<AgentState, String> {
    let [x, y, tasks @ ..] = args else {
        return Err("expected <x> <y> <task...>".to_string());
    };
    let x: f64 = x.parse().map_err(|_| format!("invalid x coordinate: {x}"))?;
    let y: f64 = y.parse().map_err(|_| format!("invalid y coordinate: {y}"))?;

    let mut state = AgentState::at(x, y);
    if !tasks.is_empty() {
        state = state.with_task(&tasks.join(" "));
    }
    Ok(state)
}

fn show<T: Serialize>(title: &str, value: &T) {
    println!("{}", format!("--- {title} ---").cyan().bold());
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("{} {e}", "failed to render:".yellow()),
    }
}
