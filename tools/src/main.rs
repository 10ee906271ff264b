//! sim-runner: headless runner for the vending machine simulation.
//!
//! Usage:
//!   sim-runner --messages 10
//!   sim-runner --config data/sim_config.json --db run.db --seed 7
//!   sim-runner --advance-minutes 60 --messages 48 --json

use anyhow::Result;
use chrono::Utc;
use std::env;
use vending_core::{
    agent::OperatorAgent,
    config::SimConfig,
    engine::{CancelFlag, RunSummary, SimEngine, StepOutcome, Termination},
    state::SimulationState,
    store::SimStore,
    weather::SeasonalWeather,
};

const AGENT_NAME: &str = "VendingBot";

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut config = match arg_value(&args, "--config") {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    config.max_messages = parse_arg(&args, "--messages", config.max_messages);
    config.weather_seed = parse_arg(&args, "--seed", config.weather_seed);
    config.step_advance.days = parse_arg(&args, "--advance-days", config.step_advance.days);
    config.step_advance.minutes =
        parse_arg(&args, "--advance-minutes", config.step_advance.minutes);
    if let Some(db) = arg_value(&args, "--db") {
        config.db_path = db.to_string();
    }
    config.validate()?;
    let json = args.iter().any(|a| a == "--json");

    // The store is released on every exit path, including a failed run.
    let mut store = SimStore::open(&config.db_path)?;
    let result = run_simulation(&config, &mut store);
    let closed = store.close();
    let summary = result?;
    closed?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}

fn run_simulation(config: &SimConfig, store: &mut SimStore) -> Result<RunSummary> {
    store.migrate()?;

    let state = SimulationState::new(config, Utc::now().date_naive())?;
    store.insert_simulation(
        state.id(),
        config.starting_balance,
        config.daily_fee,
        state.clock().now(),
    )?;

    let mut engine = SimEngine::from_state(
        state,
        config.clone(),
        Box::new(SeasonalWeather::new(config.weather_seed)),
        Box::new(OperatorAgent::new(AGENT_NAME)),
        store,
    )?;

    let start = engine.state().clock().now();
    println!("Starting Agent-Driven VendingBench Simulation");
    println!("  simulation id:  {}", engine.simulation_id());
    println!("  agent:          {}", engine.agent_name());
    println!("  starting time:  {}", start.format("%Y-%m-%d %H:%M UTC"));
    println!("  target msgs:    {}", config.max_messages);
    println!("  step advance:   {}d {}m", config.step_advance.days, config.step_advance.minutes);
    println!("  db:             {}", config.db_path);
    println!("{}", "=".repeat(60));

    let cancel = CancelFlag::new();
    install_interrupt_handler(cancel.clone());

    let summary = engine.run(config.max_messages, &cancel, print_step);
    print_summary(&summary);
    Ok(summary)
}

fn print_step(outcome: &StepOutcome) {
    if let Some(report) = &outcome.report {
        println!();
        println!("NEW DAY REPORT (Message {})", outcome.message);
        println!("{}", "=".repeat(50));
        println!("{report}");
        println!("{}", "=".repeat(50));
    }
    println!();
    println!("AGENT ACTION #{} at {}", outcome.message, outcome.time.format("%H:%M"));
    println!("Response: {}", outcome.response);
}

fn print_summary(summary: &RunSummary) {
    println!();
    match &summary.termination {
        Termination::Completed => {}
        Termination::Cancelled => println!("Simulation interrupted by user"),
        Termination::Failed { error } => println!("Error during simulation: {error}"),
    }
    println!("=== SIMULATION COMPLETE ===");
    println!("  simulation id:  {}", summary.simulation_id);
    println!("  {summary}");
}

/// Ctrl-C requests a clean stop; the step in flight is allowed to finish.
fn install_interrupt_handler(cancel: CancelFlag) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                log::warn!("Ctrl-C handling unavailable: {e}");
                return;
            }
        };
        runtime.block_on(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("interrupt received, stopping after the current step");
                cancel.cancel();
            }
        });
    });
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    arg_value(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
