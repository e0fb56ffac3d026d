//! Binary entry point for the commons simulation.
//!
//! Usage: `commons [scenario.yaml] [out_dir]`, defaulting to
//! `scenarios/baseline.yaml` and `data`.
//!
//! # Startup sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load the scenario YAML
//! 3. Assemble the strategy registry (built-ins, plus the LLM strategy
//!    when the scenario carries an `llm` section)
//! 4. Build the engine, which injects briefings and snapshots the
//!    replay baseline
//! 5. Run to completion
//! 6. Write run artifacts: initial state, final state, event log, report

mod error;

use std::path::{Path, PathBuf};

use chrono::Utc;
use commons_engine::{Engine, ScenarioConfig, StrategyRegistry};
use commons_runner::{LlmBackendConfig, LlmStrategy};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::CliError;

/// Strategy id the scenario's `llm` section registers under.
const LLM_STRATEGY_ID: &str = "llm";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let mut args = std::env::args().skip(1);
    let scenario_path = args
        .next()
        .unwrap_or_else(|| "scenarios/baseline.yaml".to_owned());
    let out_dir = args.next().unwrap_or_else(|| "data".to_owned());

    run(Path::new(&scenario_path), Path::new(&out_dir))?;
    Ok(())
}

fn run(scenario_path: &Path, out_dir: &Path) -> Result<(), CliError> {
    info!(scenario = %scenario_path.display(), "loading scenario");
    let config = ScenarioConfig::from_file(scenario_path)?;
    info!(
        name = %config.name,
        rounds = config.rounds,
        agents = config.agents.len(),
        pool = config.pool,
        receiver = %config.receiver,
        "scenario loaded"
    );

    let registry = build_registry(scenario_path, &config)?;
    let mut engine = Engine::new(config.into_world_state(), registry)?;

    let report = engine.run()?;

    let run_dir = make_run_dir(out_dir, &config.name)?;
    std::fs::write(
        run_dir.join("initial_state.json"),
        serde_json::to_string_pretty(engine.initial_state())?,
    )?;
    std::fs::write(
        run_dir.join("world_state.json"),
        serde_json::to_string_pretty(engine.state())?,
    )?;
    std::fs::write(run_dir.join("event_log.json"), engine.log().to_json()?)?;
    std::fs::write(
        run_dir.join("run_report.json"),
        serde_json::to_string_pretty(&report)?,
    )?;

    info!(
        run_dir = %run_dir.display(),
        score = report.score,
        max_score = report.max_score,
        "artifacts written"
    );
    Ok(())
}

/// Assemble the built-in strategies plus, when the scenario file has an
/// `llm` section, the LLM strategy.
///
/// The `llm` section is not part of [`ScenarioConfig`]; it is read from
/// the raw YAML so scenarios without one need no stub section.
fn build_registry(
    scenario_path: &Path,
    config: &ScenarioConfig,
) -> Result<StrategyRegistry, CliError> {
    let mut registry = StrategyRegistry::with_builtins(config.seed);

    let raw = std::fs::read_to_string(scenario_path)?;
    let value: serde_yml::Value = serde_yml::from_str(&raw)?;
    if let Some(llm_section) = value.get("llm") {
        let mut llm_config: LlmBackendConfig = serde_yml::from_value(llm_section.clone())?;
        llm_config.apply_env_overrides();
        info!(model = %llm_config.model, "registering llm strategy");
        registry.register(
            LLM_STRATEGY_ID,
            Box::new(LlmStrategy::from_config(&llm_config)?),
        );
    }
    Ok(registry)
}

/// Create a timestamped directory for this run's artifacts.
fn make_run_dir(out_dir: &Path, name: &str) -> Result<PathBuf, CliError> {
    let run_dir = out_dir.join(format!("{name}_{}", Utc::now().format("%Y%m%d%H%M%S")));
    std::fs::create_dir_all(&run_dir)?;
    Ok(run_dir)
}
