//! `burst-sim`: runs a scenario headlessly and reports squad damage.
mod cli;
mod logging;
mod output;
mod replay;

use anyhow::{Context, Result};
use clap::Parser;
use sim_content::ScenarioLoader;
use tracing::info;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = logging::setup_logging(cli.log_file.as_deref())?;

    let mut scenario = ScenarioLoader::load(&cli.scenario)?;
    if let Some(seconds) = cli.seconds {
        scenario.config.duration_seconds = seconds;
    }
    let seed = cli
        .seed
        .or(scenario.config.seed)
        .unwrap_or_else(rand::random);
    scenario.config.seed = Some(seed);
    scenario.config.record_events |= cli.events;

    info!(
        scenario = %cli.scenario.display(),
        seed,
        seconds = scenario.config.duration_seconds,
        combatants = scenario.roster.len(),
        "starting simulation"
    );

    let mut sim = scenario
        .into_simulation()
        .context("Failed to assemble simulation")?;
    let report = sim.run();

    if sim.events().is_enabled() {
        let records = sim.take_events();
        replay::replay(&records, sim.combatants());
    }
    info!(
        total_damage = report.total_damage,
        dps = report.dps(),
        "simulation finished"
    );

    if cli.json {
        output::print_json(&report)?;
    } else {
        output::print_table(&report);
    }
    if let Some(path) = &cli.trace_out {
        output::write_traces(&report, path)?;
        info!("Traces written to {}", path.display());
    }
    Ok(())
}
