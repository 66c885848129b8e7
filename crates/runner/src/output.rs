//! Report rendering.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use sim_core::engine::{CombatantReport, SimulationReport};

/// Prints a per-combatant summary and damage breakdown.
pub fn print_table(report: &SimulationReport) {
    println!(
        "{} frames ({:.1} s), total damage {:.0}, squad DPS {:.0}",
        report.frames,
        report.seconds,
        report.total_damage,
        report.dps()
    );
    for combatant in &report.combatants {
        println!();
        println!("{}", summary_line(combatant));
        for (source, damage) in &combatant.breakdown {
            if *damage > 0.0 {
                println!("    {source:<32} {damage:>16.0}");
            }
        }
    }
}

fn summary_line(c: &CombatantReport) -> String {
    format!(
        "{:<16} damage {:>14.0}  dps {:>10.0}  shots {}  hits {}  crits {}  cores {}",
        c.name,
        c.total_damage,
        c.dps,
        c.counters.shots,
        c.counters.pellet_hits,
        c.counters.crit_hits,
        c.counters.core_hits
    )
}

pub fn print_json(report: &SimulationReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    println!("{json}");
    Ok(())
}

/// Writes the full report, traces included, to `path`.
pub fn write_traces(report: &SimulationReport, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create trace file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)
        .with_context(|| format!("Failed to write traces to {}", path.display()))?;
    writer.flush()?;
    Ok(())
}
