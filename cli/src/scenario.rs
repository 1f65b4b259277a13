//! Scenario file execution

use anyhow::Result;
use colored::Colorize;
use log::info;
use serde::Serialize;
use spotlend::{Market, Op, Outcome, Sequencer};

use crate::config::Scenario;
use crate::report::{self, MarketState};

/// Result of one submitted sequence
#[derive(Debug, Serialize)]
pub struct SequenceReport {
    pub name: String,
    pub committed: bool,
    pub outcomes: Vec<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_step: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub sequences: Vec<SequenceReport>,
    pub final_state: MarketState,
}

/// Submit every sequence in order; a failed sequence is rolled back and the
/// run continues with the next one
pub fn execute(scenario: &Scenario, market: Market) -> (RunReport, Market) {
    let sequencer = Sequencer::new(market);
    let mut sequences = Vec::with_capacity(scenario.sequences.len());

    for (i, spec) in scenario.sequences.iter().enumerate() {
        let name = spec
            .name
            .clone()
            .unwrap_or_else(|| format!("sequence {}", i + 1));
        info!("submitting {} ({} ops)", name, spec.ops.len());

        let report = match sequencer.submit(&spec.ops) {
            Ok(outcomes) => SequenceReport {
                name,
                committed: true,
                outcomes,
                failed_step: None,
                error: None,
            },
            Err(err) => SequenceReport {
                name,
                committed: false,
                outcomes: Vec::new(),
                failed_step: Some(err.step),
                error: Some(err.to_string()),
            },
        };
        sequences.push(report);
    }

    let market = sequencer.into_inner();
    let report = RunReport {
        sequences,
        final_state: MarketState::capture(&market),
    };
    (report, market)
}

pub fn run_scenario(path: &str, json: bool) -> Result<()> {
    let scenario = Scenario::load(path)?;
    let market = scenario.build_market()?;
    let symbol = scenario.market.token.to_string();
    let (report, _) = execute(&scenario, market);

    if json {
        return report::print_json(&report);
    }

    println!("{}", "=== Scenario Run ===".bright_green().bold());
    println!("{} {}", "File:".bright_cyan(), path);
    println!("{} {}", "Token:".bright_cyan(), symbol);
    println!(
        "{} {} bps",
        "Collateral Ratio:".bright_cyan(),
        scenario.market.collateral_ratio_bps
    );

    for (spec, result) in scenario.sequences.iter().zip(&report.sequences) {
        println!();
        if result.committed {
            println!("{} {}", "✓".bright_green(), result.name.bold());
            for (op, outcome) in spec.ops.iter().zip(&result.outcomes) {
                let asset_out = match op {
                    Op::Swap { asset_in, .. } => Some(asset_in.counterpart()),
                    _ => None,
                };
                println!(
                    "  {} {}",
                    format!("{}:", op.name()).dimmed(),
                    report::describe(outcome, &symbol, asset_out)
                );
            }
        } else {
            println!("{} {}", "✗".bright_red(), result.name.bold());
            if let Some(error) = &result.error {
                println!("  {} {}", "rolled back:".yellow(), error);
            }
        }
    }

    report.final_state.print(&symbol);

    let committed = report.sequences.iter().filter(|s| s.committed).count();
    println!(
        "\n{} {}/{} sequences committed",
        "Summary:".bright_cyan(),
        committed,
        report.sequences.len()
    );
    Ok(())
}
