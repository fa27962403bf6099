use std::path::PathBuf;

use clap::Parser;

use baloot_bench::config::{BenchmarkConfig, ContractMode};
use baloot_bench::logging::init_logging;
use baloot_bench::tournament::TournamentRunner;

/// Tournament benchmarking harness for Baloot agents.
#[derive(Debug, Parser)]
#[command(
    name = "baloot-bench",
    author,
    version,
    about = "Deterministic Baloot tournament harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (names the output directory).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of hands to play.
    #[arg(long, value_name = "HANDS")]
    hands: Option<usize>,

    /// Override the RNG seed for deal generation.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the contract mode.
    #[arg(long, value_enum)]
    mode: Option<ContractMode>,

    /// Play every deal once only, without exchanging teams.
    #[arg(long)]
    no_swap: bool,

    /// Exit after validating the configuration (no tournament is run).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::load(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(hands) = cli.hands {
        config.deals.hands = hands;
    }

    if let Some(seed) = cli.seed {
        config.deals.seed = Some(seed);
    }

    if let Some(mode) = cli.mode {
        config.deals.mode = mode;
    }

    if cli.no_swap {
        config.deals.swap_teams = false;
    }

    config.validate()?;

    let paths = config.run_paths();
    let run_id = config.run_id.clone();
    let hands = config.deals.hands;
    let lineups = config.deals.lineups();
    let names = config
        .agents
        .iter()
        .map(|agent| agent.name.as_str())
        .collect::<Vec<_>>()
        .join(" vs ");

    println!(
        "Loaded configuration '{run_id}': {names} ({hands} hands, {lineups} lineup{})",
        if lineups == 1 { "" } else { "s" }
    );

    let _logging_guard = init_logging(config.telemetry, &paths, &run_id)?;
    let runner = TournamentRunner::new(config)?;

    if cli.validate_only {
        println!("Validation-only mode: tournament execution skipped.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Tournament complete for '{run_id}': {} hands × {} lineups → {} rows at {}",
        summary.hands_played,
        summary.lineups,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }
    if let Some(outputs) = summary.telemetry_outputs.as_ref() {
        println!("Telemetry summary (JSON): {}", outputs.json_path.display());
        println!(
            "Telemetry summary (Markdown): {}",
            outputs.markdown_path.display()
        );
        println!(
            "  Search decisions: {} logged, {} hands",
            outputs.summary.search.decisions, outputs.summary.hands.count
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_override_accepts_contract_names() {
        let cli = Cli::try_parse_from(["baloot-bench", "--mode", "hokum", "--no-swap"]).unwrap();
        assert_eq!(cli.mode, Some(ContractMode::Hokum));
        assert!(cli.no_swap);

        let cli = Cli::try_parse_from(["baloot-bench"]).unwrap();
        assert_eq!(cli.mode, None);
        assert_eq!(cli.config, PathBuf::from("bench/bench.yaml"));

        assert!(Cli::try_parse_from(["baloot-bench", "--mode", "trumps"]).is_err());
    }
}
