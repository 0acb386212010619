//! Proposal simulator entry point — CLI wiring and scenario-driven runs.

use std::path::Path;
use std::process;

use pv_bess_sim::config::ScenarioConfig;
use pv_bess_sim::io::export::{export_cashflow_csv, export_hourly_csv};
use pv_bess_sim::orchestrator::run_proposal;
use pv_bess_sim::report::print_proposal_report;
use pv_bess_sim::services::{SyntheticProduction, TableGeocoder};

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    telemetry_out: Option<String>,
    cashflow_out: Option<String>,
}

fn print_help() {
    eprintln!("pv-bess-sim — Solar-plus-battery proposal simulator");
    eprintln!();
    eprintln!("Usage: pv-bess-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!("  --preset <name>          Use a built-in preset (residential_tou)");
    eprintln!("  --seed <u64>             Override the production-noise seed");
    eprintln!("  --telemetry-out <path>   Export hourly dispatch series to CSV");
    eprintln!("  --cashflow-out <path>    Export monthly cash-flow table to CSV");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the residential_tou preset is used.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed_override: None,
        telemetry_out: None,
        cashflow_out: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --scenario requires a path argument");
                    process::exit(1);
                }
                cli.scenario_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            "--seed" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --seed requires a u64 argument");
                    process::exit(1);
                }
                if let Ok(s) = args[i].parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{}\" is not a valid u64", args[i]);
                    process::exit(1);
                }
            }
            "--telemetry-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --telemetry-out requires a path argument");
                    process::exit(1);
                }
                cli.telemetry_out = Some(args[i].clone());
            }
            "--cashflow-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --cashflow-out requires a path argument");
                    process::exit(1);
                }
                cli.cashflow_out = Some(args[i].clone());
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn main() {
    let cli = parse_args();

    // Load config: --scenario takes priority, then --preset, then the default.
    let mut scenario = if let Some(ref path) = cli.scenario_path {
        match ScenarioConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match ScenarioConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        ScenarioConfig::residential_tou()
    };

    if let Some(seed) = cli.seed_override {
        scenario.production.seed = seed;
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    // Offline collaborators; a networked deployment swaps these out.
    let geocoder = TableGeocoder;
    let production =
        SyntheticProduction::new(scenario.production.noise_std, scenario.production.seed);

    let inputs = scenario.to_inputs();
    let proposal = match run_proposal(&inputs, &geocoder, &production) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    print_proposal_report(&proposal);

    if let Some(ref path) = cli.telemetry_out {
        if let Err(e) = export_hourly_csv(&proposal, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Hourly telemetry written to {path}");
    }

    if let Some(ref path) = cli.cashflow_out {
        if let Err(e) = export_cashflow_csv(&proposal.financials.monthly, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Monthly cash flow written to {path}");
    }
}
