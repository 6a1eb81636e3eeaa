use std::env;
use std::fs::File;
use std::io;

use tracing::Level;

use crate::config::EngineConfig;
use crate::logging::init_logging;
use crate::optimizer::export_csv::write_candidates_csv;
use crate::optimizer::probability::estimate;
use crate::optimizer::ranking::{round_percent, OptimizationReport};
use crate::optimizer::search::{evaluate_candidates, select_best};
use crate::optimizer::{optimize_scenario, OptimizationScenario, TargetWindow};
use crate::parallel::WorkerPool;
use crate::server::{self, api::ApiContext};

const USAGE: &str = "usage: psi_optimizer <serve|optimize|probability|export|difficulties>";

/// Flags that consume the following argument.
const VALUE_FLAGS: &[&str] = &["--seed", "--trials", "--out"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Optimize,
    Probability,
    Export,
    Difficulties,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("optimize") => Some(Command::Optimize),
        Some("probability") => Some(Command::Probability),
        Some("export") => Some(Command::Export),
        Some("difficulties") => Some(Command::Difficulties),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let command = parse_command(args);
    let level = if command == Some(Command::Serve) {
        Level::INFO
    } else {
        Level::WARN
    };
    init_logging(level);

    match command {
        Some(Command::Serve) => handle_serve(),
        Some(Command::Optimize) => handle_optimize(args),
        Some(Command::Probability) => handle_probability(args),
        Some(Command::Export) => handle_export(args),
        Some(Command::Difficulties) => handle_difficulties(),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

fn load_config() -> Option<EngineConfig> {
    match EngineConfig::from_env() {
        Ok(config) => Some(config),
        Err(err) => {
            eprintln!("config error: {err}");
            None
        }
    }
}

fn resolve_seed(config: &EngineConfig, args: &[String]) -> Option<u64> {
    let explicit = match flag_value(args, "--seed") {
        Some(raw) => match raw.parse::<u64>() {
            Ok(seed) => Some(seed),
            Err(_) => {
                eprintln!("invalid seed '{raw}'");
                return None;
            }
        },
        None => None,
    };
    match config.resolve_seed(explicit) {
        Ok(seed) => Some(seed),
        Err(err) => {
            eprintln!("{err}");
            None
        }
    }
}

fn handle_serve() -> i32 {
    let Some(config) = load_config() else {
        return 1;
    };
    let ctx = match ApiContext::from_config(config) {
        Ok(ctx) => ctx,
        Err(err) => {
            eprintln!("config error: {err}");
            return 1;
        }
    };
    let bind_addr = env::var("PSI_BIND").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    match server::run_server(&bind_addr, &ctx) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

/// `<total> <difficulty> <reserved>` shared by optimize and export.
fn search_inputs(args: &[String], command: &str) -> Option<(u32, String, u32)> {
    let positional = positional_args(args);
    let parsed = match positional.as_slice() {
        [total, difficulty, reserved, ..] => total
            .parse::<u32>()
            .ok()
            .zip(reserved.parse::<u32>().ok())
            .map(|(total, reserved)| (total, difficulty.to_string(), reserved)),
        _ => None,
    };
    if parsed.is_none() {
        eprintln!(
            "usage: psi_optimizer {command} <total_dice> <difficulty> <required_reserved> [--hazard] [--seed N]"
        );
    }
    parsed
}

fn handle_optimize(args: &[String]) -> i32 {
    let Some((total_dice, difficulty, required_reserved)) = search_inputs(args, "optimize") else {
        return 2;
    };
    let Some(config) = load_config() else {
        return 1;
    };
    let registry = match config.registry() {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("config error: {err}");
            return 1;
        }
    };
    let Some(seed) = resolve_seed(&config, args) else {
        return 2;
    };
    let hazard_die = has_flag(args, "--hazard");

    let scenario = OptimizationScenario {
        total_dice,
        difficulty: &difficulty,
        required_reserved,
        options: config.search_options(hazard_die, seed),
    };
    let report = WorkerPool::from_env().install(|| optimize_scenario(&registry, &scenario));

    if has_flag(args, "--table") {
        return print_report_table(&report);
    }
    match serde_json::to_string_pretty(&report) {
        Ok(payload) => println!("{payload}"),
        Err(err) => {
            eprintln!("failed to serialize optimization result: {err}");
            return 1;
        }
    }
    if report.is_ok() {
        0
    } else {
        1
    }
}

fn print_report_table(report: &OptimizationReport) -> i32 {
    match report {
        OptimizationReport::Ok(best) => {
            println!("rolled\texpansion\treserved\twindow_min\twindow_max\tsuccess_percent");
            println!(
                "{}\t{}\t{}\t{}\t{}\t{:.2}",
                best.rolled,
                best.expansion,
                best.reserved,
                best.window[0],
                best.window[1],
                best.success_percent
            );
            0
        }
        OptimizationReport::Error(failure) => {
            eprintln!("{}: {}", failure.reason, failure.message);
            1
        }
    }
}

fn handle_probability(args: &[String]) -> i32 {
    let positional = positional_args(args);
    let parsed: Option<Vec<u32>> = positional
        .iter()
        .take(3)
        .map(|raw| raw.parse::<u32>().ok())
        .collect();
    let Some([dice, min, max]) = parsed.and_then(|values| <[u32; 3]>::try_from(values).ok())
    else {
        eprintln!(
            "usage: psi_optimizer probability <dice> <min> <max> [--hazard] [--seed N] [--trials N]"
        );
        return 2;
    };
    let Some(config) = load_config() else {
        return 1;
    };
    let Some(seed) = resolve_seed(&config, args) else {
        return 2;
    };
    let hazard_die = has_flag(args, "--hazard");

    let mut probability = config.probability.with_seed(seed);
    if let Some(raw) = flag_value(args, "--trials") {
        match raw.parse::<u32>() {
            Ok(trials) if trials > 0 => {
                probability.fair_trials = trials;
                probability.hazard_trials = trials;
            }
            _ => {
                eprintln!("invalid trials '{raw}'");
                return 2;
            }
        }
    }

    let window = TargetWindow::new(min, max);
    let result = estimate(dice, window, hazard_die, &probability);
    let payload = serde_json::json!({
        "dice": dice,
        "window": window.bounds(),
        "hazard_die": hazard_die,
        "probability": result.probability,
        "success_percent": round_percent(result.probability),
        "method": result.method,
        "seed": seed,
    });
    match serde_json::to_string_pretty(&payload) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize probability: {err}");
            1
        }
    }
}

fn handle_export(args: &[String]) -> i32 {
    let Some((total_dice, difficulty, required_reserved)) = search_inputs(args, "export") else {
        return 2;
    };
    let Some(config) = load_config() else {
        return 1;
    };
    let registry = match config.registry() {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("config error: {err}");
            return 1;
        }
    };
    let Some(seed) = resolve_seed(&config, args) else {
        return 2;
    };
    let options = config.search_options(has_flag(args, "--hazard"), seed);

    let candidates = match WorkerPool::from_env().install(|| {
        evaluate_candidates(&registry, total_dice, &difficulty, required_reserved, &options)
    }) {
        Ok(candidates) => candidates,
        Err(err) => {
            eprintln!("{}: {err}", err.code());
            return 1;
        }
    };
    let best = select_best(&candidates);

    let written = match flag_value(args, "--out") {
        Some(path) => match File::create(path) {
            Ok(file) => write_candidates_csv(file, &candidates, best),
            Err(err) => {
                eprintln!("failed to create '{path}': {err}");
                return 1;
            }
        },
        None => write_candidates_csv(io::stdout().lock(), &candidates, best),
    };
    match written {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("export failed: {err}");
            1
        }
    }
}

fn handle_difficulties() -> i32 {
    let Some(config) = load_config() else {
        return 1;
    };
    let registry = match config.registry() {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("config error: {err}");
            return 1;
        }
    };
    match serde_json::to_string_pretty(&serde_json::json!({ "difficulties": registry.profiles() }))
    {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize difficulties: {err}");
            1
        }
    }
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|arg| arg == flag)
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a String> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|index| args.get(index + 1))
}

/// Arguments after the command word that are neither flags nor flag values.
fn positional_args(args: &[String]) -> Vec<&String> {
    let mut positional = Vec::new();
    let mut skip_next = false;
    for arg in args.iter().skip(2) {
        if skip_next {
            skip_next = false;
            continue;
        }
        if VALUE_FLAGS.contains(&arg.as_str()) {
            skip_next = true;
        } else if !arg.starts_with("--") {
            positional.push(arg);
        }
    }
    positional
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn commands_parse() {
        assert_eq!(parse_command(&args(&["bin", "optimize"])), Some(Command::Optimize));
        assert_eq!(parse_command(&args(&["bin", "export"])), Some(Command::Export));
        assert_eq!(parse_command(&args(&["bin", "nope"])), None);
        assert_eq!(parse_command(&args(&["bin"])), None);
    }

    #[test]
    fn positional_args_skip_flags_and_values() {
        let raw = args(&["bin", "optimize", "6", "--seed", "9", "leicht", "--hazard", "1"]);
        let positional: Vec<&str> = positional_args(&raw).into_iter().map(String::as_str).collect();
        assert_eq!(positional, vec!["6", "leicht", "1"]);
        assert_eq!(flag_value(&raw, "--seed").map(String::as_str), Some("9"));
        assert!(has_flag(&raw, "--hazard"));
        assert!(!has_flag(&raw, "--table"));
    }

    #[test]
    fn search_inputs_require_numeric_counts() {
        assert_eq!(
            search_inputs(&args(&["bin", "optimize", "6", "Leicht", "1"]), "optimize"),
            Some((6, "Leicht".to_string(), 1))
        );
        assert_eq!(search_inputs(&args(&["bin", "optimize", "x", "leicht", "1"]), "optimize"), None);
        assert_eq!(search_inputs(&args(&["bin", "optimize", "6"]), "optimize"), None);
    }
}
