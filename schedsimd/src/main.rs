//! # Scheduling Simulator Host
//!
//! Main entry point for the command-line simulator.

use sched_log::LogLevel;
use schedsimd::{HostConfig, HostError, HostRuntime};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("schedsimd");

    let config = match parse_args(&args) {
        Ok(Some(config)) => config,
        Ok(None) => {
            print_usage(program);
            return;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage(program);
            process::exit(1);
        }
    };

    if let Err(e) = run(config) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(config: HostConfig) -> Result<(), HostError> {
    let mut runtime = HostRuntime::new(config)?;
    runtime.run()?;
    println!("{}", runtime.report()?);
    Ok(())
}

/// Returns `None` when help was requested
fn parse_args(args: &[String]) -> Result<Option<HostConfig>, String> {
    let mut config = HostConfig::default();
    let mut i = 1;

    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--scenario" | "-f" => {
                config.scenario = Some(PathBuf::from(value(args, &mut i, flag)?));
            }
            "--preset" | "-p" => {
                config.preset = Some(value(args, &mut i, flag)?.to_string());
            }
            "--algorithm" | "-a" => {
                let raw = value(args, &mut i, flag)?;
                config.algorithm = Some(raw.parse().map_err(|e| format!("{}", e))?);
            }
            "--cores" | "-c" => {
                config.cores = Some(number(args, &mut i, flag)?);
            }
            "--quantum" | "-q" => {
                config.quantum = Some(number(args, &mut i, flag)?);
            }
            "--aging" => {
                config.aging = Some(number(args, &mut i, flag)?);
            }
            "--max-ticks" => {
                config.max_ticks = number(args, &mut i, flag)?;
            }
            "--script" | "-s" => {
                let path = value(args, &mut i, flag)?;
                let text = fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read script file: {}", e))?;
                config.script = Some(text);
            }
            "--log-level" | "-l" => {
                let raw = value(args, &mut i, flag)?;
                config.log_level =
                    LogLevel::parse(raw).ok_or_else(|| format!("Invalid log level: {}", raw))?;
            }
            "--quiz" => {
                config.quiz_seed = Some(number(args, &mut i, flag)?);
            }
            "--json" => {
                config.json = true;
            }
            "--help" | "-h" => return Ok(None),
            other => {
                return Err(format!("Unknown option: {}", other));
            }
        }
        i += 1;
    }

    Ok(Some(config))
}

fn value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("Missing value for {}", flag))
}

fn number<T: std::str::FromStr>(args: &[String], i: &mut usize, flag: &str) -> Result<T, String> {
    let raw = value(args, i, flag)?;
    raw.parse()
        .map_err(|_| format!("Invalid {} value: {}", flag.trim_start_matches('-'), raw))
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [OPTIONS]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -f, --scenario <FILE>     Scenario file (JSON)");
    eprintln!("  -p, --preset <NAME>       Built-in scenario (default: Basic FCFS)");
    eprintln!("  -a, --algorithm <NAME>    fcfs, sjf, srtf, rr, priority, priority_np, mlfq");
    eprintln!("  -c, --cores <N>           Number of CPU cores");
    eprintln!("  -q, --quantum <N>         Time quantum for RR and MLFQ");
    eprintln!("  --aging <TICKS>           Enable priority aging with this threshold");
    eprintln!("  --max-ticks <N>           Tick budget (0 = unlimited, default 10000)");
    eprintln!("  -s, --script <FILE>       Command script (step [n], run, reset, rewind, status, quit,");
    eprintln!("                            answer <option>, predict <process> <tick>, predict avg-wait <n>)");
    eprintln!("  -l, --log-level <LEVEL>   debug, info, warn or error (default info)");
    eprintln!("  --quiz <SEED>             Record quiz questions using this seed");
    eprintln!("  --json                    Print the final snapshot as JSON");
    eprintln!("  -h, --help                Show this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} --preset \"Preemption Demo\"", program);
    eprintln!("  {} -f workload.json -a rr -q 3 --cores 2", program);
    eprintln!("  {} -p \"Preemption Demo\" --quiz 1 -s demos/quiz.script", program);
}

#[cfg(test)]
mod tests {
    use super::*;
    use sched_types::Algorithm;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("schedsimd")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_defaults() {
        let config = parse_args(&args(&[])).unwrap().unwrap();
        assert!(config.preset.is_none());
        assert_eq!(config.max_ticks, schedsimd::DEFAULT_MAX_TICKS);
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_parse_overrides() {
        let config = parse_args(&args(&[
            "-p", "I/O Bound", "-a", "mlfq", "-c", "2", "-q", "3", "--aging", "6",
            "--max-ticks", "50", "-l", "debug", "--json", "--quiz", "9",
        ]))
        .unwrap()
        .unwrap();
        assert_eq!(config.preset.as_deref(), Some("I/O Bound"));
        assert_eq!(config.algorithm, Some(Algorithm::Mlfq));
        assert_eq!(config.cores, Some(2));
        assert_eq!(config.quantum, Some(3));
        assert_eq!(config.aging, Some(6));
        assert_eq!(config.max_ticks, 50);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert!(config.json);
        assert_eq!(config.quiz_seed, Some(9));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_args(&args(&["--cores"])).unwrap_err(),
            "Missing value for --cores"
        );
        assert_eq!(
            parse_args(&args(&["--cores", "two"])).unwrap_err(),
            "Invalid cores value: two"
        );
        assert!(parse_args(&args(&["-a", "lottery"])).is_err());
        assert!(parse_args(&args(&["--verbose"])).is_err());
    }

    #[test]
    fn test_help() {
        assert!(parse_args(&args(&["--help"])).unwrap().is_none());
    }
}
