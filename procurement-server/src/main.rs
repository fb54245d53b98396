use std::env;
use std::io::{self, Read};
use std::process;

use procurement_bridge::protocol::fallback;
use procurement_bridge::{Bridge, BridgeError, OperationKind, ScoringOperation};
use procurement_engine::price_history_loader::{group_into_observations, load_price_history_file};
use procurement_engine::EngineConfig;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage: procurement-server <anomaly|vendor|batch|status|request> [JSON] [options]

Options:
  --config   Path to an engine config JSON file
  --pretty   Pretty-print the JSON response
  --csv      Price-history CSV for batch (item_id,category,price,is_current)
  --top      Keep only the N most confident anomalies in a batch

The JSON payload is read from stdin when not given as an argument.

Example:
  procurement-server anomaly '{\"current_price\": 75000, \"historical_prices\": [45000, 46000, 44000]}'
  procurement-server vendor --pretty < vendor.json
  procurement-server batch --csv fixtures/prices.csv --top 5
  procurement-server status --config engine.json";

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Single(OperationKind),
    Envelope,
}

#[derive(Debug, Default)]
struct CliArgs {
    command: Option<Command>,
    payload: Option<String>,
    config_path: Option<String>,
    csv_path: Option<String>,
    top_k: Option<usize>,
    pretty: bool,
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut cli = CliArgs::default();
    let Some(first) = args.first() else {
        return Err("missing command".into());
    };
    cli.command = Some(match first.as_str() {
        "request" => Command::Envelope,
        other => Command::Single(other.parse().map_err(|e: BridgeError| e.to_string())?),
    });

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                cli.config_path = Some(flag_value(args, i, "--config requires a file path")?);
                i += 2;
            }
            "--csv" => {
                cli.csv_path = Some(flag_value(args, i, "--csv requires a file path")?);
                i += 2;
            }
            "--top" => {
                let raw = flag_value(args, i, "--top requires a number")?;
                let top = match raw.parse::<usize>() {
                    Ok(top) if top > 0 => top,
                    _ => return Err(format!("--top requires a positive integer, got {}", raw)),
                };
                cli.top_k = Some(top);
                i += 2;
            }
            "--pretty" => {
                cli.pretty = true;
                i += 1;
            }
            other if other.starts_with("--") => {
                return Err(format!("Unknown argument: {}", other));
            }
            other => {
                if cli.payload.is_some() {
                    return Err(format!("Unexpected extra argument: {}", other));
                }
                cli.payload = Some(other.to_string());
                i += 1;
            }
        }
    }

    if cli.csv_path.is_some() && cli.command != Some(Command::Single(OperationKind::Batch)) {
        return Err("--csv only applies to the batch command".into());
    }
    if cli.csv_path.is_some() && cli.payload.is_some() {
        return Err("batch takes either a JSON payload or --csv, not both".into());
    }
    Ok(cli)
}

fn flag_value(args: &[String], i: usize, message: &str) -> Result<String, String> {
    args.get(i + 1).cloned().ok_or_else(|| message.to_string())
}

fn read_payload(cli: &CliArgs) -> io::Result<String> {
    if let Some(payload) = &cli.payload {
        return Ok(payload.clone());
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

fn run_single(bridge: &Bridge, kind: OperationKind, cli: &CliArgs) -> io::Result<Value> {
    let doc = match kind {
        OperationKind::Status => bridge.execute(&ScoringOperation::Status),
        OperationKind::Batch if cli.csv_path.is_some() => run_csv_batch(bridge, cli),
        _ => {
            let raw = read_payload(cli)?;
            match (bridge.parse_payload(kind, &raw), cli.top_k) {
                (Ok(ScoringOperation::DetectBatch { products, .. }), Some(top)) => bridge.execute(
                    &ScoringOperation::DetectBatch {
                        products,
                        top_k: Some(top),
                    },
                ),
                (Ok(op), _) => bridge.execute(&op),
                (Err(e), _) => {
                    log::warn!("Rejected {} request: {}", kind, e);
                    fallback(kind, &e)
                }
            }
        }
    };
    serde_json::to_value(&doc).map_err(io::Error::from)
}

fn run_csv_batch(bridge: &Bridge, cli: &CliArgs) -> procurement_bridge::ResponseDocument {
    let path = cli.csv_path.as_deref().unwrap_or_default();
    let records = match load_price_history_file(path) {
        Ok(records) => records,
        Err(e) => {
            let err = BridgeError::from(e);
            log::warn!("Could not load {}: {}", path, err);
            return fallback(OperationKind::Batch, &err);
        }
    };
    let op = ScoringOperation::DetectBatch {
        products: group_into_observations(&records),
        top_k: cli.top_k,
    };
    match bridge.validate_operation(&op) {
        Ok(()) => bridge.execute(&op),
        Err(e) => {
            log::warn!("Rejected batch from {}: {}", path, e);
            fallback(OperationKind::Batch, &e)
        }
    }
}

fn run(bridge: &Bridge, cli: &CliArgs) -> io::Result<Value> {
    match cli.command {
        Some(Command::Single(kind)) => run_single(bridge, kind, cli),
        Some(Command::Envelope) => {
            let raw = read_payload(cli)?;
            serde_json::to_value(bridge.handle_envelope(&raw)).map_err(io::Error::from)
        }
        None => Err(io::Error::new(io::ErrorKind::InvalidInput, "missing command")),
    }
}

fn build_bridge(config_path: Option<&str>) -> Result<Bridge, String> {
    match config_path {
        Some(path) => {
            let config = EngineConfig::from_json_file(path).map_err(|e| e.to_string())?;
            Bridge::new(config).map_err(|e| e.to_string())
        }
        None => Ok(Bridge::default()),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "procurement=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        eprintln!("{}", USAGE);
        process::exit(1);
    }

    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            eprintln!("{}", USAGE);
            process::exit(1);
        }
    };

    let bridge = match build_bridge(cli.config_path.as_deref()) {
        Ok(bridge) => bridge,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(1);
        }
    };

    let response = match run(&bridge, &cli) {
        Ok(response) => response,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&response)
    } else {
        serde_json::to_string(&response)
    };
    match rendered {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("Error rendering response: {}", e);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_command_payload_and_flags() {
        let cli = parse_args(&args(&["batch", "{}", "--top", "3", "--pretty"])).unwrap();
        assert_eq!(cli.command, Some(Command::Single(OperationKind::Batch)));
        assert_eq!(cli.payload.as_deref(), Some("{}"));
        assert_eq!(cli.top_k, Some(3));
        assert!(cli.pretty);
    }

    #[test]
    fn request_command_is_envelope() {
        let cli = parse_args(&args(&["request", "--config", "engine.json"])).unwrap();
        assert_eq!(cli.command, Some(Command::Envelope));
        assert_eq!(cli.config_path.as_deref(), Some("engine.json"));
        assert!(cli.payload.is_none());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_args(&args(&["predict"])).is_err());
        assert!(parse_args(&args(&["batch", "--top", "many"])).is_err());
        assert!(parse_args(&args(&["batch", "--top"])).is_err());
        assert!(parse_args(&args(&["batch", "--top", "0"])).is_err());
        assert!(parse_args(&args(&["vendor", "--verbose"])).is_err());
        assert!(parse_args(&args(&["vendor", "{}", "{}"])).is_err());
        assert!(parse_args(&args(&["anomaly", "--csv", "prices.csv"])).is_err());
        assert!(parse_args(&args(&["batch", "{}", "--csv", "prices.csv"])).is_err());
    }

    #[test]
    fn status_runs_without_payload() {
        let cli = parse_args(&args(&["status"])).unwrap();
        let json = run(&Bridge::default(), &cli).unwrap();
        assert_eq!(json["all_models_ready"], true);
    }

    #[test]
    fn top_flag_overrides_payload() {
        let history = "[100, 102, 98, 101, 99, 100, 103, 97]";
        let payload = format!(
            r#"{{"products": [
                {{"current_price": 400, "historical_prices": {h}}},
                {{"current_price": 500, "historical_prices": {h}}}
            ], "top_k": 2}}"#,
            h = history
        );
        let cli = parse_args(&args(&["batch", &payload, "--top", "1"])).unwrap();
        let json = run(&Bridge::default(), &cli).unwrap();
        assert_eq!(json["anomalies_detected"], 2);
        assert_eq!(json["anomalous_products"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn missing_csv_answers_with_batch_fallback() {
        let cli = parse_args(&args(&["batch", "--csv", "/nonexistent/prices.csv"])).unwrap();
        let json = run(&Bridge::default(), &cli).unwrap();
        assert_eq!(json["total_products_analyzed"], 0);
        assert!(json["error"].as_str().unwrap().starts_with("Load error"));
    }

    #[test]
    fn bad_config_path_is_reported() {
        assert!(build_bridge(Some("/nonexistent/engine.json")).is_err());
        assert!(build_bridge(None).is_ok());
    }
}
