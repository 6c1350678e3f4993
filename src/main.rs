//! Solar range entry point: CLI wiring, one-shot readings and the demo replay.

use std::path::Path;
use std::process;

use solar_range::config::AppConfig;
use solar_range::host::{EntityRecord, InMemoryHost};
use solar_range::io::export::export_csv;
use solar_range::logging;
use solar_range::replay::Replay;
use solar_range::source::{SourceState, SourceUnit};

/// Parsed CLI arguments.
struct CliArgs {
    config_path: Option<String>,
    preset: Option<String>,
    consumption: Option<f64>,
    language: Option<String>,
    reading: Option<f64>,
    unit: SourceUnit,
    json: bool,
    export: Option<String>,
    #[cfg(feature = "tui")]
    tui: bool,
}

fn print_help() {
    eprintln!("solar-range — PV energy as EV driving range and everyday equivalents");
    eprintln!();
    eprintln!("Usage: solar-range [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>          Load configuration from a TOML file");
    eprintln!(
        "  --preset <name>          Use a built-in preset ({})",
        AppConfig::PRESETS.join(", ")
    );
    eprintln!("  --consumption <f64>      Override vehicle consumption (kWh/100 km)");
    eprintln!("  --language <tag>         Message language (de, en, fr, it, es)");
    eprintln!("  --reading <f64>          Compute once for a single PV reading");
    eprintln!("  --unit <kW|kWh>          Unit of --reading (default: kWh)");
    eprintln!("  --json                   Print results as JSON");
    eprintln!("  --export <path>          Write the demo replay to CSV");
    #[cfg(feature = "tui")]
    eprintln!("  --tui                    Launch the live dashboard card");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("Without --reading, the demo PV source is replayed through the sensor.");
}

fn next_value<'a>(args: &'a [String], i: &mut usize, flag: &str, what: &str) -> &'a str {
    *i += 1;
    if *i >= args.len() {
        eprintln!("error: {flag} requires {what}");
        process::exit(1);
    }
    &args[*i]
}

fn parse_f64(value: &str, flag: &str) -> f64 {
    value.parse::<f64>().unwrap_or_else(|_| {
        eprintln!("error: {flag} value \"{value}\" is not a valid number");
        process::exit(1);
    })
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        config_path: None,
        preset: None,
        consumption: None,
        language: None,
        reading: None,
        unit: SourceUnit::KilowattHour,
        json: false,
        export: None,
        #[cfg(feature = "tui")]
        tui: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--config" => {
                cli.config_path = Some(next_value(&args, &mut i, "--config", "a path argument").to_string());
            }
            "--preset" => {
                cli.preset = Some(next_value(&args, &mut i, "--preset", "a name argument").to_string());
            }
            "--consumption" => {
                let v = next_value(&args, &mut i, "--consumption", "a number");
                cli.consumption = Some(parse_f64(v, "--consumption"));
            }
            "--language" => {
                cli.language = Some(next_value(&args, &mut i, "--language", "a language tag").to_string());
            }
            "--reading" => {
                let v = next_value(&args, &mut i, "--reading", "a number");
                cli.reading = Some(parse_f64(v, "--reading"));
            }
            "--unit" => {
                let v = next_value(&args, &mut i, "--unit", "kW or kWh");
                cli.unit = v.parse().unwrap_or_else(|e| {
                    eprintln!("error: {e}");
                    process::exit(1);
                });
            }
            "--json" => cli.json = true,
            "--export" => {
                cli.export = Some(next_value(&args, &mut i, "--export", "a path argument").to_string());
            }
            #[cfg(feature = "tui")]
            "--tui" => cli.tui = true,
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

/// Loads the configuration: `--config` wins over `--preset`, default preset otherwise.
fn load_config(cli: &CliArgs) -> AppConfig {
    let loaded = if let Some(ref path) = cli.config_path {
        AppConfig::from_toml_file(Path::new(path))
    } else if let Some(ref name) = cli.preset {
        AppConfig::from_preset(name)
    } else {
        Ok(AppConfig::baseline())
    };
    let mut cfg = loaded.unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    if let Some(c) = cli.consumption {
        cfg.options.consumption_kwh_per_100km = Some(c);
    }
    if let Some(ref lang) = cli.language {
        cfg.integration.language = lang.clone();
    }

    let errors = cfg.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    cfg
}

/// Publishes one reading through a fresh host and prints the resulting entities.
fn run_once(cfg: &AppConfig, value: f64, unit: SourceUnit, json: bool) {
    let mut sensor = cfg.build_sensor().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        process::exit(1);
    });
    let mut host = InMemoryHost::new();
    if let Err(e) = sensor.attach(&mut host) {
        tracing::debug!(error = %e, "source not reported yet");
    }
    host.set_source(sensor.pv_entity_id(), SourceState::reading(value, unit));

    let records: Vec<&EntityRecord> = sensor
        .entity_ids()
        .iter()
        .filter_map(|id| host.get(id))
        .collect();

    if json {
        match serde_json::to_string_pretty(&records) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("error: failed to encode JSON: {e}");
                process::exit(1);
            }
        }
        return;
    }

    for r in &records {
        let name = r.friendly_name.as_deref().unwrap_or(&r.entity_id);
        let unit = r.unit_of_measurement.as_deref().unwrap_or("");
        println!("{name:<28} {:>12} {unit}", r.state.to_string());
    }
    if let Some(message) = records
        .first()
        .and_then(|r| r.attributes.get("message"))
        .and_then(|m| m.as_str())
    {
        println!("\n{message}");
    }
}

fn main() {
    logging::init();
    let cli = parse_args();
    let cfg = load_config(&cli);

    if let Some(value) = cli.reading {
        run_once(&cfg, value, cli.unit, cli.json);
        return;
    }

    #[cfg(feature = "tui")]
    {
        if cli.tui {
            let label = cli
                .config_path
                .clone()
                .or_else(|| cli.preset.clone())
                .unwrap_or_else(|| "default".to_string());
            solar_range::tui::run(cfg, &label);
            return;
        }
    }

    let mut replay = Replay::from_config(&cfg).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        process::exit(1);
    });
    let ticks = replay.run();

    if cli.json {
        match serde_json::to_string_pretty(&ticks) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("error: failed to encode JSON: {e}");
                process::exit(1);
            }
        }
    } else {
        for t in &ticks {
            println!("{t}");
        }
    }

    if let Some(ref path) = cli.export {
        if let Err(e) = export_csv(&ticks, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Replay written to {path}");
    }
}
