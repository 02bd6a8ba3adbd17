//! droneop - command line driver for the drone operation form engine.
//!
//! Every subcommand prints JSON on stdout; logs go to stderr.

mod assign;
mod config;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use droneop_core::{
    lateral_options, termination_options, vertical_options, DroneType, ExportError, FormRules,
    FormSession, Manoeuvre, SubmitError, WireValue,
};
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(author, version, about = "Validate, edit and export drone operation configurations")]
struct Args {
    /// Form rules JSON file (overrides DRONEOP_RULES)
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the selectable manoeuvres and termination methods
    Options {
        #[arg(long)]
        drone_type: String,
        #[arg(long)]
        lateral: Option<String>,
        #[arg(long)]
        vertical: Option<String>,
    },
    /// Import a configuration and print it with its validation findings
    Check { file: PathBuf },
    /// Import a configuration and apply edits in order
    Edit {
        file: PathBuf,
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,
    },
    /// Write a validated export file
    Export {
        file: PathBuf,
        /// Output path (default: timestamped file in the export directory)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Export directory (overrides DRONEOP_EXPORT_DIR)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Print the calculator request for a configuration
    Request { file: PathBuf },
    /// Print the canonical fingerprint of a configuration
    Fingerprint { file: PathBuf },
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("droneop=info".parse()?)
            .add_directive("droneop_core=warn".parse()?))
        .init();

    let args = Args::parse();
    let export_dir = match &args.command {
        Command::Export { dir, .. } => dir.clone(),
        _ => None,
    };
    let config = Config::from_env().with_overrides(args.rules, export_dir);
    let rules = config.load_rules()?;

    match args.command {
        Command::Options {
            drone_type,
            lateral,
            vertical,
        } => options(&drone_type, lateral.as_deref(), vertical.as_deref()),
        Command::Check { file } => {
            let session = load(&file, rules)?;
            print_state(&session)?;
            Ok(exit_for(session.ledger().is_empty()))
        }
        Command::Edit { file, set } => {
            let mut session = load(&file, rules)?;
            for assignment in &set {
                let edit = assign::parse_assignment(assignment)?;
                tracing::debug!(?edit, "applying");
                session.apply(edit);
            }
            print_state(&session)?;
            Ok(exit_for(session.ledger().is_empty()))
        }
        Command::Export { file, out, .. } => {
            let mut session = load(&file, rules)?;
            match session.export_json() {
                Ok(contents) => {
                    let path = out.unwrap_or_else(|| config.export_dir.join(export_file_name()));
                    fs::write(&path, contents)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    tracing::info!(path = %path.display(), "configuration exported");
                    print_json(&json!({ "path": path }))?;
                    Ok(ExitCode::SUCCESS)
                }
                Err(ExportError::Invalid(errors)) => {
                    print_json(&json!({ "errors": errors }))?;
                    Ok(ExitCode::FAILURE)
                }
                Err(error) => Err(error.into()),
            }
        }
        Command::Request { file } => {
            let mut session = load(&file, rules)?;
            match session.prepare_submission() {
                Ok(request) => {
                    print_json(&request)?;
                    Ok(ExitCode::SUCCESS)
                }
                Err(SubmitError::Invalid(errors)) => {
                    print_json(&json!({ "errors": errors }))?;
                    Ok(ExitCode::FAILURE)
                }
                Err(error) => Err(error.into()),
            }
        }
        Command::Fingerprint { file } => {
            let session = load(&file, rules)?;
            print_json(&json!({ "fingerprint": session.fingerprint() }))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load(path: &Path, rules: FormRules) -> Result<FormSession> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mut session = FormSession::new(rules);
    session
        .import_json(&raw)
        .with_context(|| format!("failed to import {}", path.display()))?;
    Ok(session)
}

fn options(drone_type: &str, lateral: Option<&str>, vertical: Option<&str>) -> Result<ExitCode> {
    let drone_type = DroneType::parse(drone_type)
        .ok_or_else(|| anyhow!("unknown drone type {drone_type:?}"))?;
    let manoeuvre = |value: Option<&str>| -> Result<Option<Manoeuvre>> {
        value
            .map(|value| Manoeuvre::parse(value).ok_or_else(|| anyhow!("unknown manoeuvre {value:?}")))
            .transpose()
    };
    let lateral = manoeuvre(lateral)?;
    let vertical = manoeuvre(vertical)?;

    print_json(&json!({
        "lateral": lateral_options(Some(drone_type)),
        "vertical": vertical_options(Some(drone_type)),
        "termination": termination_options(Some(drone_type), lateral, vertical),
    }))?;
    Ok(ExitCode::SUCCESS)
}

fn print_state(session: &FormSession) -> Result<()> {
    print_json(&json!({
        "configuration": session.config(),
        "ledger": session.ledger(),
    }))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn exit_for(clean: bool) -> ExitCode {
    if clean {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn export_file_name() -> String {
    format!("drone_form_config_{}.json", Utc::now().format("%Y-%m-%dT%H-%M-%S%.3fZ"))
}
