//! Unveil CLI
//!
//! Runs headless scroll scenarios:
//! - `unveil run <scene.toml> <scenario.json>` builds the scene, runs the steps
//!   and prints a JSON report
//! - `unveil presets` lists the animation presets
//! - `unveil init` writes a default `unveil.toml`
//! - `unveil check` validates an `unveil.toml`

mod assert;
mod report;
mod runner;
mod scenario;
mod scene;
mod watch;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use unveil_animation::{AnimationKind, AnimationPreset, KeyframeProperties};
use unveil_scroll::{plugin, UnveilConfig};

use crate::report::RunReport;
use crate::scenario::Scenario;
use crate::scene::Scene;

const CONFIG_FILE: &str = "unveil.toml";

#[derive(Parser)]
#[command(name = "unveil")]
#[command(author, version, about = "Headless scroll reveal runner")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario against a scene
    Run {
        /// Scene file (TOML)
        scene: PathBuf,
        /// Scenario file (JSON)
        scenario: PathBuf,
        /// Also write the report to this relative path
        #[arg(short, long)]
        report: Option<PathBuf>,
        /// Defaults file; `./unveil.toml` is used when present
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Re-run whenever the scene or scenario changes
        #[arg(short, long)]
        watch: bool,
    },
    /// List animation presets and their starting styles
    Presets {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Write a default configuration file
    Init {
        #[arg(default_value = CONFIG_FILE)]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Validate a configuration file
    Check {
        #[arg(default_value = CONFIG_FILE)]
        path: PathBuf,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            scene,
            scenario,
            report,
            config,
            watch,
        } => {
            register_config(config.as_deref())?;
            if watch {
                watch::watch_files(&[scene.as_path(), scenario.as_path()], || {
                    run_once(&scene, &scenario, report.as_deref()).map(|_| ())
                })?;
                Ok(ExitCode::SUCCESS)
            } else {
                let report = run_once(&scene, &scenario, report.as_deref())?;
                Ok(if report.is_passed() {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::FAILURE
                })
            }
        }
        Commands::Presets { json } => {
            print_presets(json)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Init { path, force } => {
            init_config(&path, force)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { path } => check_config(&path),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("unveil=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("unveil=info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Install binding defaults before any runtime exists
fn register_config(path: Option<&Path>) -> Result<()> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None if Path::new(CONFIG_FILE).exists() => PathBuf::from(CONFIG_FILE),
        None => {
            plugin::register();
            return Ok(());
        }
    };
    let config = UnveilConfig::load(&path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    for problem in config.validate() {
        tracing::warn!(%problem, "configuration value will fall back to a default");
    }
    plugin::register_with(config);
    tracing::debug!(path = %path.display(), "configuration loaded");
    Ok(())
}

fn run_once(scene: &Path, scenario: &Path, report_path: Option<&Path>) -> Result<RunReport> {
    let scene = Scene::load(scene)?;
    let scenario = Scenario::from_path(scenario)?;
    let outcome = runner::run(&scene, &scenario)?;
    let report = outcome.report();

    report.write_to_writer(&mut std::io::stdout().lock())?;
    if let Some(path) = report_path {
        report.write_to_path(path)?;
        tracing::info!(path = %path.display(), "report written");
    }
    if outcome.is_failed() {
        tracing::error!(
            step = report.failed_step_index,
            message = report.message.as_deref(),
            "scenario failed"
        );
    } else {
        tracing::info!(steps = report.steps_run, "scenario passed");
    }
    Ok(report.clone())
}

fn print_presets(json: bool) -> Result<()> {
    if json {
        let presets: Vec<_> = AnimationKind::ALL
            .into_iter()
            .map(|kind| {
                serde_json::json!({
                    "name": kind.name(),
                    "reveal": keyframes_json(&AnimationPreset::reveal(kind).from_state()),
                    "stagger": keyframes_json(&AnimationPreset::stagger(kind).from_state()),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&presets)?);
        return Ok(());
    }

    println!("{:<10}  {:<36}  {}", "name", "reveal from", "stagger from");
    for kind in AnimationKind::ALL {
        println!(
            "{:<10}  {:<36}  {}",
            kind.name(),
            describe(&AnimationPreset::reveal(kind).from_state()),
            describe(&AnimationPreset::stagger(kind).from_state()),
        );
    }
    Ok(())
}

fn keyframes_json(props: &KeyframeProperties) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for (name, value) in fields(props) {
        map.insert(name.to_string(), serde_json::json!(value));
    }
    serde_json::Value::Object(map)
}

fn describe(props: &KeyframeProperties) -> String {
    fields(props)
        .map(|(name, value)| format!("{name} {value}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn fields(props: &KeyframeProperties) -> impl Iterator<Item = (&'static str, f32)> {
    [
        ("opacity", props.opacity),
        ("x", props.translate_x),
        ("y", props.translate_y),
        ("scale", props.scale),
        ("rotate", props.rotate),
    ]
    .into_iter()
    .filter_map(|(name, value)| value.map(|v| (name, v)))
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let content = UnveilConfig::default().to_toml()?;
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn check_config(path: &Path) -> Result<ExitCode> {
    let config = UnveilConfig::load(path)?;
    let problems = config.validate();
    if problems.is_empty() {
        println!("{}: ok", path.display());
        return Ok(ExitCode::SUCCESS);
    }
    for problem in &problems {
        println!("{}: {problem}", path.display());
    }
    Ok(ExitCode::FAILURE)
}
