//! blocks-drag - replay drag sessions against an in-memory editor view.
//!
//! Scripts are JSON files holding an optional drag surface config and a list
//! of steps, each a bare command or query object.

mod logger;

use anyhow::{bail, Context, Result};
use api::{Command, DragSession, Query, QueryResult, Script, StepOutcome};
use blocks_core::DragSurfaceConfig;
use clap::{Parser, Subcommand};
use glam::Vec2;
use logger::{parse_level, CliLogger};
use std::path::{Path, PathBuf};

/// blocks-drag - exercise the block drag surface from the command line
#[derive(Parser)]
#[command(name = "blocks-drag")]
#[command(about = "Replay block drag sessions against an in-memory editor view")]
struct Cli {
    /// Log level (error, warn, info, debug, trace); overrides the config
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Also append log output to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON drag script and print each step's outcome
    Run {
        /// Script to replay
        script: PathBuf,

        /// Drag surface config file; overrides the config embedded in the
        /// script
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Keep executing after a step fails
        #[arg(long)]
        keep_going: bool,
    },

    /// Pick a block up, drag it at the given zoom and drop it again
    Demo {
        /// Canvas zoom factor during the drag
        #[arg(short, long, default_value_t = 2.0)]
        scale: f32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            ref script,
            ref config,
            keep_going,
        } => run_script(&cli, script, config.as_deref(), keep_going),
        Commands::Demo { scale } => {
            let config = DragSurfaceConfig::default();
            init_logging(&cli, &config)?;
            demo(config, scale)
        }
    }
}

fn init_logging(cli: &Cli, config: &DragSurfaceConfig) -> Result<()> {
    let level = parse_level(cli.log_level.as_deref().unwrap_or(&config.log_level))?;
    CliLogger::init(level, cli.log_file.as_deref())
}

fn load_script(path: &Path) -> Result<Script> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script: {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse script: {}", path.display()))
}

fn run_script(
    cli: &Cli,
    script_path: &Path,
    config_path: Option<&Path>,
    keep_going: bool,
) -> Result<()> {
    let script = load_script(script_path)?;
    let config = match config_path {
        Some(path) => DragSurfaceConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => script.config.clone().unwrap_or_default(),
    };
    init_logging(cli, &config)?;
    log::info!(
        "replaying {} step(s) from {}",
        script.steps.len(),
        script_path.display()
    );

    let mut session = DragSession::new(config).context("Failed to build editor view")?;
    let outcomes = session.run(&script.steps, !keep_going);

    for outcome in &outcomes {
        println!("{}", serde_json::to_string(outcome)?);
    }
    print_markup(&session);

    let failed = outcomes.iter().filter(|o| o.is_error()).count();
    if failed > 0 {
        bail!("{failed} of {} step(s) failed", outcomes.len());
    }
    Ok(())
}

fn demo(config: DragSurfaceConfig, scale: f32) -> Result<()> {
    let mut session = DragSession::new(config).context("Failed to build editor view")?;

    let steps = [
        (
            "create blocks",
            vec![
                Command::CreateBlock {
                    name: "when_clicked".into(),
                    parent: None,
                    position: Vec2::new(40.0, 40.0),
                },
                Command::CreateBlock {
                    name: "move_steps".into(),
                    parent: Some("when_clicked".into()),
                    position: Vec2::new(0.0, 48.0),
                },
                Command::Initialize,
            ],
        ),
        (
            "pick up",
            vec![Command::PickUp {
                block: "when_clicked".into(),
            }],
        ),
        (
            "drag",
            vec![
                Command::TranslateAndScaleGroup {
                    offset: Vec2::ZERO,
                    scale,
                },
                Command::TranslateSurface {
                    offset: Vec2::new(10.0, 20.0),
                },
            ],
        ),
    ];

    for (label, commands) in steps {
        for command in commands {
            check(session.execute(command))?;
        }
        println!("== {label}");
        print_markup(&session);
    }

    if let QueryResult::Translation { offset } = session.query(Query::SurfaceTranslation) {
        println!("== surface translation: ({}, {})", offset.x, offset.y);
    }

    check(session.execute(Command::Drop { destination: None }))?;
    println!("== drop");
    print_markup(&session);
    Ok(())
}

fn check(result: api::CommandResult) -> Result<()> {
    let outcome = StepOutcome::Command(result);
    if outcome.is_error() {
        bail!("demo step failed: {}", serde_json::to_string(&outcome)?);
    }
    Ok(())
}

fn print_markup(session: &DragSession) {
    if let QueryResult::Markup { markup } = session.query(Query::Markup) {
        print!("{markup}");
    }
}
