mod logging;
mod player;
mod settings;

use std::error::Error as StdError;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use schemaguard_altercheck::{AlterCheckError, MigrationLayout, PlayerError, PreviousDbAgent};
use schemaguard_core::{DatabaseSchema, Error as CoreError, validate_schema};
use schemaguard_policy::{PolicyError, check_schema_policy};
use thiserror::Error;

use logging::init_logging;
use player::CommandPlayer;
use settings::{Settings, load_settings};

#[derive(Debug, Error)]
enum CliError {
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid schema json: {0}")]
    SchemaJson(#[from] serde_json::Error),
    #[error("invalid settings: {0}")]
    Settings(#[from] toml::de::Error),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("policy error: {0}")]
    Policy(#[from] PolicyError),
    #[error(transparent)]
    AlterCheck(#[from] AlterCheckError),
    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

#[derive(Parser, Debug)]
#[command(name = "schemaguard", version, about = "Schema policy checks and previous-schema checkpoints")]
struct Cli {
    /// Settings file; defaults to ./schemaguard.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Append JSON log lines to this file instead of logging to stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a schema against the configured policy statements.
    Check(CheckArgs),
    /// Manage previous-schema archives and markers.
    Previous(PreviousArgs),
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Schema JSON file.
    #[arg(long)]
    schema: PathBuf,
    /// Column every table must carry for `hasCommonColumn` (repeatable).
    #[arg(long = "common-column", value_name = "COLUMN")]
    common_columns: Vec<String>,
}

#[derive(Args, Debug)]
struct PreviousArgs {
    /// Overrides `alter_check.migration_dir`.
    #[arg(long)]
    migration_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: PreviousCommand,
}

#[derive(Subcommand, Debug)]
enum PreviousCommand {
    /// Print the latest previous archive and its date token.
    Latest,
    /// Extract the latest previous archive.
    Extract,
    /// Delete the extracted previous resource, keeping archives.
    Clean,
    /// Write the previous NG mark.
    MarkNg {
        #[arg(long)]
        notice: String,
    },
    /// Write the previous OK mark.
    MarkOk {
        #[arg(long)]
        notice: String,
    },
    /// Extract the latest archive and replay it with an external program.
    Rollback {
        /// Program run with the previous directory as its last argument.
        #[arg(long)]
        player: String,
        /// Arguments passed to the player before the directory.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

enum Outcome {
    Clean,
    Violations,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(Outcome::Clean) => ExitCode::SUCCESS,
        Ok(Outcome::Violations) => ExitCode::from(1),
        Err(err) => {
            tracing::error!(event = "run_failed", error = %err);
            eprintln!("error: {err}");
            let mut source = StdError::source(&err);
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<Outcome, CliError> {
    init_logging(cli.log_file.as_deref())?;
    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Command::Check(args) => run_check(&settings, args),
        Command::Previous(args) => run_previous(&settings, args),
    }
}

fn run_check(settings: &Settings, args: CheckArgs) -> Result<Outcome, CliError> {
    let mut schema = read_schema(&args.schema)?;
    validate_schema(&schema)?;
    if !args.common_columns.is_empty() {
        schema.apply_common_columns(&args.common_columns);
    }

    let report = check_schema_policy(&schema, &settings.policy)?;
    for violation in &report.violations {
        println!("{violation}");
    }

    if report.is_ok() {
        Ok(Outcome::Clean)
    } else {
        Ok(Outcome::Violations)
    }
}

fn read_schema(path: &Path) -> Result<DatabaseSchema, CliError> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        context: format!("failed to read schema: {}", path.display()),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}

fn run_previous(settings: &Settings, args: PreviousArgs) -> Result<Outcome, CliError> {
    let mut alter_check = settings.alter_check.clone();
    if let Some(migration_dir) = args.migration_dir {
        alter_check.migration_dir = migration_dir;
    }
    let layout = MigrationLayout::from_settings(&alter_check);

    match args.command {
        PreviousCommand::Latest => {
            let agent = PreviousDbAgent::new(layout, no_player);
            match agent.find_latest_previous_archive()? {
                Some(archive) => {
                    let date = agent.layout().previous_date_token(&archive).unwrap_or_default();
                    println!("{}\t{date}", archive.display());
                }
                None => print_no_archive(agent.layout()),
            }
        }
        PreviousCommand::Extract => {
            let agent = PreviousDbAgent::new(layout, no_player);
            if !agent.extract_previous_resource()? {
                print_no_archive(agent.layout());
            }
        }
        PreviousCommand::Clean => {
            PreviousDbAgent::new(layout, no_player).delete_extracted_previous_resource()?;
        }
        PreviousCommand::MarkNg { notice } => {
            PreviousDbAgent::new(layout, no_player).mark_previous_ng(&notice)?;
        }
        PreviousCommand::MarkOk { notice } => {
            PreviousDbAgent::new(layout, no_player).mark_previous_ok(&notice)?;
        }
        PreviousCommand::Rollback { player, args } => {
            let agent = PreviousDbAgent::new(layout, CommandPlayer::new(player, args));
            if !agent.rollback_previous_schema()? {
                print_no_archive(agent.layout());
            }
        }
    }
    Ok(Outcome::Clean)
}

fn print_no_archive(layout: &MigrationLayout) {
    println!("no previous archive under {}", layout.previous_dir().display());
}

fn no_player(_: &Path) -> Result<(), PlayerError> {
    Err("no player configured".into())
}
