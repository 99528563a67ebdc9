use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use kismet_watchlist::actions::{self, GenerateOptions, GenerateOutcome};
use kismet_watchlist::config::Settings;
use kismet_watchlist::watchlist::{DirectiveChange, FileChange, RuleFileChange};

#[derive(Parser)]
#[command(name = "kismet_watchlist")]
#[command(about = "Generate Kismet target alerts from a Kismet survey database")]
struct Cli {
    /// Kismet config directory to use (repeatable, searched in order)
    #[arg(long = "config-dir", global = true)]
    config_dirs: Vec<PathBuf>,

    /// Directory for the per-category target files
    #[arg(long, global = true)]
    targets_dir: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify a survey and install target alerts for its devices
    Generate {
        /// Kismet survey database (.kismet)
        database: PathBuf,

        /// Earlier survey whose devices are excluded
        #[arg(long)]
        baseline: Option<PathBuf>,

        /// Do not write the per-category target files
        #[arg(long)]
        no_files: bool,

        /// Print the rules instead of installing them
        #[arg(long)]
        dry_run: bool,

        /// Print a JSON summary of the extracted fingerprints
        #[arg(long)]
        json: bool,
    },
    /// Remove the per-category target files
    Clean,
    /// Install target alerts from existing per-category target files
    AddTargets,
    /// Remove the target alert include and rule file
    Delete,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    let settings = Settings::from_env()
        .with_config_dirs(cli.config_dirs)
        .with_targets_dir(cli.targets_dir);

    match run(cli.command, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError: {}\x1b[0m", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Generate {
            database,
            baseline,
            no_files,
            dry_run,
            json,
        } => {
            let options = GenerateOptions {
                survey: database,
                baseline,
                no_files,
                dry_run,
            };
            let outcome = actions::generate(&options, settings)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome.snapshot().summary())?);
            }
            match outcome {
                GenerateOutcome::DryRun { rules, .. } => print!("{}", rules),
                GenerateOutcome::Installed { emit, .. } => {
                    if emit.directive == DirectiveChange::AlreadyPresent {
                        println!("Include already present in {}", emit.config_dir.display());
                    }
                    println!(
                        "\x1b[32mConfiguration updated in {} ({} rules)\x1b[0m",
                        emit.config_dir.display(),
                        emit.rules_written
                    );
                }
            }
        }
        Command::Clean => {
            for (path, change) in actions::clean(settings) {
                match change {
                    FileChange::Removed => println!("Removed {}", path.display()),
                    FileChange::AlreadyAbsent => println!("Already absent: {}", path.display()),
                }
            }
        }
        Command::AddTargets => {
            let emit = actions::add_targets(settings)?;
            println!(
                "\x1b[32mConfiguration updated in {} ({} rules)\x1b[0m",
                emit.config_dir.display(),
                emit.rules_written
            );
        }
        Command::Delete => {
            let retract = actions::delete_targets(settings)?;
            match retract.directive {
                DirectiveChange::Removed => {
                    println!("Removed include from {}", retract.config_dir.display())
                }
                _ => println!("Include already absent in {}", retract.config_dir.display()),
            }
            match retract.rule_file {
                RuleFileChange::Removed => println!("Deleted target rule file"),
                RuleFileChange::AlreadyAbsent => println!("Target rule file already absent"),
            }
        }
    }
    Ok(())
}
