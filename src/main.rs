use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use log::LevelFilter;
use slimzip::commands::{config_cmd::ConfigOptions, plan::PlanOptions, run::RunOptions};
use slimzip::commands::{execute_config, execute_plan, execute_run};
use slimzip::error::AppError;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    if let Err(err) = run(cli) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Commands::Run(args) => {
            let options = RunOptions {
                config_path: cli.config,
                packages: args.packages,
                verbose: cli.verbose,
            };
            execute_run(options)?;
        }
        Commands::Plan(args) => {
            let options = PlanOptions { config_path: cli.config, packages: args.packages };
            execute_plan(options)?;
        }
        Commands::Config(args) => {
            let options = ConfigOptions {
                config_path: cli.config,
                show_path: args.path,
                init: args.init,
                edit: args.edit,
            };
            execute_config(options)?;
        }
    }

    Ok(())
}

fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.format_timestamp(None).target(env_logger::Target::Stderr).init();
}

#[derive(Parser)]
#[command(
    name = "slimzip",
    version,
    about = "Trim packaged cloud-function archives down to what each function needs."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the configuration file (defaults to ./slimzip.toml).
    #[arg(long = "config", value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Log every step and list what was removed.
    #[arg(short, long, action = ArgAction::SetTrue, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors.
    #[arg(short, long, action = ArgAction::SetTrue, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Unzip, trim, reinstall dependencies and rezip the named packages.
    #[command(visible_alias = "rn")]
    Run(RunArgs),
    /// Show what `run` would do without touching any archive.
    #[command(visible_alias = "pl")]
    Plan(PlanArgs),
    /// Locate, create or edit the configuration file.
    #[command(visible_alias = "cfg")]
    Config(ConfigArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Packages to process (defaults to every configured package).
    #[arg(value_name = "PACKAGE", num_args = 0..)]
    packages: Vec<String>,
}

#[derive(Args)]
struct PlanArgs {
    /// Packages to describe (defaults to every configured package).
    #[arg(value_name = "PACKAGE", num_args = 0..)]
    packages: Vec<String>,
}

#[derive(Args)]
struct ConfigArgs {
    /// Show the configuration file path.
    #[arg(long = "path", action = ArgAction::SetTrue)]
    path: bool,

    /// Write a starter configuration if none exists.
    #[arg(long = "init", action = ArgAction::SetTrue)]
    init: bool,

    /// Open the configuration file in $EDITOR.
    #[arg(long = "edit", action = ArgAction::SetTrue)]
    edit: bool,
}
