use mailer::cli::{Cli, Commands, ConfigAction};
use mailer::commands::{self, resolve_config_dir};
use mailer::error::MailerError;
use mailer::logger::{default_log_dir, initialize as LoggerInitialize, level_for};

use common::ErrorLocation;

use std::fs::create_dir_all;
use std::panic::Location;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), MailerError> {
    let log_dir = cli.log_dir.clone().unwrap_or_else(default_log_dir);

    create_dir_all(&log_dir).map_err(|e| MailerError::Mailer {
        message: format!("Failed to create log directory {}: {e}", log_dir.display()),
        location: ErrorLocation::from(Location::caller()),
    })?;

    // Initialize logger FIRST
    LoggerInitialize(&log_dir, level_for(cli.verbose))?;

    info!("Log directory: {}", log_dir.display());

    let config_dir = resolve_config_dir(cli.config_dir.as_deref())?;

    match cli.command {
        Commands::Send(args) => {
            let message = commands::send::run(&config_dir, &args).await?;
            println!("{message}");
        }
        Commands::Config {
            action: ConfigAction::Init,
        } => {
            let (path, created) = commands::config::init(&config_dir)?;
            if created {
                println!("Wrote {}", path.display());
            } else {
                println!("{} already exists", path.display());
            }
        }
        Commands::Config {
            action: ConfigAction::Show,
        } => {
            print!("{}", commands::config::show(&config_dir)?);
        }
    }

    Ok(())
}
