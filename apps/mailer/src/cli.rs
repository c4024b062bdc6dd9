//! Command-line arguments.

use mailer_core::{EmailRequest, PathPayload};

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

/// Launch the local mail service, send one email, and stop it again.
#[derive(Debug, Parser)]
#[command(name = "mailer", about = "Send email through a bundled local mail service", version)]
pub struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding mailer.toml (defaults to the platform config dir).
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Directory for mailer.log.
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Send a single email.
    Send(SendArgs),

    /// Inspect or create the configuration file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Write a default mailer.toml if none exists.
    Init,

    /// Print the effective configuration.
    Show,
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("payload").required(true).args(["executable", "script_dir"])))]
pub struct SendArgs {
    /// Recipient address.
    #[arg(long)]
    pub to: String,

    #[arg(long)]
    pub subject: String,

    /// Plain-text body.
    #[arg(long)]
    pub text: String,

    /// HTML body.
    #[arg(long, default_value = "")]
    pub html: String,

    /// Standalone service executable to run.
    #[arg(long, value_name = "PATH")]
    pub executable: Option<PathBuf>,

    /// Directory containing the service scripts.
    #[arg(long, value_name = "DIR", requires = "entry")]
    pub script_dir: Option<PathBuf>,

    /// Entry script, relative to --script-dir.
    #[arg(long, value_name = "FILE", requires = "script_dir")]
    pub entry: Option<PathBuf>,

    /// Interpreter for --entry.
    #[arg(long, default_value = "python3")]
    pub interpreter: String,
}

impl SendArgs {
    pub fn request(&self) -> EmailRequest {
        EmailRequest::new(&self.to, &self.subject, &self.text, &self.html)
    }

    /// The payload named by `--executable` or `--script-dir`/`--entry`.
    ///
    /// `None` only when clap's argument group was bypassed.
    pub fn payload(&self) -> Option<PathPayload> {
        match (&self.executable, &self.script_dir, &self.entry) {
            (Some(path), _, _) => Some(PathPayload::executable(path)),
            (None, Some(dir), Some(entry)) => {
                Some(PathPayload::script_dir(dir, entry, &self.interpreter))
            }
            _ => None,
        }
    }
}
