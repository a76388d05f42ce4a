//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags};
use crate::commands;

/// Build and launch QA boxes on EC2
#[derive(Parser)]
#[command(
    name = "qabox",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Environment directory holding scripts/, images/ and boxes/
    #[arg(long, global = true, env = "W3TCQA_ENV_DIR", default_value = ".")]
    pub env_dir: PathBuf,

    /// Directory for run markers and known hosts [default: <env-dir>/working]
    #[arg(long, global = true, env = "W3TCQA_WORK_DIR")]
    pub work_dir: Option<PathBuf>,

    /// Public key authorized for root on launched instances [default: ~/.ssh/id_rsa.pub]
    #[arg(long, global = true, env = "W3TCQA_PUBLIC_KEY")]
    pub public_key: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build or delete machine images
    #[command(subcommand)]
    Image(commands::image::ImageCommand),

    /// Launch, list, or terminate boxes
    #[command(subcommand, name = "box")]
    Boxes(commands::boxes::BoxCommand),

    /// Wait until an instance accepts remote shell commands
    Wait(commands::wait::WaitArgs),

    /// Inspect run markers
    #[command(subcommand)]
    Marker(commands::marker::MarkerCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            quiet,
            no_color,
            env_dir,
            work_dir,
            public_key,
            command,
        } = self;

        if let Command::Version = command {
            commands::version::run();
            return Ok(ExitCode::SUCCESS);
        }

        let app = AppContext::new(AppFlags {
            no_color,
            quiet,
            env_dir,
            work_dir,
            public_key,
        })?;

        match command {
            Command::Image(cmd) => commands::image::run(&app, cmd).await,
            Command::Boxes(cmd) => commands::boxes::run(&app, cmd).await,
            Command::Wait(args) => commands::wait::run(&app, &args).await,
            Command::Marker(cmd) => Ok(commands::marker::run(&app, &cmd)),
            Command::Version => Ok(ExitCode::SUCCESS),
        }
    }
}
