//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use saam_core::config;

mod commands;

#[derive(Parser)]
#[command(name = "saam")]
#[command(version = "0.1")]
#[command(about = "Gemini chat in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Send one prompt and print the reply
    Exec {
        /// The prompt to send
        #[arg(short, long)]
        prompt: String,

        /// Attach a file (image, PDF, or Word document)
        #[arg(short, long, value_name = "PATH")]
        attach: Option<PathBuf>,

        /// Override the model from config
        #[arg(short, long, env = "SAAM_MODEL")]
        model: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        // config commands run without logging or a loaded config
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },

        Some(Commands::Exec {
            prompt,
            attach,
            model,
        }) => {
            let _log_guard = crate::logging::init().context("init logging")?;
            let mut config = config::Config::load().context("load config")?;
            if let Some(model) = model {
                config.model = model;
            }
            commands::exec::run(&prompt, attach.as_deref(), &config).await
        }

        // default to chat mode
        None => {
            let _log_guard = crate::logging::init().context("init logging")?;
            let config = config::Config::load().context("load config")?;
            commands::chat::run(&config).await
        }
    }
}
