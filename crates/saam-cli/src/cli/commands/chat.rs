//! Chat command handler.

use std::io::{IsTerminal, Read};

use anyhow::{Context, Result};
use saam_core::config::Config;

use crate::modes;

pub async fn run(config: &Config) -> Result<()> {
    // If stdin is piped, run exec mode instead
    if !std::io::stdin().is_terminal() {
        let mut prompt = String::new();
        std::io::stdin().lock().read_to_string(&mut prompt)?;
        let prompt = prompt.trim();
        if prompt.is_empty() {
            anyhow::bail!("No input provided via pipe");
        }
        return modes::run_exec(prompt, None, config).await;
    }

    modes::run_interactive_chat(config)
        .await
        .context("interactive chat failed")
}
