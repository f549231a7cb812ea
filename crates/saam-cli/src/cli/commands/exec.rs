//! Exec command handler.

use std::path::Path;

use anyhow::Result;
use saam_core::config::Config;

use crate::modes;

pub async fn run(prompt: &str, attach: Option<&Path>, config: &Config) -> Result<()> {
    let attachment = attach.map(modes::load_attachment).transpose()?;
    modes::run_exec(prompt, attachment, config).await
}
