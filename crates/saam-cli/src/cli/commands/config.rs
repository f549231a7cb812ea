//! Config command handlers.

use anyhow::Result;
use saam_core::config;

pub fn path() {
    println!("{}", config::paths::config_path().display());
}

pub fn init() -> Result<()> {
    let config_path = config::paths::config_path();
    if config_path.exists() {
        anyhow::bail!("config already exists at {}", config_path.display());
    }
    let path = config::Config::init()?;
    println!("Created config at {}", path.display());
    Ok(())
}
