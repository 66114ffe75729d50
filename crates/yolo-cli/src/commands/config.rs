use anyhow::{Context, Result};
use clap::Subcommand;
use yolo_common::StoreConfig;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration as TOML
    Show,
    /// Show the default configuration as TOML
    Default,
}

impl ConfigAction {
    pub fn execute(&self, config: &StoreConfig) -> Result<()> {
        let rendered = match self {
            Self::Show => config.to_toml(),
            Self::Default => StoreConfig::default_toml(),
        }
        .context("Failed to serialize configuration")?;
        print!("{rendered}");
        Ok(())
    }
}
