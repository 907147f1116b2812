//! `roost config`: write or print the configuration file.
//!
//! Runs before the database is opened, so `config init` works on a fresh
//! machine without creating `roost.db`.

use anyhow::{bail, Context};
use clap::Subcommand;
use std::path::PathBuf;

use roost_accounting::RoostConfig;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write the effective configuration to the config file
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration as TOML
    Show,
}

impl ConfigCommand {
    /// `path` is the `--config` option; `None` means the platform default.
    pub fn run(self, config: &RoostConfig, path: Option<PathBuf>) -> anyhow::Result<()> {
        match self {
            ConfigCommand::Init { force } => {
                let path = path
                    .or_else(RoostConfig::default_config_path)
                    .context("no config directory on this platform; pass --config")?;
                if path.exists() && !force {
                    bail!("{} already exists; pass --force to replace it", path.display());
                }
                config
                    .save(Some(path.clone()))
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("Wrote {}", path.display());
            }
            ConfigCommand::Show => {
                print!("{}", config.to_toml()?);
            }
        }
        Ok(())
    }
}
