//! Config command - show or initialise the config file

use anyhow::{Context, Result, bail};
use clap::Args;
use macroconv_core::config::{self, Config};
use std::path::PathBuf;

use crate::convert::load_config;

/// Arguments for the config command
#[derive(Args)]
pub struct ConfigArgs {
    /// Write a config file with default values
    #[arg(long)]
    pub init: bool,

    /// Overwrite an existing file with --init
    #[arg(long)]
    pub force: bool,

    /// Config file to use instead of the default one
    #[arg(long)]
    pub file: Option<PathBuf>,
}

/// Execute the config command
pub fn execute(args: ConfigArgs) -> Result<()> {
    let path = match args.file.clone().or_else(config::config_path) {
        Some(path) => path,
        None => bail!("No config directory available on this platform"),
    };

    if args.init {
        if path.exists() && !args.force {
            bail!("{} already exists (use --force to overwrite)", path.display());
        }
        config::save_to(&path, &Config::default())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    println!("Config file: {}", path.display());
    if path.exists() {
        let current = load_config(Some(&path))?;
        print!("{}", toml::to_string_pretty(&current)?);
    } else {
        println!("(not created yet, defaults in use; run `macroconv config --init`)");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("macroconv").join("config.toml");
        let args = |force| ConfigArgs {
            init: true,
            force,
            file: Some(path.clone()),
        };

        execute(args(false)).unwrap();
        assert_eq!(config::load_from(&path).unwrap(), Config::default());

        assert!(execute(args(false)).is_err());
        execute(args(true)).unwrap();
    }

    #[test]
    fn test_show_reports_broken_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[convert]\ndefault_target = 5\n").unwrap();

        let args = ConfigArgs {
            init: false,
            force: false,
            file: Some(path),
        };
        assert!(execute(args).is_err());
    }
}
