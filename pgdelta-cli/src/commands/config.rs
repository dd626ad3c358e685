//! `pgdelta config` - config template, inspection, and validation.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use serde_yaml::Value;

use pgdelta_core::Config;

const TEMPLATE: &str = "\
# pgdelta configuration: the two databases to compare.
source:
  username: source_user
  password: source_password
  server: localhost
  database: source_db
target:
  username: target_user
  password: target_password
  server: localhost
  database: target_db
";

const REDACTED: &str = "********";

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a template config file
    Init {
        #[arg(long, default_value = "config.yml", value_name = "PATH")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective config with environment overrides applied (passwords redacted)
    Show {
        #[arg(long, short = 'c', default_value = "config.yml", value_name = "PATH")]
        config: String,

        #[arg(long = "env-prefix", value_name = "PREFIX")]
        env_prefix: Option<String>,
    },
    /// Validate that both connection sections are complete
    Check {
        #[arg(long, short = 'c', default_value = "config.yml", value_name = "PATH")]
        config: String,

        #[arg(long = "env-prefix", value_name = "PREFIX")]
        env_prefix: Option<String>,
    },
}

pub fn run_config(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommand::Init { path, force } => {
            if path.exists() && !force {
                bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            fs::write(&path, TEMPLATE)?;
            println!("wrote {}", path.display());
        }
        ConfigCommand::Show { config, env_prefix } => {
            let mut config = Config::load_with_env(&config, env_prefix.as_deref())?;
            for section in ["source", "target"] {
                let path = format!("{section}.password");
                if config.exists(&[&path]) {
                    config.set(&path, Value::from(REDACTED));
                }
            }
            print!("{}", serde_yaml::to_string(config.as_value())?);
        }
        ConfigCommand::Check { config, env_prefix } => {
            let config = Config::load_with_env(&config, env_prefix.as_deref())?;
            for section in ["source", "target"] {
                config.connection(section)?;
            }
            println!("config ok: source and target sections complete");
        }
    }
    Ok(())
}
