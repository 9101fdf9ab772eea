//! Command-line interface for framedump.
//!
//! `render` turns a recorded JSON snapshot into a dump document; `init-config`
//! writes the example configuration file.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::{ConfigError, DumpConfig};
use crate::dump::{DumpTarget, Dumper};
use crate::snapshot::Snapshot;
use crate::util::paths::config_path;

/// framedump - readable dumps of call stacks, locals and error chains
#[derive(Debug, Parser)]
#[command(name = "framedump")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: <config dir>/framedump/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// More logging on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render a JSON stack snapshot
    Render {
        /// Snapshot file
        snapshot: PathBuf,

        /// Only dump frames from this package
        #[arg(long, short, value_name = "PACKAGE")]
        package: Option<String>,

        /// Append the dump to this file instead of printing it
        #[arg(long, short, value_name = "PATH", conflicts_with = "temp")]
        output: Option<PathBuf>,

        /// Write the dump to a new temporary file
        #[arg(long)]
        temp: bool,
    },

    /// Write the example config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Load the config named by `--config`, or the default one if it exists.
    pub fn load_config(&self) -> Result<DumpConfig, ConfigError> {
        match &self.config {
            Some(path) => DumpConfig::load_from(path),
            None => DumpConfig::try_load(),
        }
    }
}

/// Execute a parsed command with its effective config.
pub fn run(cli: Cli, config: DumpConfig) -> Result<()> {
    match cli.command {
        Commands::Render {
            snapshot,
            package,
            output,
            temp,
        } => {
            let mut config = config;
            if package.is_some() {
                config.package_name = package;
            }
            let target = match output {
                Some(path) => Some(DumpTarget::Path(path)),
                None if temp => Some(DumpTarget::Temp),
                None => None,
            };
            render(&snapshot, config, target)
        }
        Commands::InitConfig { force } => {
            let path = cli.config.unwrap_or_else(config_path);
            DumpConfig::write_example(&path, force)
                .with_context(|| format!("Failed to write config to {}", path.display()))?;
            eprintln!("Wrote example config to {}", path.display());
            Ok(())
        }
    }
}

fn render(snapshot_path: &Path, config: DumpConfig, target: Option<DumpTarget>) -> Result<()> {
    let snapshot = Snapshot::read_from(snapshot_path)
        .with_context(|| format!("Failed to load snapshot {}", snapshot_path.display()))?;
    let stack = snapshot.stack();
    let exception = snapshot.exception();
    let dumper = Dumper::new(config);

    match target {
        Some(target) => {
            let report = dumper
                .dump_to(&target, &stack, exception.as_ref())
                .context("Failed to write dump")?;
            if let Some(notice) = report.notice() {
                eprint!("{notice}");
            }
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            dumper
                .write_to(&mut out, &stack, exception.as_ref())
                .context("Failed to write dump to stdout")?;
            out.flush()?;
        }
    }
    Ok(())
}
