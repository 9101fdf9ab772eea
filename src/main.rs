use anyhow::Result;
use clap::Parser;
use framedump::cli::{self, Cli, Commands};
use framedump::config::DumpConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // init-config must work even when the existing file is missing or broken.
    let config = match cli.command {
        Commands::InitConfig { .. } => DumpConfig::default(),
        _ => cli.load_config()?,
    };

    // Logs go to stderr so rendered dumps on stdout stay clean.
    let verbosity = cli.verbose.max(config.verbosity);
    tracing_subscriber::fmt()
        .with_env_filter(config.clone().with_verbosity(verbosity).env_filter())
        .with_writer(std::io::stderr)
        .init();

    cli::run(cli, config)
}
