use clap::Parser;
use tracing_subscriber::EnvFilter;

use pl_cli::cli::{Cli, Command, ConfigCommand};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Default to the interactive chat when no subcommand is given.
        None => {
            init_cli_tracing();
            let (config, _) = pl_cli::cli::load_config()?;
            pl_cli::cli::chat::chat(&config, None).await
        }
        Some(Command::Chat { user }) => {
            init_cli_tracing();
            let (config, _) = pl_cli::cli::load_config()?;
            pl_cli::cli::chat::chat(&config, user).await
        }
        Some(Command::Register { name }) => {
            init_cli_tracing();
            let (config, _) = pl_cli::cli::load_config()?;
            pl_cli::cli::account::register(&config, &name).await
        }
        Some(Command::Online) => {
            init_cli_tracing();
            let (config, _) = pl_cli::cli::load_config()?;
            pl_cli::cli::account::online(&config).await
        }
        Some(Command::Config(ConfigCommand::Validate)) => {
            let (config, config_path) = pl_cli::cli::load_config()?;
            let valid = pl_cli::cli::config::validate(&config, &config_path);
            if !valid {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Show)) => {
            let (config, config_path) = pl_cli::cli::load_config()?;
            pl_cli::cli::config::show(&config, &config_path)
        }
        Some(Command::Version) => {
            println!("parley {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Initialize compact stderr-only tracing.
///
/// Defaults to `warn` level so diagnostic output does not pollute the chat.
fn init_cli_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
