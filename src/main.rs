use anyhow::Result;
use clap::{Parser, Subcommand};
use crudboard::{ApiClient, Config, ResourceKind, Shell};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "crudboard")]
#[command(author, about = "Crudboard - terminal CRUD board for the dummyjson demo API", long_about = None)]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), env!("CRUDBOARD_VERSION_SUFFIX")))]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Resource view to open first
    #[arg(value_enum, default_value_t = ResourceKind::Todos)]
    resource: ResourceKind,

    /// API base URL (overrides config and CRUDBOARD_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Read configuration from this file instead of the default location
    #[arg(long = "config", value_name = "FILE", global = true)]
    config_file: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective configuration and where it is read from
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "crudboard=debug"
    } else {
        "crudboard=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = match &cli.config_file {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(url) = &cli.base_url {
        config.set_base_url(url)?;
    }
    if cli.no_color {
        config.shell.color = false;
    }
    colored::control::set_override(config.shell.color);

    match cli.command {
        Some(Commands::Config) => {
            let source = cli.config_file.clone().or_else(Config::config_path);
            match source {
                Some(path) => println!("# config file: {}", path.display()),
                None => println!("# config file: (no config directory)"),
            }
            print!("{}", config.to_toml()?);
        }
        None => {
            let client = ApiClient::new(&config.api)?;
            tracing::info!(
                "Opening {} against {}",
                cli.resource,
                client.base_url()
            );
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut shell = Shell::new(cli.resource, Arc::new(client), config, stdin);
            shell.run().await?;
        }
    }

    Ok(())
}
