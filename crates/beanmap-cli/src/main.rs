//! beanmap CLI - JSON codec generator
//!
//! Commands:
//! - `beanmap generate` - Generate mapper implementations and their codecs
//! - `beanmap check` - Validate a type table and configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod check;
mod generate;
mod input;

#[derive(Parser)]
#[command(name = "beanmap")]
#[command(author, version, about = "JSON codec generator for bean types", long_about = None)]
struct Cli {
    /// Log level filter (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate mapper implementations and every codec they need
    Generate {
        /// Path to the JSON type table
        #[arg(short, long)]
        types: PathBuf,

        /// Path to a TOML configuration merged over the defaults
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Mapper interface to generate (repeatable; default: every mapper in the table)
        #[arg(short, long = "mapper")]
        mappers: Vec<String>,

        /// Output directory for generated sources
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Validate a type table and configuration
    Check {
        /// Path to the JSON type table
        #[arg(short, long)]
        types: PathBuf,

        /// Path to a TOML configuration merged over the defaults
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn init_logging(level: &str) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Generate {
            types,
            config,
            mappers,
            output,
        } => {
            generate::run(&types, config.as_deref(), &mappers, &output)?;
        }
        Commands::Check { types, config } => {
            check::run(&types, config.as_deref())?;
        }
    }

    Ok(())
}
