//! wharf-migrate - apply and inspect the wharf database schema.
//!
//! Usage:
//!   wharf-migrate up
//!   wharf-migrate version --database-url postgres://...
//!   wharf-migrate validate
//!   wharf-migrate create --name add_last_seen

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();

    let cli = Cli::parse();
    let database_url = cli.database_url;

    let outcome = match cli.command {
        Commands::Up => commands::up::run(database_url).await,
        Commands::Version => commands::version::run(database_url).await,
        Commands::Validate => commands::validate::run(database_url).await,
        Commands::Create(args) => commands::create::run(args).map(|_| ()),
    };

    if let Err(err) = outcome {
        print_error(&format!("{err:#}"));
        std::process::exit(1);
    }
    Ok(())
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "→".blue(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "!".yellow().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}
