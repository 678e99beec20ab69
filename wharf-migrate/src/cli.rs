//! Command line definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "wharf-migrate")]
#[command(version)]
#[command(about = "Manage the wharf database schema", long_about = None)]
pub struct Cli {
    /// Postgres connection string
    #[arg(long, global = true, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply every pending migration
    Up,

    /// Show the latest applied migration and how many are pending
    Version,

    /// Fail if the database holds migrations this build does not know
    Validate,

    /// Scaffold a new migration file
    Create(CreateArgs),
}

#[derive(Parser, Debug)]
pub struct CreateArgs {
    /// Short snake_case description, e.g. add_last_seen
    #[arg(short, long)]
    pub name: String,

    /// Directory the migration is written to
    #[arg(long, default_value = "src/database/migrations")]
    pub dir: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definitions_are_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn database_url_is_global() {
        let cli = Cli::try_parse_from([
            "wharf-migrate",
            "version",
            "--database-url",
            "postgres://localhost/wharf",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Version));
        assert_eq!(cli.database_url.as_deref(), Some("postgres://localhost/wharf"));
    }

    #[test]
    fn create_requires_name() {
        assert!(Cli::try_parse_from(["wharf-migrate", "create"]).is_err());

        let cli = Cli::try_parse_from(["wharf-migrate", "create", "--name", "add_last_seen"]).unwrap();
        match cli.command {
            Commands::Create(args) => {
                assert_eq!(args.name, "add_last_seen");
                assert_eq!(args.dir, PathBuf::from("src/database/migrations"));
            }
            _ => panic!("expected create"),
        }
    }
}
