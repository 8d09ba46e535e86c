mod api;
mod commands;
mod config;
mod server;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process;

use crate::api::ApiClient;
use crate::commands::{
    cmd_add, cmd_chart, cmd_delete, cmd_edit, cmd_goal_clear, cmd_goal_set, cmd_goal_show,
    cmd_list, cmd_show,
};
use crate::config::Config;
use weighin_core::db::Database;
use weighin_core::range::RangeToken;
use weighin_core::units::Unit;

const DEFAULT_LOG_FILTER: &str = "weighin=info,weighin_core=info";

#[derive(Parser)]
#[command(
    name = "weighin",
    version,
    about = "Track body weight in stones, pounds or kilograms"
)]
struct Cli {
    /// Base URL of the weighin API (default: $WEIGHIN_API_URL or http://localhost:8080/api/v1)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
        /// Address to bind to (default: 127.0.0.1, use 0.0.0.0 to expose to network)
        #[arg(short, long, default_value = "127.0.0.1")]
        bind: String,
    },
    /// Log a weight entry
    Add {
        /// Whole stones
        #[arg(allow_hyphen_values = true)]
        stones: String,
        /// Remaining pounds (0 to 13.99)
        #[arg(allow_hyphen_values = true)]
        pounds: String,
        /// Date (YYYY-MM-DD or today/yesterday, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit a weight entry; unspecified fields keep their current values
    Edit {
        /// Weight entry ID
        id: i64,
        /// New stones
        #[arg(long, allow_hyphen_values = true)]
        stones: Option<String>,
        /// New pounds (0 to 13.99)
        #[arg(long, allow_hyphen_values = true)]
        pounds: Option<String>,
        /// New date (YYYY-MM-DD or today/yesterday)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a weight entry by ID
    Delete {
        /// Weight entry ID
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a single weight entry
    Show {
        /// Weight entry ID
        id: i64,
        /// Unit: imperial or metric
        #[arg(short, long, default_value = "imperial")]
        unit: Unit,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List weight entries for a date range
    List {
        /// Range: 7d, 1m, 3m, 6m, 9m, 1y, all
        #[arg(short, long, default_value = "all")]
        range: RangeToken,
        /// Unit: imperial or metric
        #[arg(short, long, default_value = "imperial")]
        unit: Unit,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Chart weight over a date range against the goal
    Chart {
        /// Range: 7d, 1m, 3m, 6m, 9m, 1y, all
        #[arg(short, long, default_value = "all")]
        range: RangeToken,
        /// Unit: imperial or metric
        #[arg(short, long, default_value = "imperial")]
        unit: Unit,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage the goal weight
    Goal {
        #[command(subcommand)]
        command: GoalCommands,
    },
}

#[derive(Subcommand)]
enum GoalCommands {
    /// Show the current goal
    Show {
        /// Unit: imperial or metric
        #[arg(short, long, default_value = "imperial")]
        unit: Unit,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set the goal weight
    Set {
        /// Whole stones
        #[arg(allow_hyphen_values = true)]
        stones: String,
        /// Remaining pounds (0 to 13.99)
        #[arg(allow_hyphen_values = true)]
        pounds: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Clear the goal
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?.with_api_url(cli.api_url);
    let client = || {
        tracing::debug!(api_url = %config.api_url, "using API");
        ApiClient::new(&config.api_url)
    };

    match cli.command {
        Commands::Serve { port, bind } => {
            tracing::info!(path = %config.db_path.display(), "opening database");
            let db = Database::open(&config.db_path)?;
            server::start_server(db, port, &bind, &config.cors_origin).await
        }
        Commands::Add {
            stones,
            pounds,
            date,
            json,
        } => cmd_add(&client()?, stones, pounds, date.as_deref(), json).await,
        Commands::Edit {
            id,
            stones,
            pounds,
            date,
            json,
        } => cmd_edit(&client()?, id, stones, pounds, date.as_deref(), json).await,
        Commands::Delete { id, yes, json } => cmd_delete(&client()?, id, yes, json).await,
        Commands::Show { id, unit, json } => cmd_show(&client()?, id, unit, json).await,
        Commands::List { range, unit, json } => cmd_list(&client()?, unit, range, json).await,
        Commands::Chart { range, unit, json } => cmd_chart(&client()?, unit, range, json).await,
        Commands::Goal { command } => {
            let api = client()?;
            match command {
                GoalCommands::Show { unit, json } => cmd_goal_show(&api, unit, json).await,
                GoalCommands::Set {
                    stones,
                    pounds,
                    json,
                } => cmd_goal_set(&api, stones, pounds, json).await,
                GoalCommands::Clear { yes, json } => cmd_goal_clear(&api, yes, json).await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_parses_with_defaults() {
        let cli = Cli::try_parse_from(["weighin", "serve"]).unwrap();
        match cli.command {
            Commands::Serve { port, bind } => {
                assert_eq!(port, 8080);
                assert_eq!(bind, "127.0.0.1");
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn edit_fields_default_to_unchanged() {
        let cli = Cli::try_parse_from(["weighin", "edit", "3", "--date", "2024-01-12"]).unwrap();
        match cli.command {
            Commands::Edit {
                id,
                stones,
                pounds,
                date,
                json,
            } => {
                assert_eq!(id, 3);
                assert!(stones.is_none());
                assert!(pounds.is_none());
                assert_eq!(date.as_deref(), Some("2024-01-12"));
                assert!(!json);
            }
            _ => panic!("expected edit"),
        }
    }
}
