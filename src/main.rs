//! hanbok: serve and inspect the sample route tree.
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!   Client Request     │  http::HttpServer (request id, trace,        │
//!   ───────────────────┼─▶ timeout, body limit)                       │
//!                      │        │                                     │
//!                      │        ▼                                     │
//!                      │  router::AxumRouter ─▶ dispatch pipeline     │
//!                      │                          │                   │
//!                      │                          ▼                   │
//!   Client Response    │                  app::AppHandlers            │
//!   ◀──────────────────┼──── ResponseSink ◀─ sample_resource / pages  │
//!                      └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use hanbok_routes::app::route_defs;
use hanbok_routes::config::{load_config, ServerConfig};
use hanbok_routes::lifecycle::startup;
use hanbok_routes::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "hanbok")]
#[command(about = "Typed route server for the hanbok sample app", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve,
    /// List every route with its method and composed path
    Routes {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration
    ShowConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    init_logging(config.observability.log_filter.as_deref());

    match cli.command {
        Commands::Serve => {
            tracing::info!("hanbok v{} starting", env!("CARGO_PKG_VERSION"));
            startup::start(config).await?;
            tracing::info!("Shutdown complete");
        }
        Commands::Routes { json } => {
            let leaves = route_defs()?.leaves(&config.routes.prefix);
            if json {
                println!("{}", serde_json::to_string_pretty(&leaves)?);
            } else {
                for leaf in leaves {
                    println!("{:<6} {:<45} {}", leaf.method.as_str(), leaf.path, leaf.name);
                }
            }
        }
        Commands::ShowConfig => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
