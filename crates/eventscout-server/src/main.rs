use std::sync::Arc;

use clap::{Parser, Subcommand};
use eventscout_connector_proxy::{start_proxy_server, ConnectorConfig};
use eventscout_mcp::meetup::MeetupConfig;
use eventscout_mcp::{serve, McpCommand, MeetupServer};
use eventscout_server::scrapers::{EventScraper, EventbriteScraper};
use eventscout_server::store::EventStore;
use eventscout_server::{config::Settings, logging, routes, state::AppState};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the event discovery web server
    Web,
    /// Run an MCP server over stdio
    Mcp {
        #[arg(value_enum)]
        name: McpCommand,
    },
    /// Run the connector proxy aggregating remote MCP endpoints
    Connector,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Web) {
        Commands::Web => {
            logging::setup_logging()?;
            run_web().await
        }
        Commands::Mcp { name } => {
            let _guard = logging::setup_file_logging(&format!("mcp-{}", name.name()))?;
            match name {
                McpCommand::Meetup => serve(MeetupServer::new(MeetupConfig::from_env())).await,
            }
        }
        Commands::Connector => {
            logging::setup_logging()?;
            let config = ConnectorConfig::from_env()?;
            let port = start_proxy_server(config).await?;
            tracing::info!("connector proxy running on port {port}; Ctrl-C to stop");
            tokio::signal::ctrl_c().await?;
            Ok(())
        }
    }
}

async fn run_web() -> anyhow::Result<()> {
    let settings = Settings::from_env();
    let store = EventStore::connect(&settings.database_url).await?;

    let scrapers: Vec<Box<dyn EventScraper>> = vec![Box::new(EventbriteScraper::new(
        settings.eventbrite_api_key.clone(),
    ))];

    let state = Arc::new(AppState {
        settings: settings.clone(),
        store,
        scrapers,
    });

    let app = routes::configure(state);
    let listener = tokio::net::TcpListener::bind((settings.host.as_str(), settings.port)).await?;
    tracing::info!(
        "Event discovery server listening on {}",
        listener.local_addr()?
    );
    axum::serve(listener, app).await?;

    Ok(())
}
