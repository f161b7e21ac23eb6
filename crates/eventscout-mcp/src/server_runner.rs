use anyhow::Result;
use clap::ValueEnum;
use rmcp::{transport::stdio, ServiceExt};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum McpCommand {
    Meetup,
}

impl McpCommand {
    pub fn name(&self) -> &str {
        match self {
            McpCommand::Meetup => "meetup",
        }
    }
}

/// Serve an MCP server over stdio until the client disconnects.
pub async fn serve<S>(server: S) -> Result<()>
where
    S: rmcp::ServerHandler,
{
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("serving error: {:?}", e);
    })?;

    service.waiting().await?;

    Ok(())
}
