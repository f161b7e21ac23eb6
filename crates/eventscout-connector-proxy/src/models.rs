//! Configuration and wire types for the connector proxy.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const APIFY_LUMA_ENDPOINT: &str =
    "https://mcp.apify.com/?actors=lexis-solutions/lu-ma-scraper";
pub const APIFY_PARSERA_ENDPOINT: &str = "https://mcp.apify.com/?actors=parsera-labs/parsera";
pub const EXA_ENDPOINT: &str = "https://mcp.exa.ai/mcp";

#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    pub apify_token: String,
    pub exa_api_key: String,
    pub host: String,
    pub port: u16,
    pub timeout_secs: u64,
}

impl ConnectorConfig {
    /// Create a ConnectorConfig from environment variables. Both upstream
    /// credentials are required.
    pub fn from_env() -> anyhow::Result<Self> {
        let apify_token = std::env::var("APIFY_API_TOKEN")
            .map_err(|_| anyhow::anyhow!("APIFY_API_TOKEN environment variable not set"))?;
        let exa_api_key = std::env::var("EXA_API_KEY")
            .map_err(|_| anyhow::anyhow!("EXA_API_KEY environment variable not set"))?;

        let host = std::env::var("CONNECTOR_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("CONNECTOR_PORT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(8000);
        let timeout_secs = std::env::var("CONNECTOR_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(60);

        Ok(Self {
            apify_token,
            exa_api_key,
            host,
            port,
            timeout_secs,
        })
    }

    /// Upstream registry in declaration order. Tool names are re-exposed
    /// under `{prefix}_` on the aggregated surface.
    pub fn upstreams(&self) -> Vec<Upstream> {
        vec![
            Upstream {
                prefix: "apify_luma".to_string(),
                url: APIFY_LUMA_ENDPOINT.to_string(),
                bearer: Some(self.apify_token.clone()),
            },
            Upstream {
                prefix: "apify_parsera".to_string(),
                url: APIFY_PARSERA_ENDPOINT.to_string(),
                bearer: Some(self.apify_token.clone()),
            },
            Upstream {
                prefix: "exa".to_string(),
                url: format!("{}?exaApiKey={}", EXA_ENDPOINT, self.exa_api_key),
                bearer: None,
            },
        ]
    }
}

/// A remote MCP endpoint the proxy forwards to.
#[derive(Debug, Clone)]
pub struct Upstream {
    pub prefix: String,
    pub url: String,
    pub bearer: Option<String>,
}

impl Upstream {
    pub fn prefixed(&self, tool: &str) -> String {
        format!("{}_{}", self.prefix, tool)
    }

    /// Strip this upstream's prefix from an aggregated tool name.
    pub fn strip<'a>(&self, tool: &'a str) -> Option<&'a str> {
        tool.strip_prefix(&self.prefix)
            .and_then(|rest| rest.strip_prefix('_'))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}
