pub mod client;
pub mod format;
pub mod query;
pub mod types;

pub use client::{MeetupClient, MeetupClientError};
pub use format::{EventFormatter, DISPLAY_LIMIT};
pub use query::{QueryExtractor, CURRENT_LOCATION};
pub use types::{MeetupConfig, MeetupEvent, SearchQuery};

use std::sync::Arc;
use std::time::Duration;

use indoc::indoc;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        AnnotateAble, CallToolResult, Content, ErrorCode, ErrorData, Implementation,
        ListResourcesResult, PaginatedRequestParams, RawResource, ReadResourceRequestParams,
        ReadResourceResult, ResourceContents, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    tool, tool_handler, tool_router, RoleServer, ServerHandler,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const CONFIG_URI: &str = "meetup://config";
const AUTH_STATUS_URI: &str = "meetup://auth/status";

const NOT_CONFIGURED: &str = "Meetup access token is not configured. \
    Set MEETUP_ACCESS_TOKEN and restart the server to enable event search.";

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchEventsParams {
    /// Natural language search query (e.g. "remote python events near me today").
    pub query: String,
    /// Maximum number of events to request. Defaults to the configured cap.
    #[serde(default)]
    pub max_results: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AugmentPromptParams {
    /// User prompt to augment with relevant event data.
    pub prompt: String,
}

/// Meetup MCP server: natural-language event search over the Meetup REST
/// API, exposed as tools, plus configuration snapshots as resources.
#[derive(Clone)]
pub struct MeetupServer {
    tool_router: ToolRouter<Self>,
    config: MeetupConfig,
    extractor: Arc<QueryExtractor>,
    formatter: EventFormatter,
    client: Option<Arc<MeetupClient>>,
}

impl Default for MeetupServer {
    fn default() -> Self {
        Self::new(MeetupConfig::default())
    }
}

#[tool_router(router = tool_router)]
impl MeetupServer {
    pub fn new(config: MeetupConfig) -> Self {
        let client = match &config.access_token {
            Some(token) => {
                match MeetupClient::new(
                    &config.base_url,
                    token,
                    Duration::from_secs(config.timeout_secs),
                ) {
                    Ok(client) => Some(Arc::new(client)),
                    Err(error) => {
                        tracing::warn!("failed to build meetup client: {error}");
                        None
                    }
                }
            }
            None => {
                tracing::warn!("no meetup access token configured; search tools will report setup steps");
                None
            }
        };

        Self {
            tool_router: Self::tool_router(),
            extractor: Arc::new(QueryExtractor::new(config.max_events_per_query)),
            formatter: EventFormatter::new(),
            client,
            config,
        }
    }

    #[tool(
        name = "search_events",
        description = "Search Meetup events from a natural language query like 'remote python events near me tomorrow'. Understands time phrases (today, tomorrow, this week, next week), locations ('in <place>', 'near me'), online/remote intent, and tech topic keywords. Returns a digest of up to 10 events."
    )]
    pub async fn search_events(
        &self,
        params: Parameters<SearchEventsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let params = params.0;
        if params.query.trim().is_empty() {
            return Err(ErrorData::new(
                ErrorCode::INVALID_PARAMS,
                "Query cannot be empty".to_string(),
                None,
            ));
        }

        let Some(client) = &self.client else {
            return Ok(CallToolResult::success(vec![Content::text(
                NOT_CONFIGURED.to_string(),
            )]));
        };

        let mut query = self.extractor.extract(&params.query);
        if let Some(max_results) = params.max_results.filter(|cap| *cap > 0) {
            query.max_results = max_results;
        }

        match client.search(&query).await {
            Ok(events) => Ok(CallToolResult::success(vec![Content::text(
                self.formatter.format(&events),
            )])),
            Err(error) => Ok(CallToolResult::error(vec![Content::text(format!(
                "Error searching events: {error}"
            ))])),
        }
    }

    #[tool(
        name = "augment_prompt",
        description = "Enhance a user prompt with relevant Meetup event data. Extracts search parameters from the prompt, fetches matching events, and appends a digest under a '=== Relevant Meetup Events ===' section. A failed or unconfigured search degrades to a note, never an error."
    )]
    pub async fn augment_prompt(
        &self,
        params: Parameters<AugmentPromptParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let params = params.0;
        if params.prompt.trim().is_empty() {
            return Err(ErrorData::new(
                ErrorCode::INVALID_PARAMS,
                "Prompt cannot be empty".to_string(),
                None,
            ));
        }

        // Acquisition failures reach the formatter only as an empty list.
        let events = match &self.client {
            Some(client) => {
                let query = self.extractor.extract(&params.prompt);
                client.search(&query).await.unwrap_or_else(|error| {
                    tracing::warn!("event search failed while augmenting prompt: {error}");
                    Vec::new()
                })
            }
            None => Vec::new(),
        };

        Ok(CallToolResult::success(vec![Content::text(
            self.formatter.augment_prompt(&params.prompt, &events),
        )]))
    }

    fn config_snapshot(&self) -> String {
        serde_json::json!({
            "base_url": self.config.base_url,
            "access_token": if self.config.access_token.is_some() { "Set" } else { "Not set" },
            "max_events_per_query": self.config.max_events_per_query,
            "timeout_secs": self.config.timeout_secs,
        })
        .to_string()
    }

    fn auth_snapshot(&self) -> String {
        serde_json::json!({
            "has_access_token": self.config.access_token.is_some(),
            "client_ready": self.client.is_some(),
        })
        .to_string()
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for MeetupServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(
            ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
        )
        .with_server_info(
            Implementation::new("eventscout-meetup", env!("CARGO_PKG_VERSION"))
                .with_title("Meetup Event Search")
                .with_description("Natural-language Meetup event search"),
        )
        .with_instructions(MEETUP_INSTRUCTIONS.to_string())
    }

    async fn list_resources(
        &self,
        _pagination: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        Ok(ListResourcesResult {
            resources: vec![
                RawResource::new(CONFIG_URI.to_string(), "config".to_string()).no_annotation(),
                RawResource::new(AUTH_STATUS_URI.to_string(), "auth-status".to_string())
                    .no_annotation(),
            ],
            next_cursor: None,
            meta: None,
        })
    }

    async fn read_resource(
        &self,
        params: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        let text = match params.uri.as_str() {
            CONFIG_URI => self.config_snapshot(),
            AUTH_STATUS_URI => self.auth_snapshot(),
            other => {
                return Err(ErrorData::new(
                    ErrorCode::INVALID_REQUEST,
                    format!("Resource not found: {other}"),
                    None,
                ))
            }
        };

        Ok(ReadResourceResult::new(vec![
            ResourceContents::TextResourceContents {
                uri: params.uri,
                text,
                mime_type: Some("application/json".to_string()),
                meta: None,
            },
        ]))
    }
}

const MEETUP_INSTRUCTIONS: &str = indoc! {r#"
    Meetup event search over natural language queries.

    Tools:
    - search_events: extract structured parameters (time window, location,
      online intent, topic keywords) from a query like "remote python events
      near me tomorrow" and return a digest of matching events. At most 10
      events are listed; the header reports the full match count.
    - augment_prompt: fetch events relevant to a prompt and append the same
      digest under a "=== Relevant Meetup Events ===" section, ready to pass
      to a language model for recommendations.

    Query phrases that are understood:
    - Time: "today", "tomorrow", "this week", "next week" (first match wins)
    - Location: "in <place>" or "near me" (resolved from the account)
    - Online: "remote", "online", "virtual" restrict results to online events
    - Topics: programming, coding, software, tech, python, javascript,
      data science, machine learning, ai, web development, mobile

    Resources:
    - meetup://config: masked configuration snapshot
    - meetup://auth/status: whether an access token is configured

    A Meetup access token (MEETUP_ACCESS_TOKEN) must be provisioned for the
    search tools to return live data.
"#};
