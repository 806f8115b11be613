//! External knowledge connector
//!
//! Bridges configured knowledge servers into the context aggregator.
//! Every per-server failure is isolated: the failing server is logged and
//! skipped, the remaining servers still contribute, and validation
//! proceeds on whatever context was gathered.

use crate::config::KnowledgeServerConfig;
use crate::context::{SourceContext, SourceType};
use crate::error::Result;
use async_trait::async_trait;
use hazcheck_mcp::{ResourceContents, SessionPool, ToolContent, DEFAULT_CONNECT_TIMEOUT_MS};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Tool invoked for shipment-specific context queries
pub const QUERY_TOOL: &str = "search";

/// Seam between the pipeline and the MCP transport
#[async_trait]
pub trait ContextFetcher: Send + Sync {
    /// Read every resource one server exposes.
    async fn fetch_server(&self, server: &KnowledgeServerConfig) -> Result<Vec<SourceContext>>;

    /// Run the server's query tool against a shipment-specific query.
    async fn query_server(
        &self,
        server: &KnowledgeServerConfig,
        query: &str,
    ) -> Result<Vec<SourceContext>>;
}

/// Production fetcher backed by a shared session pool. The pool is
/// injected by the owner; nothing here reaches for process-global state.
pub struct McpContextFetcher {
    pool: Arc<SessionPool>,
    timeout: Duration,
}

impl McpContextFetcher {
    pub fn new(pool: Arc<SessionPool>) -> Self {
        Self {
            pool,
            timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
        }
    }

    pub fn with_timeout(pool: Arc<SessionPool>, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait]
impl ContextFetcher for McpContextFetcher {
    async fn fetch_server(&self, server: &KnowledgeServerConfig) -> Result<Vec<SourceContext>> {
        let session = self.pool.connect(&server.url, self.timeout).await?;

        let mut contexts = Vec::new();
        for resource in session.list_resources().await? {
            let contents = session.read_resource(&resource.uri).await?;
            let text = flatten_resource_contents(&contents);
            if text.is_empty() {
                continue;
            }
            contexts.push(
                SourceContext::new(
                    format!("{} / {}", server.name, resource.name),
                    SourceType::RemoteServer,
                    text,
                    server.weight,
                )
                .with_uri(resource.uri),
            );
        }
        Ok(contexts)
    }

    async fn query_server(
        &self,
        server: &KnowledgeServerConfig,
        query: &str,
    ) -> Result<Vec<SourceContext>> {
        let session = self.pool.connect(&server.url, self.timeout).await?;
        let result = session
            .call_tool(QUERY_TOOL, json!({ "query": query }))
            .await?;

        let text = flatten_tool_content(&result.content);
        if result.is_error {
            return Err(hazcheck_mcp::McpError::Protocol(format!(
                "query tool reported an error: {text}"
            ))
            .into());
        }
        if text.is_empty() {
            return Ok(Vec::new());
        }

        Ok(vec![SourceContext::new(
            server.name.clone(),
            SourceType::RemoteServer,
            text,
            server.weight,
        )])
    }
}

/// Gather resource context from every server concurrently. Failing
/// servers contribute nothing; the output keeps server order.
pub async fn fetch_context_from_servers(
    fetcher: &dyn ContextFetcher,
    servers: &[KnowledgeServerConfig],
) -> Vec<SourceContext> {
    let fetches = servers.iter().map(|server| async move {
        match fetcher.fetch_server(server).await {
            Ok(contexts) => contexts,
            Err(e) => {
                tracing::warn!(server = %server.name, "skipping knowledge server: {e}");
                Vec::new()
            }
        }
    });
    futures::future::join_all(fetches)
        .await
        .into_iter()
        .flatten()
        .collect()
}

/// Run the query tool against every server concurrently, with the same
/// per-server fault isolation as resource fetching.
pub async fn fetch_tool_context(
    fetcher: &dyn ContextFetcher,
    servers: &[KnowledgeServerConfig],
    query: &str,
) -> Vec<SourceContext> {
    let queries = servers.iter().map(|server| async move {
        match fetcher.query_server(server, query).await {
            Ok(contexts) => contexts,
            Err(e) => {
                tracing::warn!(server = %server.name, "skipping knowledge server query: {e}");
                Vec::new()
            }
        }
    });
    futures::future::join_all(queries)
        .await
        .into_iter()
        .flatten()
        .collect()
}

/// Join a resource's content blocks into one text body. Binary blocks
/// are represented by a placeholder rather than dropped silently.
fn flatten_resource_contents(contents: &[ResourceContents]) -> String {
    contents
        .iter()
        .filter_map(|block| {
            if let Some(text) = &block.text {
                Some(text.clone())
            } else if block.blob.is_some() {
                let mime = block.mime_type.as_deref().unwrap_or("unknown");
                Some(format!("[Binary data: {mime}]"))
            } else {
                None
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn flatten_tool_content(content: &[ToolContent]) -> String {
    content
        .iter()
        .filter_map(|block| match block {
            ToolContent::Text { text } => Some(text.as_str()),
            ToolContent::Other => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}
