//! Streaming MCP session over the SSE transport
//!
//! A session opens a long-lived `text/event-stream` GET against the server,
//! waits for the `endpoint` event naming the POST endpoint, then performs the
//! `initialize` handshake. Requests are POSTed to the endpoint and responses
//! arrive over the event stream; correlation is by JSON-RPC id.

use crate::error::{McpError, Result};
use crate::protocol::{
    JsonRpcRequest, JsonRpcResponse, ListResourcesResult, ReadResourceResult, Resource,
    ResourceContents, ToolCallResult, PROTOCOL_VERSION,
};
use crate::sse::{drain_events, SseEvent};
use futures::{Stream, StreamExt};
use reqwest::Url;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

type PendingMap = HashMap<u64, oneshot::Sender<JsonRpcResponse>>;

/// `None` once the session is closed; taking the map drops all pending
/// senders so waiting callers observe `McpError::Closed`.
type Pending = Arc<Mutex<Option<PendingMap>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// One established connection to a knowledge server.
///
/// Sessions are read-only once established; concurrent readers share them
/// behind `Arc` without further synchronization.
#[derive(Debug)]
pub struct McpSession {
    http: reqwest::Client,
    endpoint: Url,
    url: String,
    pending: Pending,
    next_id: AtomicU64,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl McpSession {
    /// Open a session, racing the full handshake against `timeout`.
    ///
    /// On timeout the partially-opened transport is dropped, which closes
    /// the underlying connection; nothing is leaked on any failure path.
    pub async fn connect(
        http: &reqwest::Client,
        url: &str,
        timeout: Duration,
    ) -> Result<Arc<McpSession>> {
        match tokio::time::timeout(timeout, Self::open(http, url)).await {
            Ok(result) => result,
            Err(_) => Err(McpError::Timeout(url.to_string())),
        }
    }

    async fn open(http: &reqwest::Client, url: &str) -> Result<Arc<McpSession>> {
        let base = Url::parse(url)
            .map_err(|e| McpError::Protocol(format!("invalid server URL {url}: {e}")))?;

        let response = http
            .get(base.clone())
            .header("Accept", "text/event-stream")
            .send()
            .await
            .map_err(|e| classify_connect_error(url, e))?;

        if !response.status().is_success() {
            return Err(McpError::Protocol(format!(
                "server returned HTTP {} opening event stream",
                response.status()
            )));
        }

        let mut stream = response.bytes_stream();
        let mut buf = String::new();

        // The server's first event names the POST endpoint for this session.
        let endpoint = 'endpoint: loop {
            for event in next_events(&mut stream, &mut buf).await? {
                if event.event == "endpoint" {
                    break 'endpoint resolve_endpoint(&base, &event.data)?;
                }
            }
        };

        // Initialize must round-trip before the session is usable. The
        // stream is driven inline here so that a dropped (timed-out) open
        // tears the connection down with it.
        let init = JsonRpcRequest::new(
            1,
            "initialize",
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": {
                    "name": "hazcheck",
                    "version": env!("CARGO_PKG_VERSION"),
                },
            }),
        );
        post_message(http, &endpoint, &init).await?;

        'init: loop {
            for event in next_events(&mut stream, &mut buf).await? {
                if let Some(response) = parse_message(&event) {
                    if response.id == Some(1) {
                        if let Some(err) = response.error {
                            return Err(McpError::Server {
                                code: err.code,
                                message: err.message,
                            });
                        }
                        break 'init;
                    }
                }
            }
        }

        post_message(
            http,
            &endpoint,
            &JsonRpcRequest::notification("notifications/initialized", Value::Null),
        )
        .await?;

        tracing::debug!(url, "knowledge server session established");

        let pending: Pending = Arc::new(Mutex::new(Some(HashMap::new())));
        let reader = tokio::spawn(read_loop(stream, buf, Arc::clone(&pending)));

        Ok(Arc::new(McpSession {
            http: http.clone(),
            endpoint,
            url: url.to_string(),
            pending,
            next_id: AtomicU64::new(2),
            reader: Mutex::new(Some(reader)),
        }))
    }

    /// Server URL this session was opened against
    pub fn server_url(&self) -> &str {
        &self.url
    }

    /// Issue a JSON-RPC request and wait for the correlated response.
    pub async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();

        {
            let mut guard = lock(&self.pending);
            let Some(map) = guard.as_mut() else {
                return Err(McpError::Closed);
            };
            map.insert(id, tx);
        }

        let request = JsonRpcRequest::new(id, method, params);
        if let Err(e) = post_message(&self.http, &self.endpoint, &request).await {
            if let Some(map) = lock(&self.pending).as_mut() {
                map.remove(&id);
            }
            return Err(e);
        }

        let response = rx.await.map_err(|_| McpError::Closed)?;
        if let Some(err) = response.error {
            return Err(McpError::Server {
                code: err.code,
                message: err.message,
            });
        }
        response
            .result
            .ok_or_else(|| McpError::Protocol("response carries neither result nor error".into()))
    }

    /// Enumerate the server's resource handles.
    pub async fn list_resources(&self) -> Result<Vec<Resource>> {
        let result = self.request("resources/list", Value::Null).await?;
        let parsed: ListResourcesResult = serde_json::from_value(result)?;
        Ok(parsed.resources)
    }

    /// Read one resource's content blocks.
    pub async fn read_resource(&self, uri: &str) -> Result<Vec<ResourceContents>> {
        let result = self
            .request("resources/read", json!({ "uri": uri }))
            .await?;
        let parsed: ReadResourceResult = serde_json::from_value(result)?;
        Ok(parsed.contents)
    }

    /// Invoke a named tool with JSON arguments.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolCallResult> {
        let result = self
            .request("tools/call", json!({ "name": name, "arguments": arguments }))
            .await?;
        let parsed: ToolCallResult = serde_json::from_value(result)?;
        Ok(parsed)
    }

    /// Tear the session down: stop the reader and fail all pending calls.
    pub fn close(&self) {
        if let Some(handle) = lock(&self.reader).take() {
            handle.abort();
        }
        lock(&self.pending).take();
    }
}

impl Drop for McpSession {
    fn drop(&mut self) {
        self.close();
    }
}

fn classify_connect_error(url: &str, error: reqwest::Error) -> McpError {
    if error.is_connect() {
        McpError::ConnectionRefused(url.to_string())
    } else if error.is_timeout() {
        McpError::Timeout(url.to_string())
    } else {
        McpError::Http(error)
    }
}

/// Resolve the endpoint event payload against the stream URL. Servers may
/// send either an absolute URL or a path relative to their origin.
fn resolve_endpoint(base: &Url, data: &str) -> Result<Url> {
    base.join(data.trim())
        .map_err(|e| McpError::Protocol(format!("invalid endpoint {data}: {e}")))
}

fn parse_message(event: &SseEvent) -> Option<JsonRpcResponse> {
    if event.event != "message" {
        return None;
    }
    match serde_json::from_str(&event.data) {
        Ok(response) => Some(response),
        Err(e) => {
            tracing::debug!("ignoring non-response event on stream: {e}");
            None
        }
    }
}

async fn post_message(
    http: &reqwest::Client,
    endpoint: &Url,
    message: &JsonRpcRequest,
) -> Result<()> {
    let response = http.post(endpoint.clone()).json(message).send().await?;
    if !response.status().is_success() {
        return Err(McpError::Protocol(format!(
            "endpoint returned HTTP {}",
            response.status()
        )));
    }
    Ok(())
}

async fn next_events<S, C>(stream: &mut S, buf: &mut String) -> Result<Vec<SseEvent>>
where
    S: Stream<Item = reqwest::Result<C>> + Unpin,
    C: AsRef<[u8]>,
{
    loop {
        let Some(chunk) = stream.next().await else {
            return Err(McpError::Closed);
        };
        let chunk = chunk.map_err(McpError::Http)?;
        buf.push_str(&String::from_utf8_lossy(chunk.as_ref()));
        let events = drain_events(buf);
        if !events.is_empty() {
            return Ok(events);
        }
    }
}

async fn read_loop<S, C>(mut stream: S, mut buf: String, pending: Pending)
where
    S: Stream<Item = reqwest::Result<C>> + Unpin,
    C: AsRef<[u8]>,
{
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        buf.push_str(&String::from_utf8_lossy(chunk.as_ref()));

        for event in drain_events(&mut buf) {
            let Some(response) = parse_message(&event) else {
                continue;
            };
            let Some(id) = response.id else { continue };

            let sender = lock(&pending).as_mut().and_then(|map| map.remove(&id));
            if let Some(tx) = sender {
                let _ = tx.send(response);
            }
        }
    }

    // Stream ended: fail everything still waiting.
    lock(&pending).take();
}
