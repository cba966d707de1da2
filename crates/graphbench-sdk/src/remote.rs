//! RemoteClient: network client for a running Gremlin Server
//!
//! Scripts are posted to the server's HTTP endpoint and the GraphSON
//! response is decoded into [`GraphValue`]s.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as Json;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::client::{GraphClient, IndexAdmin};
use crate::error::{is_transport_failure, ClientError, ClientResult};
use crate::models::{ElementType, GraphValue};
use crate::traversal::{IdFormat, Traversal};

/// Admin procedure used for index creation when none is configured
pub const DEFAULT_INDEX_PROCEDURE: &str = "aerospike.graph.admin.index.create";

/// Where and how to reach the server
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub host: String,
    pub port: u16,
    pub tls: bool,
    /// HTTP path of the Gremlin endpoint
    pub path: String,
    /// Deadline for a whole request
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Procedure invoked through `g.call(...)` to create an index
    pub index_procedure: String,
    /// Type of the store's element ids
    pub id_format: IdFormat,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8182,
            tls: false,
            path: "/".to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
            index_procedure: DEFAULT_INDEX_PROCEDURE.to_string(),
            id_format: IdFormat::default(),
        }
    }
}

impl ConnectOptions {
    /// Endpoint URL, e.g. `http://127.0.0.1:8182/gremlin`
    pub fn url(&self) -> String {
        let scheme = if self.tls { "https" } else { "http" };
        let path = self.path.trim_start_matches('/');
        format!("{}://{}:{}/{}", scheme, self.host, self.port, path)
    }
}

/// Network client that talks to a Gremlin Server over HTTP.
pub struct RemoteClient {
    url: String,
    http_client: Client,
    timeout: Duration,
    index_procedure: String,
    id_format: IdFormat,
    closed: AtomicBool,
}

impl RemoteClient {
    /// Build the HTTP client and verify the server answers a trivial script.
    ///
    /// # Example
    /// ```no_run
    /// # use graphbench_sdk::{ConnectOptions, RemoteClient};
    /// # async fn demo() -> graphbench_sdk::ClientResult<()> {
    /// let client = RemoteClient::connect(ConnectOptions::default()).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(options: ConnectOptions) -> ClientResult<Self> {
        let http_client = Client::builder()
            .timeout(options.timeout)
            .connect_timeout(options.connect_timeout)
            .build()?;
        let client = Self {
            url: options.url(),
            http_client,
            timeout: options.timeout,
            index_procedure: options.index_procedure,
            id_format: options.id_format,
            closed: AtomicBool::new(false),
        };
        client.ping().await?;
        tracing::debug!("connected to {}", client.url);
        Ok(client)
    }

    /// Endpoint this client posts to
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Submit a raw Gremlin-Groovy script and decode the response
    pub async fn submit(&self, script: &str) -> ClientResult<Vec<GraphValue>> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ClientError::ConnectionError("client is closed".to_string()));
        }
        let body = serde_json::json!({ "gremlin": script, "language": "gremlin-groovy" });

        let response = self
            .http_client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.classify(e))?;

        if status.is_success() {
            let json: Json = serde_json::from_str(&text)?;
            decode_response(&json)
        } else {
            Err(ClientError::QueryError(error_message(&text, status.as_u16())))
        }
    }

    fn classify(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout(self.timeout)
        } else if is_transport_failure(&err) {
            ClientError::ConnectionError(format!("{}: {}", self.url, err))
        } else {
            ClientError::HttpError(err)
        }
    }
}

#[async_trait]
impl GraphClient for RemoteClient {
    async fn execute(&self, traversal: &Traversal) -> ClientResult<Vec<GraphValue>> {
        self.submit(&traversal.to_gremlin_with(self.id_format)).await
    }

    async fn ping(&self) -> ClientResult<()> {
        let out = self.submit("g.inject(1)").await?;
        match out.first().and_then(GraphValue::as_i64) {
            Some(1) => Ok(()),
            _ => Err(ClientError::ProtocolError(format!(
                "unexpected ping answer: {:?}",
                out
            ))),
        }
    }

    async fn close(&self) -> ClientResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl IndexAdmin for RemoteClient {
    async fn create_index(&self, element: ElementType, property_key: &str) -> ClientResult<()> {
        let script = index_script(&self.index_procedure, element, property_key);
        match self.submit(&script).await {
            Ok(_) => Ok(()),
            Err(ClientError::QueryError(msg)) if msg.to_lowercase().contains("already exist") => {
                tracing::debug!("{} index on '{}' already exists", element, property_key);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

fn index_script(procedure: &str, element: ElementType, property_key: &str) -> String {
    format!(
        "g.call('{}').with('element_type','{}').with('property_key','{}').next()",
        escape(procedure),
        element,
        escape(property_key)
    )
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Pull the most specific error message out of an error body
fn error_message(body: &str, status: u16) -> String {
    let parsed: Option<Json> = serde_json::from_str(body).ok();
    let msg = parsed.as_ref().and_then(|j| {
        j.get("message")
            .and_then(Json::as_str)
            .or_else(|| j.pointer("/status/message").and_then(Json::as_str))
            .map(str::to_string)
    });
    match msg {
        Some(m) if !m.is_empty() => m,
        _ if body.trim().is_empty() => format!("server returned HTTP {}", status),
        _ => format!("server returned HTTP {}: {}", status, body.trim()),
    }
}

/// Decode a full server response into the flat list of emitted values
pub fn decode_response(json: &Json) -> ClientResult<Vec<GraphValue>> {
    if let Some(code) = json.pointer("/status/code").and_then(Json::as_u64) {
        // 204 is "no content": a traversal that emitted nothing.
        if code == 204 {
            return Ok(Vec::new());
        }
        if !(200..300).contains(&code) {
            let msg = json
                .pointer("/status/message")
                .and_then(Json::as_str)
                .unwrap_or("script failed");
            return Err(ClientError::QueryError(msg.to_string()));
        }
    }
    let data = json
        .pointer("/result/data")
        .ok_or_else(|| ClientError::ProtocolError("response has no result.data".to_string()))?;
    match decode_graphson(data)? {
        GraphValue::List(items) => Ok(items),
        GraphValue::Null => Ok(Vec::new()),
        other => Ok(vec![other]),
    }
}

/// Decode one GraphSON (1.0, 2.0 or 3.0) value
pub fn decode_graphson(json: &Json) -> ClientResult<GraphValue> {
    match json {
        Json::Null => Ok(GraphValue::Null),
        Json::Bool(b) => Ok(GraphValue::Boolean(*b)),
        Json::Number(n) => Ok(number(n)),
        Json::String(s) => Ok(GraphValue::String(s.clone())),
        Json::Array(items) => items
            .iter()
            .map(decode_graphson)
            .collect::<ClientResult<Vec<_>>>()
            .map(GraphValue::List),
        Json::Object(obj) => match (obj.get("@type").and_then(Json::as_str), obj.get("@value")) {
            (Some(kind), Some(value)) => decode_typed(kind, value),
            _ => decode_untyped_object(obj),
        },
    }
}

fn number(n: &serde_json::Number) -> GraphValue {
    match n.as_i64() {
        Some(i) => GraphValue::Integer(i),
        None => GraphValue::Float(n.as_f64().unwrap_or(f64::NAN)),
    }
}

fn decode_typed(kind: &str, value: &Json) -> ClientResult<GraphValue> {
    match kind {
        "g:List" | "g:Set" | "g:BulkSet" => {
            let items = value
                .as_array()
                .ok_or_else(|| protocol(kind, value))?;
            if kind == "g:BulkSet" {
                return decode_bulk_set(items);
            }
            items
                .iter()
                .map(decode_graphson)
                .collect::<ClientResult<Vec<_>>>()
                .map(GraphValue::List)
        }
        "g:Map" => {
            // GraphSON 3 maps are flat [k1, v1, k2, v2, ...] arrays.
            let items = value
                .as_array()
                .ok_or_else(|| protocol(kind, value))?;
            let mut map = BTreeMap::new();
            for pair in items.chunks(2) {
                let [k, v] = pair else {
                    return Err(protocol(kind, value));
                };
                map.insert(map_key(&decode_graphson(k)?), decode_graphson(v)?);
            }
            Ok(GraphValue::Map(map))
        }
        "g:Int32" | "g:Int64" => value
            .as_i64()
            .map(GraphValue::Integer)
            .ok_or_else(|| protocol(kind, value)),
        "g:Float" | "g:Double" => value
            .as_f64()
            .map(GraphValue::Float)
            .ok_or_else(|| protocol(kind, value)),
        "g:Date" | "g:Timestamp" => value
            .as_i64()
            .map(GraphValue::Integer)
            .ok_or_else(|| protocol(kind, value)),
        "g:UUID" | "g:T" | "g:Direction" => value
            .as_str()
            .map(|s| GraphValue::String(s.to_string()))
            .ok_or_else(|| protocol(kind, value)),
        "g:Vertex" | "g:Edge" => {
            let id = value
                .get("id")
                .map(decode_graphson)
                .transpose()?
                .and_then(|v| v.as_element_id())
                .ok_or_else(|| protocol(kind, value))?;
            let label = value
                .get("label")
                .and_then(Json::as_str)
                .unwrap_or_default()
                .to_string();
            Ok(if kind == "g:Vertex" {
                GraphValue::Vertex { id, label }
            } else {
                GraphValue::Edge { id, label }
            })
        }
        "g:VertexProperty" | "g:Property" => value
            .get("value")
            .map(decode_graphson)
            .unwrap_or(Ok(GraphValue::Null)),
        "g:Traverser" => value
            .get("value")
            .map(decode_graphson)
            .unwrap_or(Ok(GraphValue::Null)),
        // Unknown extension types: keep the payload.
        _ => decode_graphson(value),
    }
}

/// Most values a single bulk set may expand to
pub const MAX_BULK_SET_VALUES: u64 = 1_000_000;

/// Expand a bulk set `[v1, bulk1, v2, bulk2, ...]` into repeated values
fn decode_bulk_set(items: &[Json]) -> ClientResult<GraphValue> {
    let mut out = Vec::new();
    let mut total: u64 = 0;
    for pair in items.chunks(2) {
        let value = decode_graphson(&pair[0])?;
        let bulk = match pair.get(1) {
            Some(b) => decode_graphson(b)?.as_i64().unwrap_or(1),
            None => 1,
        };
        let bulk = u64::try_from(bulk).unwrap_or(0);
        total = total.saturating_add(bulk);
        if total > MAX_BULK_SET_VALUES {
            return Err(ClientError::ProtocolError(format!(
                "bulk set expands beyond {} values",
                MAX_BULK_SET_VALUES
            )));
        }
        out.extend(std::iter::repeat(value).take(bulk as usize));
    }
    Ok(GraphValue::List(out))
}

/// GraphSON 1 elements are untyped objects with a `type` discriminator
fn decode_untyped_object(obj: &serde_json::Map<String, Json>) -> ClientResult<GraphValue> {
    let element = obj.get("type").and_then(Json::as_str);
    if let (Some(kind @ ("vertex" | "edge")), Some(id)) = (element, obj.get("id")) {
        let id = decode_graphson(id)?
            .as_element_id()
            .ok_or_else(|| ClientError::ProtocolError(format!("bad {} id", kind)))?;
        let label = obj
            .get("label")
            .and_then(Json::as_str)
            .unwrap_or_default()
            .to_string();
        return Ok(if kind == "vertex" {
            GraphValue::Vertex { id, label }
        } else {
            GraphValue::Edge { id, label }
        });
    }
    let mut map = BTreeMap::new();
    for (k, v) in obj {
        map.insert(k.clone(), decode_graphson(v)?);
    }
    Ok(GraphValue::Map(map))
}

fn map_key(key: &GraphValue) -> String {
    match key {
        GraphValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn protocol(kind: &str, value: &Json) -> ClientError {
    ClientError::ProtocolError(format!("malformed {}: {}", kind, value))
}
