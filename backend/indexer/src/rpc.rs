//! Soroban RPC client: polls `getEvents` and decodes PMP events.
//!
//! Events are requested with `xdrFormat: "json"`, so topics and bodies arrive
//! as JSON-rendered `ScVal`s (`{"symbol": "payout"}`, `{"i128": "100"}`,
//! `{"map": [{"key": .., "val": ..}]}`). [`normalize`] flattens those into plain
//! JSON before field extraction; older RPCs that already return plain objects
//! pass through unchanged.
//!
//! Failed requests, rate limiting and soft JSON-RPC errors are retried with
//! exponential back-off capped at [`MAX_BACKOFF_SECS`].

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{strategy_name, EventKind, PmpEvent};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

/// JSON-RPC codes that will not succeed on retry.
const HARD_ERROR_CODES: [i64; 3] = [-32600, -32601, -32602];

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawEvent {
    #[serde(alias = "topicJson")]
    pub topic: Vec<Value>,
    #[serde(alias = "valueJson")]
    pub value: Value,
    #[serde(rename = "contractId")]
    pub contract_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    pub ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: Option<String>,
    #[serde(rename = "inSuccessfulContractCall")]
    pub in_successful_contract_call: Option<bool>,
}

/// One page of events plus where to continue from.
#[derive(Debug)]
pub struct EventPage {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    pub latest_ledger: Option<u64>,
}

struct Backoff {
    secs: u64,
}

impl Backoff {
    fn new() -> Self {
        Backoff {
            secs: INITIAL_BACKOFF_SECS,
        }
    }

    async fn wait(&mut self, reason: &str) {
        warn!("{reason} (will retry in {}s)", self.secs);
        tokio::time::sleep(Duration::from_secs(self.secs)).await;
        self.secs = (self.secs * 2).min(MAX_BACKOFF_SECS);
    }
}

// ─────────────────────────────────────────────────────────
// Fetching
// ─────────────────────────────────────────────────────────

/// Fetch a page of contract events, starting at `start_ledger` or continuing
/// from `cursor` when one is given.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_id: &str,
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<EventPage> {
    let request = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "getEvents",
        "params": build_params(contract_id, start_ledger, cursor, limit),
    });
    let mut backoff = Backoff::new();

    loop {
        let resp = match client.post(rpc_url).json(&request).send().await {
            Ok(resp) => resp,
            Err(e) => {
                backoff.wait(&format!("RPC request failed: {e}")).await;
                continue;
            }
        };

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            backoff.wait("Rate-limited by RPC").await;
            continue;
        }

        let body: RpcResponse = resp.json().await?;
        if let Some(err) = body.error {
            if HARD_ERROR_CODES.contains(&err.code) {
                return Err(IndexerError::Rpc {
                    code: err.code,
                    message: err.message,
                });
            }
            backoff
                .wait(&format!("RPC soft error {}: {}", err.code, err.message))
                .await;
            continue;
        }

        let result = body.result.ok_or_else(|| {
            IndexerError::EventParse("Empty result from getEvents".to_string())
        })?;
        debug!(
            "Fetched {} events (latest_ledger={:?})",
            result.events.len(),
            result.latest_ledger
        );
        return Ok(EventPage {
            events: result.events,
            cursor: result.cursor,
            latest_ledger: result.latest_ledger,
        });
    }
}

fn build_params(contract_id: &str, start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    let mut params = json!({
        "filters": [{ "type": "contract", "contractIds": [contract_id] }],
        "pagination": { "limit": limit },
        "xdrFormat": "json",
    });
    match cursor {
        Some(cur) => params["pagination"]["cursor"] = json!(cur),
        None => params["startLedger"] = json!(start_ledger),
    }
    params
}

// ─────────────────────────────────────────────────────────
// Decoding
// ─────────────────────────────────────────────────────────

/// Decode raw RPC events. Events from failed contract calls are dropped:
/// their state changes were rolled back.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<PmpEvent> {
    raw.iter()
        .filter(|e| e.in_successful_contract_call != Some(false))
        .filter_map(|e| decode_single(e, contract_id))
        .collect()
}

fn decode_single(raw: &RawEvent, contract_id: &str) -> Option<PmpEvent> {
    let kind = EventKind::from_topic(&scalar(&normalize(raw.topic.first()?))?);
    let project_id = raw.topic.get(1).and_then(|t| scalar(&normalize(t)));
    let body = normalize(&raw.value);

    let (actor, amount, detail) = match kind {
        EventKind::ProjectCreated => (field(&body, "recipient"), field(&body, "cap"), field(&body, "name")),
        EventKind::PledgeCreated => {
            let strategy = body
                .get("kind")
                .and_then(scalar)
                .and_then(|k| k.parse::<u64>().ok())
                .map(|k| strategy_name(k).to_string());
            (field(&body, "contributor"), field(&body, "upfront"), strategy)
        }
        EventKind::Executed => {
            let charged = body
                .get("contributors")
                .and_then(Value::as_array)
                .map(|c| c.len().to_string());
            (None, field(&body, "total"), charged)
        }
        EventKind::PayoutReleased => (field(&body, "recipient"), field(&body, "amount"), None),
        EventKind::Unknown => (None, None, None),
    };

    Some(PmpEvent {
        event_type: kind.as_str().to_string(),
        project_id,
        actor,
        amount,
        detail,
        ledger: raw.ledger.unwrap_or(0) as i64,
        timestamp: raw
            .ledger_closed_at
            .as_deref()
            .and_then(parse_iso_to_unix)
            .unwrap_or(0),
        contract_id: raw
            .contract_id
            .clone()
            .unwrap_or_else(|| contract_id.to_string()),
        tx_hash: raw.tx_hash.clone(),
    })
}

/// Flatten a JSON-rendered `ScVal` into plain JSON.
///
/// Strings holding JSON (older RPC topic encoding) are parsed first.
pub fn normalize(value: &Value) -> Value {
    match value {
        Value::String(s) if s.starts_with('{') => match serde_json::from_str::<Value>(s) {
            Ok(parsed) => normalize(&parsed),
            Err(_) => value.clone(),
        },
        Value::Array(items) => Value::Array(items.iter().map(normalize).collect()),
        Value::Object(obj) => {
            if let Some(entries) = obj.get("map").and_then(Value::as_array) {
                let mut out = Map::new();
                for entry in entries {
                    if let (Some(k), Some(v)) = (entry.get("key"), entry.get("val")) {
                        if let Some(key) = scalar(&normalize(k)) {
                            out.insert(key, normalize(v));
                        }
                    }
                }
                return Value::Object(out);
            }
            if obj.len() == 1 {
                if let Some(inner) = obj.get("vec") {
                    return normalize(inner);
                }
                if let Some((tag, inner)) = obj.iter().next() {
                    if is_scalar_tag(tag) {
                        return normalize(inner);
                    }
                }
            }
            // Legacy `{"type": .., "value": ..}` rendering.
            if let (Some(_), Some(inner)) = (obj.get("type"), obj.get("value")) {
                return normalize(inner);
            }
            Value::Object(obj.iter().map(|(k, v)| (k.clone(), normalize(v))).collect())
        }
        _ => value.clone(),
    }
}

fn is_scalar_tag(tag: &str) -> bool {
    matches!(
        tag,
        "symbol" | "string" | "address" | "u32" | "i32" | "u64" | "i64" | "u128" | "i128" | "bool"
    )
}

/// Render a flattened scalar as a string.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        // enum-int variants render as a one-element vec
        Value::Array(items) if items.len() == 1 => scalar(&items[0]),
        _ => None,
    }
}

fn field(body: &Value, key: &str) -> Option<String> {
    body.get(key).and_then(scalar)
}

fn parse_iso_to_unix(s: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}
