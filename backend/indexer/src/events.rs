//! Event shapes emitted by the PMP contract, as seen by the indexer.
//!
//! Mirrors `contracts/pmp_protocol/src/events.rs`: every contract event has
//! topics `(symbol, project_id)` and a struct body.

use serde::{Deserialize, Serialize};

/// Recognised contract event kinds, keyed by their leading topic symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// `created`: a project was registered.
    ProjectCreated,
    /// `pledged`: a contributor chose or replaced a strategy.
    PledgeCreated,
    /// `executed`: one project's share of a settlement batch.
    Executed,
    /// `payout`: the cap was reached and escrow went to the recipient.
    PayoutReleased,
    Unknown,
}

impl EventKind {
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "created" => Self::ProjectCreated,
            "pledged" => Self::PledgeCreated,
            "executed" => Self::Executed,
            "payout" => Self::PayoutReleased,
            _ => Self::Unknown,
        }
    }

    /// Identifier stored in the `event_type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProjectCreated => "project_created",
            Self::PledgeCreated => "pledge_created",
            Self::Executed => "executed",
            Self::PayoutReleased => "payout_released",
            Self::Unknown => "unknown",
        }
    }

    pub fn from_stored(value: &str) -> Self {
        match value {
            "project_created" => Self::ProjectCreated,
            "pledge_created" => Self::PledgeCreated,
            "executed" => Self::Executed,
            "payout_released" => Self::PayoutReleased,
            _ => Self::Unknown,
        }
    }
}

/// Strategy tag carried by `pledged` events, rendered for storage.
pub fn strategy_name(kind: u64) -> &'static str {
    match kind {
        0 => "none",
        1 => "lump_sum",
        2 => "stream",
        3 => "round_up",
        _ => "unknown",
    }
}

/// A decoded event, ready to be stored.
///
/// * `actor`: recipient for `created`/`payout`, contributor for `pledged`.
/// * `amount`: cap, settled total, or payout amount (decimal i128 string).
/// * `detail`: strategy name for `pledged`, charged-contributor count for `executed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PmpEvent {
    pub event_type: String,
    pub project_id: Option<String>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub detail: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// A stored event row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_type: String,
    pub project_id: Option<String>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub detail: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}
