//! Per-project funding view folded from indexed events.
//!
//! Amounts are `i128` on-chain and stored as decimal strings; they are summed
//! here rather than in SQL so nothing is truncated to SQLite's 64-bit integers.

use serde::Serialize;

use crate::events::{EventKind, EventRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FundingSummary {
    pub project_id: String,
    pub recipient: Option<String>,
    pub cap: Option<String>,
    /// Sum of settled totals from `executed` events.
    pub settled: String,
    /// Funds pulled by lump-sum pledges at pledge time, from the `upfront`
    /// field of `pledged` events.
    pub pledged_upfront: String,
    pub pledges: usize,
    pub batches: usize,
    pub paid_out: Option<String>,
    pub status: &'static str,
}

/// Fold a project's events (in ledger order) into a [`FundingSummary`].
pub fn summarize(project_id: &str, events: &[EventRecord]) -> FundingSummary {
    let mut recipient = None;
    let mut cap = None;
    let mut settled: i128 = 0;
    let mut pledged_upfront: i128 = 0;
    let mut pledges = 0;
    let mut batches = 0;
    let mut paid_out = None;

    for ev in events {
        match EventKind::from_stored(&ev.event_type) {
            EventKind::ProjectCreated => {
                recipient = ev.actor.clone();
                cap = ev.amount.clone();
            }
            EventKind::PledgeCreated => {
                pledges += 1;
                pledged_upfront += parse_amount(ev.amount.as_deref());
            }
            EventKind::Executed => {
                batches += 1;
                settled += parse_amount(ev.amount.as_deref());
            }
            EventKind::PayoutReleased => paid_out = ev.amount.clone(),
            EventKind::Unknown => {}
        }
    }

    let status = if paid_out.is_some() { "funded" } else { "open" };

    FundingSummary {
        project_id: project_id.to_string(),
        recipient,
        cap,
        settled: settled.to_string(),
        pledged_upfront: pledged_upfront.to_string(),
        pledges,
        batches,
        paid_out,
        status,
    }
}

fn parse_amount(raw: Option<&str>) -> i128 {
    raw.and_then(|s| s.parse().ok()).unwrap_or(0)
}
