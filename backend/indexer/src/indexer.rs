//! Background task polling the Soroban RPC and storing decoded PMP events.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::Config;
use crate::db::{self, Cursor};
use crate::errors::Result;
use crate::rpc;

pub struct IndexerState {
    pub pool: SqlitePool,
    pub config: Config,
    pub client: Client,
}

/// Poll until `shutdown` is cancelled. The cursor is persisted after every
/// poll, so a restart resumes where the last run stopped.
pub async fn run(state: Arc<IndexerState>, shutdown: CancellationToken) {
    info!("Indexer starting, contract: {}", state.config.contract_id);

    let mut cursor = match db::load_cursor(&state.pool).await {
        Ok(saved) if saved.last_ledger > 0 => saved,
        Ok(_) => Cursor {
            last_ledger: i64::from(state.config.start_ledger),
            paging: None,
        },
        Err(e) => {
            error!("Could not load cursor, starting from config: {e}");
            Cursor {
                last_ledger: i64::from(state.config.start_ledger),
                paging: None,
            }
        }
    };
    info!("Resuming from ledger {}", cursor.last_ledger);

    loop {
        match poll_once(&state.pool, &state.client, &state.config, &cursor).await {
            Ok(next) => cursor = next,
            Err(e) => error!("Indexer poll error: {e}"),
        }

        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("Indexer stopped at ledger {}", cursor.last_ledger);
                return;
            }
            _ = tokio::time::sleep(Duration::from_secs(state.config.poll_interval_secs)) => {}
        }
    }
}

/// One poll: fetch a page, store what decodes, and advance the cursor.
async fn poll_once(
    pool: &SqlitePool,
    client: &Client,
    config: &Config,
    cursor: &Cursor,
) -> Result<Cursor> {
    let start_ledger = u32::try_from(cursor.last_ledger).unwrap_or(config.start_ledger);
    let page = rpc::fetch_events(
        client,
        &config.rpc_url,
        &config.contract_id,
        start_ledger,
        cursor.paging.as_deref(),
        config.events_per_page,
    )
    .await?;

    if !page.events.is_empty() {
        let decoded = rpc::decode_events(&page.events, &config.contract_id);
        let inserted = db::insert_events(pool, &decoded).await?;
        info!(
            "Polled {} raw events, {} new records stored",
            page.events.len(),
            inserted
        );
    }

    let next = next_cursor(cursor, page.latest_ledger, page.cursor);
    db::save_cursor(pool, &next).await?;
    Ok(next)
}

/// The ledger only moves forward; the paging token is replaced wholesale.
fn next_cursor(current: &Cursor, latest_ledger: Option<u64>, paging: Option<String>) -> Cursor {
    let latest = latest_ledger
        .and_then(|l| i64::try_from(l).ok())
        .unwrap_or(current.last_ledger);
    Cursor {
        last_ledger: latest.max(current.last_ledger),
        paging,
    }
}
