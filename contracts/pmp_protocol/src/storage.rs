//! # Storage
//!
//! Typed helpers over Soroban's two storage tiers used by PMP.
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key            | Type  | Description                       |
//! |----------------|-------|-----------------------------------|
//! | `ProjectCount` | `u64` | Auto-increment project ID counter |
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                     | Type            | Description                     |
//! |-------------------------|-----------------|---------------------------------|
//! | `ProjConfig(id)`        | `ProjectConfig` | Immutable project configuration |
//! | `ProjState(id)`         | `ProjectState`  | Funded amount                   |
//! | `Pledge(id, address)`   | `PledgeRecord`  | Strategy store entry            |
//!
//! Settlement rewrites `ProjState` and `Pledge` entries for every contributor
//! charged, so both are kept small; `ProjConfig` carries the strings and is
//! only read.

use soroban_sdk::{contracttype, Address, Env};

use crate::types::{PledgeRecord, Project, ProjectConfig, ProjectState};
use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Global auto-increment counter for project IDs (Instance).
    ProjectCount,
    /// Immutable project configuration keyed by ID (Persistent).
    ProjConfig(u64),
    /// Mutable project state keyed by ID (Persistent).
    ProjState(u64),
    /// Pledge record keyed by project ID and contributor (Persistent).
    Pledge(u64, Address),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

/// Number of projects created so far; also the next ID to assign.
pub fn project_count(env: &Env) -> u64 {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::ProjectCount)
        .unwrap_or(0)
}

/// Reads, increments, and stores the project counter.
/// Returns the ID to use for the *current* project (pre-increment value).
pub fn get_and_increment_project_id(env: &Env) -> u64 {
    let current = project_count(env);
    env.storage()
        .instance()
        .set(&DataKey::ProjectCount, &(current + 1));
    current
}

// ── Persistent Storage Helpers ───────────────────────────────────────

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

/// Save the configuration and an empty state for a new project.
pub fn save_new_project(env: &Env, config: &ProjectConfig) {
    let config_key = DataKey::ProjConfig(config.id);
    env.storage().persistent().set(&config_key, config);
    bump_persistent(env, &config_key);
    save_project_state(env, config.id, &ProjectState { amount_funded: 0 });
}

/// Load the full `Project` by combining config and state.
pub fn load_project(env: &Env, id: u64) -> Result<Project, Error> {
    let config = load_project_config(env, id)?;
    let state = load_project_state(env, id)?;
    Ok(Project::from_parts(config, state))
}

pub fn load_project_config(env: &Env, id: u64) -> Result<ProjectConfig, Error> {
    let key = DataKey::ProjConfig(id);
    let config: ProjectConfig = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(Error::UnknownProject)?;
    bump_persistent(env, &key);
    Ok(config)
}

pub fn load_project_state(env: &Env, id: u64) -> Result<ProjectState, Error> {
    let key = DataKey::ProjState(id);
    let state: ProjectState = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(Error::UnknownProject)?;
    bump_persistent(env, &key);
    Ok(state)
}

pub fn save_project_state(env: &Env, id: u64, state: &ProjectState) {
    let key = DataKey::ProjState(id);
    env.storage().persistent().set(&key, state);
    bump_persistent(env, &key);
}

// ── Strategy Store ───────────────────────────────────────────────────

pub fn load_pledge(env: &Env, project_id: u64, contributor: &Address) -> Option<PledgeRecord> {
    let key = DataKey::Pledge(project_id, contributor.clone());
    let record: Option<PledgeRecord> = env.storage().persistent().get(&key);
    if record.is_some() {
        bump_persistent(env, &key);
    }
    record
}

pub fn save_pledge(env: &Env, project_id: u64, contributor: &Address, record: &PledgeRecord) {
    let key = DataKey::Pledge(project_id, contributor.clone());
    env.storage().persistent().set(&key, record);
    bump_persistent(env, &key);
}
