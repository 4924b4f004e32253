//! # Types
//!
//! Shared data structures used across all modules of the PMP protocol.
//!
//! ## Config / State split
//!
//! A `Project` is internally stored as two separate ledger entries:
//!
//! - [`ProjectConfig`]: written once at creation; never mutated.
//! - [`ProjectState`]: written on every settlement that moves funds.
//!
//! The public API exposes the reconstructed [`Project`] struct. Its `status`
//! is derived on load and never stored:
//!
//! ```text
//! Open ──(amount_funded == cap, payout fired)──► Funded
//! ```
//!
//! ## Strategies
//!
//! A contributor's commitment is a [`Strategy`] carrying strongly-typed
//! parameters per kind. [`StrategyKind`] is the numeric tag used in events.

use soroban_sdk::{contracttype, Address, BytesN, String};

/// Lifecycle status of a project, derived from `amount_funded` and `cap`.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProjectStatus {
    /// Accepting pledges and settlements.
    Open,
    /// Cap reached and escrow paid out to the recipient. Terminal.
    Funded,
}

/// Numeric tag of a [`Strategy`].
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum StrategyKind {
    None = 0,
    LumpSum = 1,
    Stream = 2,
    RoundUp = 3,
}

/// Terms of a streaming pledge: `amount_per_period` is due for every whole
/// `period_seconds` elapsed since the last settlement.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StreamTerms {
    pub amount_per_period: i128,
    pub period_seconds: u64,
}

/// A contributor's chosen contribution mode for one project.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Strategy {
    /// Registered interest, never charged.
    None,
    /// One-shot transfer of the given amount, settled at pledge time.
    LumpSum(i128),
    /// Time-based accrual, settled by `execute`.
    Stream(StreamTerms),
    /// Amount supplied per settlement through a [`Payload::RoundUp`].
    RoundUp,
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::None => StrategyKind::None,
            Strategy::LumpSum(_) => StrategyKind::LumpSum,
            Strategy::Stream(_) => StrategyKind::Stream,
            Strategy::RoundUp => StrategyKind::RoundUp,
        }
    }
}

/// Externally computed round-up charge: an opaque reference to the
/// off-chain computation and the amount to pull.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoundUpCharge {
    pub reference: BytesN<32>,
    pub amount: i128,
}

/// Per-contributor settlement data passed to `execute`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Payload {
    Empty,
    RoundUp(RoundUpCharge),
}

/// Strategy store entry, unique per (project, contributor).
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PledgeRecord {
    pub strategy: Strategy,
    /// Running total pulled from this contributor for this project.
    /// Survives strategy replacement.
    pub total_donated: i128,
    /// Ledger timestamp up to which stream accrual has been paid.
    pub last_settled: u64,
    /// Set once a `LumpSum` has been pulled; the record then proposes zero.
    pub lump_sum_settled: bool,
}

/// Immutable project configuration, written once at creation.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectConfig {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub recipient: Address,
    pub asset: Address,
    pub cap: i128,
    pub duration: u64,
}

/// Mutable project state, updated whenever funds move into escrow.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectState {
    pub amount_funded: i128,
}

/// Full on-chain representation of a project.
///
/// Reconstructed from the split `ProjectConfig` + `ProjectState` entries.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Project {
    /// Sequential identifier starting at 0.
    pub id: u64,
    pub name: String,
    pub description: String,
    /// Receives the escrowed balance once the cap is reached.
    pub recipient: Address,
    /// Token contract the project is denominated in.
    pub asset: Address,
    /// Target funding amount.
    pub cap: i128,
    /// Round length in seconds; upper bound for stream periods.
    pub duration: u64,
    /// Funds moved into escrow so far, `0 <= amount_funded <= cap`.
    pub amount_funded: i128,
    pub status: ProjectStatus,
}

impl Project {
    pub fn from_parts(config: ProjectConfig, state: ProjectState) -> Self {
        let status = if state.amount_funded >= config.cap {
            ProjectStatus::Funded
        } else {
            ProjectStatus::Open
        };
        Project {
            id: config.id,
            name: config.name,
            description: config.description,
            recipient: config.recipient,
            asset: config.asset,
            cap: config.cap,
            duration: config.duration,
            amount_funded: state.amount_funded,
            status,
        }
    }
}

impl ProjectConfig {
    /// Room left under the cap given the current state.
    pub fn room(&self, state: &ProjectState) -> i128 {
        self.cap - state.amount_funded
    }
}
