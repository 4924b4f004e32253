//! # Events
//!
//! Every notification is published with a two-element topic
//! `(symbol, project_id)` and a `#[contracttype]` struct as data, so the
//! off-chain indexer can filter by project without decoding the body.
//!
//! | Topic      | Data              | Emitted by                         |
//! |------------|-------------------|------------------------------------|
//! | `created`  | [`ProjectCreated`] | `create_project`                  |
//! | `pledged`  | [`PledgeCreated`]  | `pledge`                          |
//! | `executed` | [`Executed`]       | `execute`, once per project       |
//! | `payout`   | [`PayoutReleased`] | settlement, when the cap is hit   |

use soroban_sdk::{contracttype, symbol_short, Address, Env, String, Vec};

use crate::types::StrategyKind;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectCreated {
    pub project_id: u64,
    pub recipient: Address,
    pub name: String,
    pub description: String,
    pub cap: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PledgeCreated {
    pub project_id: u64,
    pub contributor: Address,
    pub kind: StrategyKind,
    /// Pulled into escrow by the pledge itself; non-zero only for a lump sum.
    pub upfront: i128,
}

/// Summary of one project's share of an `execute` batch. Only contributors
/// that were actually charged appear, in processing order.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Executed {
    pub project_id: u64,
    pub contributors: Vec<Address>,
    pub amounts: Vec<i128>,
    pub total: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PayoutReleased {
    pub project_id: u64,
    pub recipient: Address,
    pub amount: i128,
}

pub fn emit_project_created(env: &Env, event: ProjectCreated) {
    env.events()
        .publish((symbol_short!("created"), event.project_id), event);
}

pub fn emit_pledge_created(
    env: &Env,
    project_id: u64,
    contributor: Address,
    kind: StrategyKind,
    upfront: i128,
) {
    env.events().publish(
        (symbol_short!("pledged"), project_id),
        PledgeCreated {
            project_id,
            contributor,
            kind,
            upfront,
        },
    );
}

pub fn emit_executed(env: &Env, event: Executed) {
    env.events()
        .publish((symbol_short!("executed"), event.project_id), event);
}

pub fn emit_payout(env: &Env, project_id: u64, recipient: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("payout"), project_id),
        PayoutReleased {
            project_id,
            recipient,
            amount,
        },
    );
}
