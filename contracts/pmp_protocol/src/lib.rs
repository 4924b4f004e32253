//! # PMP Protocol Contract
//!
//! Root crate of the **Perpetual Motion Protocol (PMP)**: capped crowdfunding
//! where contributors commit to a project under one of several strategies and
//! a batched settlement moves what is due into escrow, paying the escrow out
//! to the project's recipient once the cap is reached.
//!
//! | Phase        | Entry Point(s)                                  |
//! |--------------|-------------------------------------------------|
//! | Registration | [`PerpetualMotionProtocol::create_project`]     |
//! | Pledging     | [`PerpetualMotionProtocol::pledge`]             |
//! | Settlement   | [`PerpetualMotionProtocol::execute`]            |
//! | Queries      | `project_counter`, `get_project`, `get_pledge`, `remaining`, `pending_amount` |
//!
//! ## Architecture
//!
//! Storage access is delegated to [`storage`], amount arithmetic to
//! [`accrual`], fund movement and payout to [`settlement`], and notification
//! shapes to [`events`]. This file holds the entry points only.
//!
//! Every entry point returns `Result<_, Error>`. A returned error makes the
//! host discard every storage write and token transfer of the invocation, so
//! each call either applies fully or not at all.

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, Address, Env, String, Vec};

mod accrual;
pub mod events;
mod settlement;
mod storage;
mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_events;

use storage::{
    get_and_increment_project_id, load_pledge, load_project, load_project_config,
    load_project_state, project_count, save_new_project, save_pledge, save_project_state,
};
pub use types::{
    Payload, PledgeRecord, Project, ProjectStatus, RoundUpCharge, Strategy, StrategyKind,
    StreamTerms,
};
use types::ProjectConfig;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    /// Cap must be strictly positive.
    InvalidCap = 1,
    UnknownProject = 2,
    /// The project already reached its cap.
    ProjectClosed = 3,
    MalformedStrategyParams = 4,
    /// The token rejected a pull or payout (balance or allowance).
    TransferFailed = 5,
    /// `execute` sequences are not positionally aligned.
    BatchShapeMismatch = 6,
    ArithmeticOverflow = 7,
}

#[contract]
pub struct PerpetualMotionProtocol;

#[contractimpl]
impl PerpetualMotionProtocol {
    // ─────────────────────────────────────────────────────────
    // Project registry
    // ─────────────────────────────────────────────────────────

    /// Register a new project and return its sequential ID.
    ///
    /// `recipient` receives the whole escrow once `cap` is reached; `asset`
    /// is the token contract pledges are pulled in. `duration` bounds the
    /// period length of stream pledges.
    pub fn create_project(
        env: Env,
        name: String,
        description: String,
        recipient: Address,
        asset: Address,
        cap: i128,
        duration: u64,
    ) -> Result<u64, Error> {
        if cap <= 0 {
            return Err(Error::InvalidCap);
        }

        let id = get_and_increment_project_id(&env);
        let config = ProjectConfig {
            id,
            name: name.clone(),
            description: description.clone(),
            recipient: recipient.clone(),
            asset,
            cap,
            duration,
        };
        save_new_project(&env, &config);

        events::emit_project_created(
            &env,
            events::ProjectCreated {
                project_id: id,
                recipient,
                name,
                description,
                cap,
            },
        );
        Ok(id)
    }

    /// Number of projects created so far.
    pub fn project_counter(env: Env) -> u64 {
        project_count(&env)
    }

    pub fn get_project(env: Env, id: u64) -> Result<Project, Error> {
        load_project(&env, id)
    }

    /// Amount still needed before the project pays out.
    pub fn remaining(env: Env, id: u64) -> Result<i128, Error> {
        let config = load_project_config(&env, id)?;
        let state = load_project_state(&env, id)?;
        Ok(config.room(&state))
    }

    // ─────────────────────────────────────────────────────────
    // Pledge intake
    // ─────────────────────────────────────────────────────────

    /// Record `contributor`'s strategy for a project, replacing any previous
    /// one. `total_donated` carries over from the replaced record.
    ///
    /// A `LumpSum` is pulled immediately (clamped to the cap and possibly
    /// triggering payout); the contributor must have approved this contract
    /// on the project's asset beforehand. Stream accrual starts now.
    pub fn pledge(
        env: Env,
        project_id: u64,
        contributor: Address,
        strategy: Strategy,
    ) -> Result<(), Error> {
        contributor.require_auth();

        let config = load_project_config(&env, project_id)?;
        let mut state = load_project_state(&env, project_id)?;
        if config.room(&state) <= 0 {
            return Err(Error::ProjectClosed);
        }
        settlement::validate_strategy(&config, &strategy)?;

        let now = env.ledger().timestamp();
        let total_donated = load_pledge(&env, project_id, &contributor)
            .map(|previous| previous.total_donated)
            .unwrap_or(0);
        let kind = strategy.kind();
        let mut record = PledgeRecord {
            strategy,
            total_donated,
            last_settled: now,
            lump_sum_settled: false,
        };

        let mut upfront = 0;
        if kind == StrategyKind::LumpSum {
            upfront = settlement::charge(
                &env,
                &config,
                &mut state,
                &contributor,
                &mut record,
                &Payload::Empty,
                now,
            )?;
            if upfront > 0 {
                save_project_state(&env, project_id, &state);
                settlement::release_if_capped(&env, &config, &state)?;
            }
        }

        save_pledge(&env, project_id, &contributor, &record);
        events::emit_pledge_created(&env, project_id, contributor, kind, upfront);
        Ok(())
    }

    /// The strategy store entry for `(project_id, contributor)`, if any.
    pub fn get_pledge(env: Env, project_id: u64, contributor: Address) -> Option<PledgeRecord> {
        load_pledge(&env, project_id, &contributor)
    }

    /// What the next `execute` would pull from `contributor` before the cap
    /// clamp. Round-up pledges report zero; their amount arrives with the batch.
    pub fn pending_amount(env: Env, project_id: u64, contributor: Address) -> Result<i128, Error> {
        load_project_config(&env, project_id)?;
        match load_pledge(&env, project_id, &contributor) {
            Some(record) => settlement::pending_amount(&record, env.ledger().timestamp()),
            None => Ok(0),
        }
    }

    // ─────────────────────────────────────────────────────────
    // Settlement
    // ─────────────────────────────────────────────────────────

    /// Settle a batch of contributors across projects.
    ///
    /// `contributors[i]` and `payloads[i]` belong to `project_ids[i]` and are
    /// aligned index by index. Listing order is processing order: earlier
    /// contributors win when the cap would otherwise be exceeded. Projects
    /// already funded are skipped. Returns the number of projects processed.
    ///
    /// Any failed pull aborts the whole batch.
    pub fn execute(
        env: Env,
        project_ids: Vec<u64>,
        contributors: Vec<Vec<Address>>,
        payloads: Vec<Vec<Payload>>,
    ) -> Result<u32, Error> {
        if project_ids.len() != contributors.len() || project_ids.len() != payloads.len() {
            return Err(Error::BatchShapeMismatch);
        }

        let now = env.ledger().timestamp();
        let mut processed = 0u32;
        for ((project_id, batch), batch_payloads) in project_ids
            .iter()
            .zip(contributors.iter())
            .zip(payloads.iter())
        {
            if settlement::settle_project(&env, project_id, &batch, &batch_payloads, now)? {
                processed += 1;
            }
        }
        Ok(processed)
    }
}
