//! # Settlement
//!
//! Moves funds from contributors into escrow and pays escrow out when a
//! project's cap is reached. Used by `execute` for whole batches and by
//! `pledge` for the immediate one-contributor settlement of a lump sum.
//!
//! Every function here returns `Result`; an `Err` propagates to the entry
//! point and the host rolls back the whole invocation, token transfers
//! already made in the same call included.

use soroban_sdk::{log, token, Address, Env, Vec};

use crate::accrual::{advance_marker, clamp, clamp_stream, stream_accrual, Accrual};
use crate::events::{self, Executed};
use crate::storage::{load_pledge, load_project_config, load_project_state, save_pledge, save_project_state};
use crate::types::{Payload, PledgeRecord, ProjectConfig, ProjectState, Strategy};
use crate::Error;

/// Reject strategy parameters that could never settle correctly.
pub fn validate_strategy(config: &ProjectConfig, strategy: &Strategy) -> Result<(), Error> {
    match strategy {
        Strategy::None | Strategy::RoundUp => Ok(()),
        Strategy::LumpSum(amount) if *amount > 0 => Ok(()),
        Strategy::Stream(terms)
            if terms.amount_per_period > 0
                && terms.period_seconds > 0
                && terms.period_seconds <= config.duration =>
        {
            Ok(())
        }
        _ => Err(Error::MalformedStrategyParams),
    }
}

/// Amount the next settlement would pull for `record`, before the cap clamp.
///
/// Round-up amounts are only known from the execute-time payload, so they
/// report zero here.
pub fn pending_amount(record: &PledgeRecord, now: u64) -> Result<i128, Error> {
    match &record.strategy {
        Strategy::LumpSum(amount) if !record.lump_sum_settled => Ok(*amount),
        Strategy::Stream(terms) => Ok(stream_accrual(terms, record.last_settled, now)?.amount),
        _ => Ok(0),
    }
}

/// Pull from `from` against the allowance it granted this contract.
fn pull(env: &Env, asset: &Address, from: &Address, amount: i128) -> Result<(), Error> {
    let engine = env.current_contract_address();
    let token_client = token::Client::new(env, asset);
    match token_client.try_transfer_from(&engine, from, &engine, &amount) {
        Ok(Ok(())) => Ok(()),
        _ => Err(Error::TransferFailed),
    }
}

/// Charge one contributor and update `record` and `state` in memory.
///
/// Returns the amount moved into escrow; zero means nothing was due, the
/// strategy is `None`, or the cap is already reached. The caller persists
/// `record` and `state`.
pub fn charge(
    env: &Env,
    config: &ProjectConfig,
    state: &mut ProjectState,
    contributor: &Address,
    record: &mut PledgeRecord,
    payload: &Payload,
    now: u64,
) -> Result<i128, Error> {
    let room = config.room(state);
    if room <= 0 {
        return Ok(0);
    }

    let mut marker = None;
    let amount = match &record.strategy {
        Strategy::None => 0,
        Strategy::LumpSum(_) if record.lump_sum_settled => 0,
        Strategy::LumpSum(amount) => {
            record.lump_sum_settled = true;
            clamp(*amount, room)
        }
        Strategy::Stream(terms) => {
            let due = stream_accrual(terms, record.last_settled, now)?;
            let Accrual { periods, amount } = clamp_stream(terms, due, room);
            marker = Some(advance_marker(terms, record.last_settled, periods)?);
            amount
        }
        Strategy::RoundUp => match payload {
            Payload::RoundUp(round_up) if round_up.amount >= 0 => clamp(round_up.amount, room),
            _ => return Err(Error::MalformedStrategyParams),
        },
    };

    if amount == 0 {
        return Ok(0);
    }

    pull(env, &config.asset, contributor, amount)?;

    record.total_donated = record
        .total_donated
        .checked_add(amount)
        .ok_or(Error::ArithmeticOverflow)?;
    if let Some(marker) = marker {
        record.last_settled = marker;
    }
    state.amount_funded += amount;
    Ok(amount)
}

/// Pay the whole escrow to the recipient if `state` has reached the cap.
///
/// Returns `true` when the payout fired.
pub fn release_if_capped(env: &Env, config: &ProjectConfig, state: &ProjectState) -> Result<bool, Error> {
    if state.amount_funded < config.cap {
        return Ok(false);
    }
    let engine = env.current_contract_address();
    let token_client = token::Client::new(env, &config.asset);
    match token_client.try_transfer(&engine, &config.recipient, &state.amount_funded) {
        Ok(Ok(())) => {}
        _ => return Err(Error::TransferFailed),
    }
    log!(env, "project funded", config.id, state.amount_funded);
    events::emit_payout(env, config.id, config.recipient.clone(), state.amount_funded);
    Ok(true)
}

/// Settle one project's slice of an `execute` batch.
///
/// Contributors are processed in the order given; once the cap is reached the
/// rest are skipped. Returns `false` without emitting anything when the
/// project was already funded before this call.
pub fn settle_project(
    env: &Env,
    project_id: u64,
    contributors: &Vec<Address>,
    payloads: &Vec<Payload>,
    now: u64,
) -> Result<bool, Error> {
    if contributors.len() != payloads.len() {
        return Err(Error::BatchShapeMismatch);
    }

    let config = load_project_config(env, project_id)?;
    let mut state = load_project_state(env, project_id)?;
    if config.room(&state) <= 0 {
        return Ok(false);
    }

    let mut charged = Vec::new(env);
    let mut amounts = Vec::new(env);
    let mut total: i128 = 0;

    for (contributor, payload) in contributors.iter().zip(payloads.iter()) {
        if config.room(&state) <= 0 {
            break;
        }
        let Some(mut record) = load_pledge(env, project_id, &contributor) else {
            continue;
        };

        let amount = charge(env, &config, &mut state, &contributor, &mut record, &payload, now)?;
        if amount > 0 {
            save_pledge(env, project_id, &contributor, &record);
            charged.push_back(contributor);
            amounts.push_back(amount);
            total += amount;
        }
    }

    if total > 0 {
        save_project_state(env, project_id, &state);
        release_if_capped(env, &config, &state)?;
    }

    events::emit_executed(
        env,
        Executed {
            project_id,
            contributors: charged,
            amounts,
            total,
        },
    );
    Ok(true)
}
