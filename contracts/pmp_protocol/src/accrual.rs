//! Amount-due arithmetic, kept free of storage and token calls.
//!
//! Stream accrual counts whole periods only. The settlement marker advances
//! by `periods * period_seconds`, never to `now`, so the fractional remainder
//! keeps accruing towards the next period.

use crate::types::StreamTerms;
use crate::Error;

/// Whole periods due and the amount they are worth.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Accrual {
    pub periods: u64,
    pub amount: i128,
}

impl Accrual {
    pub const NONE: Accrual = Accrual {
        periods: 0,
        amount: 0,
    };
}

/// Whole periods elapsed since `last_settled` and their worth.
///
/// The amount saturates at `i128::MAX`; the cap clamp bounds what is
/// actually pulled.
pub fn stream_accrual(terms: &StreamTerms, last_settled: u64, now: u64) -> Result<Accrual, Error> {
    if terms.period_seconds == 0 {
        return Err(Error::MalformedStrategyParams);
    }
    let periods = now.saturating_sub(last_settled) / terms.period_seconds;
    let amount = terms.amount_per_period.saturating_mul(i128::from(periods));
    Ok(Accrual { periods, amount })
}

/// Clamp a stream accrual to the room left under the cap.
///
/// When clamped, the full `room` is still transferred so the project can
/// close, but only the whole periods that `room` pays for are credited.
pub fn clamp_stream(terms: &StreamTerms, accrual: Accrual, room: i128) -> Accrual {
    if accrual.amount <= room {
        return accrual;
    }
    let amount = room.max(0);
    // amount < accrual.amount <= periods * amount_per_period, so this fits in u64
    let periods = (amount / terms.amount_per_period) as u64;
    Accrual { periods, amount }
}

/// Clamp any other proposed amount to the room left under the cap.
pub fn clamp(proposed: i128, room: i128) -> i128 {
    proposed.min(room).max(0)
}

/// New settlement marker after crediting `periods` whole periods.
pub fn advance_marker(terms: &StreamTerms, last_settled: u64, periods: u64) -> Result<u64, Error> {
    periods
        .checked_mul(terms.period_seconds)
        .and_then(|secs| last_settled.checked_add(secs))
        .ok_or(Error::ArithmeticOverflow)
}
