//! Derived field recomputation
//!
//! Two steps run after every mutation, always in this order:
//!
//! 1. [`propagate_edit`]: the edited side of the sessions / per-session /
//!    total triangle drives `totalAmount`.
//! 2. [`recompute_derived`]: duration, per-session amount (recurring only)
//!    and balance are derived from the draft. This step is pure and
//!    idempotent and has the final say on `perSessionAmount`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::constants::{DAYS_PER_WEEK, PERCENT};
use crate::draft::{PlanDraft, PlanField};
use crate::money::{format_money, parse_amount, parse_amount_or_zero, parse_sessions, round_money};

/// Whole days from `start` to `end`, zero when the range is inverted
pub fn duration_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days().max(0)
}

/// Session estimate for a plan length: `ceil(days / 7 * per_week)`
pub fn estimate_sessions(duration_days: i64, sessions_per_week: u32) -> i64 {
    if duration_days <= 0 {
        return 0;
    }
    let weekly = i64::from(sessions_per_week);
    (duration_days * weekly + DAYS_PER_WEEK - 1) / DAYS_PER_WEEK
}

/// Amount owed after the discount, rounded to cents
///
/// `None` when the product falls outside the decimal range.
pub fn final_amount(total: Decimal, discount_percentage: Decimal) -> Option<Decimal> {
    let share = Decimal::ONE.checked_sub(discount_percentage.checked_div(PERCENT)?)?;
    total.checked_mul(share).map(round_money)
}

/// Discount as used by the arithmetic: unparsable input counts as zero
pub fn effective_discount(raw: &str) -> Decimal {
    parse_amount(raw).unwrap_or(Decimal::ZERO)
}

/// Apply the consequences of the user editing `field`
///
/// Editing the session count or the per-session amount recomputes the total
/// as `sessions * perSession` when both are numeric. Editing the total leaves
/// the other two alone. A product outside the decimal range leaves the
/// total as it was.
pub fn propagate_edit(draft: &mut PlanDraft, field: PlanField) {
    if !matches!(
        field,
        PlanField::EstimatedSessions | PlanField::PerSessionAmount
    ) {
        return;
    }

    let sessions = parse_sessions(&draft.estimated_sessions);
    let per_session = parse_amount(&draft.per_session_amount);

    if let (Some(sessions), Some(per_session)) = (sessions, per_session) {
        match Decimal::from(sessions).checked_mul(per_session) {
            Some(total) => {
                let total = round_money(total);
                debug!(%field, %total, "Total recomputed from sessions");
                draft.total_amount = format_money(total);
            }
            None => warn!(%field, "Total out of range, left unchanged"),
        }
    }
}

/// Recompute every derived field from the draft's inputs
pub fn recompute_derived(draft: &PlanDraft) -> PlanDraft {
    let mut next = draft.clone();

    next.therapy_duration_days = duration_days(draft.start_date, draft.end_date);

    if draft.payment_type.is_recurring() {
        let sessions = parse_sessions(&draft.estimated_sessions).filter(|s| *s > 0);
        let total = parse_amount(&draft.total_amount);

        if let Some(per_session) = sessions
            .zip(total)
            .and_then(|(sessions, total)| total.checked_div(Decimal::from(sessions)))
        {
            let per_session = round_money(per_session);
            // Only rewrite when the value changed, so partial input like "10." survives
            if parse_amount(&draft.per_session_amount) != Some(per_session) {
                next.per_session_amount = format_money(per_session);
            }
        }
    }

    let total = parse_amount_or_zero(&draft.total_amount);
    let received = parse_amount_or_zero(&draft.received_amount);
    // Blank when an input is non-numeric or the result is out of range
    next.balance = total
        .zip(received)
        .and_then(|(total, received)| {
            final_amount(total, effective_discount(&draft.discount_percentage))?
                .checked_sub(received)
        })
        .map(format_money)
        .unwrap_or_default();

    next
}
