//! Submission payload mapping

use rust_decimal::prelude::ToPrimitive;
use therapy_core::models::PlanPayload;

use crate::constants::DATE_FORMAT;
use crate::draft::PlanDraft;
use crate::money::{amount_to_f64, parse_sessions};
use crate::recompute::effective_discount;

/// Map a draft to the body expected by the persistence service
///
/// Parse failures surface as `NaN` (or `None` for the session count);
/// callers are expected to gate submission on [`crate::validate`]. The
/// discount is the exception: blank or unparsable text is sent as the 0 the
/// balance was computed with.
pub fn to_submission_payload(draft: &PlanDraft) -> PlanPayload {
    let discount_percentage = effective_discount(&draft.discount_percentage)
        .to_f64()
        .unwrap_or(0.0);

    PlanPayload {
        therapy_name: draft.therapy_name.trim().to_string(),
        patient_symptoms: draft.patient_symptoms.trim().to_string(),
        patient_diagnosis: draft.patient_diagnosis.trim().to_string(),
        therapy_category: draft.therapy_category.clone(),
        start_date: draft.start_date.format(DATE_FORMAT).to_string(),
        end_date: draft.end_date.format(DATE_FORMAT).to_string(),
        therapy_duration_days: draft.therapy_duration_days,
        payment_type: draft.payment_type,
        estimated_sessions: parse_sessions(&draft.estimated_sessions),
        per_session_amount: amount_to_f64(&draft.per_session_amount),
        total_amount: amount_to_f64(&draft.total_amount),
        discount_percentage,
        received_amount: amount_to_f64(&draft.received_amount),
        balance: amount_to_f64(&draft.balance),
    }
}
