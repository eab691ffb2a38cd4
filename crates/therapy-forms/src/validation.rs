//! Draft validation
//!
//! Validation never fails: it returns a report keyed by field. Every rule is
//! evaluated, so one pass surfaces all problems at once.

use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use therapy_core::models::PaymentType;

use crate::draft::{FormFlow, PlanDraft, PlanField};
use crate::money::{parse_amount, parse_sessions};
use crate::recompute::{effective_discount, final_amount};

/// Field errors in on-screen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: BTreeMap<PlanField, String>,
}

impl ValidationReport {
    /// True when the draft can be submitted
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Message for one field, if it failed
    pub fn get(&self, field: PlanField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: PlanField) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlanField, &str)> {
        self.errors.iter().map(|(f, m)| (*f, m.as_str()))
    }

    /// All messages joined for a blocking alert
    pub fn summary(&self) -> String {
        self.errors
            .values()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Flag a category missing from `offered`
    ///
    /// Blank categories are left to the required-field rule, and an empty
    /// list accepts anything.
    pub fn check_category(&mut self, category: &str, offered: &[String]) {
        let category = category.trim();
        if category.is_empty() || offered.is_empty() {
            return;
        }
        if !offered.iter().any(|c| c == category) {
            self.insert(
                PlanField::TherapyCategory,
                "Therapy category is not offered for this organization",
            );
        }
    }

    /// Record an error unless the field already has one
    fn insert(&mut self, field: PlanField, message: &str) {
        self.errors
            .entry(field)
            .or_insert_with(|| message.to_string());
    }
}

impl Serialize for ValidationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.errors.len()))?;
        for (field, message) in &self.errors {
            map.serialize_entry(field.as_str(), message)?;
        }
        map.end()
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Required numeric amount: blank and non-numeric get different messages
fn check_amount(report: &mut ValidationReport, field: PlanField, raw: &str, label: &str) {
    if is_blank(raw) {
        report.insert(field, &format!("{} is required", label));
    } else if parse_amount(raw).is_none() {
        report.insert(field, &format!("{} must be a valid number", label));
    }
}

/// Validate a draft for submission
///
/// `is_admin_submitter` waives the clinical fields. `flow` enables the
/// edit-only date range rule, since the create flow rejects bad dates on entry.
pub fn validate(draft: &PlanDraft, is_admin_submitter: bool, flow: FormFlow) -> ValidationReport {
    let mut report = ValidationReport::default();

    if is_blank(&draft.therapy_name) {
        report.insert(PlanField::TherapyName, "Therapy name is required");
    }

    if !is_admin_submitter {
        if is_blank(&draft.patient_symptoms) {
            report.insert(PlanField::PatientSymptoms, "Patient symptoms are required");
        }
        if is_blank(&draft.patient_diagnosis) {
            report.insert(PlanField::PatientDiagnosis, "Patient diagnosis is required");
        }
    }

    if is_blank(&draft.therapy_category) {
        report.insert(PlanField::TherapyCategory, "Therapy category is required");
    }

    check_amount(&mut report, PlanField::TotalAmount, &draft.total_amount, "Total amount");
    check_amount(
        &mut report,
        PlanField::ReceivedAmount,
        &draft.received_amount,
        "Received amount",
    );

    match draft.payment_type {
        PaymentType::Recurring => {
            match parse_amount(&draft.per_session_amount) {
                None if is_blank(&draft.per_session_amount) => {
                    report.insert(PlanField::PerSessionAmount, "Per session amount is required")
                }
                Some(amount) if amount > Decimal::ZERO => {}
                _ => report.insert(
                    PlanField::PerSessionAmount,
                    "Per session amount must be greater than 0",
                ),
            }

            match parse_sessions(&draft.estimated_sessions) {
                None if is_blank(&draft.estimated_sessions) => report.insert(
                    PlanField::EstimatedSessions,
                    "Estimated sessions is required",
                ),
                Some(sessions) if sessions > 0 => {}
                _ => report.insert(
                    PlanField::EstimatedSessions,
                    "Estimated sessions must be a whole number greater than 0",
                ),
            }
        }
        PaymentType::OneTime => {
            let total = parse_amount(&draft.total_amount);
            let received = parse_amount(&draft.received_amount);
            if let (Some(total), Some(received)) = (total, received) {
                let owed = final_amount(total, effective_discount(&draft.discount_percentage));
                if owed != Some(received) {
                    report.insert(
                        PlanField::ReceivedAmount,
                        "One-time payment requires full amount",
                    );
                }
            }
        }
    }

    if flow == FormFlow::Edit && draft.end_date < draft.start_date {
        report.insert(PlanField::EndDate, "End date cannot be before start date");
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn complete_draft() -> PlanDraft {
        let start = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let mut draft = PlanDraft::empty(start, 42);
        draft.therapy_name = "Knee Rehab".to_string();
        draft.patient_symptoms = "Pain climbing stairs".to_string();
        draft.patient_diagnosis = "Patellofemoral syndrome".to_string();
        draft.therapy_category = "Musculoskeletal".to_string();
        draft.estimated_sessions = "12".to_string();
        draft.per_session_amount = "100.00".to_string();
        draft.total_amount = "1200".to_string();
        draft.received_amount = "0".to_string();
        draft
    }

    #[test]
    fn test_category_must_be_offered() {
        let offered = vec!["Musculoskeletal".to_string(), "Neurological".to_string()];

        let mut report = validate(&complete_draft(), false, FormFlow::Create);
        report.check_category("Musculoskeletal", &offered);
        assert!(report.is_empty());

        report.check_category("Orthodontics", &offered);
        assert_eq!(
            report.get(PlanField::TherapyCategory),
            Some("Therapy category is not offered for this organization")
        );

        let mut report = ValidationReport::default();
        report.check_category("Orthodontics", &[]);
        report.check_category("  ", &offered);
        assert!(report.is_empty());
    }

    #[test]
    fn test_complete_draft_is_valid() {
        let report = validate(&complete_draft(), false, FormFlow::Create);
        assert!(report.is_empty(), "unexpected errors: {:?}", report);
    }

    #[test]
    fn test_all_rules_reported_together() {
        let start = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let draft = PlanDraft::empty(start, 7);

        let report = validate(&draft, false, FormFlow::Create);
        let fields: Vec<PlanField> = report.iter().map(|(f, _)| f).collect();
        assert_eq!(
            fields,
            vec![
                PlanField::TherapyName,
                PlanField::PatientSymptoms,
                PlanField::PatientDiagnosis,
                PlanField::TherapyCategory,
                PlanField::EstimatedSessions,
                PlanField::PerSessionAmount,
                PlanField::TotalAmount,
                PlanField::ReceivedAmount,
            ]
        );
        assert_eq!(report.get(PlanField::TotalAmount), Some("Total amount is required"));
    }

    #[test]
    fn test_whitespace_name_is_blank() {
        let mut draft = complete_draft();
        draft.therapy_name = "   ".to_string();
        let report = validate(&draft, false, FormFlow::Create);
        assert!(report.contains(PlanField::TherapyName));
    }

    #[test]
    fn test_admin_skips_clinical_fields() {
        let mut draft = complete_draft();
        draft.patient_symptoms.clear();
        draft.patient_diagnosis.clear();

        assert!(validate(&draft, true, FormFlow::Create).is_empty());
        assert_eq!(validate(&draft, false, FormFlow::Create).len(), 2);
    }

    #[test]
    fn test_non_numeric_amounts() {
        let mut draft = complete_draft();
        draft.total_amount = "twelve hundred".to_string();
        draft.received_amount = "1,000".to_string();

        let report = validate(&draft, false, FormFlow::Create);
        assert_eq!(
            report.get(PlanField::TotalAmount),
            Some("Total amount must be a valid number")
        );
        assert_eq!(
            report.get(PlanField::ReceivedAmount),
            Some("Received amount must be a valid number")
        );
    }

    #[test]
    fn test_recurring_requires_positive_sessions_and_rate() {
        let mut draft = complete_draft();
        draft.per_session_amount = "0".to_string();
        draft.estimated_sessions = "2.5".to_string();

        let report = validate(&draft, false, FormFlow::Create);
        assert!(report.contains(PlanField::PerSessionAmount));
        assert!(report.contains(PlanField::EstimatedSessions));
    }

    #[test]
    fn test_one_time_requires_full_payment() {
        let mut draft = complete_draft();
        draft.payment_type = PaymentType::OneTime;
        draft.estimated_sessions.clear();
        draft.per_session_amount.clear();
        draft.total_amount = "500".to_string();
        draft.received_amount = "400".to_string();

        let report = validate(&draft, false, FormFlow::Create);
        assert_eq!(
            report.get(PlanField::ReceivedAmount),
            Some("One-time payment requires full amount")
        );

        draft.received_amount = "500".to_string();
        assert!(validate(&draft, false, FormFlow::Create).is_empty());
    }

    #[test]
    fn test_one_time_full_amount_is_after_discount() {
        let mut draft = complete_draft();
        draft.payment_type = PaymentType::OneTime;
        draft.total_amount = "500".to_string();
        draft.discount_percentage = "10".to_string();
        draft.received_amount = "450".to_string();

        assert!(validate(&draft, false, FormFlow::Create).is_empty());
    }

    #[test]
    fn test_edit_flow_checks_date_order() {
        let mut draft = complete_draft();
        draft.end_date = draft.start_date - Duration::days(1);

        assert!(!validate(&draft, false, FormFlow::Create).contains(PlanField::EndDate));
        assert!(validate(&draft, false, FormFlow::Edit).contains(PlanField::EndDate));
    }

    #[test]
    fn test_report_serializes_wire_names() {
        let mut draft = complete_draft();
        draft.therapy_name.clear();

        let json = serde_json::to_value(validate(&draft, false, FormFlow::Create)).unwrap();
        assert_eq!(json["therapyName"], "Therapy name is required");
    }
}
