//! Plan form model
//!
//! Owns a [`PlanDraft`], applies user edits and keeps the derived fields
//! consistent. The model knows nothing about the view: rejected edits are
//! returned to the caller, which decides how to alert the user.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use therapy_core::config::FormConfig;
use therapy_core::models::{PaymentType, PlanPayload, TherapyPlan};
use thiserror::Error;
use tracing::debug;

use crate::constants::DATE_FORMAT;
use crate::draft::{FormFlow, PlanDraft, PlanField};
use crate::money::parse_amount;
use crate::payload::to_submission_payload;
use crate::recompute::{duration_days, estimate_sessions, propagate_edit, recompute_derived};
use crate::validation::{validate, ValidationReport};

/// Why a date edit was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateRejection {
    #[error("Start date cannot be in the past")]
    StartBeforeToday,

    #[error("End date cannot be before start date")]
    EndBeforeStart,

    #[error("Start date cannot be changed on an existing plan")]
    StartDateLocked,
}

/// Result of a field edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// Value stored and dependents recomputed
    Applied,
    /// Field is derived and cannot be set directly
    Ignored,
    /// Value refused; the draft is unchanged
    Rejected(String),
}

impl EditOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, EditOutcome::Applied)
    }
}

/// Draft state plus the rules for editing it
#[derive(Debug, Clone)]
pub struct PlanFormModel {
    draft: PlanDraft,
    flow: FormFlow,
    /// Edit flow only: the draft as loaded, for dirty checking
    initial: Option<PlanDraft>,
    today: NaiveDate,
    config: FormConfig,
}

impl PlanFormModel {
    /// Fresh draft for the create flow, starting today
    ///
    /// The session count stays blank until the user picks dates.
    pub fn new_create(today: NaiveDate, config: FormConfig) -> Self {
        let draft = PlanDraft::empty(today, config.default_plan_length_days);
        Self {
            draft: recompute_derived(&draft),
            flow: FormFlow::Create,
            initial: None,
            today,
            config,
        }
    }

    /// Draft populated from a fetched plan, for the edit flow
    pub fn for_edit(plan: &TherapyPlan, today: NaiveDate, config: FormConfig) -> Self {
        let draft = recompute_derived(&PlanDraft::from(plan));
        debug!(plan_id = %plan.id, "Loaded plan into edit form");
        Self {
            initial: Some(draft.clone()),
            draft,
            flow: FormFlow::Edit,
            today,
            config,
        }
    }

    pub fn draft(&self) -> &PlanDraft {
        &self.draft
    }

    pub fn flow(&self) -> FormFlow {
        self.flow
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Set one field from its input text
    ///
    /// Text fields are stored verbatim. Dates are parsed as `YYYY-MM-DD` and
    /// the payment type by name; both go through their dedicated setters.
    /// Derived fields are ignored.
    pub fn set_field(&mut self, field: PlanField, value: &str) -> EditOutcome {
        match field {
            _ if field.is_derived() => {
                debug!(%field, "Ignoring edit of derived field");
                EditOutcome::Ignored
            }
            PlanField::DiscountPercentage => self.set_discount_percentage(value),
            PlanField::PaymentType => match value.parse::<PaymentType>() {
                Ok(payment_type) => {
                    self.set_payment_type(payment_type);
                    EditOutcome::Applied
                }
                Err(_) => EditOutcome::Rejected(format!("Unknown payment type: {}", value)),
            },
            PlanField::StartDate | PlanField::EndDate => {
                let date = match NaiveDate::parse_from_str(value.trim(), DATE_FORMAT) {
                    Ok(date) => date,
                    Err(_) => {
                        return EditOutcome::Rejected(format!("Invalid date: {}", value));
                    }
                };
                let result = if field == PlanField::StartDate {
                    self.set_start_date(date)
                } else {
                    self.set_end_date(date)
                };
                match result {
                    Ok(()) => EditOutcome::Applied,
                    Err(rejection) => EditOutcome::Rejected(rejection.to_string()),
                }
            }
            _ => {
                if let Some(slot) = self.draft.text_mut(field) {
                    *slot = value.to_string();
                }
                propagate_edit(&mut self.draft, field);
                self.refresh();
                EditOutcome::Applied
            }
        }
    }

    pub fn set_payment_type(&mut self, payment_type: PaymentType) {
        self.draft.payment_type = payment_type;
        self.refresh();
    }

    /// Set the discount, refusing values outside `0..=max_discount_percent`
    ///
    /// Text that does not parse counts as zero and is kept as typed, so the
    /// input can be cleared or hold a partial number.
    pub fn set_discount_percentage(&mut self, value: &str) -> EditOutcome {
        let percent = parse_amount(value).unwrap_or(Decimal::ZERO);
        let max = Decimal::from(self.config.max_discount_percent);

        if percent > max || percent < Decimal::ZERO {
            debug!(value, "Discount outside accepted range");
            return EditOutcome::Rejected(format!("Discount must be between 0 and {}%", max));
        }

        self.draft.discount_percentage = value.to_string();
        self.refresh();
        EditOutcome::Applied
    }

    /// Change the start date
    ///
    /// In the create flow the date may not be in the past, and an end date
    /// that now precedes it is pushed to `start + end_date_advance_days`.
    /// The edit flow keeps the original start date.
    pub fn set_start_date(&mut self, date: NaiveDate) -> Result<(), DateRejection> {
        if self.flow == FormFlow::Edit {
            return Err(DateRejection::StartDateLocked);
        }
        if date < self.today {
            return Err(DateRejection::StartBeforeToday);
        }

        self.draft.start_date = date;
        if self.draft.end_date < date {
            self.draft.end_date = date + Duration::days(self.config.end_date_advance_days);
            debug!(end_date = %self.draft.end_date, "End date advanced past new start date");
        }
        self.on_dates_changed();
        Ok(())
    }

    /// Change the end date
    ///
    /// The create flow refuses an end date before the start date; the edit
    /// flow accepts it and reports it at validation time.
    pub fn set_end_date(&mut self, date: NaiveDate) -> Result<(), DateRejection> {
        if self.flow == FormFlow::Create && date < self.draft.start_date {
            return Err(DateRejection::EndBeforeStart);
        }

        self.draft.end_date = date;
        self.on_dates_changed();
        Ok(())
    }

    pub fn validate(&self, is_admin_submitter: bool) -> ValidationReport {
        validate(&self.draft, is_admin_submitter, self.flow)
    }

    /// Validate, also requiring a category from `offered`
    ///
    /// In the edit flow the category the plan was loaded with stays valid.
    pub fn validate_with_categories(
        &self,
        is_admin_submitter: bool,
        offered: &[String],
    ) -> ValidationReport {
        let mut report = self.validate(is_admin_submitter);
        let loaded = self.initial.as_ref().map(|d| d.therapy_category.as_str());
        if loaded != Some(self.draft.therapy_category.as_str()) {
            report.check_category(&self.draft.therapy_category, offered);
        }
        report
    }

    pub fn submission_payload(&self) -> PlanPayload {
        to_submission_payload(&self.draft)
    }

    /// Edit flow: whether the draft differs from the loaded plan
    pub fn has_unsaved_changes(&self) -> bool {
        match &self.initial {
            Some(initial) => *initial != self.draft,
            None => false,
        }
    }

    /// Edit flow: restore the loaded plan
    pub fn discard_changes(&mut self) {
        if let Some(initial) = &self.initial {
            self.draft = initial.clone();
        }
    }

    /// Edit flow: accept the current draft as the new baseline after a save
    pub fn mark_saved(&mut self) {
        if self.flow == FormFlow::Edit {
            self.initial = Some(self.draft.clone());
        }
    }

    fn on_dates_changed(&mut self) {
        if self.flow == FormFlow::Create {
            self.seed_sessions();
        }
        self.refresh();
    }

    /// Create flow: default the session count from the plan length
    fn seed_sessions(&mut self) {
        let days = duration_days(self.draft.start_date, self.draft.end_date);
        let sessions = estimate_sessions(days, self.config.sessions_per_week);
        self.draft.estimated_sessions = sessions.to_string();
    }

    fn refresh(&mut self) {
        self.draft = recompute_derived(&self.draft);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn create_model() -> PlanFormModel {
        PlanFormModel::new_create(today(), FormConfig::default())
    }

    fn stored_plan() -> TherapyPlan {
        TherapyPlan {
            id: "plan-7".to_string(),
            patient_id: "pat-3".to_string(),
            therapy_name: "Shoulder mobility".to_string(),
            patient_symptoms: "Limited overhead reach".to_string(),
            patient_diagnosis: "Adhesive capsulitis".to_string(),
            therapy_category: "Musculoskeletal".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 9, 29).unwrap(),
            therapy_duration_days: 28,
            payment_type: PaymentType::Recurring,
            estimated_sessions: Some(8),
            per_session_amount: Some(75.0),
            total_amount: 600.0,
            discount_percentage: 0.0,
            received_amount: 150.0,
            balance: 450.0,
        }
    }

    #[test]
    fn test_new_create_defaults() {
        let model = create_model();
        let draft = model.draft();
        assert_eq!(draft.start_date, today());
        assert_eq!(draft.therapy_duration_days, 7);
        assert!(draft.estimated_sessions.is_empty());
        assert_eq!(draft.balance, "0.00");
        assert_eq!(model.flow(), FormFlow::Create);
    }

    #[test]
    fn test_sessions_and_total_converge_per_session() {
        let mut model = create_model();
        model.set_field(PlanField::EstimatedSessions, "10");
        model.set_field(PlanField::TotalAmount, "1000");
        assert_eq!(model.draft().per_session_amount, "100.00");
    }

    #[test]
    fn test_per_session_edit_drives_total() {
        let mut model = create_model();
        model.set_field(PlanField::EstimatedSessions, "4");
        model.set_field(PlanField::PerSessionAmount, "80");
        assert_eq!(model.draft().total_amount, "320.00");
        // Equal in value, so the typed text is kept
        assert_eq!(model.draft().per_session_amount, "80");
    }

    #[test]
    fn test_per_session_rewritten_when_total_rounds() {
        let mut model = create_model();
        model.set_field(PlanField::EstimatedSessions, "3");
        model.set_field(PlanField::PerSessionAmount, "33.333");
        assert_eq!(model.draft().total_amount, "100.00");
        assert_eq!(model.draft().per_session_amount, "33.33");
    }

    #[test]
    fn test_sessions_edit_recomputes_total_from_rate() {
        let mut model = create_model();
        model.set_field(PlanField::EstimatedSessions, "10");
        model.set_field(PlanField::TotalAmount, "1000");
        model.set_field(PlanField::EstimatedSessions, "20");
        assert_eq!(model.draft().total_amount, "2000.00");
        assert_eq!(model.draft().per_session_amount, "100.00");
    }

    #[test]
    fn test_total_edit_wins_then_rate_follows() {
        let mut model = create_model();
        model.set_field(PlanField::EstimatedSessions, "10");
        model.set_field(PlanField::TotalAmount, "1000");
        model.set_field(PlanField::TotalAmount, "1500");
        assert_eq!(model.draft().total_amount, "1500");
        assert_eq!(model.draft().estimated_sessions, "10");
        assert_eq!(model.draft().per_session_amount, "150.00");
    }

    #[test]
    fn test_derived_fields_cannot_be_set() {
        let mut model = create_model();
        model.set_field(PlanField::TotalAmount, "100");
        assert_eq!(model.set_field(PlanField::Balance, "5"), EditOutcome::Ignored);
        assert_eq!(
            model.set_field(PlanField::TherapyDurationDays, "90"),
            EditOutcome::Ignored
        );
        assert_eq!(model.draft().balance, "100.00");
        assert_eq!(model.draft().therapy_duration_days, 7);
    }

    #[test]
    fn test_huge_amounts_are_applied_without_overflow() {
        let max = Decimal::MAX.to_string();
        let mut model = create_model();
        model.set_field(PlanField::EstimatedSessions, "2");
        model.set_field(PlanField::TotalAmount, "300");

        assert!(model.set_field(PlanField::PerSessionAmount, &max).is_applied());
        assert_eq!(model.draft().total_amount, "300");

        model.set_field(PlanField::TotalAmount, &max);
        assert!(model
            .set_field(PlanField::ReceivedAmount, &format!("-{}", max))
            .is_applied());
        assert_eq!(model.draft().balance, "");
    }

    #[test]
    fn test_discount_above_hundred_keeps_prior_value() {
        let mut model = create_model();
        model.set_field(PlanField::TotalAmount, "200");
        assert!(model.set_discount_percentage("25").is_applied());

        let outcome = model.set_discount_percentage("150");
        assert!(matches!(outcome, EditOutcome::Rejected(_)));
        assert_eq!(model.draft().discount_percentage, "25");
        assert_eq!(model.draft().balance, "150.00");
    }

    #[test]
    fn test_unparsable_discount_counts_as_zero() {
        let mut model = create_model();
        model.set_field(PlanField::TotalAmount, "200");
        assert!(model.set_field(PlanField::DiscountPercentage, "").is_applied());
        assert_eq!(model.draft().discount_percentage, "");
        assert_eq!(model.draft().balance, "200.00");

        assert!(model.set_field(PlanField::DiscountPercentage, "abc").is_applied());
        assert_eq!(model.draft().discount_percentage, "abc");
        assert_eq!(model.draft().balance, "200.00");
        assert_eq!(model.submission_payload().discount_percentage, 0.0);
    }

    #[test]
    fn test_category_checked_against_offered_list() {
        let offered = vec!["Neurological".to_string()];

        let mut model = create_model();
        model.set_field(PlanField::TherapyCategory, "Orthodontics");
        assert!(model
            .validate_with_categories(true, &offered)
            .contains(PlanField::TherapyCategory));
        assert!(!model.validate(true).contains(PlanField::TherapyCategory));

        // A plan keeps the category it was saved with
        let mut model = PlanFormModel::for_edit(&stored_plan(), today(), FormConfig::default());
        assert!(model.validate_with_categories(false, &offered).is_empty());

        model.set_field(PlanField::TherapyCategory, "Orthodontics");
        assert!(model
            .validate_with_categories(false, &offered)
            .contains(PlanField::TherapyCategory));
    }

    #[test]
    fn test_negative_discount_rejected() {
        let mut model = create_model();
        assert!(!model.set_discount_percentage("-5").is_applied());
        assert_eq!(model.draft().discount_percentage, "0");
    }

    #[test]
    fn test_start_date_in_past_rejected() {
        let mut model = create_model();
        let yesterday = today() - Duration::days(1);
        assert_eq!(
            model.set_start_date(yesterday),
            Err(DateRejection::StartBeforeToday)
        );
        assert_eq!(model.draft().start_date, today());
    }

    #[test]
    fn test_start_date_past_end_advances_end() {
        let mut model = create_model();
        let start = today() + Duration::days(30);
        model.set_start_date(start).unwrap();

        assert_eq!(model.draft().end_date, start + Duration::days(7));
        assert_eq!(model.draft().therapy_duration_days, 7);
        assert_eq!(model.draft().estimated_sessions, "2");
    }

    #[test]
    fn test_end_before_start_rejected_in_create() {
        let mut model = create_model();
        let before = today() - Duration::days(2);
        assert_eq!(model.set_end_date(before), Err(DateRejection::EndBeforeStart));
        assert_eq!(model.draft().end_date, today() + Duration::days(7));
    }

    #[test]
    fn test_date_change_reseeds_sessions_over_user_value() {
        let mut model = create_model();
        model.set_field(PlanField::EstimatedSessions, "5");
        assert_eq!(model.draft().estimated_sessions, "5");

        model.set_end_date(today() + Duration::days(28)).unwrap();
        assert_eq!(model.draft().therapy_duration_days, 28);
        assert_eq!(model.draft().estimated_sessions, "8");
    }

    #[test]
    fn test_set_field_parses_dates() {
        let mut model = create_model();
        assert!(model.set_field(PlanField::EndDate, "2026-11-13").is_applied());
        assert_eq!(model.draft().therapy_duration_days, 28);
        assert!(matches!(
            model.set_field(PlanField::EndDate, "13/11/2026"),
            EditOutcome::Rejected(_)
        ));
    }

    #[test]
    fn test_edit_flow_loads_clean() {
        let model = PlanFormModel::for_edit(&stored_plan(), today(), FormConfig::default());
        assert_eq!(model.flow(), FormFlow::Edit);
        assert!(!model.has_unsaved_changes());
        assert_eq!(model.draft().balance, "450.00");
    }

    #[test]
    fn test_edit_flow_dirty_and_discard() {
        let mut model = PlanFormModel::for_edit(&stored_plan(), today(), FormConfig::default());
        model.set_field(PlanField::TherapyName, "Shoulder mobility II");
        assert!(model.has_unsaved_changes());

        model.discard_changes();
        assert!(!model.has_unsaved_changes());
        assert_eq!(model.draft().therapy_name, "Shoulder mobility");
    }

    #[test]
    fn test_edit_flow_end_date_is_a_change() {
        let mut model = PlanFormModel::for_edit(&stored_plan(), today(), FormConfig::default());
        let end = model.draft().end_date + Duration::days(7);
        model.set_end_date(end).unwrap();
        assert!(model.has_unsaved_changes());
        // No session reseeding outside the create flow
        assert_eq!(model.draft().estimated_sessions, "8");
    }

    #[test]
    fn test_edit_flow_start_date_locked() {
        let mut model = PlanFormModel::for_edit(&stored_plan(), today(), FormConfig::default());
        assert_eq!(
            model.set_start_date(today() + Duration::days(1)),
            Err(DateRejection::StartDateLocked)
        );
    }

    #[test]
    fn test_edit_flow_allows_inverted_range_until_validation() {
        let mut model = PlanFormModel::for_edit(&stored_plan(), today(), FormConfig::default());
        let before = model.draft().start_date - Duration::days(3);
        model.set_end_date(before).unwrap();

        let report = model.validate(false);
        assert!(report.contains(PlanField::EndDate));
    }

    #[test]
    fn test_mark_saved_resets_baseline() {
        let mut model = PlanFormModel::for_edit(&stored_plan(), today(), FormConfig::default());
        model.set_field(PlanField::ReceivedAmount, "300");
        assert!(model.has_unsaved_changes());

        model.mark_saved();
        assert!(!model.has_unsaved_changes());
        model.discard_changes();
        assert_eq!(model.draft().received_amount, "300");
    }

    #[test]
    fn test_create_flow_never_dirty() {
        let mut model = create_model();
        model.set_field(PlanField::TherapyName, "Anything");
        assert!(!model.has_unsaved_changes());
    }
}
