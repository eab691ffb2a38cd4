//! Plan draft
//!
//! The in-progress, not yet persisted therapy plan. Free-text inputs stay
//! strings so the draft always mirrors what the user typed.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use therapy_core::models::{PaymentType, TherapyPlan};
use therapy_core::AppError;

use crate::money::f64_to_input;

/// Which screen owns the draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormFlow {
    /// New plan for a patient
    Create,
    /// Existing plan loaded from the service
    Edit,
}

/// Fields of the plan form, declared in on-screen order
///
/// The derived `Ord` follows declaration order, which keeps validation
/// reports in the order the user sees the inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlanField {
    TherapyName,
    PatientSymptoms,
    PatientDiagnosis,
    TherapyCategory,
    StartDate,
    EndDate,
    TherapyDurationDays,
    PaymentType,
    EstimatedSessions,
    PerSessionAmount,
    TotalAmount,
    DiscountPercentage,
    ReceivedAmount,
    Balance,
}

impl PlanField {
    pub const ALL: [PlanField; 14] = [
        PlanField::TherapyName,
        PlanField::PatientSymptoms,
        PlanField::PatientDiagnosis,
        PlanField::TherapyCategory,
        PlanField::StartDate,
        PlanField::EndDate,
        PlanField::TherapyDurationDays,
        PlanField::PaymentType,
        PlanField::EstimatedSessions,
        PlanField::PerSessionAmount,
        PlanField::TotalAmount,
        PlanField::DiscountPercentage,
        PlanField::ReceivedAmount,
        PlanField::Balance,
    ];

    /// Wire name used by the persistence service
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanField::TherapyName => "therapyName",
            PlanField::PatientSymptoms => "patientSymptoms",
            PlanField::PatientDiagnosis => "patientDiagnosis",
            PlanField::TherapyCategory => "therapyCategory",
            PlanField::StartDate => "startDate",
            PlanField::EndDate => "endDate",
            PlanField::TherapyDurationDays => "therapyDurationDays",
            PlanField::PaymentType => "paymentType",
            PlanField::EstimatedSessions => "estimatedSessions",
            PlanField::PerSessionAmount => "perSessionAmount",
            PlanField::TotalAmount => "totalAmount",
            PlanField::DiscountPercentage => "discountPercentage",
            PlanField::ReceivedAmount => "receivedAmount",
            PlanField::Balance => "balance",
        }
    }

    /// Fields the form computes itself
    pub fn is_derived(&self) -> bool {
        matches!(self, PlanField::TherapyDurationDays | PlanField::Balance)
    }
}

impl FromStr for PlanField {
    type Err = AppError;

    /// Parse a wire name (exact match)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlanField::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown field: {}", s)))
    }
}

impl fmt::Display for PlanField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Draft state of a therapy plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDraft {
    pub therapy_name: String,
    pub patient_symptoms: String,
    pub patient_diagnosis: String,
    pub therapy_category: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub therapy_duration_days: i64,
    pub payment_type: PaymentType,
    pub estimated_sessions: String,
    pub per_session_amount: String,
    pub total_amount: String,
    pub discount_percentage: String,
    pub received_amount: String,
    pub balance: String,
}

impl PlanDraft {
    /// Empty draft spanning `length_days` from `start`
    pub fn empty(start: NaiveDate, length_days: i64) -> Self {
        Self {
            therapy_name: String::new(),
            patient_symptoms: String::new(),
            patient_diagnosis: String::new(),
            therapy_category: String::new(),
            start_date: start,
            end_date: start + Duration::days(length_days),
            therapy_duration_days: 0,
            payment_type: PaymentType::default(),
            estimated_sessions: String::new(),
            per_session_amount: String::new(),
            total_amount: String::new(),
            discount_percentage: "0".to_string(),
            received_amount: String::new(),
            balance: String::new(),
        }
    }

    /// Text slot of a free-text field
    ///
    /// Dates, payment type and duration are not text and return `None`.
    pub(crate) fn text_mut(&mut self, field: PlanField) -> Option<&mut String> {
        let value = match field {
            PlanField::TherapyName => &mut self.therapy_name,
            PlanField::PatientSymptoms => &mut self.patient_symptoms,
            PlanField::PatientDiagnosis => &mut self.patient_diagnosis,
            PlanField::TherapyCategory => &mut self.therapy_category,
            PlanField::EstimatedSessions => &mut self.estimated_sessions,
            PlanField::PerSessionAmount => &mut self.per_session_amount,
            PlanField::TotalAmount => &mut self.total_amount,
            PlanField::DiscountPercentage => &mut self.discount_percentage,
            PlanField::ReceivedAmount => &mut self.received_amount,
            PlanField::Balance => &mut self.balance,
            PlanField::StartDate
            | PlanField::EndDate
            | PlanField::TherapyDurationDays
            | PlanField::PaymentType => return None,
        };
        Some(value)
    }
}

impl From<&TherapyPlan> for PlanDraft {
    fn from(plan: &TherapyPlan) -> Self {
        Self {
            therapy_name: plan.therapy_name.clone(),
            patient_symptoms: plan.patient_symptoms.clone(),
            patient_diagnosis: plan.patient_diagnosis.clone(),
            therapy_category: plan.therapy_category.clone(),
            start_date: plan.start_date,
            end_date: plan.end_date,
            therapy_duration_days: plan.therapy_duration_days,
            payment_type: plan.payment_type,
            estimated_sessions: plan
                .estimated_sessions
                .map(|s| s.to_string())
                .unwrap_or_default(),
            per_session_amount: plan
                .per_session_amount
                .map(f64_to_input)
                .unwrap_or_default(),
            total_amount: f64_to_input(plan.total_amount),
            discount_percentage: f64_to_input(plan.discount_percentage),
            received_amount: f64_to_input(plan.received_amount),
            balance: f64_to_input(plan.balance),
        }
    }
}
