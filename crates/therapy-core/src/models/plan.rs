// src/models/plan.rs
//! Therapy plan record
//!
//! The persisted representation of a patient's therapy plan as returned by
//! the remote service. Field names on the wire are camelCase and dictated by
//! that service.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// How the patient pays for the plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PaymentType {
    /// Paid per session over the plan's lifetime
    #[default]
    #[serde(rename = "recurring")]
    Recurring,
    /// Paid in full up front
    #[serde(rename = "one-time")]
    OneTime,
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentType::Recurring => write!(f, "recurring"),
            PaymentType::OneTime => write!(f, "one-time"),
        }
    }
}

impl FromStr for PaymentType {
    type Err = AppError;

    /// Parse from string (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "recurring" => Ok(PaymentType::Recurring),
            "one-time" | "onetime" | "one_time" => Ok(PaymentType::OneTime),
            _ => Err(AppError::InvalidInput(format!("Unknown payment type: {}", s))),
        }
    }
}

impl PaymentType {
    /// Check if sessions and per-session amounts apply
    pub fn is_recurring(&self) -> bool {
        matches!(self, PaymentType::Recurring)
    }
}

/// Therapy plan as stored by the persistence service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TherapyPlan {
    /// Unique plan ID
    pub id: String,

    /// Patient the plan belongs to
    pub patient_id: String,

    pub therapy_name: String,

    #[serde(default)]
    pub patient_symptoms: String,

    #[serde(default)]
    pub patient_diagnosis: String,

    pub therapy_category: String,

    pub start_date: NaiveDate,

    pub end_date: NaiveDate,

    #[serde(default)]
    pub therapy_duration_days: i64,

    #[serde(default)]
    pub payment_type: PaymentType,

    /// Absent for one-time plans
    #[serde(default)]
    pub estimated_sessions: Option<i64>,

    #[serde(default)]
    pub per_session_amount: Option<f64>,

    pub total_amount: f64,

    #[serde(default)]
    pub discount_percentage: f64,

    #[serde(default)]
    pub received_amount: f64,

    #[serde(default)]
    pub balance: f64,
}

/// Body sent to the persistence service on create and update
///
/// Money fields that failed to parse are carried as `NaN`, which serializes
/// as `null`. Submission is expected to be gated by validation first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanPayload {
    pub therapy_name: String,
    pub patient_symptoms: String,
    pub patient_diagnosis: String,
    pub therapy_category: String,
    /// `YYYY-MM-DD`
    pub start_date: String,
    /// `YYYY-MM-DD`
    pub end_date: String,
    pub therapy_duration_days: i64,
    pub payment_type: PaymentType,
    pub estimated_sessions: Option<i64>,
    pub per_session_amount: f64,
    pub total_amount: f64,
    pub discount_percentage: f64,
    pub received_amount: f64,
    pub balance: f64,
}

/// Acknowledgement returned by a successful create
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedPlan {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_type_parsing() {
        assert_eq!("Recurring".parse::<PaymentType>(), Ok(PaymentType::Recurring));
        assert_eq!("one-time".parse::<PaymentType>(), Ok(PaymentType::OneTime));
        assert!(matches!(
            "weekly".parse::<PaymentType>(),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_payment_type_wire_format() {
        let json = serde_json::to_string(&PaymentType::OneTime).unwrap();
        assert_eq!(json, "\"one-time\"");
        assert_eq!(PaymentType::OneTime.to_string(), "one-time");
    }

    #[test]
    fn test_plan_record_deserializes_camel_case() {
        let json = r#"{
            "id": "plan-1",
            "patientId": "pat-9",
            "therapyName": "Knee Rehab",
            "therapyCategory": "Musculoskeletal",
            "startDate": "2026-03-01",
            "endDate": "2026-03-29",
            "paymentType": "recurring",
            "estimatedSessions": 8,
            "perSessionAmount": 150.0,
            "totalAmount": 1200.0,
            "receivedAmount": 200.0
        }"#;

        let plan: TherapyPlan = serde_json::from_str(json).unwrap();
        assert_eq!(plan.patient_id, "pat-9");
        assert_eq!(plan.estimated_sessions, Some(8));
        assert_eq!(plan.discount_percentage, 0.0);
        assert!(plan.patient_symptoms.is_empty());
        assert_eq!(
            plan.start_date,
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
        );
    }
}
