//! Collaborator traits
//!
//! The form engine never talks to the network, the toast layer or the
//! navigation stack directly. These traits are the seams the host app
//! implements.

use crate::error::AppError;
use crate::models::{CreatedPlan, PlanPayload, TherapyPlan};
use async_trait::async_trait;

/// Remote storage for therapy plans
#[async_trait]
pub trait PersistenceClient: Send + Sync {
    /// Create a plan for a patient
    async fn create(&self, patient_id: &str, payload: &PlanPayload)
        -> Result<CreatedPlan, AppError>;

    /// Fetch a plan by ID
    async fn get(&self, plan_id: &str) -> Result<TherapyPlan, AppError>;

    /// Replace an existing plan's fields
    async fn update(&self, plan_id: &str, payload: &PlanPayload) -> Result<(), AppError>;
}

/// Fire-and-forget user feedback (toasts, alerts)
pub trait NotificationSink: Send + Sync {
    fn show_success(&self, message: &str);

    fn show_error(&self, error: &AppError);
}

/// Category list lookup for an organization's industry
pub trait CategoryProvider: Send + Sync {
    /// Ordered list of categories for a free-text, case-insensitive industry tag
    fn categories_for(&self, industry: &str) -> Vec<String>;
}

/// Answer to the unsaved-changes prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveChoice {
    /// Stay on the form
    Cancel,
    /// Drop the edits and leave
    Discard,
}

/// Navigation stack owned by the host app
#[async_trait]
pub trait NavigationHost: Send + Sync {
    /// Pop the current screen
    fn go_back(&self);

    /// Ask the user whether to drop unsaved changes
    async fn confirm_discard(&self) -> LeaveChoice;
}
