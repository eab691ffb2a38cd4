//! Plan screen orchestration
//!
//! Glue between a [`PlanFormModel`] and the host app's collaborators:
//! - Opening the create flow, or loading a plan for the edit flow
//! - Surfacing rejected edits as alerts
//! - Submitting with a busy flag so at most one request is in flight
//! - Guarding navigation away from unsaved edits

use chrono::NaiveDate;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use therapy_core::config::FormConfig;
use therapy_core::models::{PaymentType, UserRole};
use therapy_core::traits::{
    CategoryProvider, LeaveChoice, NavigationHost, NotificationSink, PersistenceClient,
};
use therapy_core::{AppError, AppResult};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::draft::{FormFlow, PlanField};
use crate::form::{DateRejection, EditOutcome, PlanFormModel};
use crate::validation::ValidationReport;

/// Shared flag telling the UI a submit is outstanding
#[derive(Debug, Clone, Default)]
pub struct BusyFlag {
    inner: Arc<AtomicBool>,
}

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.inner.load(Ordering::Acquire)
    }

    /// Claim the flag; `None` if it is already held
    pub fn try_acquire(&self) -> Option<BusyGuard> {
        self.inner
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard {
                inner: Arc::clone(&self.inner),
            })
    }
}

/// Clears the busy flag when dropped, including when a submit future is cancelled
#[derive(Debug)]
pub struct BusyGuard {
    inner: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.inner.store(false, Ordering::Release);
    }
}

/// Who is using the screen
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub role: UserRole,
    /// Organization industry tag, free text
    pub industry: String,
    pub today: NaiveDate,
}

/// Collaborators supplied by the host app
pub struct Collaborators<P, N, H> {
    pub persistence: Arc<P>,
    pub notifier: Arc<N>,
    pub navigation: Arc<H>,
}

impl<P, N, H> Clone for Collaborators<P, N, H> {
    fn clone(&self) -> Self {
        Self {
            persistence: Arc::clone(&self.persistence),
            notifier: Arc::clone(&self.notifier),
            navigation: Arc::clone(&self.navigation),
        }
    }
}

/// Where a submit goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitTarget {
    Create { patient_id: String },
    Update { plan_id: String },
}

/// Successful submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created { plan_id: String },
    Updated,
}

/// Why a submit did not go through
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitError {
    #[error("{} field(s) need attention", .0.len())]
    Invalid(ValidationReport),

    #[error("A submit is already in progress")]
    AlreadySubmitting,

    #[error("Submit failed: {0}")]
    Persistence(AppError),
}

/// Result of asking to leave the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    Left,
    Stayed,
}

/// One create or edit screen and its draft
pub struct PlanScreen<P, N, H> {
    collaborators: Collaborators<P, N, H>,
    model: PlanFormModel,
    target: SubmitTarget,
    role: UserRole,
    categories: Vec<String>,
    busy: BusyFlag,
    submit_error: Option<AppError>,
}

impl<P, N, H> PlanScreen<P, N, H>
where
    P: PersistenceClient,
    N: NotificationSink,
    H: NavigationHost,
{
    /// Open the create flow for a patient
    pub fn open_create(
        collaborators: Collaborators<P, N, H>,
        session: &SessionContext,
        categories: &dyn CategoryProvider,
        patient_id: impl Into<String>,
        config: FormConfig,
    ) -> Self {
        let patient_id = patient_id.into();
        debug!(patient_id = %patient_id, "Opening create plan screen");

        Self {
            collaborators,
            model: PlanFormModel::new_create(session.today, config),
            target: SubmitTarget::Create { patient_id },
            role: session.role,
            categories: categories.categories_for(&session.industry),
            busy: BusyFlag::new(),
            submit_error: None,
        }
    }

    /// Load a plan and open the edit flow
    ///
    /// A failed fetch alerts the user and navigates back; there is no retry.
    #[instrument(skip(collaborators, session, categories, config))]
    pub async fn open_edit(
        collaborators: Collaborators<P, N, H>,
        session: &SessionContext,
        categories: &dyn CategoryProvider,
        plan_id: &str,
        config: FormConfig,
    ) -> AppResult<Self> {
        let plan = match collaborators.persistence.get(plan_id).await {
            Ok(plan) => plan,
            Err(e) => {
                warn!(plan_id, error = %e, "Failed to load plan for editing");
                collaborators.notifier.show_error(&e);
                collaborators.navigation.go_back();
                return Err(e);
            }
        };

        info!(plan_id, "Plan loaded for editing");

        Ok(Self {
            model: PlanFormModel::for_edit(&plan, session.today, config),
            target: SubmitTarget::Update {
                plan_id: plan.id.clone(),
            },
            role: session.role,
            categories: categories.categories_for(&session.industry),
            busy: BusyFlag::new(),
            submit_error: None,
            collaborators,
        })
    }

    pub fn model(&self) -> &PlanFormModel {
        &self.model
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn target(&self) -> &SubmitTarget {
        &self.target
    }

    /// Handle the UI can poll while a submit is awaited
    pub fn busy_flag(&self) -> BusyFlag {
        self.busy.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.busy.is_busy()
    }

    /// Inline error from the last failed submit
    pub fn submit_error(&self) -> Option<&AppError> {
        self.submit_error.as_ref()
    }

    /// Whether the submit control should be enabled
    ///
    /// The edit flow only saves when something changed.
    pub fn can_submit(&self) -> bool {
        if self.busy.is_busy() {
            return false;
        }
        match self.model.flow() {
            FormFlow::Create => true,
            FormFlow::Edit => self.model.has_unsaved_changes(),
        }
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.model.has_unsaved_changes()
    }

    /// Inline field errors for the current draft
    pub fn field_errors(&self) -> ValidationReport {
        self.model
            .validate_with_categories(self.role.is_admin(), &self.categories)
    }

    pub fn set_field(&mut self, field: PlanField, value: &str) -> EditOutcome {
        let outcome = self.model.set_field(field, value);
        if let EditOutcome::Rejected(reason) = &outcome {
            let error = if matches!(field, PlanField::StartDate | PlanField::EndDate) {
                AppError::DateRejected(reason.clone())
            } else {
                AppError::InvalidInput(reason.clone())
            };
            self.collaborators.notifier.show_error(&error);
        }
        outcome
    }

    pub fn set_payment_type(&mut self, payment_type: PaymentType) {
        self.model.set_payment_type(payment_type);
    }

    pub fn set_start_date(&mut self, date: NaiveDate) -> Result<(), DateRejection> {
        let result = self.model.set_start_date(date);
        self.alert_on_rejection(&result);
        result
    }

    pub fn set_end_date(&mut self, date: NaiveDate) -> Result<(), DateRejection> {
        let result = self.model.set_end_date(date);
        self.alert_on_rejection(&result);
        result
    }

    /// Drop edits in the edit flow
    pub fn discard_changes(&mut self) {
        self.model.discard_changes();
    }

    /// Validate and send the draft to the persistence service
    ///
    /// On failure the draft is untouched and the submit control re-enabled.
    #[instrument(skip(self), fields(target = ?self.target))]
    pub async fn submit(&mut self) -> Result<SubmitOutcome, SubmitError> {
        let _guard = self.busy.try_acquire().ok_or_else(|| {
            debug!("Submit ignored, another one is in flight");
            SubmitError::AlreadySubmitting
        })?;

        let report = self.field_errors();
        if !report.is_empty() {
            warn!(errors = report.len(), "Plan validation failed");
            self.collaborators
                .notifier
                .show_error(&AppError::Validation(report.summary()));
            return Err(SubmitError::Invalid(report));
        }

        let payload = self.model.submission_payload();
        let persistence = Arc::clone(&self.collaborators.persistence);

        let result = match &self.target {
            SubmitTarget::Create { patient_id } => persistence
                .create(patient_id, &payload)
                .await
                .map(|created| SubmitOutcome::Created {
                    plan_id: created.id,
                }),
            SubmitTarget::Update { plan_id } => persistence
                .update(plan_id, &payload)
                .await
                .map(|()| SubmitOutcome::Updated),
        };

        match result {
            Ok(outcome) => {
                let message = match &outcome {
                    SubmitOutcome::Created { plan_id } => {
                        info!(plan_id = %plan_id, "Therapy plan created");
                        "Therapy plan created successfully"
                    }
                    SubmitOutcome::Updated => {
                        info!("Therapy plan updated");
                        self.model.mark_saved();
                        "Therapy plan updated successfully"
                    }
                };
                self.submit_error = None;
                self.collaborators.notifier.show_success(message);
                self.collaborators.navigation.go_back();
                Ok(outcome)
            }
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "Therapy plan submit failed");
                self.collaborators.notifier.show_error(&e);
                self.submit_error = Some(e.clone());
                Err(SubmitError::Persistence(e))
            }
        }
    }

    /// Pre-navigation hook
    ///
    /// With unsaved edits the user is asked to confirm. `Discard` restores
    /// the loaded plan before leaving.
    pub async fn request_leave(&mut self) -> LeaveOutcome {
        if self.model.has_unsaved_changes() {
            match self.collaborators.navigation.confirm_discard().await {
                LeaveChoice::Cancel => {
                    debug!("Leave cancelled, unsaved changes kept");
                    return LeaveOutcome::Stayed;
                }
                LeaveChoice::Discard => {
                    debug!("Discarding unsaved changes");
                    self.model.discard_changes();
                }
            }
        }
        self.collaborators.navigation.go_back();
        LeaveOutcome::Left
    }

    fn alert_on_rejection(&self, result: &Result<(), DateRejection>) {
        if let Err(rejection) = result {
            debug!(%rejection, "Date edit rejected");
            self.collaborators
                .notifier
                .show_error(&AppError::DateRejected(rejection.to_string()));
        }
    }
}
