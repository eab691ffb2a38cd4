//! Therapy plan form engine
//!
//! This crate holds the logic behind the therapy-plan create and edit
//! screens. Views apply field edits; the engine keeps the derived fields
//! consistent and reports what blocks submission.
//!
//! # Architecture
//!
//! - Every mutation runs the edit-driven update of the sessions /
//!   per-session / total triangle, then one pure `recompute_derived` pass
//! - Money is parsed into `Decimal` and rounded to cents half away from zero;
//!   the draft keeps the user's text
//! - Collaborators (persistence, notifications, navigation, categories) are
//!   traits from `therapy-core`, passed in explicitly
//!
//! # Modules
//!
//! - `form` - `PlanFormModel`, create and edit flows, dirty tracking
//! - `recompute` - derived fields and the edit precedence rule
//! - `validation` - field-keyed validation report
//! - `payload` - mapping to the persistence service's body
//! - `categories` - category lists by organization industry
//! - `screen` - submit/load/leave orchestration with a busy flag

pub mod categories;
pub mod draft;
pub mod form;
pub mod money;
pub mod payload;
pub mod recompute;
pub mod screen;
pub mod validation;

pub use categories::IndustryCategories;
pub use draft::{FormFlow, PlanDraft, PlanField};
pub use form::{DateRejection, EditOutcome, PlanFormModel};
pub use payload::to_submission_payload;
pub use recompute::recompute_derived;
pub use screen::{
    BusyFlag, Collaborators, LeaveOutcome, PlanScreen, SessionContext, SubmitError,
    SubmitOutcome, SubmitTarget,
};
pub use validation::{validate, ValidationReport};

/// Form engine constants
pub mod constants {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    /// Decimal places kept for money
    pub const MONEY_SCALE: u32 = 2;

    /// Percentages are expressed out of this
    pub const PERCENT: Decimal = dec!(100);

    pub const DAYS_PER_WEEK: i64 = 7;

    /// Wire and input format for plan dates
    pub const DATE_FORMAT: &str = "%Y-%m-%d";
}
