//! Domain models for therapy plans
//!
//! This module contains the core domain models shared by the form engine
//! and the persistence collaborator.

pub mod plan;
pub mod user;

pub use plan::{CreatedPlan, PaymentType, PlanPayload, TherapyPlan};
pub use user::UserRole;
