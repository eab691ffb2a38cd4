//! User role model
//!
//! The role of the staff member submitting a plan decides which clinical
//! fields are mandatory.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Staff role enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Clinician treating the patient
    #[default]
    Therapist,
    /// Front-desk staff handling payments
    Receptionist,
    /// Organization administrator
    Admin,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Therapist => write!(f, "therapist"),
            UserRole::Receptionist => write!(f, "receptionist"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    /// Parse from string (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "therapist" => Ok(UserRole::Therapist),
            "receptionist" => Ok(UserRole::Receptionist),
            "admin" => Ok(UserRole::Admin),
            _ => Err(AppError::InvalidInput(format!("Unknown role: {}", s))),
        }
    }
}

impl UserRole {
    /// Admins may submit plans without symptoms or diagnosis
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}
