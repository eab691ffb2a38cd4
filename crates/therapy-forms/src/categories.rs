//! Therapy categories by industry
//!
//! Organizations declare a free-text industry. Known industries get their
//! own category list; anything else falls back to a general list.

use therapy_core::traits::CategoryProvider;
use tracing::debug;

/// Categories offered when the industry is not recognized
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "General Assessment",
    "Rehabilitation",
    "Pain Management",
    "Preventive Care",
    "Follow-up Care",
    "Counseling",
    "Other",
];

const PHYSIOTHERAPY: &[&str] = &[
    "Musculoskeletal",
    "Neurological",
    "Cardiopulmonary",
    "Sports Injury",
    "Post-Surgical",
    "Pediatric",
    "Geriatric",
];

const PSYCHOLOGY: &[&str] = &[
    "Anxiety",
    "Depression",
    "Trauma",
    "Relationship",
    "Behavioral",
    "Addiction",
];

const SPEECH_THERAPY: &[&str] = &[
    "Articulation",
    "Fluency",
    "Voice",
    "Language Development",
    "Swallowing",
];

const OCCUPATIONAL_THERAPY: &[&str] = &[
    "Activities of Daily Living",
    "Fine Motor Skills",
    "Sensory Integration",
    "Cognitive Rehabilitation",
    "Hand Therapy",
];

const DENTAL: &[&str] = &[
    "Orthodontics",
    "Periodontics",
    "Endodontics",
    "Prosthodontics",
    "Oral Surgery",
    "Preventive Dentistry",
];

/// Built-in industry table
#[derive(Debug, Clone, Copy, Default)]
pub struct IndustryCategories;

impl IndustryCategories {
    pub fn new() -> Self {
        Self
    }

    fn lookup(industry: &str) -> Option<&'static [&'static str]> {
        let normalized = industry.trim().to_lowercase();
        let list = match normalized.as_str() {
            "physiotherapy" | "physical therapy" => PHYSIOTHERAPY,
            "psychology" | "mental health" => PSYCHOLOGY,
            "speech therapy" => SPEECH_THERAPY,
            "occupational therapy" => OCCUPATIONAL_THERAPY,
            "dental" | "dentistry" => DENTAL,
            _ => return None,
        };
        Some(list)
    }
}

impl CategoryProvider for IndustryCategories {
    fn categories_for(&self, industry: &str) -> Vec<String> {
        let list = Self::lookup(industry).unwrap_or_else(|| {
            debug!(industry, "Unknown industry, using default categories");
            DEFAULT_CATEGORIES
        });
        list.iter().map(|c| c.to_string()).collect()
    }
}
