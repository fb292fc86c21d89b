// src/models/classification.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Named classification methods offered by the external service.
/// Opaque to this system beyond their identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationType {
    Topsis,
    Fuzzy,
    Neural,
}

impl ClassificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Topsis => "topsis",
            Self::Fuzzy => "fuzzy",
            Self::Neural => "neural",
        }
    }
}

impl fmt::Display for ClassificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "topsis" => Ok(Self::Topsis),
            "fuzzy" => Ok(Self::Fuzzy),
            "neural" => Ok(Self::Neural),
            other => Err(format!(
                "invalid classification type '{}'. Valid values: topsis, fuzzy, neural",
                other
            )),
        }
    }
}

/// Represents the 'student_course_cognitive_classifications' table: the
/// latest classification snapshot per (student, course, type). Fully
/// replaced on each regeneration, never merged.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CognitiveClassification {
    pub id: i64,
    pub user_id: i64,
    pub course_id: i64,
    pub classification_type: String,

    /// Bloom's-taxonomy-style level returned by the classifier.
    pub classification_level: String,

    pub classification_score: f64,

    /// Opaque payload returned by the classifier, stored as-is.
    pub raw_data: serde_json::Value,

    pub classified_at: chrono::DateTime<chrono::Utc>,
}

/// One row of the classification-date selector.
#[derive(Debug, Serialize, FromRow)]
pub struct ClassificationHistoryEntry {
    pub classified_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for requesting a classification run.
#[derive(Debug, Deserialize)]
pub struct GenerateClassificationRequest {
    /// 'topsis', 'fuzzy' or 'neural'.
    pub classification_type: String,
}

/// Query parameters for reading back classifications.
#[derive(Debug, Deserialize)]
pub struct ClassificationQuery {
    pub classification_type: String,
}
