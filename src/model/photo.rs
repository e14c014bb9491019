use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoType {
    Before,
    During,
    #[default]
    After,
}

impl fmt::Display for PhotoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PhotoType::Before => "before",
            PhotoType::During => "during",
            PhotoType::After => "after",
        };
        f.write_str(s)
    }
}

impl FromStr for PhotoType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "before" => Ok(PhotoType::Before),
            "during" => Ok(PhotoType::During),
            "after" => Ok(PhotoType::After),
            other => Err(Error::validation(format!(
                "photo_type must be before, during or after, got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentPhoto {
    pub id: Uuid,
    pub treatment_id: Uuid,
    pub photo_url: String,
    pub photo_type: PhotoType,
    pub face_swapped_url: Option<String>,
    /// Set only when a Portfolio entry is created from this photo
    pub is_portfolio: bool,
    pub caption: Option<String>,
    pub taken_at: DateTime<Utc>,
}
