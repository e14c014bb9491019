use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TreatmentPhoto;

/// Published, curated photo visible to prospective customers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub id: Uuid,
    pub shop_id: Uuid,
    pub photo_id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPortfolio {
    pub photo_id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Portfolio entry together with the photo it shows.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioDetail {
    #[serde(flatten)]
    pub portfolio: Portfolio,
    pub photo: TreatmentPhoto,
}
