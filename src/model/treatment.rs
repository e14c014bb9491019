use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Patch, TreatmentPhoto};
use crate::error::{Error, Result};

/// A product applied during a treatment, e.g. brand "로레알", code "7.1", area "뿌리".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUsed {
    pub brand: String,
    pub code: Option<String>,
    pub area: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Satisfaction {
    High,
    Medium,
    Low,
}

impl fmt::Display for Satisfaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Satisfaction::High => "high",
            Satisfaction::Medium => "medium",
            Satisfaction::Low => "low",
        };
        f.write_str(s)
    }
}

impl FromStr for Satisfaction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Satisfaction::High),
            "medium" => Ok(Satisfaction::Medium),
            "low" => Ok(Satisfaction::Low),
            other => Err(format!(
                "satisfaction must be high, medium or low, got '{other}'"
            )),
        }
    }
}

/// One recorded service session for a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Treatment {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub designer_id: Option<Uuid>,
    pub shop_id: Uuid,
    /// cut, color, perm, treatment, ...
    pub service_type: String,
    pub service_detail: Option<String>,
    pub products_used: Vec<ProductUsed>,
    pub area: Option<String>,
    pub duration_minutes: Option<i32>,
    pub price: Option<i64>,
    pub satisfaction: Option<Satisfaction>,
    pub customer_notes: Option<String>,
    /// Only set when the record came from a voice memo
    pub ai_summary: Option<String>,
    pub next_visit_recommendation: Option<String>,
    /// Effective time of the visit
    pub created_at: DateTime<Utc>,
}

/// Fully specified treatment submission.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTreatment {
    pub customer_id: Uuid,
    pub designer_id: Option<Uuid>,
    pub service_type: String,
    pub service_detail: Option<String>,
    #[serde(default)]
    pub products_used: Vec<ProductUsed>,
    pub area: Option<String>,
    pub duration_minutes: Option<i32>,
    pub price: Option<i64>,
    pub satisfaction: Option<Satisfaction>,
    pub customer_notes: Option<String>,
    pub next_visit_recommendation: Option<String>,
    /// Backdates the visit; defaults to now
    pub performed_at: Option<DateTime<Utc>>,
    /// Never accepted from clients, only filled from a voice extraction
    #[serde(skip)]
    pub ai_summary: Option<String>,
}

impl NewTreatment {
    pub fn validate(&self, now: DateTime<Utc>) -> Result<()> {
        if self.service_type.trim().is_empty() {
            return Err(Error::validation("service_type must not be empty"));
        }
        check_non_negative("duration_minutes", self.duration_minutes.map(i64::from))?;
        check_non_negative("price", self.price)?;
        check_products(&self.products_used)?;
        if let Some(at) = self.performed_at {
            if at > now {
                return Err(Error::validation("performed_at must not be in the future"));
            }
        }
        Ok(())
    }

    pub fn into_treatment(self, shop_id: Uuid, now: DateTime<Utc>) -> Treatment {
        Treatment {
            id: Uuid::new_v4(),
            customer_id: self.customer_id,
            designer_id: self.designer_id,
            shop_id,
            service_type: self.service_type.trim().to_string(),
            service_detail: self.service_detail,
            products_used: self.products_used,
            area: self.area,
            duration_minutes: self.duration_minutes,
            price: self.price,
            satisfaction: self.satisfaction,
            customer_notes: self.customer_notes,
            ai_summary: self.ai_summary,
            next_visit_recommendation: self.next_visit_recommendation,
            created_at: self.performed_at.unwrap_or(now),
        }
    }
}

/// Partial treatment update: `Missing` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TreatmentPatch {
    pub designer_id: Patch<Uuid>,
    pub service_type: Patch<String>,
    pub service_detail: Patch<String>,
    pub products_used: Patch<Vec<ProductUsed>>,
    pub area: Patch<String>,
    pub duration_minutes: Patch<i32>,
    pub price: Patch<i64>,
    pub satisfaction: Patch<Satisfaction>,
    pub customer_notes: Patch<String>,
    pub next_visit_recommendation: Patch<String>,
}

impl TreatmentPatch {
    pub fn validate(&self) -> Result<()> {
        match &self.service_type {
            Patch::Null => return Err(Error::validation("service_type cannot be null")),
            Patch::Value(s) if s.trim().is_empty() => {
                return Err(Error::validation("service_type must not be empty"))
            }
            _ => {}
        }
        check_non_negative(
            "duration_minutes",
            self.duration_minutes.as_value().copied().map(i64::from),
        )?;
        check_non_negative("price", self.price.as_value().copied())?;
        if let Some(products) = self.products_used.as_value() {
            check_products(products)?;
        }
        Ok(())
    }

    pub fn apply_to(self, treatment: &mut Treatment) -> Result<()> {
        self.validate()?;
        self.designer_id.apply(&mut treatment.designer_id);
        self.service_type
            .apply_required(&mut treatment.service_type, "service_type")?;
        self.service_detail.apply(&mut treatment.service_detail);
        match self.products_used {
            Patch::Missing => {}
            Patch::Null => treatment.products_used.clear(),
            Patch::Value(products) => treatment.products_used = products,
        }
        self.area.apply(&mut treatment.area);
        self.duration_minutes.apply(&mut treatment.duration_minutes);
        self.price.apply(&mut treatment.price);
        self.satisfaction.apply(&mut treatment.satisfaction);
        self.customer_notes.apply(&mut treatment.customer_notes);
        self.next_visit_recommendation
            .apply(&mut treatment.next_visit_recommendation);
        Ok(())
    }
}

/// Treatment with its photos in creation order.
#[derive(Debug, Clone, Serialize)]
pub struct TreatmentDetail {
    #[serde(flatten)]
    pub treatment: Treatment,
    pub photos: Vec<TreatmentPhoto>,
}

fn check_non_negative(field: &str, value: Option<i64>) -> Result<()> {
    match value {
        Some(v) if v < 0 => Err(Error::validation(format!(
            "{field} must be non-negative, got {v}"
        ))),
        _ => Ok(()),
    }
}

fn check_products(products: &[ProductUsed]) -> Result<()> {
    if let Some(pos) = products.iter().position(|p| p.brand.trim().is_empty()) {
        return Err(Error::validation(format!(
            "products_used[{pos}].brand must not be empty"
        )));
    }
    Ok(())
}
