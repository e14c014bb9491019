use serde::{Deserialize, Serialize};
use tracing::warn;

use super::products::split_brand_code;
use crate::error::ExtractionError;
use crate::model::{ProductUsed, Satisfaction};

/// Best-effort structured reading of a voice memo.
///
/// Every field is always serialized, as `null` when the memo did not say.
/// Nothing here is persisted until the caller confirms it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionCandidate {
    pub customer_name: Option<String>,
    pub service_type: Option<String>,
    pub products_used: Vec<ProductUsed>,
    pub area: Option<String>,
    pub duration_minutes: Option<i32>,
    pub satisfaction: Option<Satisfaction>,
    pub next_visit_recommendation: Option<String>,
    pub summary: Option<String>,
}

/// Exactly the fields the extraction schema allows, all nullable.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawExtraction {
    #[serde(default)]
    customer_name: Option<String>,
    #[serde(default)]
    service_type: Option<String>,
    #[serde(default)]
    products_used: Option<Vec<RawProduct>>,
    #[serde(default)]
    area: Option<String>,
    #[serde(default)]
    duration_minutes: Option<i64>,
    #[serde(default)]
    satisfaction: Option<String>,
    #[serde(default)]
    next_visit_recommendation: Option<String>,
    #[serde(default)]
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawProduct {
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    area: Option<String>,
}

/// Blank and literal "null" strings mean the memo said nothing.
fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("null"))
}

impl ExtractionCandidate {
    /// Validate an extraction response body against the candidate shape.
    pub fn from_json(body: &str) -> Result<Self, ExtractionError> {
        let raw: RawExtraction =
            serde_json::from_str(body).map_err(|e| ExtractionError::Schema(e.to_string()))?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawExtraction) -> Result<Self, ExtractionError> {
        let duration_minutes = match raw.duration_minutes {
            None => None,
            Some(m) if m < 0 => {
                return Err(ExtractionError::Schema(format!(
                    "duration_minutes must be non-negative, got {m}"
                )))
            }
            Some(m) => Some(i32::try_from(m).map_err(|_| {
                ExtractionError::Schema(format!("duration_minutes out of range: {m}"))
            })?),
        };

        let satisfaction = clean(raw.satisfaction)
            .map(|s| s.parse::<Satisfaction>())
            .transpose()
            .map_err(ExtractionError::Schema)?;

        let mut products_used = Vec::new();
        for (i, p) in raw.products_used.unwrap_or_default().into_iter().enumerate() {
            let code = clean(p.code);
            let area = clean(p.area);
            match clean(p.brand) {
                Some(brand) => products_used.push(ProductUsed { brand, code, area }),
                None if code.is_some() || area.is_some() => {
                    warn!("Dropping products_used[{}]: no brand (code={:?})", i, code);
                }
                None => {}
            }
        }

        Ok(Self {
            customer_name: clean(raw.customer_name),
            service_type: clean(raw.service_type),
            products_used,
            area: clean(raw.area),
            duration_minutes,
            satisfaction,
            next_visit_recommendation: clean(raw.next_visit_recommendation),
            summary: clean(raw.summary),
        })
        .map(Self::normalized)
    }

    /// Trim text fields, turn blanks into `None` and split "<brand> <code>"
    /// product names. Never fills a field the memo left empty.
    pub fn normalized(self) -> Self {
        let products_used = self
            .products_used
            .into_iter()
            .filter_map(|p| {
                let (brand, code) = split_brand_code(&p.brand, p.code.as_deref());
                if brand.is_empty() {
                    return None;
                }
                Some(ProductUsed {
                    brand,
                    code,
                    area: clean(p.area),
                })
            })
            .collect();

        Self {
            customer_name: clean(self.customer_name),
            service_type: clean(self.service_type),
            products_used,
            area: clean(self.area),
            duration_minutes: self.duration_minutes,
            satisfaction: self.satisfaction,
            next_visit_recommendation: clean(self.next_visit_recommendation),
            summary: clean(self.summary),
        }
    }
}
