use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// A salon tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub id: Uuid,
    pub name: String,
    /// hair, nail, skin, scalp
    pub shop_type: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub subscription_plan: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewShop {
    pub name: String,
    pub shop_type: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

impl NewShop {
    pub fn into_shop(self) -> Result<Shop> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("shop name must not be empty"));
        }
        if self.shop_type.trim().is_empty() {
            return Err(Error::validation("shop_type must not be empty"));
        }
        Ok(Shop {
            id: Uuid::new_v4(),
            name: self.name.trim().to_string(),
            shop_type: self.shop_type.trim().to_string(),
            address: self.address,
            phone: self.phone,
            subscription_plan: "basic".to_string(),
            created_at: Utc::now(),
        })
    }
}

/// Staff member who may perform treatments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Designer {
    pub id: Uuid,
    pub shop_id: Uuid,
    pub name: String,
    /// owner, designer, assistant
    pub role: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDesigner {
    pub name: String,
    pub role: Option<String>,
    pub phone: Option<String>,
}

impl NewDesigner {
    pub fn into_designer(self, shop_id: Uuid) -> Result<Designer> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("designer name must not be empty"));
        }
        Ok(Designer {
            id: Uuid::new_v4(),
            shop_id,
            name: self.name.trim().to_string(),
            role: self.role.unwrap_or_else(|| "designer".to_string()),
            phone: self.phone,
            is_active: true,
            created_at: Utc::now(),
        })
    }
}
