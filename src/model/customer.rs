use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Patch;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub shop_id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<String>,
    pub notes: Option<String>,
    pub naver_booking_id: Option<String>,
    /// Only ever incremented, one per recorded treatment
    pub visit_count: u32,
    pub last_visit: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Record one visit at `at`. `last_visit` keeps the latest visit time,
    /// so a backdated treatment never moves it backwards.
    pub fn record_visit(&mut self, at: DateTime<Utc>) {
        self.visit_count += 1;
        self.last_visit = Some(match self.last_visit {
            Some(prev) if prev > at => prev,
            _ => at,
        });
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<String>,
    pub notes: Option<String>,
    pub naver_booking_id: Option<String>,
}

impl NewCustomer {
    pub fn into_customer(self, shop_id: Uuid) -> Result<Customer> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("customer name must not be empty"));
        }
        Ok(Customer {
            id: Uuid::new_v4(),
            shop_id,
            name: self.name.trim().to_string(),
            phone: self.phone,
            gender: self.gender,
            birth_date: self.birth_date,
            notes: self.notes,
            naver_booking_id: self.naver_booking_id,
            visit_count: 0,
            last_visit: None,
            created_at: Utc::now(),
        })
    }
}

/// Partial customer update. Visit statistics are not patchable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CustomerPatch {
    pub name: Patch<String>,
    pub phone: Patch<String>,
    pub gender: Patch<String>,
    pub birth_date: Patch<String>,
    pub notes: Patch<String>,
    pub naver_booking_id: Patch<String>,
}

impl CustomerPatch {
    pub fn apply_to(self, customer: &mut Customer) -> Result<()> {
        match &self.name {
            Patch::Null => return Err(Error::validation("name cannot be null")),
            Patch::Value(name) if name.trim().is_empty() => {
                return Err(Error::validation("customer name must not be empty"))
            }
            _ => {}
        }
        self.name.apply_required(&mut customer.name, "name")?;
        self.phone.apply(&mut customer.phone);
        self.gender.apply(&mut customer.gender);
        self.birth_date.apply(&mut customer.birth_date);
        self.notes.apply(&mut customer.notes);
        self.naver_booking_id.apply(&mut customer.naver_booking_id);
        Ok(())
    }
}
