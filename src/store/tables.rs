use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::{Customer, Designer, Portfolio, Shop, Treatment, TreatmentPhoto};

/// All entity tables. Relations are ids, resolved through the lookups below.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Tables {
    pub(super) shops: IndexMap<Uuid, Shop>,
    pub(super) designers: IndexMap<Uuid, Designer>,
    pub(super) customers: IndexMap<Uuid, Customer>,
    pub(super) treatments: IndexMap<Uuid, Treatment>,
    pub(super) photos: IndexMap<Uuid, TreatmentPhoto>,
    pub(super) portfolios: IndexMap<Uuid, Portfolio>,
    /// "{shop_id}/{key}" -> treatment id
    #[serde(default)]
    pub(super) idempotency_keys: IndexMap<String, Uuid>,
}

pub(super) fn idempotency_slot(shop_id: Uuid, key: &str) -> String {
    format!("{shop_id}/{key}")
}

impl Tables {
    pub fn shop(&self, id: Uuid) -> Result<&Shop> {
        self.shops.get(&id).ok_or_else(|| Error::not_found("shop", id))
    }

    pub fn designer(&self, shop_id: Uuid, id: Uuid) -> Result<&Designer> {
        self.designers
            .get(&id)
            .filter(|d| d.shop_id == shop_id)
            .ok_or_else(|| Error::not_found("designer", id))
    }

    pub fn designers_of(&self, shop_id: Uuid) -> impl Iterator<Item = &Designer> {
        self.designers.values().filter(move |d| d.shop_id == shop_id)
    }

    /// Customer owned by `shop_id`; a customer of another shop is reported
    /// as not found.
    pub fn customer(&self, shop_id: Uuid, id: Uuid) -> Result<&Customer> {
        self.customers
            .get(&id)
            .filter(|c| c.shop_id == shop_id)
            .ok_or_else(|| Error::not_found("customer", id))
    }

    pub fn customers_of(&self, shop_id: Uuid) -> impl Iterator<Item = &Customer> {
        self.customers.values().filter(move |c| c.shop_id == shop_id)
    }

    pub fn customer_count(&self) -> usize {
        self.customers.len()
    }

    pub fn treatment(&self, shop_id: Uuid, id: Uuid) -> Result<&Treatment> {
        self.treatments
            .get(&id)
            .filter(|t| t.shop_id == shop_id)
            .ok_or_else(|| Error::not_found("treatment", id))
    }

    /// Treatments of a shop in insertion order
    pub fn treatments_of(&self, shop_id: Uuid) -> impl Iterator<Item = &Treatment> {
        self.treatments.values().filter(move |t| t.shop_id == shop_id)
    }

    pub fn treatment_count(&self) -> usize {
        self.treatments.len()
    }

    pub fn photo(&self, id: Uuid) -> Result<&TreatmentPhoto> {
        self.photos.get(&id).ok_or_else(|| Error::not_found("photo", id))
    }

    /// Photo whose treatment belongs to `shop_id`
    pub fn photo_in_shop(&self, shop_id: Uuid, id: Uuid) -> Result<&TreatmentPhoto> {
        let photo = self.photo(id)?;
        match self.treatments.get(&photo.treatment_id) {
            Some(t) if t.shop_id == shop_id => Ok(photo),
            _ => Err(Error::not_found("photo", id)),
        }
    }

    /// Photos of a treatment in the order they were attached
    pub fn photos_of(&self, treatment_id: Uuid) -> Vec<TreatmentPhoto> {
        self.photos
            .values()
            .filter(|p| p.treatment_id == treatment_id)
            .cloned()
            .collect()
    }

    pub fn portfolio(&self, shop_id: Uuid, id: Uuid) -> Result<&Portfolio> {
        self.portfolios
            .get(&id)
            .filter(|p| p.shop_id == shop_id)
            .ok_or_else(|| Error::not_found("portfolio", id))
    }

    pub fn portfolios_of(&self, shop_id: Uuid) -> impl Iterator<Item = &Portfolio> {
        self.portfolios.values().filter(move |p| p.shop_id == shop_id)
    }

    pub fn portfolio_for_photo(&self, photo_id: Uuid) -> Option<&Portfolio> {
        self.portfolios.values().find(|p| p.photo_id == photo_id)
    }

    pub fn idempotent_treatment(&self, shop_id: Uuid, key: &str) -> Option<Uuid> {
        self.idempotency_keys
            .get(&idempotency_slot(shop_id, key))
            .copied()
    }
}
