use std::hash::Hash;
use std::ops::Deref;

use indexmap::IndexMap;
use uuid::Uuid;

use super::tables::{idempotency_slot, Tables};
use crate::error::{Error, Result};
use crate::model::{Customer, Designer, Portfolio, Shop, Treatment, TreatmentPhoto};

/// Previous state of a row touched by the open transaction.
/// `None` means the row did not exist.
enum Undo {
    Shop(Uuid, Option<Shop>),
    Designer(Uuid, Option<Designer>),
    Customer(Uuid, Option<Customer>),
    Treatment(Uuid, Option<Treatment>),
    Photo(Uuid, Option<TreatmentPhoto>),
    Portfolio(Uuid, Option<Portfolio>),
    IdempotencyKey(String, Option<Uuid>),
}

/// Write access to the tables for the duration of one transaction.
///
/// Reads see the transaction's own writes. Dropping without [`commit`]
/// undoes every write in reverse order.
///
/// [`commit`]: Transaction::commit
pub struct Transaction<'a> {
    tables: &'a mut Tables,
    journal: Vec<Undo>,
}

impl<'a> Transaction<'a> {
    pub(super) fn new(tables: &'a mut Tables) -> Self {
        Self {
            tables,
            journal: Vec::new(),
        }
    }

    pub(super) fn is_dirty(&self) -> bool {
        !self.journal.is_empty()
    }

    pub(super) fn commit(mut self) {
        self.journal.clear();
    }

    pub fn put_shop(&mut self, shop: Shop) {
        let id = shop.id;
        let prev = self.tables.shops.insert(id, shop);
        self.journal.push(Undo::Shop(id, prev));
    }

    pub fn put_designer(&mut self, designer: Designer) {
        let id = designer.id;
        let prev = self.tables.designers.insert(id, designer);
        self.journal.push(Undo::Designer(id, prev));
    }

    pub fn put_customer(&mut self, customer: Customer) {
        let id = customer.id;
        let prev = self.tables.customers.insert(id, customer);
        self.journal.push(Undo::Customer(id, prev));
    }

    pub fn put_treatment(&mut self, treatment: Treatment) {
        let id = treatment.id;
        let prev = self.tables.treatments.insert(id, treatment);
        self.journal.push(Undo::Treatment(id, prev));
    }

    pub fn put_photo(&mut self, photo: TreatmentPhoto) {
        let id = photo.id;
        let prev = self.tables.photos.insert(id, photo);
        self.journal.push(Undo::Photo(id, prev));
    }

    /// Insert or replace a portfolio row. The referenced photo must already
    /// carry `is_portfolio == true`.
    pub fn put_portfolio(&mut self, portfolio: Portfolio) -> Result<()> {
        let flagged = self
            .tables
            .photos
            .get(&portfolio.photo_id)
            .map(|p| p.is_portfolio)
            .unwrap_or(false);
        if !flagged {
            return Err(Error::Persistence(format!(
                "portfolio {} references photo {} that is not marked as portfolio",
                portfolio.id, portfolio.photo_id
            )));
        }

        let id = portfolio.id;
        let prev = self.tables.portfolios.insert(id, portfolio);
        self.journal.push(Undo::Portfolio(id, prev));
        Ok(())
    }

    pub fn remember_idempotency_key(&mut self, shop_id: Uuid, key: &str, treatment_id: Uuid) {
        let slot = idempotency_slot(shop_id, key);
        let prev = self.tables.idempotency_keys.insert(slot.clone(), treatment_id);
        self.journal.push(Undo::IdempotencyKey(slot, prev));
    }

    fn rollback(&mut self) {
        while let Some(undo) = self.journal.pop() {
            let t = &mut *self.tables;
            match undo {
                Undo::Shop(id, prev) => restore(&mut t.shops, id, prev),
                Undo::Designer(id, prev) => restore(&mut t.designers, id, prev),
                Undo::Customer(id, prev) => restore(&mut t.customers, id, prev),
                Undo::Treatment(id, prev) => restore(&mut t.treatments, id, prev),
                Undo::Photo(id, prev) => restore(&mut t.photos, id, prev),
                Undo::Portfolio(id, prev) => restore(&mut t.portfolios, id, prev),
                Undo::IdempotencyKey(slot, prev) => restore(&mut t.idempotency_keys, slot, prev),
            }
        }
    }
}

fn restore<K: Hash + Eq, V>(table: &mut IndexMap<K, V>, key: K, prev: Option<V>) {
    match prev {
        Some(row) => {
            table.insert(key, row);
        }
        None => {
            table.shift_remove(&key);
        }
    }
}

impl Deref for Transaction<'_> {
    type Target = Tables;

    fn deref(&self) -> &Tables {
        self.tables
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        self.rollback();
    }
}
