use uuid::Uuid;

use crate::error::Result;
use crate::model::{
    Customer, CustomerPatch, Designer, NewCustomer, NewDesigner, NewShop, Page, Shop,
};
use crate::store::Store;

/// Shops, their staff and their customers.
#[derive(Clone)]
pub struct Directory {
    store: Store,
}

impl Directory {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn create_shop(&self, new: NewShop) -> Result<Shop> {
        let shop = new.into_shop()?;
        self.store
            .transaction(move |tx| {
                tx.put_shop(shop.clone());
                Ok(shop)
            })
            .await
    }

    pub async fn get_shop(&self, shop_id: Uuid) -> Result<Shop> {
        self.store.read(|t| t.shop(shop_id).cloned()).await
    }

    pub async fn create_designer(&self, shop_id: Uuid, new: NewDesigner) -> Result<Designer> {
        let designer = new.into_designer(shop_id)?;
        self.store
            .transaction(move |tx| {
                tx.shop(shop_id)?;
                tx.put_designer(designer.clone());
                Ok(designer)
            })
            .await
    }

    pub async fn list_designers(&self, shop_id: Uuid) -> Result<Vec<Designer>> {
        self.store
            .read(|t| {
                t.shop(shop_id)?;
                Ok(t.designers_of(shop_id).cloned().collect())
            })
            .await
    }

    pub async fn create_customer(&self, shop_id: Uuid, new: NewCustomer) -> Result<Customer> {
        let customer = new.into_customer(shop_id)?;
        self.store
            .transaction(move |tx| {
                tx.shop(shop_id)?;
                tx.put_customer(customer.clone());
                Ok(customer)
            })
            .await
    }

    /// Most recent visitors first, never-visited customers last.
    pub async fn list_customers(
        &self,
        shop_id: Uuid,
        search: Option<&str>,
        page: Page,
    ) -> Result<Vec<Customer>> {
        let page = page.validated()?;
        let needle = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        self.store
            .read(|t| {
                t.shop(shop_id)?;
                let mut customers: Vec<&Customer> = t
                    .customers_of(shop_id)
                    .filter(|c| match &needle {
                        Some(n) => c.name.to_lowercase().contains(n.as_str()),
                        None => true,
                    })
                    .collect();
                customers.sort_by(|a, b| b.last_visit.cmp(&a.last_visit));
                Ok(page.apply(customers.into_iter().cloned()))
            })
            .await
    }

    pub async fn count_customers(&self, shop_id: Uuid) -> Result<usize> {
        self.store
            .read(|t| {
                t.shop(shop_id)?;
                Ok(t.customers_of(shop_id).count())
            })
            .await
    }

    pub async fn get_customer(&self, shop_id: Uuid, customer_id: Uuid) -> Result<Customer> {
        self.store
            .read(|t| t.customer(shop_id, customer_id).cloned())
            .await
    }

    pub async fn update_customer(
        &self,
        shop_id: Uuid,
        customer_id: Uuid,
        patch: CustomerPatch,
    ) -> Result<Customer> {
        self.store
            .transaction(move |tx| {
                let mut customer = tx.customer(shop_id, customer_id)?.clone();
                patch.apply_to(&mut customer)?;
                tx.put_customer(customer.clone());
                Ok(customer)
            })
            .await
    }
}
