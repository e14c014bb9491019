use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::{NewTreatment, Page, Treatment, TreatmentDetail, TreatmentPatch};
use crate::store::{Store, Tables, Transaction};
use crate::voice::ExtractionCandidate;

/// A voice-memo candidate confirmed by the designer, plus the fields a memo
/// never carries.
#[derive(Debug, Clone, Deserialize)]
pub struct CandidateConfirmation {
    pub customer_id: Uuid,
    pub designer_id: Option<Uuid>,
    pub candidate: ExtractionCandidate,
    pub service_detail: Option<String>,
    pub price: Option<i64>,
    pub customer_notes: Option<String>,
    pub performed_at: Option<DateTime<Utc>>,
}

impl CandidateConfirmation {
    fn into_new_treatment(self) -> Result<NewTreatment> {
        let CandidateConfirmation {
            customer_id,
            designer_id,
            candidate,
            service_detail,
            price,
            customer_notes,
            performed_at,
        } = self;

        let service_type = candidate.service_type.ok_or_else(|| {
            Error::validation("service_type is missing; fill it in before saving")
        })?;

        Ok(NewTreatment {
            customer_id,
            designer_id,
            service_type,
            service_detail,
            products_used: candidate.products_used,
            area: candidate.area,
            duration_minutes: candidate.duration_minutes,
            price,
            satisfaction: candidate.satisfaction,
            customer_notes,
            next_visit_recommendation: candidate.next_visit_recommendation,
            performed_at,
            ai_summary: candidate.summary,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TreatmentFilter {
    pub customer_id: Option<Uuid>,
    pub service_type: Option<String>,
}

/// Treatment records and the customer visit statistics that follow them.
#[derive(Clone)]
pub struct Treatments {
    store: Store,
}

impl Treatments {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Persist a treatment and count the visit on its customer, atomically.
    ///
    /// With an idempotency key, a repeated submission returns the treatment
    /// created the first time and leaves the visit count alone.
    pub async fn create_treatment(
        &self,
        shop_id: Uuid,
        new: NewTreatment,
        idempotency_key: Option<&str>,
    ) -> Result<Treatment> {
        let now = Utc::now();
        new.validate(now)?;
        let key = idempotency_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string);

        let (treatment, created) = self
            .store
            .transaction(move |tx| {
                tx.shop(shop_id)?;
                if let Some(key) = &key {
                    if let Some(existing) = tx.idempotent_treatment(shop_id, key) {
                        return Ok((tx.treatment(shop_id, existing)?.clone(), false));
                    }
                }
                let treatment = merge_visit(tx, shop_id, new, now)?;
                if let Some(key) = &key {
                    tx.remember_idempotency_key(shop_id, key, treatment.id);
                }
                Ok((treatment, true))
            })
            .await?;

        if created {
            info!(
                "Treatment {} recorded for customer {} ({})",
                treatment.id, treatment.customer_id, treatment.service_type
            );
        } else {
            info!("Treatment {} replayed for idempotency key", treatment.id);
        }
        Ok(treatment)
    }

    /// Save a confirmed voice-memo candidate; its summary becomes the
    /// treatment's `ai_summary`.
    pub async fn create_treatment_from_candidate(
        &self,
        shop_id: Uuid,
        confirmation: CandidateConfirmation,
        idempotency_key: Option<&str>,
    ) -> Result<Treatment> {
        let new = confirmation.into_new_treatment()?;
        self.create_treatment(shop_id, new, idempotency_key).await
    }

    /// Apply a partial update. Visit statistics are not touched.
    pub async fn update_treatment(
        &self,
        shop_id: Uuid,
        treatment_id: Uuid,
        patch: TreatmentPatch,
    ) -> Result<Treatment> {
        patch.validate()?;
        self.store
            .transaction(move |tx| {
                let mut treatment = tx.treatment(shop_id, treatment_id)?.clone();
                if let Some(designer_id) = patch.designer_id.as_value() {
                    check_designer(tx, shop_id, *designer_id)?;
                }
                patch.apply_to(&mut treatment)?;
                tx.put_treatment(treatment.clone());
                Ok(treatment)
            })
            .await
    }

    pub async fn get_treatment(&self, shop_id: Uuid, treatment_id: Uuid) -> Result<TreatmentDetail> {
        self.store
            .read(|t| {
                let treatment = t.treatment(shop_id, treatment_id)?;
                Ok(detail(t, treatment))
            })
            .await
    }

    /// Newest visits first.
    pub async fn list_treatments(
        &self,
        shop_id: Uuid,
        filter: TreatmentFilter,
        page: Page,
    ) -> Result<Vec<TreatmentDetail>> {
        let page = page.validated()?;
        let service_type = filter
            .service_type
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        self.store
            .read(|t| {
                t.shop(shop_id)?;
                let mut treatments: Vec<&Treatment> = t
                    .treatments_of(shop_id)
                    .filter(|tr| filter.customer_id.map_or(true, |c| tr.customer_id == c))
                    .filter(|tr| service_type.map_or(true, |s| tr.service_type == s))
                    .collect();
                treatments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                Ok(page.apply(treatments.into_iter().map(|tr| detail(t, tr))))
            })
            .await
    }
}

/// Insert the treatment, then bump its customer's visit statistics. Runs
/// inside the caller's transaction, so a failure at any step leaves neither
/// write behind.
fn merge_visit(
    tx: &mut Transaction<'_>,
    shop_id: Uuid,
    new: NewTreatment,
    now: DateTime<Utc>,
) -> Result<Treatment> {
    if let Some(designer_id) = new.designer_id {
        check_designer(tx, shop_id, designer_id)?;
    }

    let treatment = new.into_treatment(shop_id, now);
    tx.put_treatment(treatment.clone());

    let mut customer = match tx.customer(shop_id, treatment.customer_id) {
        Ok(c) => c.clone(),
        Err(Error::NotFound { id, .. }) => {
            return Err(Error::validation(format!(
                "customer {id} does not exist in this shop"
            )))
        }
        Err(e) => return Err(e),
    };
    customer.record_visit(treatment.created_at);
    tx.put_customer(customer);

    Ok(treatment)
}

fn check_designer(tables: &Tables, shop_id: Uuid, designer_id: Uuid) -> Result<()> {
    tables
        .designer(shop_id, designer_id)
        .map(|_| ())
        .map_err(|_| Error::validation(format!("designer {designer_id} does not exist in this shop")))
}

fn detail(tables: &Tables, treatment: &Treatment) -> TreatmentDetail {
    TreatmentDetail {
        treatment: treatment.clone(),
        photos: tables.photos_of(treatment.id),
    }
}
