use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::{NewPortfolio, Page, PhotoType, Portfolio, PortfolioDetail, TreatmentPhoto};
use crate::storage::FileStorage;
use crate::store::{Store, Tables};

const PHOTO_FOLDER: &str = "photos";

/// Photo file received for a treatment.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub photo_type: PhotoType,
    pub caption: Option<String>,
}

/// Treatment photos and the portfolio curated from them.
#[derive(Clone)]
pub struct Gallery {
    store: Store,
    storage: Arc<dyn FileStorage>,
}

impl Gallery {
    pub fn new(store: Store, storage: Arc<dyn FileStorage>) -> Self {
        Self { store, storage }
    }

    /// Store the file and attach it to the treatment. If the record cannot be
    /// written the stored file is removed again.
    pub async fn attach_photo(
        &self,
        shop_id: Uuid,
        treatment_id: Uuid,
        upload: PhotoUpload,
    ) -> Result<TreatmentPhoto> {
        self.store
            .read(|t| t.treatment(shop_id, treatment_id).map(|_| ()))
            .await?;

        let photo_url = self
            .storage
            .save(&upload.bytes, &upload.filename, PHOTO_FOLDER)
            .await?;

        let photo = TreatmentPhoto {
            id: Uuid::new_v4(),
            treatment_id,
            photo_url: photo_url.clone(),
            photo_type: upload.photo_type,
            face_swapped_url: None,
            is_portfolio: false,
            caption: clean(upload.caption),
            taken_at: Utc::now(),
        };

        let saved = self
            .store
            .transaction(move |tx| {
                tx.treatment(shop_id, treatment_id)?;
                tx.put_photo(photo.clone());
                Ok(photo)
            })
            .await;

        match &saved {
            Ok(photo) => info!(
                "Photo {} ({}) attached to treatment {}",
                photo.id, photo.photo_type, treatment_id
            ),
            Err(_) => {
                if let Err(e) = self.storage.remove(&photo_url).await {
                    warn!("Failed to remove orphaned photo {}: {}", photo_url, e);
                }
            }
        }
        saved
    }

    /// Mark a photo as portfolio material and create its portfolio entry in
    /// one step. A photo can back at most one entry.
    pub async fn promote_to_portfolio(
        &self,
        shop_id: Uuid,
        new: NewPortfolio,
    ) -> Result<PortfolioDetail> {
        let detail = self
            .store
            .transaction(move |tx| {
                let mut photo = tx.photo_in_shop(shop_id, new.photo_id)?.clone();
                if let Some(existing) = tx.portfolio_for_photo(photo.id) {
                    return Err(Error::validation(format!(
                        "photo {} is already in portfolio {}",
                        photo.id, existing.id
                    )));
                }

                photo.is_portfolio = true;
                tx.put_photo(photo.clone());

                let portfolio = Portfolio {
                    id: Uuid::new_v4(),
                    shop_id,
                    photo_id: photo.id,
                    title: clean(new.title),
                    description: clean(new.description),
                    tags: clean_tags(new.tags),
                    is_published: false,
                    created_at: Utc::now(),
                };
                tx.put_portfolio(portfolio.clone())?;

                Ok(PortfolioDetail { portfolio, photo })
            })
            .await?;

        info!(
            "Photo {} promoted to portfolio {}",
            detail.photo.id, detail.portfolio.id
        );
        Ok(detail)
    }

    /// Flip the published flag. The underlying photo is left as is.
    pub async fn toggle_publish(
        &self,
        shop_id: Uuid,
        portfolio_id: Uuid,
    ) -> Result<PortfolioDetail> {
        self.store
            .transaction(move |tx| {
                let mut portfolio = tx.portfolio(shop_id, portfolio_id)?.clone();
                portfolio.is_published = !portfolio.is_published;
                let photo = tx.photo(portfolio.photo_id)?.clone();
                tx.put_portfolio(portfolio.clone())?;
                Ok(PortfolioDetail { portfolio, photo })
            })
            .await
    }

    /// Newest entries first.
    pub async fn list_portfolio(
        &self,
        shop_id: Uuid,
        published_only: bool,
        page: Page,
    ) -> Result<Vec<PortfolioDetail>> {
        let page = page.validated()?;
        self.store
            .read(|t| {
                t.shop(shop_id)?;
                let mut entries: Vec<&Portfolio> = t
                    .portfolios_of(shop_id)
                    .filter(|p| !published_only || p.is_published)
                    .collect();
                entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                page.apply(entries.into_iter())
                    .into_iter()
                    .map(|p| with_photo(t, p))
                    .collect()
            })
            .await
    }

    /// Record the result of an external face-swap job on a photo.
    pub async fn record_face_swap(
        &self,
        photo_id: Uuid,
        face_swapped_url: &str,
    ) -> Result<TreatmentPhoto> {
        let url = face_swapped_url.trim();
        if url.is_empty() {
            return Err(Error::validation("face_swapped_url must not be empty"));
        }
        let url = url.to_string();

        let photo = self
            .store
            .transaction(move |tx| {
                let mut photo = tx.photo(photo_id)?.clone();
                photo.face_swapped_url = Some(url);
                tx.put_photo(photo.clone());
                Ok(photo)
            })
            .await?;

        info!("Face swap recorded for photo {}", photo.id);
        Ok(photo)
    }
}

fn with_photo(tables: &Tables, portfolio: &Portfolio) -> Result<PortfolioDetail> {
    Ok(PortfolioDetail {
        portfolio: portfolio.clone(),
        photo: tables.photo(portfolio.photo_id)?.clone(),
    })
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().trim_start_matches('#').trim().to_string();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_trimmed_and_deduplicated() {
        let tags = vec![
            " #레이어드컷 ".to_string(),
            "".to_string(),
            "레이어드컷".to_string(),
            "애쉬브라운".to_string(),
        ];
        assert_eq!(clean_tags(tags), vec!["레이어드컷", "애쉬브라운"]);
    }
}
