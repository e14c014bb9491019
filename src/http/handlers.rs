use axum::{
    extract::{multipart::Field, Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::state::AppState;
use crate::error::{Error, Result};
use crate::model::{
    CustomerPatch, NewCustomer, NewDesigner, NewPortfolio, NewShop, NewTreatment, Page, PhotoType,
    TreatmentPatch,
};
use crate::records::{CandidateConfirmation, PhotoUpload, TreatmentFilter};
use crate::voice::AudioUpload;

const IDEMPOTENCY_KEY: &str = "idempotency-key";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: String,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct CustomerQuery {
    pub search: Option<String>,
    #[serde(default)]
    pub skip: usize,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct TreatmentQuery {
    pub customer_id: Option<Uuid>,
    pub service_type: Option<String>,
    #[serde(default)]
    pub skip: usize,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PortfolioQuery {
    /// Public listing unless the shop asks for drafts too
    #[serde(default = "default_published_only")]
    pub published_only: bool,
    #[serde(default)]
    pub skip: usize,
    pub limit: Option<usize>,
}

fn default_published_only() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct FaceSwapComplete {
    pub face_swapped_url: String,
}

fn page(skip: usize, limit: Option<usize>) -> Result<Page> {
    Page::new(skip, limit.unwrap_or(Page::default().limit))
}

fn idempotency_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(IDEMPOTENCY_KEY)
        .and_then(|v| v.to_str().ok())
}

async fn field_bytes(field: Field<'_>) -> Result<Vec<u8>> {
    field
        .bytes()
        .await
        .map(|b| b.to_vec())
        .map_err(|e| Error::validation(format!("could not read uploaded file: {e}")))
}

async fn field_text(field: Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| Error::validation(format!("could not read form field: {e}")))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> Error {
    Error::validation(format!("malformed multipart body: {e}"))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/health
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        service: state.service_name.clone(),
    })
}

/// POST /api/voice/transcribe
/// Turn a recorded memo into a treatment candidate for the designer to confirm
pub async fn transcribe_voice(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        if name.as_deref() == Some("file") {
            let filename = field.file_name().map(str::to_string);
            let bytes = field_bytes(field).await?;
            upload = Some(AudioUpload { bytes, filename });
        }
    }
    let upload = upload.ok_or_else(|| Error::validation("multipart field 'file' is required"))?;

    info!(
        "Voice memo received: {} bytes ({})",
        upload.bytes.len(),
        upload.filename.as_deref().unwrap_or("unnamed")
    );

    let candidate = state.pipeline.transcribe_and_extract(upload).await?;
    Ok(Json(candidate))
}

/// POST /api/shops
pub async fn create_shop(
    State(state): State<AppState>,
    Json(req): Json<NewShop>,
) -> Result<impl IntoResponse> {
    let shop = state.directory.create_shop(req).await?;
    info!("Shop created: {} ({})", shop.name, shop.id);
    Ok((StatusCode::CREATED, Json(shop)))
}

/// GET /api/shops/:shop_id
pub async fn get_shop(
    State(state): State<AppState>,
    Path(shop_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.directory.get_shop(shop_id).await?))
}

/// POST /api/shops/:shop_id/designers
pub async fn create_designer(
    State(state): State<AppState>,
    Path(shop_id): Path<Uuid>,
    Json(req): Json<NewDesigner>,
) -> Result<impl IntoResponse> {
    let designer = state.directory.create_designer(shop_id, req).await?;
    Ok((StatusCode::CREATED, Json(designer)))
}

/// GET /api/shops/:shop_id/designers
pub async fn list_designers(
    State(state): State<AppState>,
    Path(shop_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.directory.list_designers(shop_id).await?))
}

/// POST /api/shops/:shop_id/customers
pub async fn create_customer(
    State(state): State<AppState>,
    Path(shop_id): Path<Uuid>,
    Json(req): Json<NewCustomer>,
) -> Result<impl IntoResponse> {
    let customer = state.directory.create_customer(shop_id, req).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// GET /api/shops/:shop_id/customers
/// Most recent visitors first; `search` matches on name
pub async fn list_customers(
    State(state): State<AppState>,
    Path(shop_id): Path<Uuid>,
    Query(q): Query<CustomerQuery>,
) -> Result<impl IntoResponse> {
    let page = page(q.skip, q.limit)?;
    let customers = state
        .directory
        .list_customers(shop_id, q.search.as_deref(), page)
        .await?;
    Ok(Json(customers))
}

/// GET /api/shops/:shop_id/customers/count
pub async fn count_customers(
    State(state): State<AppState>,
    Path(shop_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let count = state.directory.count_customers(shop_id).await?;
    Ok(Json(CountResponse { count }))
}

/// GET /api/shops/:shop_id/customers/:customer_id
pub async fn get_customer(
    State(state): State<AppState>,
    Path((shop_id, customer_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.directory.get_customer(shop_id, customer_id).await?))
}

/// PUT /api/shops/:shop_id/customers/:customer_id
/// Only the fields present in the body are changed
pub async fn update_customer(
    State(state): State<AppState>,
    Path((shop_id, customer_id)): Path<(Uuid, Uuid)>,
    Json(patch): Json<CustomerPatch>,
) -> Result<impl IntoResponse> {
    let customer = state
        .directory
        .update_customer(shop_id, customer_id, patch)
        .await?;
    Ok(Json(customer))
}

/// POST /api/shops/:shop_id/treatments
/// Manual entry; honours an `Idempotency-Key` header
pub async fn create_treatment(
    State(state): State<AppState>,
    Path(shop_id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<NewTreatment>,
) -> Result<impl IntoResponse> {
    let treatment = state
        .treatments
        .create_treatment(shop_id, req, idempotency_key(&headers))
        .await?;
    Ok((StatusCode::CREATED, Json(treatment)))
}

/// POST /api/shops/:shop_id/treatments/from-candidate
/// Save a voice-memo candidate after the designer confirmed it
pub async fn create_treatment_from_candidate(
    State(state): State<AppState>,
    Path(shop_id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<CandidateConfirmation>,
) -> Result<impl IntoResponse> {
    let treatment = state
        .treatments
        .create_treatment_from_candidate(shop_id, req, idempotency_key(&headers))
        .await?;
    Ok((StatusCode::CREATED, Json(treatment)))
}

/// GET /api/shops/:shop_id/treatments
/// Newest first, optionally filtered by customer and service type
pub async fn list_treatments(
    State(state): State<AppState>,
    Path(shop_id): Path<Uuid>,
    Query(q): Query<TreatmentQuery>,
) -> Result<impl IntoResponse> {
    let page = page(q.skip, q.limit)?;
    let filter = TreatmentFilter {
        customer_id: q.customer_id,
        service_type: q.service_type,
    };
    Ok(Json(
        state.treatments.list_treatments(shop_id, filter, page).await?,
    ))
}

/// GET /api/shops/:shop_id/treatments/:treatment_id
pub async fn get_treatment(
    State(state): State<AppState>,
    Path((shop_id, treatment_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse> {
    Ok(Json(
        state.treatments.get_treatment(shop_id, treatment_id).await?,
    ))
}

/// PATCH /api/shops/:shop_id/treatments/:treatment_id
pub async fn update_treatment(
    State(state): State<AppState>,
    Path((shop_id, treatment_id)): Path<(Uuid, Uuid)>,
    Json(patch): Json<TreatmentPatch>,
) -> Result<impl IntoResponse> {
    let treatment = state
        .treatments
        .update_treatment(shop_id, treatment_id, patch)
        .await?;
    Ok(Json(treatment))
}

/// POST /api/shops/:shop_id/treatments/:treatment_id/photos
/// Multipart: `file` (required), `photo_type` (before|during|after), `caption`
pub async fn attach_photo(
    State(state): State<AppState>,
    Path((shop_id, treatment_id)): Path<(Uuid, Uuid)>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut file = None;
    let mut photo_type = PhotoType::default();
    let mut caption = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("photo.jpg").to_string();
                file = Some((field_bytes(field).await?, filename));
            }
            Some("photo_type") => photo_type = field_text(field).await?.parse()?,
            Some("caption") => caption = Some(field_text(field).await?),
            _ => {}
        }
    }
    let (bytes, filename) =
        file.ok_or_else(|| Error::validation("multipart field 'file' is required"))?;

    let photo = state
        .gallery
        .attach_photo(
            shop_id,
            treatment_id,
            PhotoUpload {
                bytes,
                filename,
                photo_type,
                caption,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(photo)))
}

/// POST /api/shops/:shop_id/portfolio
pub async fn promote_to_portfolio(
    State(state): State<AppState>,
    Path(shop_id): Path<Uuid>,
    Json(req): Json<NewPortfolio>,
) -> Result<impl IntoResponse> {
    let entry = state.gallery.promote_to_portfolio(shop_id, req).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /api/shops/:shop_id/portfolio
pub async fn list_portfolio(
    State(state): State<AppState>,
    Path(shop_id): Path<Uuid>,
    Query(q): Query<PortfolioQuery>,
) -> Result<impl IntoResponse> {
    let page = page(q.skip, q.limit)?;
    Ok(Json(
        state
            .gallery
            .list_portfolio(shop_id, q.published_only, page)
            .await?,
    ))
}

/// PUT /api/shops/:shop_id/portfolio/:portfolio_id/publish
pub async fn toggle_publish(
    State(state): State<AppState>,
    Path((shop_id, portfolio_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse> {
    Ok(Json(
        state.gallery.toggle_publish(shop_id, portfolio_id).await?,
    ))
}

/// POST /api/face-swap/complete/:photo_id
pub async fn complete_face_swap(
    State(state): State<AppState>,
    Path(photo_id): Path<Uuid>,
    Json(req): Json<FaceSwapComplete>,
) -> Result<impl IntoResponse> {
    let photo = state
        .gallery
        .record_face_swap(photo_id, &req.face_swapped_url)
        .await?;
    Ok(Json(photo))
}
