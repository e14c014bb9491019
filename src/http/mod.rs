//! HTTP API for the salon apps
//!
//! All routes live under `/api`:
//! - POST /voice/transcribe - Voice memo -> treatment candidate (multipart `file`)
//! - POST /shops, GET /shops/:shop_id - Shops
//! - POST|GET /shops/:shop_id/designers - Designers
//! - POST|GET /shops/:shop_id/customers, GET .../customers/count,
//!   GET|PUT .../customers/:customer_id - Customers
//! - POST|GET /shops/:shop_id/treatments, POST .../treatments/from-candidate,
//!   GET|PATCH .../treatments/:treatment_id - Treatment records
//! - POST .../treatments/:treatment_id/photos - Attach a photo (multipart)
//! - POST|GET /shops/:shop_id/portfolio, PUT .../portfolio/:portfolio_id/publish - Portfolio
//! - POST /face-swap/complete/:photo_id - Face-swap result callback
//! - GET /health - Health check
//!
//! Stored files are served under the storage public prefix (`/uploads` by default).

mod error;
mod handlers;
mod routes;
mod state;

pub use error::ErrorResponse;
pub use routes::create_router;
pub use state::AppState;
