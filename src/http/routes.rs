use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::warn;

use super::handlers;
use super::state::AppState;
use crate::config::ServiceConfig;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState, service: &ServiceConfig) -> Router {
    let api = Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Voice memo
        .route("/voice/transcribe", post(handlers::transcribe_voice))
        // Shops and staff
        .route("/shops", post(handlers::create_shop))
        .route("/shops/:shop_id", get(handlers::get_shop))
        .route(
            "/shops/:shop_id/designers",
            post(handlers::create_designer).get(handlers::list_designers),
        )
        // Customers
        .route(
            "/shops/:shop_id/customers",
            post(handlers::create_customer).get(handlers::list_customers),
        )
        .route(
            "/shops/:shop_id/customers/count",
            get(handlers::count_customers),
        )
        .route(
            "/shops/:shop_id/customers/:customer_id",
            get(handlers::get_customer).put(handlers::update_customer),
        )
        // Treatments
        .route(
            "/shops/:shop_id/treatments",
            post(handlers::create_treatment).get(handlers::list_treatments),
        )
        .route(
            "/shops/:shop_id/treatments/from-candidate",
            post(handlers::create_treatment_from_candidate),
        )
        .route(
            "/shops/:shop_id/treatments/:treatment_id",
            get(handlers::get_treatment).patch(handlers::update_treatment),
        )
        .route(
            "/shops/:shop_id/treatments/:treatment_id/photos",
            post(handlers::attach_photo),
        )
        // Portfolio
        .route(
            "/shops/:shop_id/portfolio",
            post(handlers::promote_to_portfolio).get(handlers::list_portfolio),
        )
        .route(
            "/shops/:shop_id/portfolio/:portfolio_id/publish",
            put(handlers::toggle_publish),
        )
        // Face-swap job callback
        .route(
            "/face-swap/complete/:photo_id",
            post(handlers::complete_face_swap),
        );

    let mut router = Router::new().nest("/api", api);

    let prefix = state.uploads.public_prefix();
    if prefix.starts_with('/') && prefix.len() > 1 {
        router = router.nest_service(prefix, ServeDir::new(state.uploads.root()));
    } else {
        warn!("Not serving uploads: public prefix {:?} is not a URL path", prefix);
    }

    router
        .layer(DefaultBodyLimit::max(service.max_upload_bytes))
        .layer(cors_layer(&service.cors_origins))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
