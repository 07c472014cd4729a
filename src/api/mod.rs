//! REST API over the lookup service (axum).
//!
//! ```text
//! GET    /v1/swift-codes/:swift_code     details (branch or headquarters)
//! GET    /v1/swift-codes/country/:iso2   every code in a country
//! DELETE /v1/swift-codes/:swift_code     remove one code
//! POST   /v1/swift-codes                 add one code
//! GET    /health                         liveness
//! ```

mod error;
mod handlers;

pub use error::{panic_response, ApiError};

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::service::SwiftCodeService;

/// Build the full application router
pub fn build_router(service: SwiftCodeService) -> Router {
    let swift_routes = Router::new()
        .route("/", post(handlers::add_swift))
        .route(
            "/:swift_code",
            get(handlers::get_swift_details).delete(handlers::delete_swift),
        )
        .route("/country/:iso2", get(handlers::get_swift_by_country))
        .with_state(service);

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1/swift-codes", swift_routes)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
