use std::time::Duration;

use axum::http::{
    header::{ACCEPT, CONTENT_TYPE, ORIGIN},
    Method,
};
use tower_http::cors::{Any, CorsLayer};

/// A layer that attaches CORS headers to all responses.
pub fn layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS, Method::POST, Method::PUT])
        .allow_headers([ACCEPT, CONTENT_TYPE, ORIGIN])
        .max_age(Duration::from_secs(60 * 60))
}
