//! Uploaded file delivery and cross-origin policy

use axum::{
    extract::Request,
    http::{
        header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware::Next,
    response::Response,
};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

/// Mark served uploads as downloads unless the query asks for `inline=true`
pub async fn content_disposition(request: Request, next: Next) -> Response {
    let inline = request
        .uri()
        .query()
        .map(|q| q.split('&').any(|pair| pair == "inline=true"))
        .unwrap_or(false);

    let mut response = next.run(request).await;
    if !inline && response.status().is_success() {
        response
            .headers_mut()
            .insert(CONTENT_DISPOSITION, HeaderValue::from_static("attachment"));
    }
    response
}

/// CORS for the browser client; an unset or unparsable origin allows any
pub fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    match origin.map(HeaderValue::from_str) {
        Some(Ok(value)) => layer.allow_origin(value),
        Some(Err(e)) => {
            warn!(error = %e, "Invalid CORS origin, allowing any");
            layer.allow_origin(Any)
        }
        None => layer.allow_origin(Any),
    }
}
