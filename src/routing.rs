use std::time::Duration;

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::routing::{get, post};
use tower::{BoxError, ServiceBuilder};
use tower::timeout::TimeoutLayer;
use tower::timeout::error::Elapsed;
use tower_http::trace::TraceLayer;

use crate::net::error::{self, GeneralKind};
use crate::net::layer::{self, RIDLayer};
use crate::state::ArcShared;

mod handle;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

async fn handle_error(error: BoxError) -> error::Error {
    if error.is::<Elapsed>() {
        error::Error::api(GeneralKind::Timeout)
    } else {
        error::Error::new()
            .context("unhandled service error")
            .source(error)
    }
}

async fn not_found() -> error::Error {
    error::Error::api(GeneralKind::NotFound)
}

pub fn routes(state: &ArcShared) -> Router {
    Router::new()
        .route(
            "/groups.json",
            post(handle::groups::post)
        )
        .route(
            "/groups",
            post(handle::groups::post)
        )
        .route(
            "/healthcheck/status.json",
            get(handle::status)
        )
        .fallback(not_found)
        .layer(ServiceBuilder::new()
            .layer(RIDLayer::new())
            .layer(TraceLayer::new_for_http()
                .make_span_with(layer::trace::make_span_with)
                .on_request(layer::trace::on_request)
                .on_response(layer::trace::on_response)
                .on_failure(layer::trace::on_failure))
            .layer(HandleErrorLayer::new(handle_error))
            .layer(TimeoutLayer::new(REQUEST_TIMEOUT)))
        .with_state(state.clone())
}
