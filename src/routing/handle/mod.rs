use axum::response::IntoResponse;
use lockbox_api::Envelope;

pub mod groups;

pub async fn status() -> impl IntoResponse {
    Envelope::success("OK", "OK")
        .with_action("healthcheck.status")
        .with_url("/healthcheck/status.json")
}
