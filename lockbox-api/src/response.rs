use http::{StatusCode, HeaderValue};
use http::header::{CONTENT_TYPE, CONTENT_LENGTH};
use axum_core::body::Body;
use axum_core::response::Response;
use serde::Serialize;
use bytes::{BytesMut, BufMut};

pub fn serialize_json(
    status: StatusCode,
    data: &impl Serialize
) -> Result<Response, serde_json::Error> {
    let froze = {
        let mut buf = BytesMut::with_capacity(128).writer();
        serde_json::to_writer(&mut buf, data)?;

        buf.into_inner().freeze()
    };

    let length = HeaderValue::from(froze.len());
    let mut response = Response::new(Body::from(froze));

    *response.status_mut() = status;
    response.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response.headers_mut().insert(CONTENT_LENGTH, length);

    Ok(response)
}

pub fn error_json() -> Response {
    let body = r#"{"header":{"status":"error","message":"InternalFailure","code":500},"body":null}"#;

    let mut response = Response::new(Body::from(body));

    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response.headers_mut().insert(CONTENT_LENGTH, HeaderValue::from(body.len()));

    response
}
