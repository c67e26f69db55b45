use http::StatusCode;
use axum_core::response::{Response, IntoResponse};
use serde::{Serialize, Deserialize};
use uuid::Uuid;

use crate::response::{serialize_json, error_json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Header {
    pub id: Uuid,
    pub status: Status,
    pub servertime: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Uuid>,

    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    pub code: u16,
}

/// every response body is wrapped in a header describing the outcome of
/// the request
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    header: Header,
    body: T,
}

impl<T> Envelope<T> {
    pub fn success<M>(message: M, body: T) -> Self
    where
        M: Into<String>
    {
        Self::with_status(Status::Success, StatusCode::OK, message, body)
    }

    pub fn error<M>(code: StatusCode, message: M, body: T) -> Self
    where
        M: Into<String>
    {
        Self::with_status(Status::Error, code, message, body)
    }

    fn with_status<M>(status: Status, code: StatusCode, message: M, body: T) -> Self
    where
        M: Into<String>
    {
        Envelope {
            header: Header {
                id: Uuid::new_v4(),
                status,
                servertime: chrono::Utc::now().timestamp(),
                action: None,
                message: message.into(),
                url: None,
                code: code.as_u16(),
            },
            body
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.header.id = id;
        self
    }

    /// the action id is derived from the action name so it stays the same
    /// across requests
    pub fn with_action<A>(mut self, action: A) -> Self
    where
        A: AsRef<str>
    {
        self.header.action = Some(lockbox_lib::ids::from_name(action));
        self
    }

    pub fn with_url<U>(mut self, url: U) -> Self
    where
        U: Into<String>
    {
        self.header.url = Some(url.into());
        self
    }

    /// copies the details of the request into the header
    pub fn with_origin(mut self, origin: &Origin) -> Self {
        if let Some(id) = origin.id {
            self = self.with_id(id);
        }

        if let Some(action) = &origin.action {
            self = self.with_action(action);
        }

        if let Some(url) = &origin.url {
            self = self.with_url(url.clone());
        }

        self
    }
}

/// the request a response belongs to. success and error envelopes for the
/// same request carry the same id, action and url
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Origin {
    pub id: Option<Uuid>,
    pub action: Option<String>,
    pub url: Option<String>,
}

impl Origin {
    pub fn new<A, U>(id: Option<Uuid>, action: A, url: U) -> Self
    where
        A: Into<String>,
        U: Into<String>,
    {
        Origin {
            id,
            action: Some(action.into()),
            url: Some(url.into()),
        }
    }
}

impl<T> IntoResponse for Envelope<T>
where
    T: Serialize
{
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.header.code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match serialize_json(status, &self) {
            Ok(res) => res,
            Err(err) => {
                tracing::error!("Envelope<T> serialization error {:?}", err);
                error_json()
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn success_header() {
        let envelope = Envelope::success("The group has been added successfully.", 12)
            .with_action("groups.add")
            .with_url("/groups.json");
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["header"]["status"], "success");
        assert_eq!(json["header"]["code"], 200);
        assert_eq!(json["header"]["message"], "The group has been added successfully.");
        assert_eq!(json["header"]["url"], "/groups.json");
        assert_eq!(
            json["header"]["action"],
            lockbox_lib::ids::from_name("groups.add").to_string()
        );
        assert_eq!(json["body"], 12);
    }

    #[test]
    fn error_header_skips_missing_fields() {
        let envelope = Envelope::error(StatusCode::FORBIDDEN, "nope", ());
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["header"]["status"], "error");
        assert_eq!(json["header"]["code"], 403);
        assert!(json["header"].get("url").is_none());
        assert!(json["header"].get("action").is_none());
        assert!(json["body"].is_null());
    }

    #[test]
    fn origin_header() {
        let id = Uuid::new_v4();
        let origin = Origin::new(Some(id), "groups.add", "/groups");

        let json = serde_json::to_value(
            Envelope::error(StatusCode::FORBIDDEN, "nope", ()).with_origin(&origin)
        ).unwrap();

        assert_eq!(json["header"]["id"], id.to_string());
        assert_eq!(json["header"]["url"], "/groups");
        assert_eq!(
            json["header"]["action"],
            lockbox_lib::ids::from_name("groups.add").to_string()
        );

        let json = serde_json::to_value(
            Envelope::success("ok", ()).with_origin(&Origin::default())
        ).unwrap();

        assert!(json["header"].get("url").is_none());
        assert!(json["header"].get("action").is_none());
    }
}
