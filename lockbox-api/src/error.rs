use http::StatusCode;
use axum_core::response::{Response, IntoResponse};
use serde::{Serialize, Deserialize};
use strum::{AsRefStr as StrumAsRefStr};

use crate::envelope::Envelope;
use crate::validation::ValidationErrors;

#[derive(
    Debug, Clone, PartialEq, Eq,
    StrumAsRefStr,
    Serialize, Deserialize
)]
pub enum AuthKind {
    PermissionDenied,

    InvalidSession,
    SessionExpired,
    SessionNotFound,

    UserNotFound,

    MechanismNotFound
}

impl AuthKind {
    fn message(&self) -> &'static str {
        match self {
            AuthKind::PermissionDenied => "You are not authorized to access that location.",
            AuthKind::InvalidSession |
            AuthKind::SessionExpired |
            AuthKind::SessionNotFound |
            AuthKind::UserNotFound |
            AuthKind::MechanismNotFound => "Authentication is required to continue.",
        }
    }
}

impl std::fmt::Display for AuthKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self.as_ref(), f)
    }
}

impl From<&AuthKind> for StatusCode {
    fn from(kind: &AuthKind) -> Self {
        match kind {
            AuthKind::PermissionDenied => StatusCode::FORBIDDEN,
            AuthKind::InvalidSession |
            AuthKind::SessionExpired |
            AuthKind::SessionNotFound |
            AuthKind::UserNotFound |
            AuthKind::MechanismNotFound => StatusCode::UNAUTHORIZED,
        }
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq,
    StrumAsRefStr,
    Serialize, Deserialize
)]
pub enum GroupKind {
    NotAdded,
}

impl GroupKind {
    fn message(&self) -> &'static str {
        match self {
            GroupKind::NotAdded => "Could not add the group. Please try again later",
        }
    }
}

impl std::fmt::Display for GroupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self.as_ref(), f)
    }
}

impl From<&GroupKind> for StatusCode {
    fn from(kind: &GroupKind) -> Self {
        match kind {
            GroupKind::NotAdded => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq,
    StrumAsRefStr,
    Serialize, Deserialize
)]
pub enum GeneralKind {
    InternalFailure,
    Timeout,

    NotFound,

    ValidationFailed,
}

impl GeneralKind {
    fn message(&self) -> &'static str {
        match self {
            GeneralKind::InternalFailure => "An internal error occurred.",
            GeneralKind::Timeout => "The request took too long to complete.",
            GeneralKind::NotFound => "The requested location does not exist.",
            GeneralKind::ValidationFailed => "Could not validate data.",
        }
    }
}

impl std::fmt::Display for GeneralKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self.as_ref(), f)
    }
}

impl From<&GeneralKind> for StatusCode {
    fn from(kind: &GeneralKind) -> StatusCode {
        match kind {
            GeneralKind::InternalFailure => StatusCode::INTERNAL_SERVER_ERROR,
            GeneralKind::Timeout => StatusCode::REQUEST_TIMEOUT,
            GeneralKind::NotFound => StatusCode::NOT_FOUND,
            GeneralKind::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq,
    Serialize, Deserialize
)]
pub enum ApiErrorKind {
    General(GeneralKind),
    Auth(AuthKind),
    Group(GroupKind),
}

impl ApiErrorKind {
    /// message shown when the error does not carry its own
    pub fn default_message(&self) -> &'static str {
        match self {
            ApiErrorKind::General(v) => v.message(),
            ApiErrorKind::Auth(v) => v.message(),
            ApiErrorKind::Group(v) => v.message(),
        }
    }
}

impl std::fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiErrorKind::General(v) => std::fmt::Display::fmt(v, f),
            ApiErrorKind::Auth(v) => std::fmt::Display::fmt(v, f),
            ApiErrorKind::Group(v) => std::fmt::Display::fmt(v, f),
        }
    }
}

impl From<GeneralKind> for ApiErrorKind {
    fn from(v: GeneralKind) -> Self {
        ApiErrorKind::General(v)
    }
}

impl From<AuthKind> for ApiErrorKind {
    fn from(v: AuthKind) -> Self {
        ApiErrorKind::Auth(v)
    }
}

impl From<GroupKind> for ApiErrorKind {
    fn from(v: GroupKind) -> Self {
        ApiErrorKind::Group(v)
    }
}

impl From<&ApiErrorKind> for StatusCode {
    fn from(kind: &ApiErrorKind) -> Self {
        match kind {
            ApiErrorKind::General(v) => v.into(),
            ApiErrorKind::Auth(v) => v.into(),
            ApiErrorKind::Group(v) => v.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Detail {
    /// the storage table the record belongs to
    Table(String),
}

impl Detail {
    pub fn table(name: impl Into<String>) -> Self {
        Detail::Table(name.into())
    }
}

impl std::fmt::Display for Detail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Detail::Table(name) => write!(f, "table {}", name),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    kind: ApiErrorKind,
    detail: Option<Detail>,
    msg: Option<String>,
    errors: Option<ValidationErrors>,
}

impl ApiError {
    pub fn new() -> Self {
        ApiError {
            kind: ApiErrorKind::General(GeneralKind::InternalFailure),
            detail: None,
            msg: None,
            errors: None,
        }
    }

    /// a failed validation for records of the given table
    pub fn validation<M, T>(msg: M, errors: ValidationErrors, table: T) -> Self
    where
        M: Into<String>,
        T: Into<String>,
    {
        ApiError {
            kind: ApiErrorKind::General(GeneralKind::ValidationFailed),
            detail: Some(Detail::Table(table.into())),
            msg: Some(msg.into()),
            errors: Some(errors),
        }
    }

    pub fn with_kind<K>(mut self, kind: K) -> Self
    where
        K: Into<ApiErrorKind>
    {
        self.kind = kind.into();
        self
    }

    pub fn kind(&self) -> &ApiErrorKind {
        &self.kind
    }

    pub fn detail(&self) -> Option<&Detail> {
        self.detail.as_ref()
    }

    pub fn message(&self) -> Option<&str> {
        self.msg.as_ref().map(|v| v.as_str())
    }

    pub fn errors(&self) -> Option<&ValidationErrors> {
        self.errors.as_ref()
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from(&self.kind)
    }
}

impl std::default::Default for ApiError {
    fn default() -> Self {
        ApiError::new()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;

        if let Some(detail) = &self.detail {
            write!(f, ": {}", detail)?;
        }

        if let Some(msg) = &self.msg {
            write!(f, ": {}", msg)?;
        }

        if let Some(errors) = &self.errors {
            write!(f, ": {}", errors)?;
        }

        Ok(())
    }
}

impl ApiError {
    /// the error envelope sent to the client. field errors are the body
    pub fn into_envelope(self) -> Envelope<Option<ValidationErrors>> {
        let status = self.status();
        let message = match self.msg {
            Some(msg) => msg,
            None => self.kind.default_message().to_owned(),
        };

        Envelope::error(status, message, self.errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.into_envelope().into_response()
    }
}

impl<K> From<K> for ApiError
where
    K: Into<ApiErrorKind>
{
    fn from(kind: K) -> Self {
        ApiError {
            kind: kind.into(),
            detail: None,
            msg: None,
            errors: None,
        }
    }
}

impl<K,M> From<(K, M)> for ApiError
where
    K: Into<ApiErrorKind>,
    M: Into<String>,
{
    fn from((kind, msg): (K, M)) -> Self {
        ApiError {
            kind: kind.into(),
            detail: None,
            msg: Some(msg.into()),
            errors: None,
        }
    }
}
