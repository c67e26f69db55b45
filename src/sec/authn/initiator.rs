use std::pin::Pin;
use std::future::Future;

use axum::http::header::{HeaderMap, HeaderValue, GetAll};
use axum::http::request::Parts;
use axum::extract::FromRequestParts;

use crate::net::error;
use crate::state::ArcShared;
use crate::store::StoreError;
use crate::user::User;

use super::session::{self, SessionStore};

/// the user making the request
#[derive(Debug, Clone)]
pub struct Initiator {
    pub user: User,
}

impl Initiator {
    pub fn user(&self) -> &User {
        &self.user
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("session was not found")]
    SessionNotFound,

    #[error("session has expired")]
    SessionExpired,

    #[error("user was not found")]
    UserNotFound,

    #[error("no authentication mechanism was found")]
    MechanismNotFound,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    HeaderToStr(#[from] axum::http::header::ToStrError),
}

impl From<LookupError> for error::Error {
    fn from(e: LookupError) -> Self {
        match e {
            LookupError::SessionNotFound => error::Error::api(error::AuthKind::SessionNotFound),
            LookupError::SessionExpired => error::Error::api(error::AuthKind::SessionExpired),
            LookupError::UserNotFound => error::Error::api(error::AuthKind::UserNotFound),
            LookupError::MechanismNotFound => error::Error::api(error::AuthKind::MechanismNotFound),

            LookupError::Store(e) => e.into(),
            LookupError::HeaderToStr(e) => e.into(),
        }
    }
}

pub async fn lookup_session_id<S>(
    sessions: &dyn SessionStore,
    session_id: S,
) -> Result<Initiator, LookupError>
where
    S: AsRef<[u8]>
{
    let token_hash = session::hash_token(session_id);

    let Some(session) = sessions.retrieve_session(&token_hash).await? else {
        return Err(LookupError::SessionNotFound);
    };

    if session.is_expired(&chrono::Utc::now()) {
        return Err(LookupError::SessionExpired);
    }

    if let Some(user) = sessions.retrieve_user(&session.user_id).await? {
        Ok(Initiator {
            user,
        })
    } else {
        Err(LookupError::UserNotFound)
    }
}

/// finds the named cookie across all `cookie` headers
fn find_session_id<'a>(
    cookies: GetAll<'a, HeaderValue>,
    cookie_name: &str
) -> Result<Option<&'a str>, LookupError> {
    for value in cookies {
        let value_str = value.to_str()?;

        for pair in value_str.split(';') {
            if let Some((name, value)) = pair.trim().split_once('=') {
                if name == cookie_name && !value.is_empty() {
                    return Ok(Some(value));
                }
            }
        }
    }

    Ok(None)
}

pub async fn lookup_header_map(
    sessions: &dyn SessionStore,
    cookie_name: &str,
    headers: &HeaderMap
) -> Result<Initiator, LookupError> {
    let cookies = headers.get_all("cookie");

    if let Some(found) = find_session_id(cookies, cookie_name)? {
        return lookup_session_id(sessions, found.as_bytes()).await;
    }

    Err(LookupError::MechanismNotFound)
}

impl FromRequestParts<ArcShared> for Initiator {
    type Rejection = error::Error;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 ArcShared,
    ) -> Pin<Box<dyn Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>>
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait
    {
        Box::pin(async move {
            let sessions = state.store().sessions.as_ref();

            match lookup_header_map(sessions, state.session_cookie(), &parts.headers).await {
                Ok(initiator) => {
                    tracing::debug!(user_id = %initiator.user.id, "request initiator");

                    Ok(initiator)
                },
                Err(err) => Err(err.into())
            }
        })
    }
}
