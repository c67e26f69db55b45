use axum::response::{Response, IntoResponse};
use tracing::Level;

use lockbox_api::Origin;

pub use lockbox_api::error::{
    ApiErrorKind,
    ApiError,
    AuthKind,
    GeneralKind,
    GroupKind,
};

type BoxDynError = Box<dyn std::error::Error + Send + Sync>;

/// error returned from request handlers and the stores they call
///
/// `inner` is what the client sees. `context` and `src` are only logged
#[derive(Debug)]
pub struct Error {
    inner: ApiError,
    origin: Option<Origin>,
    context: Option<String>,
    src: Option<BoxDynError>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn new() -> Self {
        Error {
            inner: Default::default(),
            origin: None,
            context: None,
            src: None,
        }
    }

    pub fn api<T>(value: T) -> Self
    where
        T: Into<ApiError>
    {
        Error {
            inner: value.into(),
            origin: None,
            context: None,
            src: None
        }
    }

    pub fn kind<K>(mut self, kind: K) -> Self
    where
        K: Into<ApiErrorKind>
    {
        self.inner = self.inner.with_kind(kind);
        self
    }

    pub fn context<C>(mut self, ctx: C) -> Self
    where
        C: Into<String>
    {
        self.context = Some(ctx.into());
        self
    }

    pub fn source<S>(mut self, src: S) -> Self
    where
        S: Into<BoxDynError>
    {
        self.src = Some(src.into());
        self
    }

    /// the request the error response is sent for
    pub fn origin(mut self, origin: Origin) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn inner(&self) -> &ApiError {
        &self.inner
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.inner, &self.context, &self.src) {
            (inner, Some(cxt), Some(err)) => if f.alternate() {
                write!(f, "inner: {}\ncxt: {}\nerr: {:#?}", inner, cxt, err)
            } else {
                write!(f, "inner: {}\ncxt: {}\nerr: {:?}", inner, cxt, err)
            },
            (inner, Some(cxt), None) => write!(f, "inner: {}\ncxt: {}", inner, cxt),
            (inner, None, Some(err)) => if f.alternate() {
                write!(f, "inner: {}\nerr: {:#?}", inner, err)
            } else {
                write!(f, "inner: {}\nerr: {:?}", inner, err)
            },
            (inner, None, None) => write!(f, "inner: {}", inner)
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.src.as_ref().map(|v| & **v as _)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match (&self.context, &self.src) {
            (Some(cxt), Some(err)) => tracing::event!(
                Level::ERROR,
                "unhandled error when processing request: {cxt}\n{err:#?}"
            ),
            (None, Some(err)) => tracing::event!(
                Level::ERROR,
                "unhandled error when processing request: {err:#?}"
            ),
            (Some(cxt), None) => tracing::event!(
                Level::DEBUG,
                "request failed: {} {cxt}", self.inner
            ),
            (None, None) => {}
        }

        let envelope = self.inner.into_envelope();

        match &self.origin {
            Some(origin) => envelope.with_origin(origin).into_response(),
            None => envelope.into_response(),
        }
    }
}

impl From<ApiError> for Error {
    fn from(api_err: ApiError) -> Self {
        Error {
            inner: api_err,
            origin: None,
            context: None,
            src: None,
        }
    }
}

impl From<deadpool_postgres::HookErrorCause> for Error {
    fn from(err: deadpool_postgres::HookErrorCause) -> Self {
        use deadpool_postgres::HookErrorCause;

        match err {
            HookErrorCause::Backend(e) => Self::from(e),
            HookErrorCause::Message(msg) => Error::new()
                .source(msg),
            HookErrorCause::StaticMessage(msg) => Error::new()
                .source(msg.to_owned()),
        }
    }
}

impl From<deadpool_postgres::HookError> for Error {
    fn from(err: deadpool_postgres::HookError) -> Self {
        use deadpool_postgres::HookError;

        match err {
            HookError::Continue(opt) => {
                if let Some(cause) = opt {
                    Self::from(cause)
                } else {
                    Error::new()
                        .source("deadpool::managed::HookError::Continue with no cause")
                }
            },
            HookError::Abort(cause) => {
                Self::from(cause)
            }
        }
    }
}

impl From<deadpool_postgres::PoolError> for Error {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        use deadpool_postgres::PoolError;

        match err {
            PoolError::Backend(e) => Self::from(e),
            PoolError::PostCreateHook(e) |
            PoolError::PreRecycleHook(e) |
            PoolError::PostRecycleHook(e) => Self::from(e),
            _ => Error::new()
                .context("failed to retrieve database connection")
                .source(err)
        }
    }
}

macro_rules! simple_from {
    ($e:path) => {
        impl From<$e> for Error {
            fn from(err: $e) -> Self {
                Error::new()
                    .source(err)
            }
        }
    };
    ($e:path, $k:expr) => {
        impl From<$e> for Error {
            fn from(err: $e) -> Self {
                Error::new()
                    .kind($k)
                    .source(err)
            }
        }
    };
}

simple_from!(std::io::Error);

simple_from!(axum::Error);
simple_from!(axum::http::Error);
simple_from!(
    axum::http::header::ToStrError,
    AuthKind::InvalidSession
);

simple_from!(handlebars::RenderError);

simple_from!(tokio_postgres::Error);

simple_from!(serde_json::Error);

// ----------------------------------------------------------------------------

pub trait Context<T, E> {
    fn context<C>(self, cxt: C) -> std::result::Result<T, Error>
    where
        C: Into<String>;
}

impl<T, E> Context<T, E> for std::result::Result<T, E>
where
    E: Into<Error>
{
    fn context<C>(self, cxt: C) -> std::result::Result<T, Error>
    where
        C: Into<String>
    {
        match self {
            Ok(v) => Ok(v),
            Err(err) => Err(err.into().context(cxt))
        }
    }
}

impl<T> Context<T, ()> for std::option::Option<T> {
    fn context<C>(self, cxt: C) -> std::result::Result<T, Error>
    where
        C: Into<String>
    {
        match self {
            Some(v) => Ok(v),
            None => Err(Error::new()
                .context(cxt))
        }
    }
}
