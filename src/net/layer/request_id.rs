use std::task::{Context, Poll};

use axum::http::Request;
use tower::{Layer, Service};
use uuid::Uuid;

/// id assigned to every incoming request. it is the id of the response
/// envelope and is recorded on the request span
#[derive(Debug, Clone, Copy)]
pub struct RequestId {
    id: Uuid,
}

impl RequestId {
    pub fn new() -> Self {
        RequestId { id: Uuid::new_v4() }
    }

    pub fn try_get<'a, B>(req: &'a Request<B>) -> Option<&'a Self> {
        req.extensions().get()
    }

    pub fn id(&self) -> &Uuid {
        &self.id
    }
}

#[derive(Debug, Clone)]
pub struct RIDService<S> {
    inner: S,
}

impl<S> RIDService<S> {
    pub fn new(inner: S) -> Self {
        RIDService {
            inner,
        }
    }
}

impl<S, B> Service<Request<B>> for RIDService<S>
where
    S: Service<Request<B>>
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        request.extensions_mut().insert(RequestId::new());

        self.inner.call(request)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RIDLayer {}

impl RIDLayer {
    pub fn new() -> Self {
        RIDLayer {}
    }
}

impl<S> Layer<S> for RIDLayer {
    type Service = RIDService<S>;

    fn layer(&self, service: S) -> Self::Service {
        RIDService::new(service)
    }
}
