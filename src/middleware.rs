/* src/middleware.rs */

use axum::{extract::Request, http::request::Parts, response::Response};
use futures_util::future::BoxFuture;
use std::{
    convert::Infallible,
    net::IpAddr,
    task::{Context, Poll},
};
use tower::{Layer, Service};

use crate::extractor::ClientIpResolver;

/// Extension that holds the resolved client IP address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub IpAddr);

impl ClientIp {
    /// Get the IP address.
    pub fn ip(&self) -> IpAddr {
        self.0
    }
}

/// Layer that resolves the client IP from forwarding headers.
///
/// The result is stored as a [`ClientIp`] request extension so handlers can
/// extract it.
///
/// # Examples
///
/// ```rust,no_run
/// use axum::{Router, routing::get};
/// use forwarded_ip::{ClientIp, ClientIpLayer};
///
/// async fn handler(ClientIp(ip): ClientIp) -> String {
///     ip.to_string()
/// }
///
/// let app: Router = Router::new()
///     .route("/", get(handler))
///     .layer(ClientIpLayer::default());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClientIpLayer {
    resolver: ClientIpResolver,
}

impl ClientIpLayer {
    /// Create a layer with the default resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a layer with a custom resolver configuration.
    pub fn with_resolver(resolver: ClientIpResolver) -> Self {
        Self { resolver }
    }
}

impl<S> Layer<S> for ClientIpLayer {
    type Service = ClientIpService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ClientIpService {
            inner,
            resolver: self.resolver.clone(),
        }
    }
}

/// Service that tags each request with its client IP.
#[derive(Debug, Clone)]
pub struct ClientIpService<S> {
    inner: S,
    resolver: ClientIpResolver,
}

impl<S> Service<Request> for ClientIpService<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let ip = self.resolver.resolve(req.headers());
        req.extensions_mut().insert(ClientIp(ip));

        Box::pin(self.inner.call(req))
    }
}

/// Axum extractor for the client IP address.
///
/// Reads the extension set by [`ClientIpLayer`]. Without the layer it
/// resolves from the request headers with the default resolver.
impl<S> axum::extract::FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(client_ip) = parts.extensions.get::<ClientIp>() {
            return Ok(*client_ip);
        }
        Ok(ClientIp(ClientIpResolver::default().resolve(&parts.headers)))
    }
}
