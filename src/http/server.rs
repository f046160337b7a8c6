//! HTTP server implementation.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{Method, Request, Response, StatusCode};
use http_body_util::Full;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::ratelimit::DecisionEngine;

/// Header carrying the client identity used in the rate limit key.
static X_USER_ID: HeaderName = HeaderName::from_static("x-user-id");
/// Response header echoing the per-request id.
static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Key segment used when the client sends no identity header.
const ANONYMOUS_USER: &str = "anonymous";

/// Body returned on a denied request.
const DENIED_BODY: &str = "Too many requests - Rate limited";

/// HTTP server gating every request through the decision engine.
pub struct HttpServer {
    /// Address to bind to
    addr: SocketAddr,
    /// The decision engine instance
    engine: Arc<DecisionEngine>,
}

impl HttpServer {
    /// Create a new HTTP server.
    pub fn new(addr: SocketAddr, engine: Arc<DecisionEngine>) -> Self {
        Self { addr, engine }
    }

    /// Start the server and run until the provided signal resolves.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.addr).await?;
        info!(addr = %self.addr, "HTTP server listening");

        tokio::pin!(signal);

        loop {
            tokio::select! {
                _ = &mut signal => {
                    info!("Shutdown signal received, stopping HTTP server");
                    break;
                }
                accepted = listener.accept() => {
                    let (stream, remote_addr) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            warn!(error = %e, "Failed to accept connection");
                            continue;
                        }
                    };

                    let engine = self.engine.clone();
                    tokio::spawn(async move {
                        let io = TokioIo::new(stream);
                        let service = service_fn(move |req| {
                            let engine = engine.clone();
                            async move {
                                Ok::<_, Infallible>(handle_request(engine, req).await)
                            }
                        });

                        if let Err(e) = auto::Builder::new(TokioExecutor::new())
                            .serve_connection(io, service)
                            .await
                        {
                            debug!(remote = %remote_addr, error = %e, "Connection error");
                        }
                    });
                }
            }
        }

        Ok(())
    }
}

/// Route a single request.
///
/// `/healthz` and `/metrics` bypass the gate; every other path is decided
/// against the quota for `"{X-User-ID}:{path}"`.
async fn handle_request<B>(engine: Arc<DecisionEngine>, req: Request<B>) -> Response<Full<Bytes>> {
    let path = req.uri().path().to_string();

    match (req.method(), path.as_str()) {
        (&Method::GET, "/healthz") => {
            let body = serde_json::json!({ "status": "ok" }).to_string();
            json_response(StatusCode::OK, body)
        }
        (&Method::GET, "/metrics") => match engine.metrics().render() {
            Ok(body) => text_response(StatusCode::OK, body),
            Err(e) => {
                warn!(error = %e, "Failed to render metrics");
                text_response(StatusCode::INTERNAL_SERVER_ERROR, String::new())
            }
        },
        _ => {
            let request_id = Uuid::new_v4();
            let user = req
                .headers()
                .get(&X_USER_ID)
                .and_then(|v| v.to_str().ok())
                .unwrap_or(ANONYMOUS_USER);
            let key = format!("{user}:{path}");

            let mut response = if engine.decide(&key).await {
                debug!(request_id = %request_id, key = %key, "Request admitted");
                text_response(StatusCode::OK, "OK".to_string())
            } else {
                debug!(request_id = %request_id, key = %key, "Request rate limited");
                text_response(StatusCode::TOO_MANY_REQUESTS, DENIED_BODY.to_string())
            };

            if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
                response.headers_mut().insert(&X_REQUEST_ID, value);
            }
            response
        }
    }
}

fn text_response(status: StatusCode, body: String) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
}

fn json_response(status: StatusCode, body: String) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
