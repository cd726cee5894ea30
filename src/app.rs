use std::{sync::Arc, time::Duration};

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, Response, header};
use axum::middleware::{Next, from_fn};
use axum::routing::get;
use axum::{Json, Router};

use tower::ServiceBuilder;
use tower_http::{
    classify::ServerErrorsFailureClass,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{Span, info_span};

use crate::{fetch::PageFetcher, resolver::Resolver, routes::resolve};

/// Shared handler state.
pub struct AppState<F> {
    pub resolver: Arc<Resolver<F>>,
}

impl<F> AppState<F> {
    pub fn new(resolver: Resolver<F>) -> Self {
        Self {
            resolver: Arc::new(resolver),
        }
    }
}

impl<F> Clone for AppState<F> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
        }
    }
}

async fn healthz() -> Json<&'static str> {
    Json("ok")
}

fn request_id(req: &Request<Body>) -> String {
    req.headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string()
}

/// Logs response bodies at debug, correlated by request-id.
async fn log_payloads(req: Request<Body>, next: Next) -> Response<Body> {
    const PREVIEW: usize = 4 * 1024;

    let req_id = request_id(&req);
    let res = next.run(req).await;

    let is_json = res
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));
    if !is_json || !tracing::enabled!(tracing::Level::DEBUG) {
        return res;
    }

    let (parts, body) = res.into_parts();
    match axum::body::to_bytes(body, 1024 * 1024).await {
        Ok(bytes) => {
            let preview = if bytes.len() > PREVIEW {
                format!("{}… [truncated]", String::from_utf8_lossy(&bytes[..PREVIEW]))
            } else {
                String::from_utf8_lossy(&bytes).to_string()
            };
            tracing::debug!(request_id=%req_id, response_body=%preview, "response body");
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(e) => {
            tracing::warn!(request_id=%req_id, error=%e, "failed reading response body");
            Response::from_parts(parts, Body::empty())
        }
    }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn build_app<F: PageFetcher + 'static>(state: AppState<F>) -> Router {
    let trace = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            let client_ip = req
                .extensions()
                .get::<ConnectInfo<std::net::SocketAddr>>()
                .map_or_else(|| "-".into(), |ci| ci.0.to_string());
            info_span!(
                "http",
                method = %req.method(),
                uri = %req.uri(),
                client_ip = %client_ip,
                request_id = %request_id(req)
            )
        })
        .on_request(|_req: &Request<Body>, _span: &Span| {
            tracing::info!("request started");
        })
        .on_response(|res: &Response<Body>, latency: Duration, _span: &Span| {
            tracing::info!(status=%res.status(), latency_ms=%latency.as_millis(), "response completed");
        })
        .on_failure(|_class: ServerErrorsFailureClass, latency: Duration, _span: &Span| {
            tracing::error!(latency_ms=%latency.as_millis(), "request failed");
        });

    // Request-ID is the outermost layer so the trace span and the payload
    // log both see the x-request-id header.
    let request_id_layer = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id());

    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/resolve",
            get(resolve::get::<F>).post(resolve::post::<F>),
        )
        .with_state(state)
        .layer(from_fn(log_payloads))
        .layer(cors_layer())
        .layer(trace)
        .layer(request_id_layer)
}
