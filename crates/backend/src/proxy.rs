//! Pass-through for `/api/*` to the catalog server.
//!
//! Method, path, query string, body and content type go upstream as-is; the
//! upstream status, content type and body come back as-is. Only a transport
//! failure is answered locally, as a 502 with an `{"error": ...}` body the
//! viewer can classify like any other search failure.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

#[derive(Clone)]
pub struct Proxy {
    http: reqwest::Client,
    upstream: String,
}

impl Proxy {
    pub fn new(upstream: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            upstream: upstream.into(),
        }
    }

    pub fn upstream(&self) -> &str {
        &self.upstream
    }

    /// Upstream URL for an incoming request URI.
    pub fn target(&self, uri: &Uri) -> String {
        let path = uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| uri.path());
        format!("{}{}", self.upstream, path)
    }
}

fn api_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message.into() })))
}

pub async fn forward(
    State(proxy): State<Proxy>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let url = proxy.target(&uri);
    tracing::debug!(%method, %url, "forwarding");

    let mut request = proxy.http.request(method, &url);
    if let Some(content_type) = headers.get(header::CONTENT_TYPE) {
        request = request.header(header::CONTENT_TYPE, content_type.clone());
    }
    if !body.is_empty() {
        request = request.body(body);
    }

    let resp = match request.send().await {
        Ok(resp) => resp,
        Err(e) => {
            tracing::warn!(%url, error = %e, "upstream unreachable");
            return api_error(StatusCode::BAD_GATEWAY, format!("Fetch failed: {e}")).into_response();
        }
    };

    let status = resp.status();
    let content_type = resp.headers().get(header::CONTENT_TYPE).cloned();
    let bytes = match resp.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(%url, error = %e, "upstream body read failed");
            return api_error(StatusCode::BAD_GATEWAY, format!("Read failed: {e}")).into_response();
        }
    };
    if !status.is_success() {
        tracing::info!(%url, status = status.as_u16(), "upstream returned an error");
    }

    let mut response = (status, bytes).into_response();
    match content_type {
        Some(ct) => {
            response.headers_mut().insert(header::CONTENT_TYPE, ct);
        }
        None => {
            response.headers_mut().remove(header::CONTENT_TYPE);
        }
    }
    response
}
