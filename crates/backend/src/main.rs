mod assets;
mod config;
mod proxy;

use std::path::{Path, PathBuf};

use axum::http::HeaderValue;
use axum::{response::Html, routing::{any, get}, Router};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing_subscriber::EnvFilter;

use config::ServerConfig;
use proxy::Proxy;

/// Build a cache-controlled static file router.
///
/// Separated so tests can exercise the caching layer with arbitrary directories.
fn cached_static_router(dir: &Path, cache_header: &'static str) -> Router {
    let layer = SetResponseHeaderLayer::overriding(
        axum::http::header::CACHE_CONTROL,
        HeaderValue::from_static(cache_header),
    );
    Router::new()
        .fallback_service(ServeDir::new(dir))
        .layer(layer)
}

const CACHE_1DAY: &str = "public, max-age=86400, must-revalidate";
const CACHE_IMMUTABLE: &str = "public, max-age=31536000, immutable";

/// Build the full application router.
fn build_app(config: &ServerConfig, proxy: Proxy) -> Router {
    // Static file routers are stateless, merge them before adding app state
    let static_files = Router::new()
        .nest(
            "/static",
            cached_static_router(&config.assets_dir, CACHE_1DAY),
        )
        .nest(
            "/dist",
            cached_static_router(&config.dist_dir, CACHE_IMMUTABLE),
        )
        .nest(
            "/assets",
            cached_static_router(&config.dist_dir.join("assets"), CACHE_IMMUTABLE),
        );

    let index_path = config.dist_dir.join("index.html");

    Router::new()
        .route("/api/{*path}", any(proxy::forward))
        .with_state(proxy)
        .route("/", get(move || serve_index(index_path.clone())))
        .merge(static_files)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();
    if let Err(e) = assets::load_viewer_config(&config.assets_dir) {
        tracing::warn!(error = %e, "viewer config unusable, the front end will use defaults");
    }

    let proxy = Proxy::new(config.upstream.clone());
    let app = build_app(&config, proxy);

    let listener = tokio::net::TcpListener::bind(config.addr()).await?;
    tracing::info!(port = config.port, upstream = %config.upstream, "Server running at http://localhost:{}", config.port);
    axum::serve(listener, app).await
}

async fn serve_index(index_path: PathBuf) -> Html<String> {
    // Try to serve the built frontend, fall back to a simple message
    match tokio::fs::read_to_string(&index_path).await {
        Ok(html) => Html(html),
        Err(_) => Html(
            r#"<!DOCTYPE html>
<html>
<head><title>Planet Viewer</title></head>
<body>
<h1>Planet Viewer</h1>
<p>Frontend not built yet. Run <code>dx build</code> and restart the server.</p>
</body>
</html>"#
                .to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::{extract::RawQuery, routing::post, Json};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    /// Build a test app that serves files from the given temp directories.
    fn test_app(assets_dir: &Path, dist_dir: &Path, dist_assets_dir: &Path) -> Router {
        Router::new()
            .nest("/static", cached_static_router(assets_dir, CACHE_1DAY))
            .nest("/dist", cached_static_router(dist_dir, CACHE_IMMUTABLE))
            .nest(
                "/assets",
                cached_static_router(dist_assets_dir, CACHE_IMMUTABLE),
            )
    }

    /// Create a temp dir with a test file and return the dir path.
    fn temp_dir_with_file(file_name: &str, content: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(file_name), content).unwrap();
        dir
    }

    fn server_config(dist_dir: &Path, assets_dir: &Path, upstream: &str) -> ServerConfig {
        ServerConfig {
            port: 0,
            dist_dir: dist_dir.to_path_buf(),
            assets_dir: assets_dir.to_path_buf(),
            upstream: upstream.to_string(),
        }
    }

    /// Stand-in catalog server on an ephemeral port. Returns its origin.
    async fn spawn_upstream() -> String {
        async fn search(RawQuery(query): RawQuery) -> Json<Value> {
            Json(json!({ "results": [], "query": query }))
        }
        async fn key(headers: axum::http::HeaderMap, body: String) -> String {
            let ct = headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();
            format!("{ct}|{body}")
        }
        async fn denied() -> (StatusCode, Json<Value>) {
            (StatusCode::UNAUTHORIZED, Json(json!({ "error": "invalid key" })))
        }

        let app = Router::new()
            .route("/api/search", get(search))
            .route("/api/key", post(key))
            .route("/api/denied", get(denied));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn body_json(resp: axum::response::Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_static_assets_have_1day_cache() {
        let assets_dir = temp_dir_with_file("viewer.json", "{}");
        let dist_dir = temp_dir_with_file("index.html", "<html></html>");
        let dist_assets_dir = temp_dir_with_file("app.js", "console.log()");

        let app = test_app(assets_dir.path(), dist_dir.path(), dist_assets_dir.path());

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/static/viewer.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("cache-control").unwrap(),
            "public, max-age=86400, must-revalidate"
        );
    }

    #[tokio::test]
    async fn test_dist_assets_have_immutable_cache() {
        let assets_dir = temp_dir_with_file("viewer.json", "{}");
        let dist_dir = temp_dir_with_file("index.html", "<html></html>");
        let dist_assets_dir = temp_dir_with_file("style-xyz.css", "body{}");

        let app = test_app(assets_dir.path(), dist_dir.path(), dist_assets_dir.path());

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/assets/style-xyz.css")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("cache-control").unwrap(),
            "public, max-age=31536000, immutable"
        );
    }

    #[tokio::test]
    async fn test_missing_static_file_returns_404() {
        let assets_dir = temp_dir_with_file("viewer.json", "{}");
        let dist_dir = temp_dir_with_file("index.html", "<html></html>");
        let dist_assets_dir = temp_dir_with_file("app.js", "");

        let app = test_app(assets_dir.path(), dist_dir.path(), dist_assets_dir.path());

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/static/nonexistent.txt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_index_served_from_dist() {
        let assets_dir = tempfile::tempdir().unwrap();
        let dist_dir = temp_dir_with_file("index.html", "<html>viewer</html>");
        let config = server_config(dist_dir.path(), assets_dir.path(), "http://127.0.0.1:1");

        let resp = build_app(&config, Proxy::new(config.upstream.clone()))
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"<html>viewer</html>");
    }

    #[tokio::test]
    async fn test_index_fallback_when_not_built() {
        let dir = tempfile::tempdir().unwrap();
        let Html(html) = serve_index(dir.path().join("index.html")).await;
        assert!(html.contains("Frontend not built yet"));
    }

    #[tokio::test]
    async fn test_search_forwarded_with_query() {
        let upstream = spawn_upstream().await;
        let dir = tempfile::tempdir().unwrap();
        let config = server_config(dir.path(), dir.path(), &upstream);

        let resp = build_app(&config, Proxy::new(upstream))
            .oneshot(
                Request::builder()
                    .uri("/api/search?lat=47.5&lng=-120&z=12&group_by=satellite")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body = body_json(resp).await;
        assert_eq!(body["query"], "lat=47.5&lng=-120&z=12&group_by=satellite");
        assert!(body["results"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_key_post_forwards_form_body() {
        let upstream = spawn_upstream().await;
        let dir = tempfile::tempdir().unwrap();
        let config = server_config(dir.path(), dir.path(), &upstream);

        let resp = build_app(&config, Proxy::new(upstream))
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/key")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("key=abc%20123"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(
            std::str::from_utf8(&bytes).unwrap(),
            "application/x-www-form-urlencoded|key=abc%20123"
        );
    }

    #[tokio::test]
    async fn test_upstream_error_status_and_body_pass_through() {
        let upstream = spawn_upstream().await;
        let dir = tempfile::tempdir().unwrap();
        let config = server_config(dir.path(), dir.path(), &upstream);

        let resp = build_app(&config, Proxy::new(upstream))
            .oneshot(
                Request::builder()
                    .uri("/api/denied")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(resp).await["error"], "invalid key");
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_bad_gateway() {
        let dir = tempfile::tempdir().unwrap();
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let upstream = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);
        let config = server_config(dir.path(), dir.path(), &upstream);

        let resp = build_app(&config, Proxy::new(upstream))
            .oneshot(
                Request::builder()
                    .uri("/api/search?lat=0&lng=0&z=3&group_by=date")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(resp).await;
        assert!(body["error"].as_str().unwrap().starts_with("Fetch failed"));
    }
}
