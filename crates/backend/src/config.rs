use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_UPSTREAM: &str = "http://127.0.0.1:8080";

/// Server settings, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Built front-end bundle (`index.html`, hashed scripts).
    pub dist_dir: PathBuf,
    /// Unhashed files served under `/static`, including `viewer.json`.
    pub assets_dir: PathBuf,
    /// Catalog server that answers `/api/*`.
    pub upstream: String,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = match lookup("PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(port = %raw, "PORT is not a valid port, using {}", DEFAULT_PORT);
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };
        Self {
            port,
            dist_dir: PathBuf::from(lookup("DIST_DIR").unwrap_or_else(|| "dist".to_string())),
            assets_dir: PathBuf::from(lookup("ASSETS_DIR").unwrap_or_else(|| "assets".to_string())),
            upstream: lookup("CATALOG_UPSTREAM")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_UPSTREAM.to_string()),
        }
    }

    pub fn addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
