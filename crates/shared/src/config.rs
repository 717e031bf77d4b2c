use serde::Deserialize;

use crate::coordinator::DEFAULT_DEBOUNCE_MS;
use crate::export::ExportTarget;
use crate::viewport::LatLng;

pub const DEFAULT_START: LatLng = LatLng {
    lat: 47.5,
    lng: -120.0,
};
pub const DEFAULT_START_ZOOM: u32 = 7;
pub const MAX_ZOOM: u32 = 22;
/// Delay between posting a new API key and retrying the search.
pub const DEFAULT_KEY_RETRY_MS: u64 = 1_000;

#[derive(Debug)]
pub struct ConfigError(String);

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid viewer config: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Front-end settings. Every field has a default, so a partial JSON
/// document only overrides what it names.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub start: LatLng,
    pub start_zoom: u32,
    pub debounce_ms: u64,
    pub key_retry_ms: u64,
    /// Public origin of the tile server, used for exported links.
    pub tile_origin: String,
    pub caltopo_url: String,
    pub base_layer_url: String,
    pub base_layer_attribution: String,
    /// Nominatim-compatible place search endpoint.
    pub geocoder_url: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            start: DEFAULT_START,
            start_zoom: DEFAULT_START_ZOOM,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            key_retry_ms: DEFAULT_KEY_RETRY_MS,
            tile_origin: "https://planet.jeffheidel.com".to_string(),
            caltopo_url: "https://caltopo.com/map.html".to_string(),
            base_layer_url: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            base_layer_attribution: "&copy; OpenStreetMap contributors".to_string(),
            geocoder_url: "https://nominatim.openstreetmap.org/search".to_string(),
        }
    }
}

impl ViewerConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ViewerConfig =
            serde_json::from_str(json).map_err(|e| ConfigError(e.to_string()))?;
        if config.start_zoom > MAX_ZOOM {
            return Err(ConfigError(format!("start_zoom {} out of range", config.start_zoom)));
        }
        Ok(config)
    }

    pub fn export_target(&self) -> ExportTarget {
        ExportTarget {
            map_url: self.caltopo_url.clone(),
            tile_origin: self.tile_origin.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = ViewerConfig::default();
        assert_eq!(c.start_zoom, 7);
        assert_eq!(c.debounce_ms, 300);
        assert_eq!(c.key_retry_ms, 1_000);
        assert!((c.start.lat - 47.5).abs() < 1e-9);
        assert_eq!(c.geocoder_url, "https://nominatim.openstreetmap.org/search");
    }

    #[test]
    fn test_geocoder_override() {
        let c = ViewerConfig::from_json(r#"{"geocoder_url":"https://geo.example.com/search"}"#).unwrap();
        assert_eq!(c.geocoder_url, "https://geo.example.com/search");
        assert_eq!(c.start_zoom, DEFAULT_START_ZOOM);
    }

    #[test]
    fn test_partial_json_overrides() {
        let c = ViewerConfig::from_json(r#"{"tile_origin":"https://tiles.example.com","start_zoom":10}"#)
            .unwrap();
        assert_eq!(c.tile_origin, "https://tiles.example.com");
        assert_eq!(c.start_zoom, 10);
        assert_eq!(c.debounce_ms, DEFAULT_DEBOUNCE_MS);
        assert_eq!(c.export_target().tile_origin, "https://tiles.example.com");
    }

    #[test]
    fn test_invalid_json_is_error() {
        let err = ViewerConfig::from_json("{not json").unwrap_err();
        assert!(err.to_string().starts_with("invalid viewer config"));
    }

    #[test]
    fn test_zoom_out_of_range() {
        assert!(ViewerConfig::from_json(r#"{"start_zoom":40}"#).is_err());
    }
}
