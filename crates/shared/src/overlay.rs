//! Footprint overlay for the result list.

use geojson::{Feature, FeatureCollection, JsonObject};

use crate::models::{ActiveTile, SearchResult};

/// Track colors by result position. Results past the end of the palette are
/// not drawn.
pub const PALETTE: [&str; 7] = ["red", "orange", "yellow", "green", "blue", "purple", "brown"];

/// Color of overflow entries (never drawn, used for list swatches).
pub const OVERFLOW_COLOR: &str = "gray";

/// Color for the result at `index`.
pub fn color_for(index: usize) -> &'static str {
    PALETTE.get(index).copied().unwrap_or(OVERFLOW_COLOR)
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayEntry {
    pub index: usize,
    pub color: &'static str,
    pub geometry: Option<geojson::Geometry>,
}

/// Leaflet path style for a footprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub color: &'static str,
    pub opacity: f64,
    pub fill_opacity: f64,
}

pub fn style_for(index: usize) -> OverlayStyle {
    OverlayStyle {
        color: color_for(index),
        opacity: 1.0,
        fill_opacity: 0.1,
    }
}

/// Entries to draw. Empty when tracks are hidden or a raster tile is
/// loaded; otherwise the first `PALETTE.len()` results in server order.
pub fn overlay_entries(
    results: &[SearchResult],
    show_tracks: bool,
    active: &ActiveTile,
) -> Vec<OverlayEntry> {
    if !show_tracks || active.is_active() {
        return Vec::new();
    }
    results
        .iter()
        .take(PALETTE.len())
        .enumerate()
        .map(|(index, r)| OverlayEntry {
            index,
            color: color_for(index),
            geometry: r.geometry.clone(),
        })
        .collect()
}

/// GeoJSON collection handed to the map. Each feature carries its `index`
/// and its path style so the map side can draw it as-is.
pub fn build_overlay(
    results: &[SearchResult],
    show_tracks: bool,
    active: &ActiveTile,
) -> FeatureCollection {
    let features: Vec<Feature> = overlay_entries(results, show_tracks, active)
        .into_iter()
        .map(|entry| {
            let style = style_for(entry.index);
            let mut properties = JsonObject::new();
            properties.insert("index".to_string(), serde_json::json!(entry.index));
            properties.insert("color".to_string(), serde_json::json!(style.color));
            properties.insert("opacity".to_string(), serde_json::json!(style.opacity));
            properties.insert("fillOpacity".to_string(), serde_json::json!(style.fill_opacity));
            Feature {
                bbox: None,
                geometry: entry.geometry,
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();
    tracing::debug!(features = features.len(), "overlay rebuilt");
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
