//! Leaflet glue. The map, its raster layer and its footprint layer live on
//! the JS side; Rust only pushes new state into them and receives moves.

use planet_viewer_shared::config::ViewerConfig;
use planet_viewer_shared::viewport::{Bounds, LatLng};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

pub const MAP_CONTAINER_ID: &str = "planet-map";

#[wasm_bindgen(inline_js = "
let __pv_map = null;
let __pv_raster = null;
let __pv_tracks = null;

function __pv_require() {
    if (!__pv_map) throw new Error('map is not initialised');
}

export function pv_init_map(elementId, lat, lng, zoom, baseUrl, baseAttribution, onMove, onTileLoading) {
    if (typeof L === 'undefined') throw new Error('Leaflet is not loaded');
    if (__pv_map) return;

    __pv_map = L.map(elementId, {
        center: [lat, lng],
        zoom: zoom,
        inertiaDeceleration: 3000,
        inertiaMaxSpeed: 3000,
        tapTolerance: 40,
        tap: false,
    });
    L.tileLayer(baseUrl, { attribution: baseAttribution }).addTo(__pv_map);

    __pv_raster = L.tileLayer('', {
        attribution: '&copy; <a href=\"https://www.planet.com/\">Planet</a>',
    }).addTo(__pv_map);
    __pv_raster.on('loading', () => onTileLoading(true));
    __pv_raster.on('load', () => onTileLoading(false));

    __pv_tracks = L.geoJSON(null, {
        style: (f) => ({
            color: f.properties.color,
            opacity: f.properties.opacity,
            fillOpacity: f.properties.fillOpacity,
        }),
    }).addTo(__pv_map);

    const report = () => {
        const b = __pv_map.getBounds();
        onMove(__pv_map.getZoom(), b.getNorth(), b.getSouth(), b.getEast(), b.getWest());
    };
    __pv_map.on('moveend', report);
    setTimeout(() => {
        __pv_map.invalidateSize({ animate: true });
        report();
    }, 250);
}

export function pv_set_tile_url(url) {
    __pv_require();
    __pv_raster.setUrl(url);
}

export function pv_set_opacity(value) {
    __pv_require();
    __pv_raster.setOpacity(value);
}

export function pv_set_view(lat, lng, zoom) {
    __pv_require();
    __pv_map.setView([lat, lng], zoom);
}

export function pv_set_overlay(json) {
    __pv_require();
    __pv_tracks.clearLayers();
    __pv_tracks.addData(JSON.parse(json));
}
")]
extern "C" {
    #[wasm_bindgen(catch)]
    #[allow(clippy::too_many_arguments)]
    fn pv_init_map(
        element_id: &str,
        lat: f64,
        lng: f64,
        zoom: u32,
        base_url: &str,
        base_attribution: &str,
        on_move: &js_sys::Function,
        on_tile_loading: &js_sys::Function,
    ) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn pv_set_tile_url(url: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn pv_set_opacity(value: f64) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn pv_set_view(lat: f64, lng: f64, zoom: u32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn pv_set_overlay(json: &str) -> Result<(), JsValue>;
}

/// Whether the Leaflet script has finished loading.
pub fn leaflet_ready() -> bool {
    js_sys::Reflect::has(&js_sys::global(), &JsValue::from_str("L")).unwrap_or(false)
}

/// Create the map inside [`MAP_CONTAINER_ID`]. `on_move` runs after every
/// settled pan or zoom (and once shortly after creation); `on_tile_loading`
/// tracks the raster layer's fetch state. Both callbacks live as long as the
/// page.
pub fn init_map(
    config: &ViewerConfig,
    on_move: impl FnMut(u32, Bounds) + 'static,
    on_tile_loading: impl FnMut(bool) + 'static,
) -> Result<(), JsValue> {
    let mut on_move = on_move;
    let moved = Closure::<dyn FnMut(f64, f64, f64, f64, f64)>::new(
        move |zoom: f64, north: f64, south: f64, east: f64, west: f64| {
            on_move(
                zoom.round().max(0.0) as u32,
                Bounds {
                    north,
                    south,
                    east,
                    west,
                },
            );
        },
    );
    let loading = Closure::<dyn FnMut(bool)>::new(on_tile_loading);

    pv_init_map(
        MAP_CONTAINER_ID,
        config.start.lat,
        config.start.lng,
        config.start_zoom,
        &config.base_layer_url,
        &config.base_layer_attribution,
        moved.as_ref().unchecked_ref(),
        loading.as_ref().unchecked_ref(),
    )?;

    moved.forget();
    loading.forget();
    Ok(())
}

pub fn set_tile_url(url: &str) -> Result<(), JsValue> {
    pv_set_tile_url(url)
}

pub fn set_opacity(value: f64) -> Result<(), JsValue> {
    pv_set_opacity(value)
}

pub fn set_view(center: LatLng, zoom: u32) -> Result<(), JsValue> {
    pv_set_view(center.lat, center.lng, zoom)
}

pub fn set_overlay(geojson: &str) -> Result<(), JsValue> {
    pv_set_overlay(geojson)
}
