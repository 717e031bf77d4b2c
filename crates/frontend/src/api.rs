use dioxus::logger::tracing;
use planet_viewer_shared::classify::classify_raw;
use planet_viewer_shared::config::ViewerConfig;
use planet_viewer_shared::models::{SearchFailure, SearchOutcome, SearchResponse};
use planet_viewer_shared::query::SearchQuery;
use planet_viewer_shared::viewport::{Bounds, LatLng};
use serde::Deserialize;

pub const SEARCH_PATH: &str = "/api/search";
pub const KEY_PATH: &str = "/api/key";
pub const VIEWER_CONFIG_PATH: &str = "/static/viewer.json";

fn origin() -> Result<String, String> {
    web_sys::window()
        .ok_or_else(|| "no window".to_string())?
        .location()
        .origin()
        .map_err(|_| "window has no origin".to_string())
}

pub fn search_url(origin: &str) -> String {
    format!("{}{}", origin, SEARCH_PATH)
}

pub fn key_url(origin: &str) -> String {
    format!("{}{}", origin, KEY_PATH)
}

/// Interpret a settled search. Non-2xx bodies go through the error
/// classifier; a 2xx body that is not a result list is a plain failure.
pub fn parse_search_response(ok: bool, body: &str) -> SearchOutcome {
    if !ok {
        return SearchOutcome::Failure(classify_raw(body));
    }
    match serde_json::from_str::<SearchResponse>(body) {
        Ok(resp) => SearchOutcome::Success(resp.results),
        Err(e) => SearchOutcome::Failure(SearchFailure {
            message: format!("Malformed search response: {}", e),
            is_key_error: false,
        }),
    }
}

async fn fetch_search(query: &SearchQuery) -> Result<SearchOutcome, String> {
    let resp = reqwest::Client::new()
        .get(search_url(&origin()?))
        .query(query)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    let ok = resp.status().is_success();
    let body = resp.text().await.map_err(|e| e.to_string())?;
    Ok(parse_search_response(ok, &body))
}

/// Run a search. Never fails: transport errors become a failure outcome
/// carrying the error text.
pub async fn search(query: SearchQuery) -> SearchOutcome {
    match fetch_search(&query).await {
        Ok(outcome) => outcome,
        Err(message) => {
            tracing::warn!(%message, "search request failed");
            SearchOutcome::Failure(SearchFailure {
                message,
                is_key_error: false,
            })
        }
    }
}

/// POST a new catalog API key. The response text is returned but carries
/// no meaning for the viewer.
pub async fn update_key(key: &str) -> Result<String, String> {
    let resp = reqwest::Client::new()
        .post(key_url(&origin()?))
        .form(&[("key", key)])
        .send()
        .await
        .map_err(|e| e.to_string())?;
    resp.text().await.map_err(|e| e.to_string())
}

/// One geocoder hit. Nominatim sends coordinates as strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

/// Query parameters for a single-hit place lookup. `bias` becomes a
/// preferred (not bounding) viewbox.
pub fn place_params(text: &str, bias: Option<Bounds>) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("q", text.to_string()),
        ("format", "json".to_string()),
        ("limit", "1".to_string()),
    ];
    if let Some(b) = bias {
        params.push(("viewbox", format!("{},{},{},{}", b.west, b.north, b.east, b.south)));
    }
    params
}

/// First hit of a geocoder answer, `None` when nothing matched.
pub fn parse_places(body: &str) -> Result<Option<LatLng>, String> {
    let places: Vec<Place> =
        serde_json::from_str(body).map_err(|e| format!("malformed response: {}", e))?;
    let Some(place) = places.first() else {
        return Ok(None);
    };
    let lat = place.lat.parse::<f64>().map_err(|e| format!("bad latitude: {}", e))?;
    let lng = place.lon.parse::<f64>().map_err(|e| format!("bad longitude: {}", e))?;
    Ok(Some(LatLng { lat, lng }))
}

/// Look up `text` on the geocoder at `endpoint`.
pub async fn geocode(endpoint: &str, text: &str, bias: Option<Bounds>) -> Result<Option<LatLng>, String> {
    let resp = reqwest::Client::new()
        .get(endpoint)
        .query(&place_params(text, bias))
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if !resp.status().is_success() {
        return Err(format!("HTTP {}", resp.status()));
    }
    let body = resp.text().await.map_err(|e| e.to_string())?;
    parse_places(&body)
}

/// Viewer settings from `/static/viewer.json`, or the defaults when the
/// file is missing or invalid.
pub async fn fetch_config() -> ViewerConfig {
    let fetched = async {
        let resp = reqwest::Client::new()
            .get(format!("{}{}", origin()?, VIEWER_CONFIG_PATH))
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !resp.status().is_success() {
            return Err(format!("HTTP {}", resp.status()));
        }
        let body = resp.text().await.map_err(|e| e.to_string())?;
        ViewerConfig::from_json(&body).map_err(|e| e.to_string())
    };
    match fetched.await {
        Ok(config) => config,
        Err(e) => {
            tracing::info!(error = %e, "using default viewer config");
            ViewerConfig::default()
        }
    }
}
