//! CalTopo link for the loaded raster overlay.
//!
//! CalTopo reads custom layers from the URL fragment and decodes the layer
//! payloads twice, so each JSON payload is percent-encoded twice here.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

use crate::models::ActiveTile;
use crate::viewport::LatLng;

/// Characters left alone by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const LAYER_TYPE: &str = "TILE";
const LAYER_MAX_ZOOM: &str = "20";
const LAYER_CLASS: &str = "CustomLayer";
const TITLE_PREFIX: &str = "Planet - ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// Nothing is loaded, so there is nothing to export.
    NoActiveTile,
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::NoActiveTile => write!(f, "no tile overlay is loaded"),
        }
    }
}

impl std::error::Error for ExportError {}

/// Where exported links point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTarget {
    /// CalTopo map page, e.g. `https://caltopo.com/map.html`.
    pub map_url: String,
    /// Public origin prepended to origin-relative tile templates.
    pub tile_origin: String,
}

#[derive(Serialize)]
struct TileLayer<'a> {
    template: &'a str,
    #[serde(rename = "type")]
    layer_type: &'static str,
    maxzoom: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CustomLayerProperties<'a> {
    title: &'a str,
    template: &'a str,
    #[serde(rename = "type")]
    layer_type: &'static str,
    #[serde(rename = "maxzoom")]
    max_zoom: &'static str,
    alpha_overlay: bool,
    class: &'static str,
}

#[derive(Serialize)]
struct CustomLayer<'a> {
    properties: CustomLayerProperties<'a>,
    id: &'static str,
}

#[derive(Serialize)]
struct CustomLayers<'a> {
    custom: [CustomLayer<'a>; 1],
}

/// Rewrite `{x}`, `{y}`, `{z}` to CalTopo's `{X}`, `{Y}`, `{Z}`. Only the
/// first occurrence of each placeholder is rewritten.
pub fn substitute_placeholders(template: &str) -> String {
    template
        .replacen("{x}", "{X}", 1)
        .replacen("{y}", "{Y}", 1)
        .replacen("{z}", "{Z}", 1)
}

/// Absolute tile template: origin-relative templates get `tile_origin`.
pub fn absolute_template(template: &str, tile_origin: &str) -> String {
    if template.starts_with("http://") || template.starts_with("https://") {
        template.to_string()
    } else {
        format!("{}{}", tile_origin.trim_end_matches('/'), template)
    }
}

fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, URI_COMPONENT).to_string()
}

fn encode_twice(s: &str) -> String {
    encode_component(&encode_component(s))
}

/// The two layer payloads, before encoding: the base layer and the
/// custom-layer list carrying the title.
pub fn layer_payloads(active: &ActiveTile, tile_origin: &str) -> (String, String) {
    let template = substitute_placeholders(&absolute_template(&active.url_template, tile_origin));
    let title = format!("{}{}", TITLE_PREFIX, active.name);

    let layer = TileLayer {
        template: &template,
        layer_type: LAYER_TYPE,
        maxzoom: LAYER_MAX_ZOOM,
    };
    let custom = CustomLayers {
        custom: [CustomLayer {
            properties: CustomLayerProperties {
                title: &title,
                template: &template,
                layer_type: LAYER_TYPE,
                max_zoom: LAYER_MAX_ZOOM,
                alpha_overlay: false,
                class: LAYER_CLASS,
            },
            id: "",
        }],
    };

    // Plain structs of strings and bools always serialize.
    let layer = serde_json::to_string(&layer).unwrap_or_default();
    let custom = serde_json::to_string(&custom).unwrap_or_default();
    (layer, custom)
}

/// Build the CalTopo link for `active`, centred on `center` at `zoom`.
pub fn encode(
    active: &ActiveTile,
    center: LatLng,
    zoom: u32,
    target: &ExportTarget,
) -> Result<String, ExportError> {
    if !active.is_active() {
        return Err(ExportError::NoActiveTile);
    }
    let (layer, custom) = layer_payloads(active, &target.tile_origin);
    Ok(format!(
        "{}#ll={},{}&z={}&b=mbt&o=cl_{}&n=1&cl={}",
        target.map_url,
        center.lat,
        center.lng,
        zoom,
        encode_twice(&layer),
        encode_twice(&custom),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use percent_encoding::percent_decode_str;

    fn target() -> ExportTarget {
        ExportTarget {
            map_url: "https://caltopo.com/map.html".to_string(),
            tile_origin: "https://planet.example.com".to_string(),
        }
    }

    fn active() -> ActiveTile {
        ActiveTile {
            name: "A".to_string(),
            url_template: "/api/tile/{z}/{x}/{y}.png".to_string(),
        }
    }

    fn center() -> LatLng {
        LatLng {
            lat: 47.5,
            lng: -120.0,
        }
    }

    fn decode_twice(s: &str) -> String {
        let once = percent_decode_str(s).decode_utf8().unwrap().to_string();
        percent_decode_str(&once).decode_utf8().unwrap().to_string()
    }

    fn param<'a>(url: &'a str, key: &str) -> &'a str {
        let fragment = url.split_once('#').unwrap().1;
        fragment
            .split('&')
            .find_map(|kv| kv.strip_prefix(key).and_then(|v| v.strip_prefix('=')))
            .unwrap()
    }

    #[test]
    fn test_substitutes_first_occurrence_only() {
        assert_eq!(substitute_placeholders("/{z}/{x}/{y}.png"), "/{Z}/{X}/{Y}.png");
        assert_eq!(substitute_placeholders("/{x}/{x}"), "/{X}/{x}");
        assert_eq!(substitute_placeholders("/{X}/{Y}"), "/{X}/{Y}");
    }

    #[test]
    fn test_absolute_template() {
        assert_eq!(
            absolute_template("/t/{z}.png", "https://h.example/"),
            "https://h.example/t/{z}.png"
        );
        assert_eq!(
            absolute_template("https://other.example/{z}.png", "https://h.example"),
            "https://other.example/{z}.png"
        );
    }

    #[test]
    fn test_encode_requires_active_tile() {
        let err = encode(&ActiveTile::empty(), center(), 12, &target()).unwrap_err();
        assert_eq!(err, ExportError::NoActiveTile);
        assert_eq!(err.to_string(), "no tile overlay is loaded");
    }

    #[test]
    fn test_encode_header() {
        let url = encode(&active(), center(), 12, &target()).unwrap();
        assert!(url.starts_with("https://caltopo.com/map.html#ll=47.5,-120&z=12&b=mbt&o=cl_"));
        assert!(url.contains("&n=1&cl="));
    }

    #[test]
    fn test_payloads_survive_double_decoding() {
        let url = encode(&active(), center(), 12, &target()).unwrap();
        let (layer, custom) = layer_payloads(&active(), &target().tile_origin);

        let o = param(&url, "o").strip_prefix("cl_").unwrap();
        assert_eq!(decode_twice(o), layer);
        assert_eq!(decode_twice(param(&url, "cl")), custom);
    }

    #[test]
    fn test_payload_contents() {
        let (layer, custom) = layer_payloads(&active(), &target().tile_origin);
        assert_eq!(
            layer,
            r#"{"template":"https://planet.example.com/api/tile/{Z}/{X}/{Y}.png","type":"TILE","maxzoom":"20"}"#
        );
        assert_eq!(
            custom,
            r#"{"custom":[{"properties":{"title":"Planet - A","template":"https://planet.example.com/api/tile/{Z}/{X}/{Y}.png","type":"TILE","maxzoom":"20","alphaOverlay":false,"class":"CustomLayer"},"id":""}]}"#
        );
        for placeholder in ["{X}", "{Y}", "{Z}"] {
            assert_eq!(layer.matches(placeholder).count(), 1);
        }
        assert!(!layer.contains("{x}"));
    }

    #[test]
    fn test_encoding_matches_uri_component_rules() {
        assert_eq!(encode_component("a b/{c}"), "a%20b%2F%7Bc%7D");
        assert_eq!(encode_component("-_.!~*'()"), "-_.!~*'()");
        assert_eq!(encode_twice("{"), "%257B");
    }

    #[test]
    fn test_raw_url_has_no_unencoded_braces() {
        let url = encode(&active(), center(), 12, &target()).unwrap();
        assert!(!url.contains('{'));
        assert!(!url.contains('"'));
    }
}
