use crate::format::{format_date, format_time, DisplayZone};
use crate::models::{ActiveTile, Opacity, SearchResult};
use crate::query::ViewOptions;

/// Display name for a result. Always starts with the acquisition date;
/// individual images append the time and image id, satellite passes the
/// time and satellite label. Times are on `zone`'s wall clock.
pub fn to_name(result: &SearchResult, options: ViewOptions, zone: DisplayZone) -> String {
    let local = result.acquired.as_ref().map(|ts| zone.localize(ts));
    let acquired = local.as_ref();
    let mut name = format_date(acquired);
    if options.show_images {
        name.push_str(&format!(", {} ({})", format_time(acquired), result.id));
    } else if options.show_satellites {
        name.push_str(&format!(
            ", {} (SAT-{})",
            format_time(acquired),
            result.satellite_id
        ));
    }
    name
}

/// Whether `result` is the tile currently on the map.
pub fn is_loaded(result: &SearchResult, active: &ActiveTile) -> bool {
    active.is_active() && active.url_template == result.tile_url
}

/// Which result, if any, is the raster overlay, plus its opacity.
///
/// The raster layer itself lives in the map widget; this only records
/// what it should show. `layer_mounted` stays false until the widget has
/// created the layer.
#[derive(Debug, Clone, Default)]
pub struct TileSelection {
    active: ActiveTile,
    opacity: Opacity,
    layer_mounted: bool,
}

impl TileSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> &ActiveTile {
        &self.active
    }

    pub fn opacity(&self) -> Opacity {
        self.opacity
    }

    pub fn layer_mounted(&self) -> bool {
        self.layer_mounted
    }

    pub fn mount_layer(&mut self) {
        self.layer_mounted = true;
    }

    /// Make `result` the raster overlay. Returns the new active tile; the
    /// caller repoints the raster layer at its template.
    pub fn select(&mut self, result: &SearchResult, options: ViewOptions, zone: DisplayZone) -> ActiveTile {
        self.active = ActiveTile {
            name: to_name(result, options, zone),
            url_template: result.tile_url.clone(),
        };
        tracing::debug!(name = %self.active.name, "tile selected");
        self.active.clone()
    }

    /// Drop the raster overlay. The caller repoints the layer at an empty
    /// template.
    pub fn clear(&mut self) -> ActiveTile {
        self.active = ActiveTile::empty();
        self.active.clone()
    }

    /// Store the new opacity. Returns the fraction to apply to the raster
    /// layer, or `None` when there is no layer yet.
    pub fn set_opacity(&mut self, percent: i32) -> Option<f64> {
        self.opacity = Opacity::new(percent);
        self.layer_mounted.then(|| self.opacity.as_fraction())
    }
}
