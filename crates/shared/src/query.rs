use serde::Serialize;

use crate::viewport::Viewport;

/// Server-side aggregation of catalog results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GroupBy {
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "satellite")]
    Satellite,
    /// Every individual image, no aggregation.
    #[serde(rename = "")]
    Ungrouped,
}

/// The two sidebar toggles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewOptions {
    pub show_satellites: bool,
    pub show_images: bool,
}

impl ViewOptions {
    /// Both toggles → ungrouped, satellites only → per satellite pass,
    /// anything else → per date.
    pub fn group_by(&self) -> GroupBy {
        if self.show_images && self.show_satellites {
            GroupBy::Ungrouped
        } else if self.show_satellites {
            GroupBy::Satellite
        } else {
            GroupBy::Date
        }
    }

    /// Individual images only make sense on top of satellite tracks; the
    /// images toggle is forced off otherwise.
    pub fn normalized(self) -> Self {
        if !self.show_satellites && self.show_images {
            ViewOptions {
                show_satellites: false,
                show_images: false,
            }
        } else {
            self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SearchQuery {
    pub lat: f64,
    pub lng: f64,
    #[serde(rename = "z")]
    pub zoom: u32,
    pub group_by: GroupBy,
}

/// Build the search for the current map view. Returns `None` until the map
/// has settled at least once.
pub fn build_query(viewport: Option<&Viewport>, options: ViewOptions) -> Option<SearchQuery> {
    let viewport = viewport?;
    Some(SearchQuery {
        lat: viewport.center.lat,
        lng: viewport.center.lng,
        zoom: viewport.zoom,
        group_by: options.group_by(),
    })
}
