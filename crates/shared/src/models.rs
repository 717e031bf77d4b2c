use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};

/// One catalog entry returned by `/api/search`, in server order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub satellite_id: String,
    #[serde(default)]
    pub acquired: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub clear_percent: i32,
    #[serde(default)]
    pub visible_percent: i32,
    #[serde(default)]
    pub cloud_percent: i32,
    #[serde(default)]
    pub thumb: String,
    #[serde(default)]
    pub tile_name: String,
    #[serde(default)]
    pub tile_url: String,
    #[serde(default)]
    pub geometry: Option<geojson::Geometry>,
}

/// Success body of `/api/search`. The catalog sends `"results": null` when
/// nothing matched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<SearchResult>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Failure body of the catalog endpoints: `{"error": "..."}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFailure {
    pub message: String,
    pub is_key_error: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Success(Vec<SearchResult>),
    Failure(SearchFailure),
}

/// The raster overlay currently shown on the map. An empty template means
/// no overlay is loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveTile {
    pub name: String,
    pub url_template: String,
}

impl ActiveTile {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        !self.url_template.is_empty()
    }
}

/// Raster overlay opacity as a whole percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opacity(u8);

impl Opacity {
    pub const MAX: u8 = 100;

    /// Clamp `percent` into [0, 100].
    pub fn new(percent: i32) -> Self {
        Opacity(percent.clamp(0, Self::MAX as i32) as u8)
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    /// Opacity as the 0.0..=1.0 fraction raster layers expect.
    pub fn as_fraction(self) -> f64 {
        self.0 as f64 / Self::MAX as f64
    }
}

impl Default for Opacity {
    fn default() -> Self {
        Opacity(Self::MAX)
    }
}

impl std::fmt::Display for Opacity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}
