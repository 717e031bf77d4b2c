use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Visible map rectangle in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Bounds {
    /// Midpoint of the rectangle, the same point the map widget reports as
    /// its bounds center.
    pub fn center(&self) -> LatLng {
        LatLng {
            lat: (self.north + self.south) / 2.0,
            lng: (self.east + self.west) / 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: u32,
    pub bounds: Bounds,
}

/// Holds the last settled viewport. Stays empty until the map reports its
/// first `moveend`.
#[derive(Debug, Clone, Default)]
pub struct ViewportTracker {
    current: Option<Viewport>,
}

impl ViewportTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a settled pan/zoom. No debouncing happens here.
    pub fn on_viewport_change(&mut self, zoom: u32, bounds: Bounds) -> Viewport {
        let viewport = Viewport {
            center: bounds.center(),
            zoom,
            bounds,
        };
        tracing::debug!(
            lat = viewport.center.lat,
            lng = viewport.center.lng,
            zoom,
            "viewport settled"
        );
        self.current = Some(viewport);
        viewport
    }

    pub fn current(&self) -> Option<&Viewport> {
        self.current.as_ref()
    }
}
