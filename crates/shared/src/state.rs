//! The viewer's state record.
//!
//! Every input from the page (map moves, toggles, taps, timer fires,
//! responses) goes through one method here. Methods mutate the record and
//! return the [`Effect`]s the page must perform; the page never touches the
//! map or the network on its own.

use geojson::FeatureCollection;

use crate::classify;
use crate::config::ViewerConfig;
use crate::coordinator::{RequestTag, SearchCoordinator, SearchRequest};
use crate::export::{self, ExportError};
use crate::format::DisplayZone;
use crate::models::{ActiveTile, Opacity, SearchFailure, SearchOutcome, SearchResult};
use crate::overlay;
use crate::query::{build_query, ViewOptions};
use crate::tiles::{self, TileSelection};
use crate::timer::{Timer, TimerTicket, Timers};
use crate::viewport::{Bounds, LatLng, Viewport, ViewportTracker};

/// Zoom the map jumps to on a found place.
pub const PLACE_ZOOM: u32 = 13;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Start a timeout for `delay_ms` and pass the ticket to
    /// [`ViewerState::on_timer`] when it fires.
    StartTimer(TimerTicket<Timer>),
    /// Run the search and pass the outcome to
    /// [`ViewerState::on_search_settled`].
    Search(SearchRequest),
    /// POST the key to `/api/key`. The response is not awaited by the state.
    PostKey(String),
    /// Repoint the raster layer. Empty hides it.
    SetTileUrl(String),
    SetOpacity(f64),
    DrawOverlay(FeatureCollection),
    /// Scroll the result list back to the top.
    ResetScroll,
    /// Look up a place name, preferring hits inside `bias`, and pass the
    /// answer to [`ViewerState::on_place_found`].
    Geocode { text: String, bias: Option<Bounds> },
    /// Recenter the map. The move reports back as a viewport change.
    SetView { center: LatLng, zoom: u32 },
    /// Blocking message to the user.
    Alert(String),
}

#[derive(Debug, Clone)]
pub struct ViewerState {
    config: ViewerConfig,
    tracker: ViewportTracker,
    options: ViewOptions,
    coordinator: SearchCoordinator,
    timers: Timers<Timer>,
    results: Vec<SearchResult>,
    failure: Option<SearchFailure>,
    tiles: TileSelection,
    tiles_loading: bool,
    key_update_pending: bool,
    place_search_pending: bool,
    zone: DisplayZone,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

impl ViewerState {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            coordinator: SearchCoordinator::new(config.debounce_ms),
            config,
            tracker: ViewportTracker::new(),
            options: ViewOptions::default(),
            timers: Timers::new(),
            results: Vec::new(),
            failure: None,
            tiles: TileSelection::new(),
            tiles_loading: false,
            key_update_pending: false,
            place_search_pending: false,
            zone: DisplayZone::default(),
        }
    }

    // --- read side ---

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn options(&self) -> ViewOptions {
        self.options
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.tracker.current()
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn failure(&self) -> Option<&SearchFailure> {
        self.failure.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.coordinator.is_loading()
    }

    pub fn active_tile(&self) -> &ActiveTile {
        self.tiles.active()
    }

    pub fn opacity(&self) -> Opacity {
        self.tiles.opacity()
    }

    /// What the map is busy with, if anything: a place lookup, or raster
    /// tiles for the active overlay still streaming in.
    pub fn map_loading(&self) -> Option<&'static str> {
        if self.place_search_pending {
            Some("Map Search")
        } else if self.tiles_loading && self.tiles.active().is_active() {
            Some("Map Tiles")
        } else {
            None
        }
    }

    pub fn key_update_pending(&self) -> bool {
        self.key_update_pending
    }

    pub fn display_zone(&self) -> DisplayZone {
        self.zone
    }

    pub fn display_name(&self, result: &SearchResult) -> String {
        tiles::to_name(result, self.options, self.zone)
    }

    pub fn is_loaded(&self, result: &SearchResult) -> bool {
        tiles::is_loaded(result, self.tiles.active())
    }

    pub fn can_export(&self) -> bool {
        self.tiles.active().is_active()
    }

    pub fn overlay(&self) -> FeatureCollection {
        overlay::build_overlay(
            &self.results,
            self.options.show_satellites,
            self.tiles.active(),
        )
    }

    /// CalTopo link for the loaded overlay at the current view.
    pub fn export_link(&self) -> Result<String, ExportError> {
        let (center, zoom) = match self.tracker.current() {
            Some(vp) => (vp.center, vp.zoom),
            None => (self.config.start, self.config.start_zoom),
        };
        export::encode(
            self.tiles.active(),
            center,
            zoom,
            &self.config.export_target(),
        )
    }

    // --- helpers ---

    fn redraw(&self, effects: &mut Vec<Effect>) {
        if self.tiles.layer_mounted() {
            effects.push(Effect::DrawOverlay(self.overlay()));
        }
    }

    fn repoint(&self, effects: &mut Vec<Effect>) {
        if self.tiles.layer_mounted() {
            effects.push(Effect::SetTileUrl(
                self.tiles.active().url_template.clone(),
            ));
        }
    }

    fn resubmit(&mut self, now_ms: u64) -> Vec<Effect> {
        let Some(query) = build_query(self.tracker.current(), self.options) else {
            return Vec::new();
        };
        self.coordinator
            .submit(query, &mut self.timers, now_ms)
            .map(Effect::StartTimer)
            .into_iter()
            .collect()
    }

    fn handle_timer(&mut self, token: Timer) -> Vec<Effect> {
        match token {
            Timer::Search => self
                .coordinator
                .on_debounce_elapsed()
                .map(Effect::Search)
                .into_iter()
                .collect(),
            Timer::KeyRetry => {
                // Fixed delay, not a confirmation that the server accepted
                // the key.
                self.key_update_pending = false;
                self.coordinator
                    .retry(&mut self.timers)
                    .map(Effect::Search)
                    .into_iter()
                    .collect()
            }
        }
    }

    // --- inputs ---

    /// The map widget created its raster and overlay layers.
    pub fn on_map_mounted(&mut self) -> Vec<Effect> {
        self.tiles.mount_layer();
        vec![
            Effect::SetTileUrl(self.tiles.active().url_template.clone()),
            Effect::SetOpacity(self.tiles.opacity().as_fraction()),
            Effect::DrawOverlay(self.overlay()),
        ]
    }

    /// A pan or zoom settled.
    pub fn on_viewport_change(&mut self, zoom: u32, bounds: Bounds, now_ms: u64) -> Vec<Effect> {
        self.tracker.on_viewport_change(zoom, bounds);
        self.resubmit(now_ms)
    }

    /// A sidebar toggle changed. Any loaded tile is dropped and the search
    /// is rebuilt for the new grouping.
    pub fn set_options(&mut self, show_satellites: bool, show_images: bool, now_ms: u64) -> Vec<Effect> {
        let options = ViewOptions {
            show_satellites,
            show_images,
        }
        .normalized();
        if options == self.options {
            return Vec::new();
        }
        self.options = options;
        let mut effects = self.clear_tile();
        effects.extend(self.resubmit(now_ms));
        effects
    }

    /// A timeout started for [`Effect::StartTimer`] fired.
    pub fn on_timer(&mut self, ticket: TimerTicket<Timer>) -> Vec<Effect> {
        if !self.timers.fire(&ticket) {
            return Vec::new();
        }
        self.handle_timer(ticket.token)
    }

    /// Fire every timer due at `now_ms`. For hosts that drive time
    /// themselves instead of starting one timeout per ticket.
    pub fn poll_timers(&mut self, now_ms: u64) -> Vec<Effect> {
        self.timers
            .expired(now_ms)
            .into_iter()
            .flat_map(|t| self.handle_timer(t.token))
            .collect()
    }

    /// A search request settled. Responses to superseded queries do
    /// nothing.
    pub fn on_search_settled(&mut self, tag: RequestTag, outcome: SearchOutcome) -> Vec<Effect> {
        let Some(outcome) = self.coordinator.settle(tag, outcome) else {
            return Vec::new();
        };

        let mut effects = vec![Effect::ResetScroll];
        match outcome {
            SearchOutcome::Success(results) => {
                self.failure = None;
                self.results = results;
            }
            SearchOutcome::Failure(failure) => {
                self.results.clear();
                self.failure = Some(failure);
            }
        }

        let active = self.tiles.active();
        if active.is_active() && !self.results.iter().any(|r| r.tile_url == active.url_template) {
            tracing::debug!("loaded tile is no longer among the results, clearing");
            self.tiles.clear();
            self.tiles_loading = false;
            self.repoint(&mut effects);
        }

        self.redraw(&mut effects);
        effects
    }

    /// Convenience for hosts that only have the raw failure body.
    pub fn on_search_failed(&mut self, tag: RequestTag, raw_body: &str) -> Vec<Effect> {
        let failure = classify::classify_raw(raw_body);
        self.on_search_settled(tag, SearchOutcome::Failure(failure))
    }

    /// "Load" on the result whose tile template is `tile_url`. A template
    /// no longer among the results does nothing.
    pub fn select_tile(&mut self, tile_url: &str) -> Vec<Effect> {
        let Some(result) = self.results.iter().find(|r| r.tile_url == tile_url).cloned() else {
            tracing::debug!(tile_url, "selected tile is not among the results");
            return Vec::new();
        };
        self.tiles.select(&result, self.options, self.zone);
        let mut effects = Vec::new();
        self.repoint(&mut effects);
        self.redraw(&mut effects);
        effects
    }

    /// "Clear" on the loaded tile.
    pub fn clear_tile(&mut self) -> Vec<Effect> {
        self.tiles.clear();
        self.tiles_loading = false;
        let mut effects = Vec::new();
        self.repoint(&mut effects);
        self.redraw(&mut effects);
        effects
    }

    pub fn set_opacity(&mut self, percent: i32) -> Vec<Effect> {
        self.tiles
            .set_opacity(percent)
            .map(Effect::SetOpacity)
            .into_iter()
            .collect()
    }

    /// Raster layer started or finished fetching tiles.
    pub fn on_tile_loading(&mut self, loading: bool) {
        self.tiles_loading = loading;
    }

    /// Show times on `zone`'s clock from now on. A loaded tile keeps the
    /// name it was given.
    pub fn set_display_zone(&mut self, zone: DisplayZone) {
        self.zone = zone;
    }

    /// The place search box was submitted.
    pub fn search_place(&mut self, raw: &str) -> Vec<Effect> {
        let text = raw.trim();
        if text.is_empty() {
            return Vec::new();
        }
        self.place_search_pending = true;
        vec![Effect::Geocode {
            text: text.to_string(),
            bias: self.tracker.current().map(|vp| vp.bounds),
        }]
    }

    /// A place lookup finished. `Ok(None)` means nothing matched.
    pub fn on_place_found(&mut self, found: Result<Option<LatLng>, String>) -> Vec<Effect> {
        self.place_search_pending = false;
        match found {
            Ok(Some(center)) => vec![Effect::SetView {
                center,
                zoom: PLACE_ZOOM,
            }],
            Ok(None) => vec![Effect::Alert("No results found for search".to_string())],
            Err(e) => {
                tracing::warn!(error = %e, "place search failed");
                vec![Effect::Alert(format!("Place search failed: {}", e))]
            }
        }
    }

    /// Save a new API key, then retry the search after a fixed delay.
    pub fn submit_key(&mut self, raw: &str, now_ms: u64) -> Vec<Effect> {
        let key = raw.trim();
        if key.is_empty() {
            return Vec::new();
        }
        self.key_update_pending = true;
        let ticket = self
            .timers
            .schedule(Timer::KeyRetry, self.config.key_retry_ms, now_ms);
        vec![Effect::PostKey(key.to_string()), Effect::StartTimer(ticket)]
    }
}
