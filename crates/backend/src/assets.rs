use planet_viewer_shared::config::ViewerConfig;
use std::path::Path;

pub const VIEWER_CONFIG_FILE: &str = "viewer.json";

/// Load and validate `viewer.json` from the assets directory. The front end
/// fetches the same file from `/static`; checking it here surfaces a broken
/// deploy in the server log instead of silently falling back to defaults in
/// the browser.
pub fn load_viewer_config(assets_dir: &Path) -> Result<ViewerConfig, String> {
    let path = assets_dir.join(VIEWER_CONFIG_FILE);
    let data = std::fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let config = ViewerConfig::from_json(&data).map_err(|e| e.to_string())?;

    tracing::info!(
        tile_origin = %config.tile_origin,
        start_zoom = config.start_zoom,
        "Loaded viewer config"
    );
    Ok(config)
}
