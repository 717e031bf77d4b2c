pub mod classify;
pub mod config;
pub mod coordinator;
pub mod export;
pub mod format;
pub mod models;
pub mod overlay;
pub mod query;
pub mod state;
pub mod tiles;
pub mod timer;
pub mod viewport;
