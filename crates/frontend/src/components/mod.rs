pub mod error_panel;
pub mod place_search;
pub mod result_list;
pub mod search_options;
pub mod tile_panel;
