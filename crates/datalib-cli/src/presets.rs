//! Built-in view presets.
//!
//! The dashboard ships a handful of tabs per list; the CLI mirrors them so
//! `--view` behaves like clicking a tab. Base filters here merge with any
//! `--filter` and `--advanced-filters` the user adds.

use datalib_model::{SortSpec, ViewConfig};

pub fn default_views() -> Vec<ViewConfig> {
    vec![
        ViewConfig::new("all", "All Items"),
        ViewConfig::new("recent", "Recently Added")
            .with_default_sort(SortSpec::desc("created_at")),
        ViewConfig::new("video", "Video")
            .with_base_filter("type", "video")
            .with_default_group_by("category"),
        ViewConfig::new("audio", "Audio")
            .with_base_filter("type", "audio")
            .with_default_group_by("category"),
        ViewConfig::new("flagged", "Flagged")
            .with_base_filter("status", "flagged")
            .with_default_sort(SortSpec::desc("updated_at")),
    ]
}

pub fn find_view(id: &str) -> Option<ViewConfig> {
    default_views().into_iter().find(|view| view.id == id)
}
