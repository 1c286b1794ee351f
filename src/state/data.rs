/// Shared data structures for the gallery state
///
/// These structs represent the data model that flows from the
/// manifest, through normalization, into the grid and the preview.

use serde::Deserialize;

/// A manifest entry exactly as the metadata collaborator supplies it.
/// Every field is optional here; `normalize` decides what is required.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawItem {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Human readable category labels ("Street Photography")
    #[serde(default, alias = "categories")]
    pub category_labels: Vec<String>,
    pub year: Option<i32>,
    pub primary_src: Option<String>,
    pub secondary_src: Option<String>,
    pub thumb_src: Option<String>,
    pub alt_text: Option<String>,
    pub accent_color: Option<String>,
}

/// A single normalized photo in the gallery
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoItem {
    /// Unique id, also the base name for generated assets
    pub id: String,
    pub title: String,
    pub description: String,
    /// Trimmed, non-empty labels
    pub category_labels: Vec<String>,
    /// `category_slugs[i]` is the slug of `category_labels[i]`
    pub category_slugs: Vec<String>,
    pub year: i32,
    /// Source of the main image
    pub primary_src: String,
    /// Optional second image, shown side by side in the preview
    pub secondary_src: Option<String>,
    /// Optional small image for the grid cell
    pub thumb_src: Option<String>,
    pub alt_text: String,
    /// CSS-style hex color used as placeholder background
    pub accent_color: Option<String>,
}

impl PhotoItem {
    /// True when the item belongs to the category with this slug
    pub fn has_category(&self, slug: &str) -> bool {
        self.category_slugs.iter().any(|s| s == slug)
    }

    /// Case-insensitive match against title, description and labels
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }

        self.title.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
            || self
                .category_labels
                .iter()
                .any(|label| label.to_lowercase().contains(&query))
    }
}

/// Mutable view state of the gallery
///
/// - `loaded_count` is only changed by the incremental loader
/// - `column_count` only by the viewport width observer
/// - `active_index`, `preview_open` and `preview_aspect_ratio` only by
///   the viewer coordinator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GalleryViewState {
    /// Length of the visible prefix of the filtered items
    pub loaded_count: usize,
    /// 1, 2 or 3
    pub column_count: usize,
    /// Original index of the previewed item (None = nothing active)
    pub active_index: Option<usize>,
    pub preview_open: bool,
    /// width / height shared by the one or two preview images
    pub preview_aspect_ratio: f32,
}

impl Default for GalleryViewState {
    fn default() -> Self {
        Self {
            loaded_count: 0,
            column_count: 3,
            active_index: None,
            preview_open: false,
            preview_aspect_ratio: 1.0,
        }
    }
}
