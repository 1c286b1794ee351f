/// Gallery configuration
///
/// Tunables for loading, layout and asset resolution. Stored as JSON;
/// every field has a default so a partial (or missing) file is fine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::assets::SizeTier;
use crate::error::{GalleryError, Result};
use crate::grid::layout::{AspectBand, Breakpoints};

/// All tunables of the gallery
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GalleryConfig {
    // ========== Incremental Loading ==========

    /// Items added per sentinel trigger (also the initial batch)
    pub batch_size: usize,

    /// Minimum time between two growths, in milliseconds
    pub debounce_ms: u64,

    /// How far below the viewport the sentinel counts as visible (px)
    pub lookahead_margin: f32,

    /// Not-yet-loaded items to prefetch after each growth
    pub prefetch_ahead: usize,

    // ========== Layout ==========

    /// Viewport widths below which the grid drops to 1 or 2 columns
    pub breakpoints: Breakpoints,

    /// Range of the decorative per-cell aspect ratio
    pub aspect_band: AspectBand,

    /// Spacing between cells (px)
    pub grid_gap: f32,

    /// Vertical slack used by keyboard navigation (px)
    pub navigation_margin: f32,

    // ========== Assets ==========

    /// Directory that holds `variants/`, `originals/` and legacy files
    pub asset_root: Option<PathBuf>,

    /// Size tier preference for grid cells
    pub grid_sizes: Vec<SizeTier>,

    /// Size tier preference for the preview dialog
    pub preview_sizes: Vec<SizeTier>,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            batch_size: 20,
            debounce_ms: 250,
            lookahead_margin: 600.0,
            prefetch_ahead: 6,
            breakpoints: Breakpoints::default(),
            aspect_band: AspectBand::default(),
            grid_gap: 12.0,
            navigation_margin: 1.0,
            asset_root: None,
            grid_sizes: vec![SizeTier::Small, SizeTier::Medium, SizeTier::Original],
            preview_sizes: vec![
                SizeTier::Large,
                SizeTier::Medium,
                SizeTier::Small,
                SizeTier::Original,
            ],
        }
    }
}

impl GalleryConfig {
    /// Convert to a JSON string
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse from a JSON string
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load the config from `path`, or from the default location.
    ///
    /// An explicit path must exist. The default location is optional and
    /// falls back to `GalleryConfig::default()`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::default_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        if !explicit && !path.exists() {
            return Ok(Self::default());
        }

        let json = std::fs::read_to_string(&path).map_err(|source| GalleryError::Io {
            path: path.clone(),
            source,
        })?;

        let config = Self::from_json(&json).map_err(|e| GalleryError::Config {
            path: path.clone(),
            message: e.to_string(),
        })?;

        log::info!("loaded config from {}", path.display());
        Ok(config.sanitized())
    }

    /// `<config dir>/photo-gallery/config.json`
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("photo-gallery");
        path.push("config.json");
        Some(path)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Clamp values that would stall or break the grid
    fn sanitized(mut self) -> Self {
        self.batch_size = self.batch_size.max(1);
        self.grid_gap = self.grid_gap.max(0.0);
        self.navigation_margin = self.navigation_margin.max(0.0);
        if self.aspect_band.min > self.aspect_band.max {
            std::mem::swap(&mut self.aspect_band.min, &mut self.aspect_band.max);
        }
        self.aspect_band.min = self.aspect_band.min.max(AspectBand::MIN_RATIO);
        self.aspect_band.max = self.aspect_band.max.max(self.aspect_band.min);
        if self.grid_sizes.is_empty() {
            self.grid_sizes = Self::default().grid_sizes;
        }
        if self.preview_sizes.is_empty() {
            self.preview_sizes = Self::default().preview_sizes;
        }
        self
    }
}
