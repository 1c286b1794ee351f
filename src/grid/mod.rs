/// Masonry grid module
///
/// This module handles:
/// - Column-major distribution and cell geometry (layout.rs)
/// - Batch-wise growth of the visible prefix (loader.rs)
/// - Geometry-based keyboard navigation (navigator.rs)

pub mod layout;
pub mod loader;
pub mod navigator;
