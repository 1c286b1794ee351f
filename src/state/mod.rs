/// State management module
///
/// This module handles all gallery state, including:
/// - Item data structures and the view state (data.rs)
/// - Manifest parsing and item normalization (normalize.rs)
/// - Tunables loaded from disk (config.rs)
/// - The filtered item set and its derived layout (library.rs)

pub mod config;
pub mod data;
pub mod library;
pub mod normalize;
