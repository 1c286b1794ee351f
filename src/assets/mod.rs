/// Image asset handling
///
/// This module handles:
/// - Building candidate paths for an item image (resolver.rs)
/// - Walking those candidates on disk and reading dimensions (probe.rs)
/// - Best-effort prefetch of upcoming images

pub mod probe;
pub mod resolver;

pub use probe::{ImageState, Dimensions, FsImageLoader, ImageLoader};
pub use resolver::{resolve_item, FallbackChain, SizeTier, Variant};
