/// Preview coordinator
///
/// Owns the single-item preview. Opening is split in two so the slow
/// part (loading one or two images) can run as a background task:
///
/// 1. `begin_open` captures scroll/focus, bumps the open token and says
///    which images to load.
/// 2. `load_sources` loads them concurrently; each settles to an image
///    with its natural size, or to the degraded state.
/// 3. `complete_open` applies the result only if its token is still the
///    current one, then reveals the preview.
///
/// The token check is what keeps a slow, older load from overwriting the
/// aspect ratio of a more recently opened item.

use futures_util::future::join_all;
use log::{debug, info};

use crate::assets::{resolve_item, Dimensions, ImageLoader, ImageState, SizeTier, Variant};
use crate::state::data::PhotoItem;

/// Ratio used before any preview image ever loaded
pub const DEFAULT_ASPECT_RATIO: f32 = 1.0;

/// One image to show in the preview
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSource {
    pub variant: Variant,
    pub candidates: Vec<String>,
}

/// Handle for an open in progress
#[derive(Debug, Clone, PartialEq)]
pub struct OpenTicket {
    pub token: u64,
    pub original_index: usize,
    pub sources: Vec<ImageSource>,
}

/// A preview that just became visible
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reveal {
    pub original_index: usize,
    pub aspect_ratio: f32,
    /// How many of the images loaded
    pub loaded: usize,
}

/// Where to go back to after closing
#[derive(Debug, Clone, PartialEq)]
pub struct Restore<F> {
    pub scroll_offset: f32,
    /// Previously focused element, only if it is still attached
    pub focus: Option<F>,
}

#[derive(Debug, Clone)]
struct ReturnPoint<F> {
    scroll_offset: f32,
    focused: Option<F>,
}

/// Preview state machine; `F` is whatever identifies a focusable element
#[derive(Debug, Clone)]
pub struct ViewerCoordinator<F> {
    token: u64,
    pending: Option<usize>,
    active_index: Option<usize>,
    open: bool,
    aspect_ratio: f32,
    return_point: Option<ReturnPoint<F>>,
    sizes: Vec<SizeTier>,
}

impl<F: Clone> ViewerCoordinator<F> {
    /// `sizes` is the tier preference for preview images
    pub fn new(sizes: Vec<SizeTier>) -> Self {
        Self {
            token: 0,
            pending: None,
            active_index: None,
            open: false,
            aspect_ratio: DEFAULT_ASPECT_RATIO,
            return_point: None,
            sizes,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// An open was started and has not been revealed or superseded yet
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn current_token(&self) -> u64 {
        self.token
    }

    /// Start opening the preview for `item`.
    ///
    /// The return point is captured only when coming from the grid, so
    /// switching items inside an open preview still returns to where the
    /// user started.
    pub fn begin_open(
        &mut self,
        original_index: usize,
        item: &PhotoItem,
        scroll_offset: f32,
        focused: Option<F>,
    ) -> OpenTicket {
        if !self.open && self.pending.is_none() {
            self.return_point = Some(ReturnPoint {
                scroll_offset,
                focused,
            });
        }

        self.token += 1;
        self.pending = Some(original_index);

        let mut sources = vec![ImageSource {
            variant: Variant::Primary,
            candidates: resolve_item(item, Variant::Primary, &self.sizes),
        }];
        if item.secondary_src.is_some() {
            sources.push(ImageSource {
                variant: Variant::Secondary,
                candidates: resolve_item(item, Variant::Secondary, &self.sizes),
            });
        }

        debug!(
            "open #{} requested for `{}` with {} image(s)",
            self.token,
            item.id,
            sources.len()
        );

        OpenTicket {
            token: self.token,
            original_index,
            sources,
        }
    }

    /// Apply the settled loads of an open.
    ///
    /// Returns `None` (and changes nothing) when `token` is stale.
    pub fn complete_open(&mut self, token: u64, outcomes: &[Option<Dimensions>]) -> Option<Reveal> {
        if token != self.token {
            debug!("discarding stale open #{token} (current #{})", self.token);
            return None;
        }
        let original_index = self.pending.take()?;

        if let Some(ratio) = shared_aspect_ratio(outcomes) {
            self.aspect_ratio = ratio;
        }

        self.active_index = Some(original_index);
        self.open = true;

        let loaded = outcomes.iter().flatten().count();
        info!(
            "preview open for item {original_index} (ratio {:.3}, {loaded}/{} images)",
            self.aspect_ratio,
            outcomes.len()
        );

        Some(Reveal {
            original_index,
            aspect_ratio: self.aspect_ratio,
            loaded,
        })
    }

    /// Hide the preview.
    ///
    /// Any open still in flight is invalidated. The captured focus is
    /// handed back only if `is_attached` still accepts it.
    pub fn close(&mut self, is_attached: impl Fn(&F) -> bool) -> Option<Restore<F>> {
        if !self.open && self.pending.is_none() {
            return None;
        }

        self.token += 1;
        self.pending = None;
        self.open = false;
        self.active_index = None;

        let point = self.return_point.take()?;
        Some(Restore {
            scroll_offset: point.scroll_offset,
            focus: point.focused.filter(|focus| is_attached(focus)),
        })
    }
}

/// Ratio of the smallest-area image among the successful loads
pub fn shared_aspect_ratio(outcomes: &[Option<Dimensions>]) -> Option<f32> {
    outcomes
        .iter()
        .flatten()
        .filter(|dims| dims.aspect_ratio().is_some())
        .min_by_key(|dims| dims.area())
        .and_then(|dims| dims.aspect_ratio())
}

/// Load every source concurrently and wait until all have settled
pub async fn load_sources<L: ImageLoader>(loader: &L, sources: &[ImageSource]) -> Vec<ImageState> {
    join_all(
        sources
            .iter()
            .map(|source| loader.load(source.candidates.clone())),
    )
    .await
}

/// Natural sizes of the settled loads, `None` for failures
pub fn outcomes(images: &[ImageState]) -> Vec<Option<Dimensions>> {
    images.iter().map(ImageState::dimensions).collect()
}
