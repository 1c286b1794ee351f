/// Incremental loading of the grid
///
/// The grid starts with one batch. A sentinel sits below the last cell;
/// whenever it comes into view (within a lookahead margin) another batch
/// is revealed. Two guards keep this from running away: an in-flight
/// flag that holds until the host has rendered the growth, and a minimum
/// interval between growths.

use log::debug;
use std::ops::Range;
use std::time::{Duration, Instant};

/// Edge-triggered visibility change of a watched region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityEvent {
    Entered,
    Left,
}

/// "Tell me when the sentinel enters or leaves the viewport."
///
/// Implementations may poll geometry, wrap a native observer, or receive
/// messages from another component.
pub trait SentinelWatch {
    /// Next pending visibility change, if any
    fn poll(&mut self) -> Option<VisibilityEvent>;
}

/// Sentinel at the bottom of a scrollable region, driven by scroll geometry
#[derive(Debug, Clone)]
pub struct ScrollSentinel {
    /// Extra distance below the viewport that still counts as visible
    margin: f32,
    visible: bool,
    pending: Option<VisibilityEvent>,
}

impl ScrollSentinel {
    pub fn new(margin: f32) -> Self {
        Self {
            margin,
            visible: false,
            pending: None,
        }
    }

    /// Feed the latest scroll geometry
    pub fn observe(&mut self, offset_y: f32, viewport_height: f32, content_height: f32) {
        let visible = offset_y + viewport_height + self.margin >= content_height;

        if visible != self.visible {
            self.visible = visible;
            self.pending = Some(if visible {
                VisibilityEvent::Entered
            } else {
                VisibilityEvent::Left
            });
        }
    }

    /// Forget the last state so a still-visible sentinel reports `Entered`
    /// again on the next observation (used after the content grew)
    pub fn rearm(&mut self) {
        self.visible = false;
        self.pending = None;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl SentinelWatch for ScrollSentinel {
    fn poll(&mut self) -> Option<VisibilityEvent> {
        self.pending.take()
    }
}

/// One accepted growth step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Growth {
    pub from: usize,
    pub to: usize,
    /// Not-yet-loaded items worth prefetching
    pub prefetch: Range<usize>,
}

/// Owner of `loaded_count`
#[derive(Debug, Clone)]
pub struct IncrementalLoader {
    batch_size: usize,
    debounce: Duration,
    prefetch_ahead: usize,
    total: usize,
    loaded: usize,
    in_flight: bool,
    last_growth: Option<Instant>,
}

impl IncrementalLoader {
    pub fn new(batch_size: usize, debounce: Duration, prefetch_ahead: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            debounce,
            prefetch_ahead,
            total: 0,
            loaded: 0,
            in_flight: false,
            last_growth: None,
        }
    }

    /// Start over for a new item set (filter change): back to one batch
    pub fn reset(&mut self, total: usize) {
        self.total = total;
        self.loaded = self.batch_size.min(total);
        self.in_flight = false;
        self.last_growth = None;
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn has_more(&self) -> bool {
        self.loaded < self.total
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Handle a sentinel visibility change.
    ///
    /// Returns the growth when a batch was added; re-entrant, debounced
    /// and exhausted triggers are ignored.
    pub fn on_sentinel(&mut self, event: VisibilityEvent, now: Instant) -> Option<Growth> {
        if event != VisibilityEvent::Entered || !self.has_more() {
            return None;
        }

        if self.in_flight {
            debug!("sentinel ignored: growth in flight");
            return None;
        }

        if let Some(last) = self.last_growth {
            if now.saturating_duration_since(last) < self.debounce {
                debug!("sentinel ignored: debounced");
                return None;
            }
        }

        let from = self.loaded;
        let to = (from + self.batch_size).min(self.total);
        self.loaded = to;
        self.in_flight = true;
        self.last_growth = Some(now);

        debug!("grid grew {from} -> {to} of {}", self.total);

        Some(Growth {
            from,
            to,
            prefetch: to..(to + self.prefetch_ahead).min(self.total),
        })
    }

    /// The host rendered the last growth; accept triggers again
    pub fn settle(&mut self) {
        self.in_flight = false;
    }
}
