use log::{debug, info};
use std::sync::Arc;
use std::time::Instant;

use super::config::GalleryConfig;
use super::data::{GalleryViewState, PhotoItem};
use super::normalize::{normalize, parse_manifest};
use crate::assets::{resolve_item, Variant};
use crate::error::Result;
use crate::grid::layout::{self, CellRect, ColumnLayout};
use crate::grid::loader::{Growth, IncrementalLoader, VisibilityEvent};
use crate::grid::navigator::{self, Direction};
use crate::viewer::ViewerCoordinator;

/// Something observable changed in the library
#[derive(Debug, Clone, PartialEq)]
pub enum LibraryEvent {
    /// A new item set was loaded
    ItemsReplaced { total: usize },
    /// Category or query changed; `matches` items pass
    FilterChanged { matches: usize },
    /// The rendered layout was recomputed
    LayoutChanged { loaded: usize, columns: usize },
    /// The loader revealed another batch
    Grew(Growth),
}

/// One category chip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    pub slug: String,
    pub label: String,
    pub count: usize,
}

type Observer = Box<dyn FnMut(&LibraryEvent)>;

/// The Library owns the normalized photos and everything derived from them.
///
/// Layout and cell geometry are recomputed from scratch whenever the
/// filtered set, `loaded_count`, the column count or the viewport width
/// changes. Observers are told after each recomputation.
pub struct Library {
    config: GalleryConfig,
    items: Vec<Arc<PhotoItem>>,
    /// Canonical filtered list; layout indices point into this
    filtered: Vec<Arc<PhotoItem>>,
    category: Option<String>,
    query: String,
    viewport_width: f32,
    column_count: usize,
    loader: IncrementalLoader,
    layout: ColumnLayout,
    cells: Vec<CellRect>,
    observers: Vec<Observer>,
}

impl Library {
    pub fn new(config: GalleryConfig, viewport_width: f32) -> Self {
        let loader = IncrementalLoader::new(config.batch_size, config.debounce(), config.prefetch_ahead);
        let column_count = layout::column_count_for_width(viewport_width, &config.breakpoints);

        Library {
            config,
            items: Vec::new(),
            filtered: Vec::new(),
            category: None,
            query: String::new(),
            viewport_width,
            column_count,
            loader,
            layout: ColumnLayout::default(),
            cells: Vec::new(),
            observers: Vec::new(),
        }
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    /// Register a change observer
    pub fn subscribe(&mut self, observer: impl FnMut(&LibraryEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Parse and normalize a JSON manifest, then show it
    pub fn load_manifest(&mut self, json: &str) -> Result<usize> {
        let items = normalize(parse_manifest(json)?)?;
        let total = items.len();
        self.set_items(items);
        Ok(total)
    }

    /// Replace the whole item set (keeps the current filter)
    pub fn set_items(&mut self, items: Vec<PhotoItem>) {
        self.items = items.into_iter().map(Arc::new).collect();
        info!("library holds {} photos", self.items.len());
        self.emit(LibraryEvent::ItemsReplaced { total: self.items.len() });
        self.refilter();
    }

    /// Change category/query; snaps the grid back to one batch
    pub fn set_filter(&mut self, category: Option<String>, query: &str) {
        if self.category == category && self.query == query {
            return;
        }
        self.category = category;
        self.query = query.to_string();
        self.refilter();
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Every category in the full set with its item count, in first-seen order
    pub fn categories(&self) -> Vec<CategorySummary> {
        let mut summaries: Vec<CategorySummary> = Vec::new();

        for item in &self.items {
            for (slug, label) in item.category_slugs.iter().zip(&item.category_labels) {
                match summaries.iter_mut().find(|s| &s.slug == slug) {
                    Some(summary) => summary.count += 1,
                    None => summaries.push(CategorySummary {
                        slug: slug.clone(),
                        label: label.clone(),
                        count: 1,
                    }),
                }
            }
        }

        summaries
    }

    /// Viewport observer: may change the column count
    pub fn set_viewport_width(&mut self, width: f32) {
        if (width - self.viewport_width).abs() < f32::EPSILON {
            return;
        }
        self.viewport_width = width;
        let columns = layout::column_count_for_width(width, &self.config.breakpoints);
        if columns != self.column_count {
            debug!("viewport {width}px -> {columns} columns");
            self.column_count = columns;
        }
        self.rebuild_layout();
    }

    pub fn viewport_width(&self) -> f32 {
        self.viewport_width
    }

    /// Forward a sentinel signal to the loader
    pub fn on_sentinel(&mut self, event: VisibilityEvent, now: Instant) -> Option<Growth> {
        let growth = self.loader.on_sentinel(event, now)?;
        self.rebuild_layout();
        self.emit(LibraryEvent::Grew(growth.clone()));
        Some(growth)
    }

    /// The host rendered the last growth
    pub fn settle(&mut self) {
        self.loader.settle();
    }

    pub fn has_more(&self) -> bool {
        self.loader.has_more()
    }

    pub fn loaded_count(&self) -> usize {
        self.loader.loaded_count()
    }

    /// Size of the filtered set
    pub fn total(&self) -> usize {
        self.filtered.len()
    }

    pub fn filtered(&self) -> &[Arc<PhotoItem>] {
        &self.filtered
    }

    /// Item by position in the filtered list
    pub fn item(&self, original_index: usize) -> Option<&Arc<PhotoItem>> {
        self.filtered.get(original_index)
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    /// Cell rectangles in rendered order
    pub fn cells(&self) -> &[CellRect] {
        &self.cells
    }

    pub fn content_height(&self) -> f32 {
        layout::content_height(&self.cells)
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// Arrow-key target from a rendered index
    pub fn navigate(&self, rendered_index: usize, direction: Direction) -> Option<usize> {
        navigator::navigate(&self.cells, rendered_index, direction, self.config.navigation_margin)
    }

    /// Candidates for a grid cell: the thumb variant, then the primary image
    pub fn cell_candidates(&self, item: &PhotoItem) -> Vec<String> {
        let mut candidates = resolve_item(item, Variant::Thumb, &self.config.grid_sizes);
        for candidate in resolve_item(item, Variant::Primary, &self.config.grid_sizes) {
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
        candidates
    }

    /// Candidate lists worth warming for the items in `range`
    pub fn prefetch_candidates(&self, range: std::ops::Range<usize>) -> Vec<Vec<String>> {
        self.filtered
            .get(range.start.min(self.filtered.len())..range.end.min(self.filtered.len()))
            .unwrap_or_default()
            .iter()
            .flat_map(|item| {
                [
                    resolve_item(item, Variant::Thumb, &self.config.grid_sizes),
                    resolve_item(item, Variant::Primary, &self.config.preview_sizes),
                ]
            })
            .collect()
    }

    /// Snapshot of the view state
    pub fn view_state<F: Clone>(&self, viewer: &ViewerCoordinator<F>) -> GalleryViewState {
        GalleryViewState {
            loaded_count: self.loader.loaded_count(),
            column_count: self.column_count,
            active_index: viewer.active_index(),
            preview_open: viewer.is_open(),
            preview_aspect_ratio: viewer.aspect_ratio(),
        }
    }

    fn refilter(&mut self) {
        let category = self.category.as_deref();
        let query = self.query.as_str();

        self.filtered = self
            .items
            .iter()
            .filter(|item| category.map_or(true, |slug| item.has_category(slug)))
            .filter(|item| item.matches_query(query))
            .cloned()
            .collect();

        self.loader.reset(self.filtered.len());
        self.emit(LibraryEvent::FilterChanged {
            matches: self.filtered.len(),
        });
        self.rebuild_layout();
    }

    fn rebuild_layout(&mut self) {
        self.layout = layout::distribute(&self.filtered, self.loader.loaded_count(), self.column_count);
        self.cells = layout::measure_cells(
            &self.layout,
            self.viewport_width,
            self.config.grid_gap,
            &self.config.aspect_band,
        );

        self.emit(LibraryEvent::LayoutChanged {
            loaded: self.layout.len(),
            columns: self.column_count,
        });
    }

    fn emit(&mut self, event: LibraryEvent) {
        for observer in &mut self.observers {
            observer(&event);
        }
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("items", &self.items.len())
            .field("filtered", &self.filtered.len())
            .field("loaded", &self.loader.loaded_count())
            .field("columns", &self.column_count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::RawItem;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    fn photos(count: usize) -> Vec<PhotoItem> {
        let raw = (0..count)
            .map(|i| RawItem {
                id: Some(format!("shot-{i}")),
                title: Some(format!("Shot {i}")),
                primary_src: Some(format!("shot-{i}.jpg")),
                category_labels: if i % 3 == 0 {
                    vec!["Street".into(), "Black & White".into()]
                } else {
                    vec!["Travel".into()]
                },
                ..RawItem::default()
            })
            .collect();
        normalize(raw).unwrap()
    }

    fn library(count: usize) -> Library {
        let mut library = Library::new(GalleryConfig::default(), 1280.0);
        library.set_items(photos(count));
        library
    }

    #[test]
    fn test_initial_batch_and_growth() {
        let mut library = library(45);
        assert_eq!(library.loaded_count(), 20);
        assert_eq!(library.layout().len(), 20);
        assert_eq!(library.cells().len(), 20);

        let growth = library.on_sentinel(VisibilityEvent::Entered, Instant::now()).unwrap();
        assert_eq!(growth.to, 40);
        assert_eq!(library.layout().len(), 40);

        let mut indices = library.layout().original_indices();
        indices.sort_unstable();
        assert_eq!(indices, (0..40).collect::<Vec<_>>());
    }

    #[test]
    fn test_filter_resets_loaded_count() {
        let mut library = library(90);
        let start = Instant::now();
        library.on_sentinel(VisibilityEvent::Entered, start);
        library.settle();
        library.on_sentinel(VisibilityEvent::Entered, start + Duration::from_secs(1));
        assert_eq!(library.loaded_count(), 60);

        library.set_filter(Some("travel".into()), "");
        assert_eq!(library.total(), 60);
        assert_eq!(library.loaded_count(), 20);
        assert!(library.filtered().iter().all(|item| item.has_category("travel")));

        library.set_filter(Some("black-white".into()), "shot 3");
        let titles: Vec<&str> = library.filtered().iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Shot 3", "Shot 30", "Shot 33", "Shot 36", "Shot 39"]);
    }

    #[test]
    fn test_categories() {
        let library = library(6);
        let categories = library.categories();

        assert_eq!(
            categories,
            vec![
                CategorySummary { slug: "street".into(), label: "Street".into(), count: 2 },
                CategorySummary { slug: "black-white".into(), label: "Black & White".into(), count: 2 },
                CategorySummary { slug: "travel".into(), label: "Travel".into(), count: 4 },
            ]
        );
    }

    #[test]
    fn test_viewport_changes_columns() {
        let mut library = library(10);
        assert_eq!(library.column_count(), 3);

        library.set_viewport_width(480.0);
        assert_eq!(library.column_count(), 1);
        assert_eq!(library.layout().original_indices(), (0..10).collect::<Vec<_>>());
        assert!(library.cells().iter().all(|c| c.x == 0.0));

        library.set_viewport_width(700.0);
        assert_eq!(library.column_count(), 2);
        assert_eq!(library.layout().original_indices()[..3], [0, 2, 4]);
    }

    #[test]
    fn test_observers_see_changes() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let mut library = Library::new(GalleryConfig::default(), 1280.0);
        library.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        library.set_items(photos(3));
        library.set_viewport_width(500.0);

        let events = seen.borrow();
        assert_eq!(
            *events,
            vec![
                LibraryEvent::ItemsReplaced { total: 3 },
                LibraryEvent::FilterChanged { matches: 3 },
                LibraryEvent::LayoutChanged { loaded: 3, columns: 3 },
                LibraryEvent::LayoutChanged { loaded: 3, columns: 1 },
            ]
        );
    }

    #[test]
    fn test_empty_library() {
        let mut library = Library::new(GalleryConfig::default(), 1280.0);
        assert_eq!(library.load_manifest("[]").unwrap(), 0);
        assert!(library.layout().is_empty());
        assert_eq!(library.content_height(), 0.0);
        assert_eq!(library.on_sentinel(VisibilityEvent::Entered, Instant::now()), None);
        assert!(library.prefetch_candidates(0..6).is_empty());
    }

    #[test]
    fn test_view_state_snapshot() {
        let library = library(25);
        let mut viewer: ViewerCoordinator<usize> = ViewerCoordinator::new(library.config().preview_sizes.clone());
        let item = Arc::clone(library.item(2).unwrap());

        let ticket = viewer.begin_open(2, &item, 0.0, None);
        viewer.complete_open(ticket.token, &[None]);

        let state = library.view_state(&viewer);
        assert_eq!(state.loaded_count, 20);
        assert_eq!(state.column_count, 3);
        assert_eq!(state.active_index, Some(2));
        assert!(state.preview_open);
        assert_eq!(state.preview_aspect_ratio, 1.0);
    }

    #[test]
    fn test_prefetch_and_cell_candidates() {
        let library = library(25);
        let lists = library.prefetch_candidates(20..26);
        // 5 remaining items, thumb + primary each
        assert_eq!(lists.len(), 10);

        let item = library.item(0).unwrap();
        let candidates = library.cell_candidates(item);
        assert!(candidates[0].contains("_thumb"));
        assert_eq!(candidates.last().map(String::as_str), Some("shot-0.jpg"));
    }
}
