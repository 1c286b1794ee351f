use clap::Parser;
use iced::keyboard::{self, key::Named, Key};
use iced::widget::scrollable::{self, AbsoluteOffset};
use iced::widget::{column, stack};
use iced::{time, window, Element, Size, Subscription, Task, Theme};
use log::{debug, error, info, warn};
use rfd::FileDialog;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

mod assets;
mod error;
mod grid;
mod state;
mod ui;
mod viewer;

use assets::{FallbackChain, FsImageLoader, ImageState};
use error::GalleryError;
use grid::loader::{ScrollSentinel, SentinelWatch};
use grid::navigator::{route_key, Direction, GalleryKey, KeyRoute};
use state::config::GalleryConfig;
use state::library::Library;
use viewer::ViewerCoordinator;

const INITIAL_WINDOW: Size = Size {
    width: 1280.0,
    height: 860.0,
};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(version, about = "Adaptive masonry photo gallery")]
struct Args {
    /// JSON manifest with the photo items
    manifest: Option<PathBuf>,

    /// Directory holding `variants/` and `originals/` (defaults to the manifest's folder)
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Config file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Main application state
struct PhotoGallery {
    /// Items, filter, loader and derived layout
    library: Library,
    /// Preview state; focus handles are original indices
    viewer: ViewerCoordinator<usize>,
    /// Image loading relative to the asset root
    assets: FsImageLoader,
    /// Asset root came from the command line or config
    assets_pinned: bool,
    /// Grid cell images by item id
    cell_images: HashMap<String, ImageState>,
    /// Images shown in the open preview
    preview_images: Vec<ImageState>,
    /// Original index of the focused cell
    focused: Option<usize>,
    sentinel: ScrollSentinel,
    scroll_offset: f32,
    /// Height of the grid's scrollable as last reported
    viewport_height: f32,
    window: Size,
    query: String,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked "Open Manifest"
    OpenManifest,
    /// Manifest read from disk (or the error)
    ManifestLoaded(Result<String, String>),
    FilterCategory(Option<String>),
    QueryChanged(String),
    Scrolled(scrollable::Viewport),
    Resized(Size),
    /// Periodic re-check while the sentinel stays visible
    SentinelTick,
    /// The host drew the last growth
    GrowthRendered,
    CellImageSettled(String, ImageState),
    Prefetched(usize),
    CellPressed(usize),
    Key(GalleryKey),
    PreviewSettled(u64, Vec<ImageState>),
    ClosePreview,
}

impl PhotoGallery {
    fn new(args: Args) -> (Self, Task<Message>) {
        let (config, status) = match GalleryConfig::load(args.config.as_deref()) {
            Ok(config) => (config, String::from("Open a manifest to get started.")),
            Err(e) => {
                warn!("{e}, using defaults");
                (GalleryConfig::default(), format!("{e}. Using default settings."))
            }
        };

        let pinned_root = args.assets.clone().or_else(|| config.asset_root.clone());
        let root = pinned_root
            .clone()
            .or_else(|| args.manifest.as_deref().and_then(Path::parent).map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));

        let gallery = PhotoGallery::with_config(config, root, pinned_root.is_some(), status);

        let task = match args.manifest {
            Some(path) => Task::perform(read_manifest(path), Message::ManifestLoaded),
            None => Task::none(),
        };

        (gallery, task)
    }

    fn with_config(config: GalleryConfig, root: PathBuf, assets_pinned: bool, status: String) -> Self {
        let mut library = Library::new(config.clone(), ui::grid::grid_width(INITIAL_WINDOW.width));
        library.subscribe(|event| debug!("library: {event:?}"));

        PhotoGallery {
            viewer: ViewerCoordinator::new(config.preview_sizes.clone()),
            library,
            assets: FsImageLoader::new(root),
            assets_pinned,
            cell_images: HashMap::new(),
            preview_images: Vec::new(),
            focused: None,
            sentinel: ScrollSentinel::new(config.lookahead_margin),
            scroll_offset: 0.0,
            viewport_height: INITIAL_WINDOW.height,
            window: INITIAL_WINDOW,
            query: String::new(),
            status,
        }
    }

    fn title(&self) -> String {
        format!("Photo Gallery ({} photos)", self.library.total())
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenManifest => {
                let picked = FileDialog::new()
                    .set_title("Select Photo Manifest")
                    .add_filter("JSON manifest", &["json"])
                    .pick_file();

                if let Some(path) = picked {
                    if !self.assets_pinned {
                        if let Some(parent) = path.parent() {
                            self.assets = FsImageLoader::new(parent);
                        }
                    }
                    self.status = format!("Reading {}...", path.display());
                    return Task::perform(read_manifest(path), Message::ManifestLoaded);
                }

                Task::none()
            }
            Message::ManifestLoaded(Ok(json)) => {
                self.viewer.close(|_| false);
                self.preview_images.clear();
                self.cell_images.clear();
                self.focused = None;

                match self.library.load_manifest(&json) {
                    Ok(count) => {
                        self.status = format!("Loaded {count} photos from {}.", self.assets.root().display());
                        Task::batch([self.request_cell_images(), self.scroll_to(0.0)])
                    }
                    Err(e) => {
                        error!("manifest rejected: {e}");
                        self.status = format!("Manifest rejected: {e}");
                        Task::none()
                    }
                }
            }
            Message::ManifestLoaded(Err(e)) => {
                error!("{e}");
                self.status = e;
                Task::none()
            }
            Message::FilterCategory(category) => {
                let query = self.query.clone();
                self.apply_filter(category, &query)
            }
            Message::QueryChanged(query) => {
                self.query = query;
                let category = self.library.category().map(str::to_string);
                let query = self.query.clone();
                self.apply_filter(category, &query)
            }
            Message::Scrolled(viewport) => {
                self.scroll_offset = viewport.absolute_offset().y;
                self.viewport_height = viewport.bounds().height;
                self.sentinel.observe(
                    self.scroll_offset,
                    self.viewport_height,
                    viewport.content_bounds().height,
                );
                self.poll_sentinel()
            }
            Message::Resized(size) => {
                self.window = size;
                self.library.set_viewport_width(ui::grid::grid_width(size.width));
                Task::none()
            }
            Message::SentinelTick => {
                // Content may still not fill the viewport after a growth
                self.sentinel.rearm();
                self.sentinel.observe(
                    self.scroll_offset,
                    self.viewport_height,
                    self.library.content_height() + ui::grid::PADDING * 2.0,
                );
                self.poll_sentinel()
            }
            Message::GrowthRendered => {
                self.library.settle();
                Task::none()
            }
            Message::CellImageSettled(id, image) => {
                if image == ImageState::Degraded {
                    debug!("no usable image for `{id}`");
                }
                self.cell_images.insert(id, image);
                Task::none()
            }
            Message::Prefetched(count) => {
                debug!("prefetch warmed {count} images");
                Task::none()
            }
            Message::CellPressed(original_index) => {
                self.focused = Some(original_index);
                self.open_preview(original_index)
            }
            Message::Key(key) => self.handle_key(key),
            Message::PreviewSettled(token, images) => {
                let outcomes = viewer::outcomes(&images);
                if self.viewer.complete_open(token, &outcomes).is_some() {
                    self.preview_images = images;
                    debug!("{:?}", self.library.view_state(&self.viewer));
                }
                Task::none()
            }
            Message::ClosePreview => self.close_preview(),
        }
    }

    fn apply_filter(&mut self, category: Option<String>, query: &str) -> Task<Message> {
        // Original indices are about to change meaning; drop any open or in-flight preview
        self.viewer.close(|_| false);
        self.preview_images.clear();

        self.library.set_filter(category, query);

        let layout = self.library.layout();
        if self.focused.is_some_and(|index| layout.rendered_position(index).is_none()) {
            self.focused = None;
        }

        self.sentinel.rearm();
        Task::batch([self.request_cell_images(), self.scroll_to(0.0)])
    }

    /// Feed pending sentinel events to the loader
    fn poll_sentinel(&mut self) -> Task<Message> {
        let mut tasks = Vec::new();

        while let Some(event) = self.sentinel.poll() {
            let Some(growth) = self.library.on_sentinel(event, Instant::now()) else {
                continue;
            };

            let candidates = self.library.prefetch_candidates(growth.prefetch.clone());
            let loader = self.assets.clone();
            tasks.push(self.request_cell_images());
            tasks.push(Task::perform(assets::probe::prefetch(loader, candidates), Message::Prefetched));
            tasks.push(Task::done(Message::GrowthRendered));
        }

        Task::batch(tasks)
    }

    /// Start walking the fallback chain for every visible cell not seen yet
    fn request_cell_images(&mut self) -> Task<Message> {
        let mut tasks = Vec::new();

        for entry in self.library.layout().entries() {
            if self.cell_images.contains_key(&entry.item.id) {
                continue;
            }
            self.cell_images.insert(entry.item.id.clone(), ImageState::Pending);

            let id = entry.item.id.clone();
            let chain = FallbackChain::new(self.library.cell_candidates(&entry.item));
            let loader = self.assets.clone();
            tasks.push(Task::perform(
                async move {
                    let image = loader.settle(chain).await;
                    (id, image)
                },
                |(id, image)| Message::CellImageSettled(id, image),
            ));
        }

        Task::batch(tasks)
    }

    fn open_preview(&mut self, original_index: usize) -> Task<Message> {
        let Some(item) = self.library.item(original_index).cloned() else {
            return Task::none();
        };

        let ticket = self
            .viewer
            .begin_open(original_index, &item, self.scroll_offset, self.focused);
        let loader = self.assets.clone();

        Task::perform(
            async move {
                let images = viewer::load_sources(&loader, &ticket.sources).await;
                (ticket.token, images)
            },
            |(token, images)| Message::PreviewSettled(token, images),
        )
    }

    fn close_preview(&mut self) -> Task<Message> {
        let layout = self.library.layout();
        let Some(restore) = self
            .viewer
            .close(|index| layout.rendered_position(*index).is_some())
        else {
            return Task::none();
        };

        self.preview_images.clear();
        if restore.focus.is_some() {
            self.focused = restore.focus;
        }
        self.scroll_to(restore.scroll_offset)
    }

    fn handle_key(&mut self, key: GalleryKey) -> Task<Message> {
        let route = route_key(key, self.viewer.is_open(), self.focused.is_some());
        if route.is_handled() {
            debug!("{key:?} -> {route:?}");
        }

        match route {
            KeyRoute::ClosePreview => self.close_preview(),
            KeyRoute::Move(direction) => self.move_focus(direction),
            KeyRoute::Activate => match self.focused {
                Some(index) => self.open_preview(index),
                None => Task::none(),
            },
            KeyRoute::FocusFirst => {
                self.focused = self.library.layout().get(0).map(|entry| entry.original_index);
                self.scroll_to(0.0)
            }
            KeyRoute::Ignore => Task::none(),
        }
    }

    fn move_focus(&mut self, direction: Direction) -> Task<Message> {
        let layout = self.library.layout();
        let Some(current) = self.focused.and_then(|index| layout.rendered_position(index)) else {
            return Task::none();
        };
        let Some(next) = self.library.navigate(current, direction) else {
            return Task::none();
        };
        let (Some(entry), Some(rect)) = (layout.get(next), self.library.cells().get(next).copied()) else {
            return Task::none();
        };

        self.focused = Some(entry.original_index);

        // Keep the focused cell on screen
        let top = rect.y + ui::grid::PADDING;
        if top < self.scroll_offset || rect.bottom() + ui::grid::PADDING > self.scroll_offset + self.viewport_height {
            return self.scroll_to((top - ui::grid::PADDING).max(0.0));
        }
        Task::none()
    }

    fn scroll_to(&mut self, y: f32) -> Task<Message> {
        self.scroll_offset = y;
        scrollable::scroll_to(ui::grid::grid_scroll_id(), AbsoluteOffset { x: 0.0, y })
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let content = column![
            ui::grid::header(&self.library, &self.query, &self.status),
            ui::grid::grid(&self.library, &self.cell_images, self.focused),
        ];

        let preview = self
            .viewer
            .active_index()
            .filter(|_| self.viewer.is_open())
            .and_then(|index| self.library.item(index));

        match preview {
            Some(item) => stack![
                content,
                ui::preview::view(item, &self.preview_images, self.viewer.aspect_ratio(), self.window),
            ]
            .into(),
            None => content.into(),
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions = vec![
            keyboard::on_key_press(map_key),
            window::resize_events().map(|(_id, size)| Message::Resized(size)),
        ];

        if self.sentinel.is_visible() && self.library.has_more() {
            let every = self.library.config().debounce().max(Duration::from_millis(16));
            subscriptions.push(time::every(every).map(|_| Message::SentinelTick));
        }

        Subscription::batch(subscriptions)
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn map_key(key: Key, _modifiers: keyboard::Modifiers) -> Option<Message> {
    let key = match key {
        Key::Named(Named::Escape) => GalleryKey::Escape,
        Key::Named(Named::ArrowUp) => GalleryKey::ArrowUp,
        Key::Named(Named::ArrowDown) => GalleryKey::ArrowDown,
        Key::Named(Named::ArrowLeft) => GalleryKey::ArrowLeft,
        Key::Named(Named::ArrowRight) => GalleryKey::ArrowRight,
        Key::Named(Named::Enter) => GalleryKey::Enter,
        Key::Named(Named::Space) => GalleryKey::Space,
        Key::Named(Named::Tab) => GalleryKey::Tab,
        _ => return None,
    };
    Some(Message::Key(key))
}

/// Read the manifest without blocking the UI
async fn read_manifest(path: PathBuf) -> Result<String, String> {
    info!("reading manifest {}", path.display());
    tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| GalleryError::Io { path, source }.to_string())
}

fn main() -> iced::Result {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info,wgpu_core=error,wgpu_hal=error,iced_wgpu=warn"),
    )
    .init();

    let args = Args::parse();

    iced::application(PhotoGallery::title, PhotoGallery::update, PhotoGallery::view)
        .subscription(PhotoGallery::subscription)
        .theme(PhotoGallery::theme)
        .window_size(INITIAL_WINDOW)
        .centered()
        .run_with(move || PhotoGallery::new(args))
}
