/// Preview dialog logic
///
/// The coordinator is toolkit independent; `ui::preview` draws it.

pub mod coordinator;

pub use coordinator::{load_sources, outcomes, ViewerCoordinator};
