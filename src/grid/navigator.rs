/// Keyboard navigation over the rendered grid
///
/// Masonry columns have no real rows, so Up/Down pick the nearest cell
/// by geometry instead of by index. Left/Right simply step through the
/// rendered order.

use super::layout::CellRect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Keys the gallery reacts to, independent of the windowing toolkit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryKey {
    Escape,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Enter,
    Space,
    Tab,
}

/// What a key press should do in the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRoute {
    ClosePreview,
    Move(Direction),
    /// Open the preview for the focused cell
    Activate,
    /// Focus enters the grid at its first cell
    FocusFirst,
    /// Not ours; let the default behaviour happen
    Ignore,
}

impl KeyRoute {
    /// Handled keys suppress the default (scrolling) behaviour
    pub fn is_handled(self) -> bool {
        self != KeyRoute::Ignore
    }
}

/// Route a key press.
///
/// Escape only matters while the preview is open; movement and
/// activation only while it is closed and focus is inside the grid.
pub fn route_key(key: GalleryKey, preview_open: bool, grid_focused: bool) -> KeyRoute {
    if preview_open {
        return match key {
            GalleryKey::Escape => KeyRoute::ClosePreview,
            _ => KeyRoute::Ignore,
        };
    }

    if !grid_focused {
        return match key {
            GalleryKey::Tab => KeyRoute::FocusFirst,
            _ => KeyRoute::Ignore,
        };
    }

    match key {
        GalleryKey::ArrowUp => KeyRoute::Move(Direction::Up),
        GalleryKey::ArrowDown => KeyRoute::Move(Direction::Down),
        GalleryKey::ArrowLeft => KeyRoute::Move(Direction::Left),
        GalleryKey::ArrowRight => KeyRoute::Move(Direction::Right),
        GalleryKey::Enter | GalleryKey::Space => KeyRoute::Activate,
        GalleryKey::Escape | GalleryKey::Tab => KeyRoute::Ignore,
    }
}

/// Rendered index focus should move to, or None to stay put.
///
/// `margin` pushes the search line just past the current edge so that
/// cells sharing the edge are not picked.
pub fn navigate(cells: &[CellRect], current: usize, direction: Direction, margin: f32) -> Option<usize> {
    let origin = cells.get(current)?;

    match direction {
        Direction::Left => current.checked_sub(1),
        Direction::Right => (current + 1 < cells.len()).then_some(current + 1),
        Direction::Down => {
            let target = origin.bottom() + margin;
            nearest(cells, current, origin, target, |top| top >= target)
        }
        Direction::Up => {
            let target = origin.y - margin;
            nearest(cells, current, origin, target, |top| top <= target)
        }
    }
}

/// Candidate minimizing vertical gap to `target` plus horizontal offset
fn nearest(
    cells: &[CellRect],
    current: usize,
    origin: &CellRect,
    target: f32,
    accepts: impl Fn(f32) -> bool,
) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;

    for (index, cell) in cells.iter().enumerate() {
        if index == current || !accepts(cell.y) {
            continue;
        }

        let distance = (cell.y - target).abs() + (cell.x - origin.x).abs();
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((index, distance));
        }
    }

    best.map(|(index, _)| index)
}
