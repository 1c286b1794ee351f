/// Column distribution for the masonry grid
///
/// The grid is drawn as `column_count` vertical stacks filled one after
/// another. To make the result read left-to-right, top-to-bottom, the
/// visible prefix is reordered column-major: column `c` receives the
/// items at `c, c + C, c + 2C, …`. No heights are measured.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::state::data::PhotoItem;

/// Viewport widths where the column count changes
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Breakpoints {
    /// Below this: 1 column
    pub single_column_below: f32,
    /// Below this: 2 columns, otherwise 3
    pub two_columns_below: f32,
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self {
            single_column_below: 600.0,
            two_columns_below: 900.0,
        }
    }
}

/// Range of the decorative cell aspect ratio (width / height)
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct AspectBand {
    pub min: f32,
    pub max: f32,
}

impl AspectBand {
    /// Narrowest ratio a cell may get; keeps heights finite
    pub const MIN_RATIO: f32 = 0.1;
}

impl Default for AspectBand {
    fn default() -> Self {
        Self { min: 0.85, max: 1.35 }
    }
}

/// Column count for a viewport width
pub fn column_count_for_width(width: f32, breakpoints: &Breakpoints) -> usize {
    if width < breakpoints.single_column_below {
        1
    } else if width < breakpoints.two_columns_below {
        2
    } else {
        3
    }
}

/// One rendered cell
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutEntry {
    pub item: Arc<PhotoItem>,
    /// Position in the filtered item list
    pub original_index: usize,
}

/// The visible prefix in rendered (column-major) order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnLayout {
    entries: Vec<LayoutEntry>,
    column_count: usize,
}

impl ColumnLayout {
    pub fn entries(&self) -> &[LayoutEntry] {
        &self.entries
    }

    pub fn get(&self, rendered_index: usize) -> Option<&LayoutEntry> {
        self.entries.get(rendered_index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// Rendered position of an item, if it is visible
    pub fn rendered_position(&self, original_index: usize) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.original_index == original_index)
    }

    pub fn original_indices(&self) -> Vec<usize> {
        self.entries.iter().map(|entry| entry.original_index).collect()
    }

    /// Contiguous slices, one per column, left to right
    pub fn columns(&self) -> Vec<&[LayoutEntry]> {
        let n = self.entries.len();
        let mut columns = Vec::with_capacity(self.column_count);
        let mut start = 0;

        for column in 0..self.column_count {
            let len = column_len(n, self.column_count, column);
            columns.push(&self.entries[start..start + len]);
            start += len;
        }

        columns
    }
}

/// Column-major permutation of `0..count`
pub fn column_major_order(count: usize, column_count: usize) -> Vec<usize> {
    let column_count = column_count.max(1);
    let mut order = Vec::with_capacity(count);

    for column in 0..column_count {
        order.extend((column..count).step_by(column_count));
    }

    order
}

/// Reorder the first `loaded_count` items for `column_count` columns
pub fn distribute(items: &[Arc<PhotoItem>], loaded_count: usize, column_count: usize) -> ColumnLayout {
    let count = loaded_count.min(items.len());
    let column_count = column_count.max(1);

    let entries = column_major_order(count, column_count)
        .into_iter()
        .map(|original_index| LayoutEntry {
            item: Arc::clone(&items[original_index]),
            original_index,
        })
        .collect();

    ColumnLayout { entries, column_count }
}

/// Number of entries column `column` receives out of `count`
fn column_len(count: usize, column_count: usize, column: usize) -> usize {
    if column >= count {
        return 0;
    }
    (count - column + column_count - 1) / column_count
}

/// Deterministic cell aspect ratio derived from the id.
///
/// Base-31 polynomial hash over UTF-16 code units (wrapping u32),
/// reduced with `% 1000 / 1000` and mapped into `band`. Purely
/// decorative: it does not know the real image ratio.
pub fn aspect_hint(id: &str, band: &AspectBand) -> f32 {
    let hash = id
        .encode_utf16()
        .fold(0u32, |hash, unit| hash.wrapping_mul(31).wrapping_add(unit as u32));
    let t = (hash % 1000) as f32 / 1000.0;
    band.min + t * (band.max - band.min)
}

/// On-screen rectangle of a rendered cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl CellRect {
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Width of one column for the available width
pub fn column_width(width: f32, column_count: usize, gap: f32) -> f32 {
    let column_count = column_count.max(1) as f32;
    ((width - gap * (column_count - 1.0)) / column_count).max(1.0)
}

/// Geometry of every cell, in rendered order, as the grid draws it
pub fn measure_cells(layout: &ColumnLayout, width: f32, gap: f32, band: &AspectBand) -> Vec<CellRect> {
    let column_width = column_width(width, layout.column_count(), gap);
    let mut cells = Vec::with_capacity(layout.len());

    for (column, entries) in layout.columns().into_iter().enumerate() {
        let x = column as f32 * (column_width + gap);
        let mut y = 0.0;

        for entry in entries {
            let height = column_width / aspect_hint(&entry.item.id, band);
            cells.push(CellRect {
                x,
                y,
                width: column_width,
                height,
            });
            y += height + gap;
        }
    }

    cells
}

/// Height of the tallest column
pub fn content_height(cells: &[CellRect]) -> f32 {
    cells.iter().map(CellRect::bottom).fold(0.0, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(count: usize) -> Vec<Arc<PhotoItem>> {
        (0..count)
            .map(|i| {
                Arc::new(PhotoItem {
                    id: format!("photo-{i}"),
                    title: format!("Photo {i}"),
                    description: String::new(),
                    category_labels: vec![],
                    category_slugs: vec![],
                    year: 2022,
                    primary_src: format!("photo-{i}.jpg"),
                    secondary_src: None,
                    thumb_src: None,
                    alt_text: String::new(),
                    accent_color: None,
                })
            })
            .collect()
    }

    #[test]
    fn test_seven_items_three_columns() {
        let layout = distribute(&items(7), 7, 3);
        assert_eq!(layout.original_indices(), vec![0, 3, 6, 1, 4, 2, 5]);

        let column_sizes: Vec<usize> = layout.columns().iter().map(|c| c.len()).collect();
        assert_eq!(column_sizes, vec![3, 2, 2]);
    }

    #[test]
    fn test_distribution_is_a_permutation() {
        for count in 0..40 {
            for columns in 1..=4 {
                let mut order = column_major_order(count, columns);
                order.sort_unstable();
                assert_eq!(order, (0..count).collect::<Vec<_>>(), "n={count} c={columns}");
            }
        }
    }

    #[test]
    fn test_only_loaded_prefix_is_distributed() {
        let all = items(10);
        let layout = distribute(&all, 4, 2);
        assert_eq!(layout.original_indices(), vec![0, 2, 1, 3]);

        // loaded_count beyond the item count is clamped
        assert_eq!(distribute(&all, 50, 1).len(), 10);
        assert!(distribute(&[], 20, 3).is_empty());
    }

    #[test]
    fn test_fewer_items_than_columns() {
        let layout = distribute(&items(2), 2, 3);
        let column_sizes: Vec<usize> = layout.columns().iter().map(|c| c.len()).collect();
        assert_eq!(column_sizes, vec![1, 1, 0]);
    }

    #[test]
    fn test_column_count_ladder() {
        let bp = Breakpoints::default();
        assert_eq!(column_count_for_width(320.0, &bp), 1);
        assert_eq!(column_count_for_width(599.9, &bp), 1);
        assert_eq!(column_count_for_width(600.0, &bp), 2);
        assert_eq!(column_count_for_width(899.0, &bp), 2);
        assert_eq!(column_count_for_width(900.0, &bp), 3);
        assert_eq!(column_count_for_width(2560.0, &bp), 3);
    }

    #[test]
    fn test_aspect_hint_is_pure_and_banded() {
        let band = AspectBand::default();

        // 'a' = 97 -> 0.097 of the band
        assert!((aspect_hint("a", &band) - (0.85 + 0.097 * 0.5)).abs() < 1e-6);

        for i in 0..200 {
            let id = format!("frame-{i}");
            let hint = aspect_hint(&id, &band);
            assert_eq!(hint, aspect_hint(&id, &band));
            assert!(hint >= band.min && hint < band.max);
        }
    }

    #[test]
    fn test_measure_cells_stacks_columns() {
        let layout = distribute(&items(5), 5, 2);
        let band = AspectBand::default();
        let cells = measure_cells(&layout, 412.0, 12.0, &band);

        assert_eq!(cells.len(), 5);
        // Rendered order [0, 2, 4 | 1, 3]
        assert_eq!(cells[0].x, 0.0);
        assert_eq!(cells[0].y, 0.0);
        assert_eq!(cells[0].width, 200.0);
        assert!((cells[1].y - (cells[0].bottom() + 12.0)).abs() < 1e-3);
        assert_eq!(cells[3].x, 212.0);
        assert_eq!(cells[3].y, 0.0);

        let tallest = content_height(&cells);
        assert!(cells.iter().all(|c| c.bottom() <= tallest));
    }
}
