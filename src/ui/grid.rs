/// Header and masonry grid
///
/// The grid is drawn as one fixed-width column per layout column, each
/// cell sized exactly as `grid::layout::measure_cells` computed it, so
/// keyboard navigation sees the same geometry the user does.
use iced::widget::{button, column, container, image, row, scrollable, text, text_input, Column, Row, Space};
use iced::{Alignment, Border, Color, ContentFit, Element, Length};
use std::collections::HashMap;

use super::accent_color;
use crate::assets::ImageState;
use crate::grid::layout::{self, CellRect};
use crate::state::data::PhotoItem;
use crate::state::library::Library;
use crate::Message;

/// Outer padding of the grid (px)
pub const PADDING: f32 = 16.0;
/// Room kept free for the vertical scrollbar (px)
const SCROLLBAR_ALLOWANCE: f32 = 14.0;
/// Opacity of a cell whose every candidate failed
const DEGRADED_ALPHA: f32 = 0.35;

pub fn grid_scroll_id() -> scrollable::Id {
    scrollable::Id::new("gallery-grid")
}

/// Width the cells can use inside a window of `window_width`
pub fn grid_width(window_width: f32) -> f32 {
    (window_width - PADDING * 2.0 - SCROLLBAR_ALLOWANCE).max(1.0)
}

/// Title bar, search box and category chips
pub fn header<'a>(library: &'a Library, query: &'a str, status: &'a str) -> Element<'a, Message> {
    let title_bar = row![
        text("Photo Gallery").size(28),
        Space::with_width(Length::Fill),
        text_input("Search photos…", query)
            .on_input(Message::QueryChanged)
            .padding(8)
            .width(Length::Fixed(260.0)),
        button("Open Manifest")
            .on_press(Message::OpenManifest)
            .padding(8),
    ]
    .spacing(12)
    .align_y(Alignment::Center);

    let mut chips = Row::new()
        .spacing(8)
        .push(chip("All".to_string(), None, library.category().is_none()));

    for category in library.categories() {
        let selected = library.category() == Some(category.slug.as_str());
        let label = format!("{} ({})", category.label, category.count);
        chips = chips.push(chip(label, Some(category.slug), selected));
    }

    column![title_bar, chips, text(status).size(14)]
        .spacing(10)
        .padding(PADDING)
        .into()
}

fn chip<'a>(label: String, slug: Option<String>, selected: bool) -> Element<'a, Message> {
    let style = if selected { button::primary } else { button::secondary };

    button(text(label).size(14))
        .padding([4, 10])
        .style(style)
        .on_press(Message::FilterCategory(slug))
        .into()
}

/// The scrollable masonry grid plus its loading footer
pub fn grid<'a>(
    library: &'a Library,
    images: &'a HashMap<String, ImageState>,
    focused: Option<usize>,
) -> Element<'a, Message> {
    let gap = library.config().grid_gap;
    let cells = library.cells();
    let column_width = layout::column_width(library.viewport_width(), library.column_count(), gap);

    let mut columns = Row::new().spacing(gap);
    let mut rendered = 0;

    for entries in library.layout().columns() {
        let mut stack = Column::new().spacing(gap).width(Length::Fixed(column_width));

        for entry in entries {
            if let Some(rect) = cells.get(rendered) {
                stack = stack.push(cell(
                    &entry.item,
                    entry.original_index,
                    *rect,
                    images.get(&entry.item.id),
                    focused == Some(entry.original_index),
                ));
            }
            rendered += 1;
        }

        columns = columns.push(stack);
    }

    let footer = if library.total() == 0 {
        text("No photos to show")
    } else if library.has_more() {
        text(format!("Showing {} of {} photos", library.loaded_count(), library.total()))
    } else {
        text(format!("All {} photos", library.total()))
    };

    scrollable(
        column![columns, footer.size(14)]
            .spacing(24)
            .padding(PADDING)
            .align_x(Alignment::Center),
    )
    .id(grid_scroll_id())
    .on_scroll(Message::Scrolled)
    .width(Length::Fill)
    .height(Length::Fill)
    .into()
}

fn cell<'a>(
    item: &'a PhotoItem,
    original_index: usize,
    rect: CellRect,
    state: Option<&'a ImageState>,
    focused: bool,
) -> Element<'a, Message> {
    let accent = accent_color(item.accent_color.as_deref());

    let content: Element<'a, Message> = match state {
        Some(ImageState::Ready { path, .. }) => image(image::Handle::from_path(path))
            .width(Length::Fill)
            .height(Length::Fill)
            .content_fit(ContentFit::Cover)
            .into(),
        Some(ImageState::Degraded) => container(text(&item.title).size(14))
            .padding(8)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme| container::Style {
                text_color: Some(Color { a: DEGRADED_ALPHA, ..Color::WHITE }),
                ..Default::default()
            })
            .into(),
        // Still walking the fallback chain
        _ => Space::new(Length::Fill, Length::Fill).into(),
    };
    let fill = fill_alpha(state);

    button(content)
        .padding(0)
        .width(Length::Fixed(rect.width))
        .height(Length::Fixed(rect.height))
        .on_press(Message::CellPressed(original_index))
        .style(move |_theme, status| cell_style(accent, fill, focused, status))
        .into()
}

/// Flat accent-colored block with a label
pub fn placeholder<'a>(label: &'a str, accent: Color, alpha: f32) -> Element<'a, Message> {
    container(text(label).size(14))
        .padding(8)
        .width(Length::Fill)
        .height(Length::Fill)
        .style(move |_theme| container::Style {
            background: Some(Color { a: alpha, ..accent }.into()),
            text_color: Some(Color { a: alpha, ..Color::WHITE }),
            ..Default::default()
        })
        .into()
}

/// Cells whose every candidate failed are drawn faded
fn fill_alpha(state: Option<&ImageState>) -> f32 {
    match state {
        Some(ImageState::Degraded) => DEGRADED_ALPHA,
        _ => 1.0,
    }
}

fn cell_style(accent: Color, fill: f32, focused: bool, status: button::Status) -> button::Style {
    let hovered = matches!(status, button::Status::Hovered);

    let (border_color, border_width) = if focused {
        (Color::WHITE, 3.0)
    } else if hovered {
        (Color { a: 0.6, ..Color::WHITE }, 1.0)
    } else {
        (Color::TRANSPARENT, 0.0)
    };

    button::Style {
        background: Some(Color { a: accent.a * fill, ..accent }.into()),
        text_color: Color::WHITE,
        border: Border {
            color: border_color,
            width: border_width,
            radius: 6.0.into(),
        },
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iced::Background;
    use std::path::PathBuf;

    #[test]
    fn test_degraded_cell_is_faded() {
        let accent = Color::from_rgb(0.2, 0.4, 0.6);

        let degraded = cell_style(accent, fill_alpha(Some(&ImageState::Degraded)), false, button::Status::Active);
        assert_eq!(
            degraded.background,
            Some(Background::Color(Color { a: DEGRADED_ALPHA, ..accent }))
        );

        let pending = cell_style(accent, fill_alpha(Some(&ImageState::Pending)), false, button::Status::Active);
        assert_eq!(pending.background, Some(Background::Color(accent)));
    }

    #[test]
    fn test_ready_and_unknown_cells_are_opaque() {
        let ready = ImageState::Ready {
            path: PathBuf::from("variants/a_thumb-sm.jpg"),
            dimensions: crate::assets::Dimensions::new(4, 3),
        };

        assert_eq!(fill_alpha(Some(&ready)), 1.0);
        assert_eq!(fill_alpha(None), 1.0);
    }
}
