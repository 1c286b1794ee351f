/// Modal preview dialog
///
/// Shows the one or two images of an item side by side, all at the
/// shared aspect ratio the viewer coordinator settled on.
use iced::widget::{button, column, container, image, opaque, text, Row};
use iced::{Alignment, Border, Color, ContentFit, Element, Length, Size};

use super::{accent_color, grid::placeholder};
use crate::assets::ImageState;
use crate::state::data::PhotoItem;
use crate::Message;

const PANE_SPACING: f32 = 16.0;

/// Size of each image pane for `count` panes at `aspect_ratio` in `window`
pub fn pane_size(count: usize, aspect_ratio: f32, window: Size) -> Size {
    let count = count.max(1) as f32;
    let aspect_ratio = if aspect_ratio > 0.0 { aspect_ratio } else { 1.0 };

    let max_width = ((window.width * 0.85 - PANE_SPACING * (count - 1.0)) / count).max(1.0);
    let max_height = (window.height * 0.65).max(1.0);

    let mut width = max_width;
    let mut height = width / aspect_ratio;
    if height > max_height {
        height = max_height;
        width = height * aspect_ratio;
    }

    Size::new(width, height)
}

pub fn view<'a>(
    item: &'a PhotoItem,
    images: &'a [ImageState],
    aspect_ratio: f32,
    window: Size,
) -> Element<'a, Message> {
    let pane = pane_size(images.len(), aspect_ratio, window);
    let accent = accent_color(item.accent_color.as_deref());

    let panes: Vec<Element<'a, Message>> = images
        .iter()
        .map(|state| match state {
            ImageState::Ready { path, .. } => image(image::Handle::from_path(path))
                .width(Length::Fixed(pane.width))
                .height(Length::Fixed(pane.height))
                .content_fit(ContentFit::Cover)
                .into(),
            _ => container(placeholder("Image unavailable", accent, 0.35))
                .width(Length::Fixed(pane.width))
                .height(Length::Fixed(pane.height))
                .into(),
        })
        .collect();

    let details = if item.category_labels.is_empty() {
        item.year.to_string()
    } else {
        format!("{} · {}", item.year, item.category_labels.join(", "))
    };

    let dialog = column![
        Row::with_children(panes).spacing(PANE_SPACING),
        text(&item.title).size(22),
        text(details).size(14),
        text(&item.description).size(14),
        button("Close").on_press(Message::ClosePreview).padding([6, 14]),
    ]
    .spacing(12)
    .padding(20)
    .align_x(Alignment::Center);

    let dialog = container(dialog).style(|_theme| container::Style {
        background: Some(Color::from_rgb8(28, 28, 32).into()),
        border: Border {
            color: Color::from_rgba(1.0, 1.0, 1.0, 0.1),
            width: 1.0,
            radius: 10.0.into(),
        },
        ..Default::default()
    });

    opaque(
        container(dialog)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(Color::from_rgba(0.0, 0.0, 0.0, 0.8).into()),
                ..Default::default()
            }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pane_size_keeps_ratio() {
        let window = Size::new(1000.0, 1000.0);

        let single = pane_size(1, 1.5, window);
        assert!((single.width / single.height - 1.5).abs() < 1e-4);
        assert!(single.width <= 850.0 + 1e-3);

        // Tall images are bounded by the height limit
        let tall = pane_size(2, 0.5, window);
        assert!((tall.height - 650.0).abs() < 1e-3);
        assert!((tall.width - 325.0).abs() < 1e-3);
    }

    #[test]
    fn test_pane_size_degenerate_ratio() {
        let pane = pane_size(0, 0.0, Size::new(400.0, 400.0));
        assert_eq!(pane.width, pane.height);
    }
}
