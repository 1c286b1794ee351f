/// User interface components
///
/// - `grid.rs` - header, category chips and the masonry grid
/// - `preview.rs` - the modal preview dialog

pub mod grid;
pub mod preview;

use iced::Color;

/// Placeholder color for cells without a loaded image
const FALLBACK_ACCENT: Color = Color {
    r: 0.22,
    g: 0.22,
    b: 0.25,
    a: 1.0,
};

/// Parse a `#rrggbb` / `#rgb` accent color, falling back to a neutral gray
pub fn accent_color(hex: Option<&str>) -> Color {
    hex.and_then(parse_hex).unwrap_or(FALLBACK_ACCENT)
}

fn parse_hex(hex: &str) -> Option<Color> {
    let hex = hex.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();

    let (r, g, b) = match hex.len() {
        6 => (channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?),
        3 => {
            let r = channel(&hex[0..1])?;
            let g = channel(&hex[1..2])?;
            let b = channel(&hex[2..3])?;
            (r * 17, g * 17, b * 17)
        }
        _ => return None,
    };

    Some(Color::from_rgb8(r, g, b))
}
