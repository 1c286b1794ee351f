/// Item normalization
///
/// Turns raw manifest entries into immutable `PhotoItem`s. Missing ids
/// are never synthesized: a manifest without `id`, `title` or
/// `primarySrc` is the collaborator's bug and is reported as such.

use chrono::Datelike;
use log::debug;

use super::data::{PhotoItem, RawItem};
use crate::error::{GalleryError, Result};

/// Parse a manifest (a JSON array of raw items)
pub fn parse_manifest(json: &str) -> Result<Vec<RawItem>> {
    let items: Vec<RawItem> = serde_json::from_str(json)?;
    Ok(items)
}

/// Normalize every raw item, failing on the first one missing a required field
pub fn normalize(raw_items: Vec<RawItem>) -> Result<Vec<PhotoItem>> {
    let current_year = chrono::Local::now().year();

    raw_items
        .into_iter()
        .enumerate()
        .map(|(index, raw)| normalize_item(index, raw, current_year))
        .collect()
}

fn normalize_item(index: usize, raw: RawItem, current_year: i32) -> Result<PhotoItem> {
    let id = required(raw.id, index, "id")?;
    let title = required(raw.title, index, "title")?;
    let primary_src = required(raw.primary_src, index, "primarySrc")?;

    // Slugs are derived per label so positions stay aligned
    let category_labels: Vec<String> = raw
        .category_labels
        .iter()
        .map(|label| label.trim())
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect();
    let category_slugs = category_labels.iter().map(|label| slugify(label)).collect();

    debug!("normalized item #{index} `{id}`");

    Ok(PhotoItem {
        alt_text: non_empty(raw.alt_text).unwrap_or_else(|| title.clone()),
        id,
        title,
        description: raw.description.unwrap_or_default(),
        category_labels,
        category_slugs,
        year: raw.year.unwrap_or(current_year),
        primary_src,
        secondary_src: non_empty(raw.secondary_src),
        thumb_src: non_empty(raw.thumb_src),
        accent_color: non_empty(raw.accent_color),
    })
}

fn required(value: Option<String>, index: usize, field: &'static str) -> Result<String> {
    non_empty(value).ok_or(GalleryError::MissingField { index, field })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Lowercase, keep `[a-z0-9]`, whitespace and `-`, turn whitespace runs
/// into `-` and collapse repeated `-`.
///
/// "Black & White" -> "black-white", "Film -- 35mm" -> "film-35mm"
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut last_was_hyphen = false;

    for ch in input.to_lowercase().chars() {
        let mapped = if ch.is_ascii_alphanumeric() {
            ch
        } else if ch.is_whitespace() || ch == '-' {
            '-'
        } else {
            continue;
        };

        if mapped == '-' {
            if last_was_hyphen {
                continue;
            }
            last_was_hyphen = true;
        } else {
            last_was_hyphen = false;
        }
        slug.push(mapped);
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str) -> RawItem {
        RawItem {
            id: Some(id.into()),
            title: Some(format!("Title {id}")),
            primary_src: Some(format!("{id}.jpg")),
            ..RawItem::default()
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Street Photography"), "street-photography");
        assert_eq!(slugify("Black & White"), "black-white");
        assert_eq!(slugify("Film -- 35mm"), "film-35mm");
        assert_eq!(slugify("already-slugged"), "already-slugged");
        assert_eq!(slugify("Café Nights"), "caf-nights");
        assert_eq!(slugify("snake_case"), "snakecase");
    }

    #[test]
    fn test_labels_and_slugs_stay_aligned() {
        let mut item = raw("a");
        item.category_labels = vec![
            "  Travel ".into(),
            "".into(),
            "   ".into(),
            "Black & White".into(),
        ];

        let items = normalize(vec![item]).unwrap();

        assert_eq!(items[0].category_labels, vec!["Travel", "Black & White"]);
        assert_eq!(items[0].category_slugs, vec!["travel", "black-white"]);
    }

    #[test]
    fn test_defaults() {
        let items = normalize(vec![raw("a")]).unwrap();
        let item = &items[0];

        assert_eq!(item.description, "");
        assert_eq!(item.year, chrono::Local::now().year());
        assert!(item.category_labels.is_empty());
        assert_eq!(item.alt_text, "Title a");
        assert_eq!(item.secondary_src, None);
    }

    #[test]
    fn test_missing_required_field_fails_fast() {
        let mut broken = raw("b");
        broken.primary_src = None;

        let err = normalize(vec![raw("a"), broken, RawItem::default()]).unwrap_err();
        match err {
            GalleryError::MissingField { index, field } => {
                assert_eq!(index, 1);
                assert_eq!(field, "primarySrc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_manifest() {
        let raw_items = parse_manifest("[]").unwrap();
        assert!(normalize(raw_items).unwrap().is_empty());
        assert!(parse_manifest("{\"not\": \"an array\"}").is_err());
    }
}
