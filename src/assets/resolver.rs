/// Asset candidate resolution
///
/// Generated assets are not named consistently upstream, so for one
/// image we build every plausible path in priority order and let the
/// consumer walk the list until one loads.
///
/// Layout of an asset root:
/// - `variants/<stem>-<tier>.<ext>` or `variants/<stem>_<tier>.<ext>`
/// - `variants/<stem>.<ext>` (untiered, original resolution)
/// - `originals/<stem>.<ext>`
/// - `<stem>.<ext>` (flat legacy root)
///
/// where `<stem>` is `<base>_<variant>` or `<base>-<variant>`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::state::data::PhotoItem;

/// Extensions in the order they are tried
pub const EXTENSIONS: [&str; 4] = ["webp", "jpg", "jpeg", "png"];

pub const VARIANTS_DIR: &str = "variants";
pub const ORIGINALS_DIR: &str = "originals";

/// Which of the item's images is wanted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Primary,
    Secondary,
    Thumb,
}

impl Variant {
    /// File name token
    pub fn token(self) -> &'static str {
        match self {
            Variant::Primary => "primary",
            Variant::Secondary => "secondary",
            Variant::Thumb => "thumb",
        }
    }
}

/// Pre-generated size tiers
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeTier {
    /// ~640px
    #[serde(rename = "sm")]
    Small,
    /// ~1200px
    #[serde(rename = "md")]
    Medium,
    /// ~1920px
    #[serde(rename = "lg")]
    Large,
    /// Untiered, full resolution
    #[serde(rename = "original")]
    Original,
}

impl SizeTier {
    /// File name suffix, None for the untiered original
    pub fn suffix(self) -> Option<&'static str> {
        match self {
            SizeTier::Small => Some("sm"),
            SizeTier::Medium => Some("md"),
            SizeTier::Large => Some("lg"),
            SizeTier::Original => None,
        }
    }
}

/// Build the ordered, deduplicated candidate list for one image.
///
/// Nesting (outermost first): tier, extension, id spelling, stem
/// separator, directory form. The first occurrence of a path wins.
pub fn resolve(id: &str, variant: Variant, sizes: &[SizeTier]) -> Vec<String> {
    let spellings = id_spellings(id);
    let token = variant.token();

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    let mut push = |path: String| {
        if seen.insert(path.clone()) {
            candidates.push(path);
        }
    };

    for &tier in sizes {
        for ext in EXTENSIONS {
            for base in &spellings {
                for stem in [format!("{base}_{token}"), format!("{base}-{token}")] {
                    match tier.suffix() {
                        Some(suffix) => {
                            push(format!("{VARIANTS_DIR}/{stem}-{suffix}.{ext}"));
                            push(format!("{VARIANTS_DIR}/{stem}_{suffix}.{ext}"));
                        }
                        None => {
                            push(format!("{VARIANTS_DIR}/{stem}.{ext}"));
                            push(format!("{ORIGINALS_DIR}/{stem}.{ext}"));
                            push(format!("{stem}.{ext}"));
                        }
                    }
                }
            }
        }
    }

    candidates
}

/// Candidates for an item, with the item's own source for that variant
/// appended as the last resort
pub fn resolve_item(item: &PhotoItem, variant: Variant, sizes: &[SizeTier]) -> Vec<String> {
    let mut candidates = resolve(&item.id, variant, sizes);

    let explicit = match variant {
        Variant::Primary => Some(&item.primary_src),
        Variant::Secondary => item.secondary_src.as_ref(),
        Variant::Thumb => item.thumb_src.as_ref(),
    };

    if let Some(src) = explicit {
        if !candidates.contains(src) {
            candidates.push(src.clone());
        }
    }

    candidates
}

/// Slugified base name plus its hyphen/underscore respellings, unique
fn id_spellings(id: &str) -> Vec<String> {
    let base = basename(id);
    let mut spellings = vec![base.clone()];

    for spelling in [base.replace('-', "_"), base.replace('_', "-")] {
        if !spellings.contains(&spelling) {
            spellings.push(spelling);
        }
    }

    spellings
}

/// Like `slugify`, but underscores survive since they are part of the
/// upstream naming we need to match
fn basename(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    let mut pending_hyphen = false;

    for ch in id.trim().to_lowercase().chars() {
        if ch.is_whitespace() || ch == '-' {
            pending_hyphen = !out.is_empty();
            continue;
        }
        if !(ch.is_ascii_alphanumeric() || ch == '_') {
            continue;
        }
        if pending_hyphen {
            out.push('-');
            pending_hyphen = false;
        }
        out.push(ch);
    }

    out
}

/// Consumer side of a candidate list: bounded retry with ordered fallback.
///
/// The first candidate is tried first; each load failure advances to the
/// next one. Once the list is exhausted the image is degraded.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackChain {
    candidates: Vec<String>,
    cursor: usize,
}

impl FallbackChain {
    pub fn new(candidates: Vec<String>) -> Self {
        Self { candidates, cursor: 0 }
    }

    /// Candidate currently being tried
    pub fn current(&self) -> Option<&str> {
        self.candidates.get(self.cursor).map(String::as_str)
    }

    /// Record a load failure of the current candidate and move on
    pub fn advance(&mut self) -> Option<&str> {
        if self.cursor < self.candidates.len() {
            self.cursor += 1;
        }
        self.current()
    }

    /// Every candidate failed (or there were none)
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.candidates.len()
    }

    /// Number of candidates that have been given up on
    pub fn failures(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_candidate_is_preferred_tier() {
        let candidates = resolve("Harbour At Dusk", Variant::Primary, &[SizeTier::Large, SizeTier::Small]);

        assert_eq!(candidates[0], "variants/harbour-at-dusk_primary-lg.webp");
        assert_eq!(candidates[1], "variants/harbour-at-dusk_primary_lg.webp");
        assert_eq!(candidates[2], "variants/harbour-at-dusk-primary-lg.webp");
        assert!(candidates.contains(&"variants/harbour_at_dusk_primary-lg.jpg".to_string()));

        // Every large candidate comes before any small one
        let last_large = candidates.iter().rposition(|c| c.contains("lg.")).unwrap();
        let first_small = candidates.iter().position(|c| c.contains("sm.")).unwrap();
        assert!(last_large < first_small);
    }

    #[test]
    fn test_no_duplicates_and_deterministic() {
        let sizes = [SizeTier::Large, SizeTier::Medium, SizeTier::Small, SizeTier::Original];
        let a = resolve("img_0042-final", Variant::Thumb, &sizes);
        let b = resolve("img_0042-final", Variant::Thumb, &sizes);

        assert_eq!(a, b);
        let unique: HashSet<_> = a.iter().collect();
        assert_eq!(unique.len(), a.len());
    }

    #[test]
    fn test_candidate_counts() {
        // "a-b" and "a_b": two spellings, two stems each
        let sized = resolve("a-b", Variant::Primary, &[SizeTier::Medium]);
        assert_eq!(sized.len(), 4 * 2 * 2 * 2);

        let original = resolve("a-b", Variant::Primary, &[SizeTier::Original]);
        assert_eq!(original.len(), 4 * 2 * 2 * 3);
        assert_eq!(original[0], "variants/a-b_primary.webp");
        assert_eq!(original[1], "originals/a-b_primary.webp");
        assert_eq!(original[2], "a-b_primary.webp");

        // Repeating a tier adds nothing
        let repeated = resolve("a-b", Variant::Primary, &[SizeTier::Medium, SizeTier::Medium]);
        assert_eq!(repeated, sized);
    }

    #[test]
    fn test_id_spellings() {
        assert_eq!(id_spellings("plain"), vec!["plain"]);
        assert_eq!(id_spellings("Old Town_2"), vec!["old-town_2", "old_town_2", "old-town-2"]);
    }

    #[test]
    fn test_resolve_item_appends_explicit_source() {
        let item = PhotoItem {
            id: "pier".into(),
            title: "Pier".into(),
            description: String::new(),
            category_labels: vec![],
            category_slugs: vec![],
            year: 2020,
            primary_src: "legacy/pier.JPG".into(),
            secondary_src: None,
            thumb_src: None,
            alt_text: "Pier".into(),
            accent_color: None,
        };

        let primary = resolve_item(&item, Variant::Primary, &[SizeTier::Small]);
        assert_eq!(primary.last().map(String::as_str), Some("legacy/pier.JPG"));

        let secondary = resolve_item(&item, Variant::Secondary, &[SizeTier::Small]);
        assert_eq!(secondary, resolve("pier", Variant::Secondary, &[SizeTier::Small]));
    }

    #[test]
    fn test_fallback_chain_is_bounded() {
        let mut chain = FallbackChain::new(vec!["a.webp".into(), "a.jpg".into()]);

        assert_eq!(chain.current(), Some("a.webp"));
        assert_eq!(chain.advance(), Some("a.jpg"));
        assert!(!chain.is_exhausted());
        assert_eq!(chain.advance(), None);
        assert!(chain.is_exhausted());

        // Further failures do not wrap around
        assert_eq!(chain.advance(), None);
        assert_eq!(chain.failures(), 2);
    }

    #[test]
    fn test_empty_chain_is_exhausted() {
        let chain = FallbackChain::new(Vec::new());
        assert!(chain.is_exhausted());
        assert_eq!(chain.current(), None);
    }
}
