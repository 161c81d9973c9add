//! Default search filter.
//!
//! Hides gallery items whose caption, title and collections do not contain
//! the query, ignoring case. Hidden items drop out of the gallery index on
//! its next re-scan, so viewer navigation only visits what the filter shows.

use crate::config::Selectors;
use crate::dom::{Document, NodeId, Selector};

fn haystack(doc: &Document, item: NodeId) -> String {
    let img = Selector::Tag("img".to_string());
    let Some(image) = doc.select_first(item, &img) else {
        return String::new();
    };
    ["alt", "data-title", "data-collections"]
        .iter()
        .filter_map(|name| doc.attribute(image, name))
        .collect::<Vec<_>>()
        .join("\n")
        .to_lowercase()
}

/// Show the items matching `query` and hide the rest. An empty (or blank)
/// query shows everything. Returns the number of items left visible.
pub fn filter_items(doc: &mut Document, selectors: &Selectors, query: &str) -> usize {
    let Some(container) = doc.find(&selectors.gallery) else {
        return 0;
    };
    let needle = query.trim().to_lowercase();
    let mut visible = 0;
    for item in doc.select(container, &selectors.item) {
        let show = needle.is_empty() || haystack(doc, item).contains(&needle);
        if show {
            doc.remove_style(item, "display");
            visible += 1;
        } else {
            doc.set_style(item, "display", "none");
        }
    }
    tracing::debug!(query = %needle, visible, "search filter applied");
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use crate::types::GalleryItem;

    fn tagged(src: &str, alt: &str, collections: &[&str]) -> GalleryItem {
        GalleryItem {
            alt: Some(alt.to_string()),
            collections: collections.iter().map(|c| c.to_string()).collect(),
            ..GalleryItem::new(src)
        }
    }

    fn visible(doc: &Document) -> Vec<bool> {
        gallery_items(doc).iter().map(|&n| !doc.is_hidden(n)).collect()
    }

    #[test]
    fn matches_caption_case_insensitively() {
        let mut doc = document_with(&[
            tagged("a.jpg", "Harbor at Dawn", &[]),
            tagged("b.jpg", "Dusk", &[]),
        ]);
        assert_eq!(filter_items(&mut doc, &Selectors::default(), "dawn"), 1);
        assert_eq!(visible(&doc), vec![true, false]);
    }

    #[test]
    fn matches_collections() {
        let mut doc = document_with(&[
            tagged("a.jpg", "One", &["Sea"]),
            tagged("b.jpg", "Two", &["Mountains"]),
        ]);
        filter_items(&mut doc, &Selectors::default(), "SEA");
        assert_eq!(visible(&doc), vec![true, false]);
    }

    #[test]
    fn empty_query_shows_everything() {
        let mut doc = document_with(&[tagged("a.jpg", "One", &[]), tagged("b.jpg", "Two", &[])]);
        let selectors = Selectors::default();
        filter_items(&mut doc, &selectors, "zzz");
        assert_eq!(visible(&doc), vec![false, false]);
        assert_eq!(filter_items(&mut doc, &selectors, "  "), 2);
        assert_eq!(visible(&doc), vec![true, true]);
    }

    #[test]
    fn items_without_alt_only_match_empty_query() {
        let mut doc = document_with(&urls(&["a.jpg"]));
        assert_eq!(filter_items(&mut doc, &Selectors::default(), "a"), 0);
    }
}
