//! Shared types used across scan, rendering and the in-memory page.
//!
//! A [`GalleryItem`] is one image as the page markup carries it. The scan
//! stage produces them, `render` turns them into HTML and `layout` turns them
//! into a live [`Document`](crate::dom::Document). They are serialized into
//! `manifest.json` between CLI commands.

use serde::{Deserialize, Serialize};

/// One gallery image as it appears in the page markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryItem {
    /// Sort key from the `NNN-` filename prefix (`u32::MAX` when absent).
    pub number: u32,
    /// Source filename, used to match `[collections]` entries.
    pub filename: String,
    /// Rendered image source (thumbnail).
    pub src: String,
    /// Full-size image URL, when it differs from `src`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large: Option<String>,
    /// Alt text, shown as the viewer caption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    /// Display title derived from the filename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Collections this image belongs to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collections: Vec<String>,
}

impl GalleryItem {
    /// A bare item with only a source, as hand-written markup often has.
    pub fn new(src: &str) -> Self {
        Self {
            number: u32::MAX,
            filename: src.rsplit('/').next().unwrap_or(src).to_string(),
            src: src.to_string(),
            large: None,
            alt: None,
            title: None,
            collections: Vec::new(),
        }
    }

    /// The `data-collections` attribute value.
    pub fn collections_attr(&self) -> Option<String> {
        (!self.collections.is_empty()).then(|| self.collections.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_item_takes_filename_from_path() {
        let item = GalleryItem::new("photos/thumbs/001-dawn.jpg");
        assert_eq!(item.filename, "001-dawn.jpg");
        assert_eq!(item.large, None);
    }

    #[test]
    fn collections_attr_joins_with_commas() {
        let mut item = GalleryItem::new("a.jpg");
        assert_eq!(item.collections_attr(), None);
        item.collections = vec!["Sea".into(), "Sky".into()];
        assert_eq!(item.collections_attr().as_deref(), Some("Sea,Sky"));
    }

    #[test]
    fn optional_fields_skipped_in_json() {
        let json = serde_json::to_string(&GalleryItem::new("a.jpg")).unwrap();
        assert!(!json.contains("large"));
        assert!(!json.contains("collections"));
        let back: GalleryItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, GalleryItem::new("a.jpg"));
    }
}
