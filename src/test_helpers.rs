//! Shared test utilities for the gallery-lightbox test suite.
//!
//! Provides page builders, lookup helpers and content-directory fixtures
//! used by the unit tests of every module.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut doc = document_with(&urls(&["a.jpg", "b.jpg"]));
//! let items = gallery_items(&doc);
//! doc.set_style(items[0], "display", "none");
//!
//! let (mut page, fetches) = mounted_page(&["a.jpg", "b.jpg", "c.jpg"]);
//! page.open_at(0);
//! assert_eq!(fetches.len(), 2);
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::config::{GalleryConfig, PageConfig, Selectors};
use crate::dom::{Document, NodeId};
use crate::gallery::GalleryEntry;
use crate::layout::build_document;
use crate::page::Page;
use crate::preload::RecordingFetcher;
use crate::types::GalleryItem;

// =========================================================================
// Page builders
// =========================================================================

/// Build the stock page layout around `items`.
pub fn document_with(items: &[GalleryItem]) -> Document {
    build_document(items, &PageConfig::default(), &Selectors::default())
}

/// An item with optional full-size URL and alt text.
pub fn item(src: &str, large: Option<&str>, alt: Option<&str>) -> GalleryItem {
    GalleryItem {
        large: large.map(String::from),
        alt: alt.map(String::from),
        ..GalleryItem::new(src)
    }
}

/// Bare items, one per source URL.
pub fn urls(srcs: &[&str]) -> Vec<GalleryItem> {
    srcs.iter().map(|src| GalleryItem::new(src)).collect()
}

/// Mount a stock page over `srcs` with a recording fetcher.
pub fn mounted_page(srcs: &[&str]) -> (Page, RecordingFetcher) {
    mounted_page_with(&urls(srcs))
}

pub fn mounted_page_with(items: &[GalleryItem]) -> (Page, RecordingFetcher) {
    let config = GalleryConfig::default();
    let selectors = Selectors::default();
    let doc = build_document(items, &config.page, &selectors);
    let fetcher = RecordingFetcher::new();
    let page = Page::mount(doc, config, fetcher.clone()).unwrap();
    (page, fetcher)
}

// =========================================================================
// Lookup helpers
// =========================================================================

pub fn gallery_container(doc: &Document) -> NodeId {
    doc.find(&Selectors::default().gallery)
        .expect("gallery container")
}

/// Every item element in the gallery container, hidden or not.
pub fn gallery_items(doc: &Document) -> Vec<NodeId> {
    doc.select(gallery_container(doc), &Selectors::default().item)
}

pub fn full_urls(entries: &[GalleryEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.full_url.as_str()).collect()
}

/// Detached entries with full URLs `full-0.jpg`, `full-1.jpg`, ...
pub fn entries_for(n: usize) -> Vec<GalleryEntry> {
    let mut doc = Document::new();
    (0..n)
        .map(|i| GalleryEntry {
            thumbnail_url: format!("thumb-{i}.jpg"),
            full_url: format!("full-{i}.jpg"),
            caption: format!("Image {}", i + 1),
            title: None,
            collections: Vec::new(),
            element: doc.create_element("div"),
        })
        .collect()
}

// =========================================================================
// Content fixtures
// =========================================================================

/// Write `files` (relative path, contents) under a fresh temp directory.
pub fn content_dir(files: &[(&str, &str)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_files(tmp.path(), files);
    tmp
}

pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (path, contents) in files {
        let path = root.join(path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }
}

/// A small content directory: three numbered images, one thumbnail, one
/// caption sidecar and a config assigning a collection.
pub fn setup_content() -> TempDir {
    content_dir(&[
        ("001-dawn.jpg", "jpg"),
        ("002-harbor-lights.png", "png"),
        ("010-dusk.webp", "webp"),
        ("thumbs/001-dawn.jpg", "thumb"),
        ("001-dawn.txt", "First light over the bay\n"),
        ("notes.md", "not an image"),
        (
            "config.toml",
            "[page]\ntitle = \"Coast\"\n\n[collections]\nSea = [\"001-dawn.jpg\", \"010-dusk.webp\"]\n",
        ),
    ])
}
