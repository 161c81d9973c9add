//! Gallery index: the ordered list of viewable images on the page.
//!
//! The index scans the gallery container for item elements and turns each
//! one into a [`GalleryEntry`]. The list is rebuilt wholesale, never patched:
//! on mount, on [`refresh`](GalleryIndex::rebuild), and after the container
//! has been quiet for the debounce delay following a mutation. A rebuild
//! that finds its container detached from the page stops observing it and
//! looks the container up again.
//!
//! ## Entry resolution
//!
//! For every item in document order:
//!
//! - no `img` inside → skipped
//! - item or image hidden with `display: none` → skipped (filtered out)
//! - image without a usable `src` → skipped
//! - `full_url`: `data-large`, falling back to `src`
//! - `caption`: `alt`, falling back to `"Image {n}"` where `n` is the
//!   1-based position of the entry in the list
//! - `collections`: `data-collections`, comma-separated
//!
//! ## Binding
//!
//! The index owns the map from bound item element to entry position. It is
//! replaced on every rebuild, so an item is bound to exactly one position at
//! a time. The input router asks the index which position a click landed on.

use crate::config::Selectors;
use crate::dom::{Document, NodeId, ObserverId, Selector};
use crate::scheduler::{Scheduler, TaskHandle};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryEntry {
    pub thumbnail_url: String,
    pub full_url: String,
    pub caption: String,
    pub title: Option<String>,
    pub collections: Vec<String>,
    /// The item element this entry was scanned from.
    pub element: NodeId,
}

/// Split a `data-collections` value into trimmed, non-empty names.
pub fn parse_collections(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

/// Caption for an entry without `alt`, from its 1-based list position.
pub fn default_caption(position: usize) -> String {
    format!("Image {position}")
}

pub(crate) fn non_blank<'a>(doc: &'a Document, node: NodeId, name: &str) -> Option<&'a str> {
    doc.attribute(node, name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Scan `container` for items matching `item` and produce their entries.
pub fn scan(doc: &Document, container: NodeId, item: &Selector) -> Vec<GalleryEntry> {
    let img = Selector::Tag("img".to_string());
    let mut entries = Vec::new();

    for element in doc.select(container, item) {
        if doc.is_hidden(element) {
            continue;
        }
        let Some(image) = doc.select_first(element, &img) else {
            tracing::trace!(?element, "gallery item without image skipped");
            continue;
        };
        if doc.is_hidden(image) {
            continue;
        }
        let Some(src) = non_blank(doc, image, "src") else {
            tracing::warn!(?element, "gallery image without src skipped");
            continue;
        };

        let position = entries.len() + 1;
        let thumbnail_url = src.to_string();
        let full_url = non_blank(doc, image, "data-large")
            .map(String::from)
            .unwrap_or_else(|| thumbnail_url.clone());
        let caption = non_blank(doc, image, "alt")
            .map(String::from)
            .unwrap_or_else(|| default_caption(position));

        entries.push(GalleryEntry {
            thumbnail_url,
            full_url,
            caption,
            title: non_blank(doc, image, "data-title").map(String::from),
            collections: doc
                .attribute(image, "data-collections")
                .map(parse_collections)
                .unwrap_or_default(),
            element,
        });
    }

    entries
}

#[derive(Debug)]
pub struct GalleryIndex {
    container_selector: Selector,
    item: Selector,
    container: Option<NodeId>,
    observer: Option<ObserverId>,
    entries: Vec<GalleryEntry>,
    bound: HashMap<NodeId, usize>,
    pending: Option<TaskHandle>,
    rebuilds: u64,
}

impl GalleryIndex {
    /// Locate the gallery container, start observing it and build the
    /// initial entry list. Without a container the index stays empty.
    pub fn attach(doc: &mut Document, selectors: &Selectors) -> Self {
        let mut index = Self {
            container_selector: selectors.gallery.clone(),
            item: selectors.item.clone(),
            container: None,
            observer: None,
            entries: Vec::new(),
            bound: HashMap::new(),
            pending: None,
            rebuilds: 0,
        };
        index.rebuild(doc);
        index
    }

    pub fn entries(&self) -> &[GalleryEntry] {
        &self.entries
    }

    pub fn get(&self, position: usize) -> Option<&GalleryEntry> {
        self.entries.get(position)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn container(&self) -> Option<NodeId> {
        self.container
    }

    /// How many times the entry list has been rebuilt.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    pub fn has_pending_rescan(&self) -> bool {
        self.pending.is_some()
    }

    /// Rescan the container now, replacing the entry list and the bound set.
    pub fn rebuild(&mut self, doc: &mut Document) {
        // A container taken out of the page is dropped and looked up again.
        if let Some(stale) = self.container.filter(|&c| !doc.is_attached(c)) {
            tracing::debug!(?stale, "gallery container detached");
            if let Some(observer) = self.observer.take() {
                doc.disconnect(observer);
            }
            self.container = None;
        }
        if self.container.is_none() {
            self.container = doc.find(&self.container_selector);
            if let Some(container) = self.container {
                self.observer = Some(doc.observe(container));
            }
        }
        let Some(container) = self.container else {
            tracing::debug!(selector = %self.container_selector, "no gallery container");
            return;
        };

        let entries = scan(doc, container, &self.item);
        let bound: HashMap<NodeId, usize> = entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (entry.element, position))
            .collect();

        for entry in &entries {
            if doc.attribute(entry.element, "tabindex").is_none() {
                doc.set_attribute(entry.element, "tabindex", "0");
            }
            if doc.attribute(entry.element, "role").is_none() {
                doc.set_attribute(entry.element, "role", "button");
            }
        }
        // The scan reflects every queued mutation, including the marks above.
        if let Some(observer) = self.observer {
            doc.take_records(observer);
        }

        self.entries = entries;
        self.bound = bound;
        self.rebuilds += 1;
        tracing::debug!(entries = self.entries.len(), rebuild = self.rebuilds, "gallery indexed");
    }

    /// Drain mutation records. Returns whether the container changed.
    pub fn take_mutations(&mut self, doc: &mut Document) -> bool {
        match self.observer {
            Some(observer) => !doc.take_records(observer).is_empty(),
            None => false,
        }
    }

    /// Schedule `task` to rebuild after `delay`, replacing any rebuild that
    /// is already waiting.
    pub fn schedule_rescan<T>(&mut self, scheduler: &mut Scheduler<T>, delay: Duration, task: T) {
        if let Some(pending) = self.pending.take() {
            scheduler.cancel(pending);
        }
        self.pending = Some(scheduler.schedule(delay, task));
    }

    /// Forget the waiting rebuild, cancelling it if it has not run yet.
    pub fn clear_pending<T>(&mut self, scheduler: &mut Scheduler<T>) {
        if let Some(pending) = self.pending.take() {
            scheduler.cancel(pending);
        }
    }

    /// The position of the bound item containing `target`, if any.
    pub fn position_for(&self, doc: &Document, target: NodeId) -> Option<usize> {
        let item = doc.closest(target, &self.item)?;
        self.position_of_element(item)
    }

    /// The position `element` is bound to after the last rebuild.
    pub fn position_of_element(&self, element: NodeId) -> Option<usize> {
        self.bound.get(&element).copied()
    }

    pub fn position_of_full_url(&self, url: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.full_url == url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use crate::types::GalleryItem;

    fn selectors() -> Selectors {
        Selectors::default()
    }

    // =========================================================================
    // Entry resolution
    // =========================================================================

    #[test]
    fn full_url_falls_back_to_src() {
        let mut doc = document_with(&[GalleryItem::new("thumb.jpg")]);
        let index = GalleryIndex::attach(&mut doc, &selectors());
        assert_eq!(index.entries()[0].full_url, "thumb.jpg");
        assert_eq!(index.entries()[0].thumbnail_url, "thumb.jpg");
    }

    #[test]
    fn large_attribute_wins() {
        let mut doc = document_with(&[item("t/a.jpg", Some("a.jpg"), None)]);
        let index = GalleryIndex::attach(&mut doc, &selectors());
        assert_eq!(index.entries()[0].full_url, "a.jpg");
        assert_eq!(index.entries()[0].thumbnail_url, "t/a.jpg");
    }

    #[test]
    fn caption_from_alt_or_position() {
        let mut doc = document_with(&[
            item("a.jpg", None, Some("Dawn")),
            item("b.jpg", None, None),
            item("c.jpg", None, Some("   ")),
        ]);
        let index = GalleryIndex::attach(&mut doc, &selectors());
        let captions: Vec<&str> = index.entries().iter().map(|e| e.caption.as_str()).collect();
        assert_eq!(captions, vec!["Dawn", "Image 2", "Image 3"]);
    }

    #[test]
    fn items_without_image_are_skipped() {
        let mut doc = document_with(&[GalleryItem::new("a.jpg"), GalleryItem::new("b.jpg")]);
        let gallery = gallery_container(&doc);
        let empty = doc.create_element("div");
        doc.add_class(empty, "item");
        doc.append_child(gallery, empty);

        let index = GalleryIndex::attach(&mut doc, &selectors());
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn hidden_items_are_skipped() {
        let mut doc = document_with(&urls(&["a.jpg", "b.jpg", "c.jpg"]));
        let items = gallery_items(&doc);
        doc.set_style(items[1], "display", "none");

        let index = GalleryIndex::attach(&mut doc, &selectors());
        assert_eq!(full_urls(index.entries()), vec!["a.jpg", "c.jpg"]);
    }

    #[test]
    fn collections_and_title_read_from_image() {
        let mut tagged = GalleryItem::new("a.jpg");
        tagged.collections = vec!["Sea".into(), "Sky".into()];
        tagged.title = Some("Dawn".into());
        let mut doc = document_with(&[tagged]);
        let index = GalleryIndex::attach(&mut doc, &selectors());
        assert_eq!(index.entries()[0].collections, vec!["Sea", "Sky"]);
        assert_eq!(index.entries()[0].title.as_deref(), Some("Dawn"));
    }

    #[test]
    fn parse_collections_trims_and_drops_empty() {
        assert_eq!(parse_collections(" Sea , ,Sky,"), vec!["Sea", "Sky"]);
        assert!(parse_collections("").is_empty());
    }

    #[test]
    fn missing_container_leaves_index_empty() {
        let mut doc = Document::new();
        let index = GalleryIndex::attach(&mut doc, &selectors());
        assert!(index.is_empty());
        assert_eq!(index.container(), None);
        assert_eq!(index.rebuilds(), 0);
    }

    #[test]
    fn replaced_container_is_found_again() {
        let mut doc = document_with(&urls(&["a.jpg", "b.jpg"]));
        let mut index = GalleryIndex::attach(&mut doc, &selectors());
        let old = gallery_container(&doc);
        let parent = doc.parent(old).unwrap();
        doc.remove(old);

        let fresh = doc.create_element("div");
        doc.set_attribute(fresh, "id", "gallery");
        let item = crate::layout::item_element(&mut doc, &selectors(), &GalleryItem::new("z.jpg"));
        doc.append_child(fresh, item);
        doc.append_child(parent, fresh);
        index.rebuild(&mut doc);

        assert_eq!(index.container(), Some(fresh));
        assert_eq!(full_urls(index.entries()), vec!["z.jpg"]);
        // The detached container is no longer observed.
        doc.clear_children(old);
        assert!(!index.take_mutations(&mut doc));
        doc.set_style(item, "display", "none");
        assert!(index.take_mutations(&mut doc));
    }

    // =========================================================================
    // Binding
    // =========================================================================

    #[test]
    fn click_inside_item_resolves_position() {
        let mut doc = document_with(&urls(&["a.jpg", "b.jpg"]));
        let index = GalleryIndex::attach(&mut doc, &selectors());
        let items = gallery_items(&doc);
        let img = doc.children(items[1])[0];
        assert_eq!(index.position_for(&doc, img), Some(1));
        assert_eq!(index.position_for(&doc, doc.body()), None);
    }

    #[test]
    fn bound_items_become_focusable_once() {
        let mut doc = document_with(&urls(&["a.jpg"]));
        let mut index = GalleryIndex::attach(&mut doc, &selectors());
        let item = gallery_items(&doc)[0];
        assert_eq!(doc.attribute(item, "tabindex"), Some("0"));
        assert_eq!(doc.attribute(item, "role"), Some("button"));
        // Binding marks do not count as container changes.
        assert!(!index.take_mutations(&mut doc));
    }

    #[test]
    fn rebuild_replaces_bound_positions() {
        let mut doc = document_with(&urls(&["a.jpg", "b.jpg", "c.jpg"]));
        let mut index = GalleryIndex::attach(&mut doc, &selectors());
        let items = gallery_items(&doc);
        doc.remove(items[0]);
        index.rebuild(&mut doc);

        assert_eq!(index.position_for(&doc, items[0]), None);
        assert_eq!(index.position_for(&doc, items[1]), Some(0));
        assert_eq!(index.position_for(&doc, items[2]), Some(1));
    }

    #[test]
    fn position_of_full_url_is_exact() {
        let mut doc = document_with(&urls(&["a.jpg", "b.jpg"]));
        let index = GalleryIndex::attach(&mut doc, &selectors());
        assert_eq!(index.position_of_full_url("b.jpg"), Some(1));
        assert_eq!(index.position_of_full_url("B.jpg"), None);
    }

    // =========================================================================
    // Debounced re-scan
    // =========================================================================

    #[test]
    fn mutations_are_reported_once() {
        let mut doc = document_with(&urls(&["a.jpg"]));
        let mut index = GalleryIndex::attach(&mut doc, &selectors());
        let item = gallery_items(&doc)[0];
        doc.set_style(item, "display", "none");
        assert!(index.take_mutations(&mut doc));
        assert!(!index.take_mutations(&mut doc));
    }

    #[test]
    fn schedule_rescan_replaces_pending_task() {
        let mut doc = document_with(&urls(&["a.jpg"]));
        let mut index = GalleryIndex::attach(&mut doc, &selectors());
        let mut scheduler = Scheduler::new();
        for _ in 0..5 {
            index.schedule_rescan(&mut scheduler, Duration::from_millis(100), ());
        }
        assert_eq!(scheduler.len(), 1);
        assert!(index.has_pending_rescan());
        index.clear_pending(&mut scheduler);
        assert!(scheduler.is_empty());
    }
}
