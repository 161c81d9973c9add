//! In-memory page construction.
//!
//! Builds the same element structure that [`render`](crate::render) writes
//! as HTML, directly as a live [`Document`]. Every part the engine looks up
//! is created to match its configured selector, so a page built here always
//! mounts cleanly with the same configuration.
//!
//! ```text
//! body
//! ├── nav.navbar
//! │   ├── span.nav-brand
//! │   ├── button.nav-toggle            aria-expanded
//! │   └── div.nav-menu
//! │       ├── a                        href="#gallery"
//! │       ├── input.search-input
//! │       ├── button.collections-btn
//! │       └── button.upload-btn        (when upload is enabled)
//! ├── div#gallery
//! │   └── div.item > img               src, data-large, alt, data-title, data-collections
//! ├── div#lightbox                     aria-hidden
//! │   ├── div.lightbox-stage
//! │   │   ├── img.lightbox-image
//! │   │   └── div.lightbox-caption
//! │   ├── button.lightbox-prev
//! │   ├── button.lightbox-next
//! │   └── button.lightbox-close
//! └── div#collections-modal            aria-hidden
//!     └── div.collections-panel
//!         ├── h2.collections-title
//!         ├── button.collections-back
//!         ├── button.collections-close
//!         └── div.collections-grid
//! ```

use crate::collections::{BACK_CLASS, CLOSE_CLASS, PANEL_CLASS, TITLE_CLASS};
use crate::config::{PageConfig, Selectors};
use crate::dom::{Document, NodeId, Selector};
use crate::types::GalleryItem;

/// Create an element that matches `selector`, using `tag` unless the
/// selector names a tag itself.
pub fn element_for(doc: &mut Document, selector: &Selector, tag: &str) -> NodeId {
    match selector {
        Selector::Id(id) => {
            let node = doc.create_element(tag);
            doc.set_attribute(node, "id", id);
            node
        }
        Selector::Class(class) => {
            let node = doc.create_element(tag);
            doc.add_class(node, class);
            node
        }
        Selector::Tag(name) => doc.create_element(name),
    }
}

fn child(doc: &mut Document, parent: NodeId, selector: &Selector, tag: &str) -> NodeId {
    let node = element_for(doc, selector, tag);
    doc.append_child(parent, node);
    node
}

fn classed(doc: &mut Document, parent: NodeId, class: &str, tag: &str) -> NodeId {
    child(doc, parent, &Selector::Class(class.to_string()), tag)
}

/// Build the gallery item element for `item`: a wrapper holding one image.
pub fn item_element(doc: &mut Document, selectors: &Selectors, item: &GalleryItem) -> NodeId {
    let wrapper = element_for(doc, &selectors.item, "div");
    let img = doc.create_element("img");
    doc.set_attribute(img, "src", &item.src);
    doc.set_attribute(img, "loading", "lazy");
    if let Some(large) = &item.large {
        doc.set_attribute(img, "data-large", large);
    }
    if let Some(alt) = &item.alt {
        doc.set_attribute(img, "alt", alt);
    }
    if let Some(title) = &item.title {
        doc.set_attribute(img, "data-title", title);
    }
    if let Some(collections) = item.collections_attr() {
        doc.set_attribute(img, "data-collections", &collections);
    }
    doc.append_child(wrapper, img);
    wrapper
}

/// Build the full page for `items`.
pub fn build_document(items: &[GalleryItem], page: &PageConfig, selectors: &Selectors) -> Document {
    let mut doc = Document::new();
    let body = doc.body();

    let nav = classed(&mut doc, body, "navbar", "nav");
    let brand = classed(&mut doc, nav, "nav-brand", "span");
    doc.set_text(brand, &page.title);
    let toggle = child(&mut doc, nav, &selectors.nav_toggle, "button");
    doc.set_attribute(toggle, "aria-expanded", "false");
    doc.set_attribute(toggle, "aria-label", "Menu");
    let menu = child(&mut doc, nav, &selectors.nav_menu, "div");
    let link = doc.create_element("a");
    doc.set_attribute(link, "href", &format!("#{}", gallery_anchor(selectors)));
    doc.set_text(link, "Gallery");
    doc.append_child(menu, link);
    let search = child(&mut doc, menu, &selectors.search_input, "input");
    doc.set_attribute(search, "type", "search");
    doc.set_attribute(search, "placeholder", "Search");
    let collections = child(&mut doc, menu, &selectors.collections_button, "button");
    doc.set_text(collections, "Collections");
    if page.upload_enabled {
        let upload = child(&mut doc, menu, &selectors.upload_button, "button");
        doc.set_text(upload, "Upload");
    }

    let gallery = child(&mut doc, body, &selectors.gallery, "div");
    for item in items {
        let node = item_element(&mut doc, selectors, item);
        doc.append_child(gallery, node);
    }

    let lightbox = child(&mut doc, body, &selectors.lightbox, "div");
    doc.set_attribute(lightbox, "aria-hidden", "true");
    let stage = child(&mut doc, lightbox, &selectors.stage, "div");
    child(&mut doc, stage, &selectors.image, "img");
    child(&mut doc, stage, &selectors.caption, "div");
    for (selector, label) in [
        (&selectors.prev, "Previous"),
        (&selectors.next, "Next"),
        (&selectors.close, "Close"),
    ] {
        let button = child(&mut doc, lightbox, selector, "button");
        doc.set_attribute(button, "aria-label", label);
    }

    let modal = child(&mut doc, body, &selectors.collections_modal, "div");
    doc.set_attribute(modal, "aria-hidden", "true");
    let panel = classed(&mut doc, modal, PANEL_CLASS, "div");
    let title = classed(&mut doc, panel, TITLE_CLASS, "h2");
    doc.set_text(title, "Collections");
    let back = classed(&mut doc, panel, BACK_CLASS, "button");
    doc.set_text(back, "Back");
    doc.set_style(back, "display", "none");
    let close = classed(&mut doc, panel, CLOSE_CLASS, "button");
    doc.set_attribute(close, "aria-label", "Close");
    child(&mut doc, panel, &selectors.collections_grid, "div");

    doc
}

/// Fragment the navbar gallery link points at.
pub fn gallery_anchor(selectors: &Selectors) -> &str {
    match &selectors.gallery {
        Selector::Id(id) => id.as_str(),
        _ => "",
    }
}
