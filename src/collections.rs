//! Collections modal.
//!
//! Gallery images can be tagged with one or more collection names through
//! `data-collections`. The modal lists every collection as a card (cover
//! thumbnail, name and photo count). Choosing a card lists its members;
//! choosing a member opens it in the viewer.
//!
//! Collections are derived from every item in the gallery container,
//! including items the search filter currently hides. Collection order is
//! the order of first appearance; member order is document order.

use crate::config::Selectors;
use crate::dom::{Document, NodeId, Selector};
use crate::gallery::{default_caption, non_blank, parse_collections};
use crate::viewer::OPEN_CLASS;

pub const PANEL_CLASS: &str = "collections-panel";
pub const TITLE_CLASS: &str = "collections-title";
pub const BACK_CLASS: &str = "collections-back";
pub const CLOSE_CLASS: &str = "collections-close";
pub const CARD_CLASS: &str = "collection-card";
pub const MEMBER_CLASS: &str = "collection-member";
pub const EMPTY_CLASS: &str = "collections-empty";

const MODAL_TITLE: &str = "Collections";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionMember {
    pub thumbnail_url: String,
    pub full_url: String,
    pub caption: String,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub name: String,
    pub members: Vec<CollectionMember>,
}

impl Collection {
    /// First member, used as the card thumbnail.
    pub fn cover(&self) -> Option<&CollectionMember> {
        self.members.first()
    }

    pub fn count_label(&self) -> String {
        match self.members.len() {
            1 => "1 photo".to_string(),
            n => format!("{n} photos"),
        }
    }
}

/// Group every tagged item in the gallery by collection.
///
/// Member captions fall back exactly like gallery captions: `"Image {n}"`
/// with `n` the item's position among listed entries. A hidden member takes
/// the position it would get if shown again.
pub fn build_collections(doc: &Document, selectors: &Selectors) -> Vec<Collection> {
    let Some(container) = doc.find(&selectors.gallery) else {
        return Vec::new();
    };
    let img = Selector::Tag("img".to_string());
    let mut collections: Vec<Collection> = Vec::new();
    let mut listed = 0;

    for item in doc.select(container, &selectors.item) {
        let Some(image) = doc.select_first(item, &img) else {
            continue;
        };
        let Some(src) = non_blank(doc, image, "src") else {
            continue;
        };
        let position = listed + 1;
        if !doc.is_hidden(item) && !doc.is_hidden(image) {
            listed = position;
        }
        let names = doc
            .attribute(image, "data-collections")
            .map(parse_collections)
            .unwrap_or_default();
        if names.is_empty() {
            continue;
        }
        let member = CollectionMember {
            thumbnail_url: src.to_string(),
            full_url: non_blank(doc, image, "data-large").unwrap_or(src).to_string(),
            caption: non_blank(doc, image, "alt")
                .map(String::from)
                .unwrap_or_else(|| default_caption(position)),
            title: non_blank(doc, image, "data-title").map(String::from),
        };
        for name in names {
            match collections.iter_mut().find(|c| c.name == name) {
                Some(collection) => collection.members.push(member.clone()),
                None => collections.push(Collection {
                    name,
                    members: vec![member.clone()],
                }),
            }
        }
    }

    collections
}

/// What the modal grid is currently listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalView {
    Closed,
    Cards,
    Members(String),
}

#[derive(Debug, Clone)]
pub struct CollectionsModal {
    root: NodeId,
    grid: Option<NodeId>,
    title: Option<NodeId>,
    back: Option<NodeId>,
    collections: Vec<Collection>,
    view: ModalView,
}

impl CollectionsModal {
    pub fn locate(doc: &Document, selectors: &Selectors) -> Option<Self> {
        let root = doc.find(&selectors.collections_modal)?;
        let class = |name: &str| Selector::Class(name.to_string());
        Some(Self {
            root,
            grid: doc.select_first(root, &selectors.collections_grid),
            title: doc.select_first(root, &class(TITLE_CLASS)),
            back: doc.select_first(root, &class(BACK_CLASS)),
            collections: Vec::new(),
            view: ModalView::Closed,
        })
    }

    pub fn is_open(&self, doc: &Document) -> bool {
        doc.has_class(self.root, OPEN_CLASS)
    }

    pub fn view(&self) -> &ModalView {
        &self.view
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    /// Show the modal listing `collections` as cards.
    pub fn open(&mut self, doc: &mut Document, collections: Vec<Collection>) {
        self.collections = collections;
        self.render_cards(doc);
        doc.add_class(self.root, OPEN_CLASS);
        doc.set_attribute(self.root, "aria-hidden", "false");
        tracing::debug!(collections = self.collections.len(), "collections opened");
    }

    /// Returns whether the modal was open.
    pub fn close(&mut self, doc: &mut Document) -> bool {
        let was_open = self.is_open(doc);
        doc.set_class(self.root, OPEN_CLASS, false);
        doc.set_attribute(self.root, "aria-hidden", "true");
        self.view = ModalView::Closed;
        was_open
    }

    /// List the members of `name`. Unknown names leave the grid unchanged.
    pub fn show_collection(&mut self, doc: &mut Document, name: &str) -> bool {
        let Some(collection) = self.collections.iter().find(|c| c.name == name).cloned() else {
            tracing::warn!(%name, "unknown collection");
            return false;
        };
        self.set_heading(doc, &collection.name, true);
        let Some(grid) = self.grid else {
            self.view = ModalView::Members(collection.name);
            return true;
        };
        doc.clear_children(grid);
        for member in &collection.members {
            let tile = doc.create_element("div");
            doc.add_class(tile, MEMBER_CLASS);
            doc.set_attribute(tile, "data-full", &member.full_url);
            doc.set_attribute(tile, "role", "button");
            let img = doc.create_element("img");
            doc.set_attribute(img, "src", &member.thumbnail_url);
            doc.set_attribute(img, "alt", &member.caption);
            if let Some(title) = &member.title {
                doc.set_attribute(tile, "title", title);
            }
            doc.append_child(tile, img);
            doc.append_child(grid, tile);
        }
        self.view = ModalView::Members(collection.name);
        true
    }

    pub fn back(&mut self, doc: &mut Document) {
        self.render_cards(doc);
    }

    fn render_cards(&mut self, doc: &mut Document) {
        self.set_heading(doc, MODAL_TITLE, false);
        self.view = ModalView::Cards;
        let Some(grid) = self.grid else {
            return;
        };
        doc.clear_children(grid);
        if self.collections.is_empty() {
            let empty = doc.create_element("p");
            doc.add_class(empty, EMPTY_CLASS);
            doc.set_text(empty, "No collections yet");
            doc.append_child(grid, empty);
            return;
        }
        for collection in &self.collections {
            let card = doc.create_element("div");
            doc.add_class(card, CARD_CLASS);
            doc.set_attribute(card, "data-collection", &collection.name);
            doc.set_attribute(card, "role", "button");
            if let Some(cover) = collection.cover() {
                let img = doc.create_element("img");
                doc.set_attribute(img, "src", &cover.thumbnail_url);
                doc.set_attribute(img, "alt", &collection.name);
                doc.append_child(card, img);
            }
            for (class, text) in [
                ("collection-name", collection.name.clone()),
                ("collection-count", collection.count_label()),
            ] {
                let span = doc.create_element("span");
                doc.add_class(span, class);
                doc.set_text(span, &text);
                doc.append_child(card, span);
            }
            doc.append_child(grid, card);
        }
    }

    fn set_heading(&self, doc: &mut Document, text: &str, show_back: bool) {
        if let Some(title) = self.title {
            doc.set_text(title, text);
        }
        if let Some(back) = self.back {
            if show_back {
                doc.remove_style(back, "display");
            } else {
                doc.set_style(back, "display", "none");
            }
        }
    }
}
