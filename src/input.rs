//! Input routing: raw page events in, [`Action`]s out.
//!
//! The router only reads the document. It decides what an event means and
//! hands back an action; the page applies it. Apart from the pending drag
//! start it keeps no state of its own.
//!
//! ## Keyboard
//!
//! | Key | While viewer open | Otherwise |
//! |-----|-------------------|-----------|
//! | Escape | close viewer | close collections, then navbar menu |
//! | ArrowRight / ArrowLeft | next / prev | nothing |
//! | Enter / Space on a gallery item | open at item | open at item |
//!
//! ## Clicks
//!
//! Lightbox controls win over everything else, so a control click never
//! also counts as a backdrop click. The backdrop closes the viewer only when
//! it is the click target itself; clicks inside the stage do nothing.
//! While the viewer is closed the whole surface ignores clicks.
//!
//! ## Swipes
//!
//! A pointer-down inside the stage records the start position. The matching
//! pointer-up navigates when the horizontal distance exceeds the threshold:
//! rightwards goes back, leftwards goes forward. Swipes only navigate an
//! open viewer.

use crate::collections::{BACK_CLASS, CARD_CLASS, CLOSE_CLASS, MEMBER_CLASS};
use crate::config::Selectors;
use crate::dom::{Document, NodeId, Selector};
use crate::gallery::GalleryIndex;
use crate::viewer::{Control, LightboxSurface, OPEN_CLASS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Escape,
    ArrowLeft,
    ArrowRight,
    Enter,
    Space,
    Other(String),
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Escape" | "Esc" => Key::Escape,
            "ArrowLeft" | "Left" => Key::ArrowLeft,
            "ArrowRight" | "Right" => Key::ArrowRight,
            "Enter" => Key::Enter,
            " " | "Space" | "Spacebar" => Key::Space,
            other => Key::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown { key: Key, target: Option<NodeId> },
    Click { target: NodeId },
    PointerDown { target: NodeId, x: f64 },
    PointerUp { x: f64 },
    PointerCancel,
    /// The value of a text field changed.
    Input { target: NodeId, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    OpenAt(i64),
    Next,
    Prev,
    Close,
    ToggleNav,
    CloseNav,
    Search(String),
    Upload,
    OpenCollections,
    CloseCollections,
    ShowCollection(String),
    BackToCollections,
    SelectMember(String),
}

/// Everything the router may look at while deciding.
#[derive(Debug, Clone, Copy)]
pub struct RouteContext<'a> {
    pub doc: &'a Document,
    pub selectors: &'a Selectors,
    pub gallery: &'a GalleryIndex,
    pub surface: Option<&'a LightboxSurface>,
    pub viewer_open: bool,
}

impl RouteContext<'_> {
    fn find(&self, selector: &Selector) -> Option<NodeId> {
        self.doc.find(selector)
    }

    fn is_open(&self, selector: &Selector) -> bool {
        self.find(selector)
            .is_some_and(|node| self.doc.has_class(node, OPEN_CLASS))
    }

    fn within(&self, selector: &Selector, target: NodeId) -> Option<NodeId> {
        self.doc.closest(target, selector)
    }
}

#[derive(Debug, Clone)]
pub struct InputRouter {
    swipe_threshold: f64,
    drag_start: Option<f64>,
}

impl InputRouter {
    pub fn new(swipe_threshold: f64) -> Self {
        Self {
            swipe_threshold,
            drag_start: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_start.is_some()
    }

    pub fn route(&mut self, ctx: &RouteContext<'_>, event: &InputEvent) -> Option<Action> {
        let action = match event {
            InputEvent::KeyDown { key, target } => self.route_key(ctx, key, *target),
            InputEvent::Click { target } => self.route_click(ctx, *target),
            InputEvent::PointerDown { target, x } => {
                if ctx.surface.is_some_and(|s| s.in_stage(ctx.doc, *target)) {
                    self.drag_start = Some(*x);
                }
                None
            }
            InputEvent::PointerUp { x } => self
                .finish_drag(*x)
                .filter(|_| ctx.viewer_open),
            InputEvent::PointerCancel => {
                self.drag_start = None;
                None
            }
            InputEvent::Input { target, value } => ctx
                .within(&ctx.selectors.search_input, *target)
                .map(|_| Action::Search(value.clone())),
        };
        tracing::trace!(?event, ?action, "routed");
        action
    }

    fn route_key(&self, ctx: &RouteContext<'_>, key: &Key, target: Option<NodeId>) -> Option<Action> {
        match key {
            Key::Escape if ctx.viewer_open => Some(Action::Close),
            Key::Escape if ctx.is_open(&ctx.selectors.collections_modal) => {
                Some(Action::CloseCollections)
            }
            Key::Escape if ctx.is_open(&ctx.selectors.nav_menu) => Some(Action::CloseNav),
            Key::ArrowRight if ctx.viewer_open => Some(Action::Next),
            Key::ArrowLeft if ctx.viewer_open => Some(Action::Prev),
            Key::Enter | Key::Space => {
                let position = ctx.gallery.position_for(ctx.doc, target?)?;
                Some(Action::OpenAt(position as i64))
            }
            _ => None,
        }
    }

    fn route_click(&self, ctx: &RouteContext<'_>, target: NodeId) -> Option<Action> {
        let doc = ctx.doc;
        let selectors = ctx.selectors;

        // The surface swallows its own clicks; its controls act only while open.
        if let Some(surface) = ctx.surface.filter(|s| doc.contains(s.root, target)) {
            if !ctx.viewer_open {
                return None;
            }
            if let Some(control) = surface.control_at(doc, target) {
                return Some(match control {
                    Control::Prev => Action::Prev,
                    Control::Next => Action::Next,
                    Control::Close => Action::Close,
                });
            }
            if target == surface.root {
                return Some(Action::Close);
            }
            return None;
        }

        if ctx.within(&selectors.nav_toggle, target).is_some() {
            return Some(Action::ToggleNav);
        }
        if ctx.within(&selectors.upload_button, target).is_some() {
            return Some(Action::Upload);
        }
        if ctx.within(&selectors.collections_button, target).is_some() {
            return Some(Action::OpenCollections);
        }
        if let Some(menu) = ctx.within(&selectors.nav_menu, target) {
            let link = Selector::Tag("a".to_string());
            if doc.has_class(menu, OPEN_CLASS) && doc.closest(target, &link).is_some() {
                return Some(Action::CloseNav);
            }
        }
        if let Some(modal) = ctx.within(&selectors.collections_modal, target) {
            return route_modal_click(doc, modal, target);
        }

        ctx.gallery
            .position_for(doc, target)
            .map(|position| Action::OpenAt(position as i64))
    }

    fn finish_drag(&mut self, x: f64) -> Option<Action> {
        let start = self.drag_start.take()?;
        let dx = x - start;
        if dx > self.swipe_threshold {
            Some(Action::Prev)
        } else if dx < -self.swipe_threshold {
            Some(Action::Next)
        } else {
            None
        }
    }
}

fn route_modal_click(doc: &Document, modal: NodeId, target: NodeId) -> Option<Action> {
    if target == modal {
        return Some(Action::CloseCollections);
    }
    let class = |name: &str| Selector::Class(name.to_string());
    if doc.closest(target, &class(CLOSE_CLASS)).is_some() {
        return Some(Action::CloseCollections);
    }
    if doc.closest(target, &class(BACK_CLASS)).is_some() {
        return Some(Action::BackToCollections);
    }
    if let Some(member) = doc.closest(target, &class(MEMBER_CLASS)) {
        return doc
            .attribute(member, "data-full")
            .map(|url| Action::SelectMember(url.to_string()));
    }
    if let Some(card) = doc.closest(target, &class(CARD_CLASS)) {
        return doc
            .attribute(card, "data-collection")
            .map(|name| Action::ShowCollection(name.to_string()));
    }
    None
}
