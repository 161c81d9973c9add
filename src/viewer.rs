//! Viewer state and the lightbox surface it drives.
//!
//! [`ViewerState`] is the whole state machine: a current index and an open
//! flag. Every transition wraps modulo the entry count, and every transition
//! on an empty gallery is a no-op:
//!
//! ```text
//!            open_at (N > 0)              next / prev / open_at
//!   Closed ──────────────────▶ Open ◀───────────────────────┐
//!     ▲                          │ └─────────────────────────┘
//!     └──────── close ───────────┘
//! ```
//!
//! [`LightboxSurface`] is the optional DOM panel. Pages without one still get
//! coherent state; only the DOM writes are skipped.

use crate::config::Selectors;
use crate::dom::{Document, NodeId};

/// Class toggled on the lightbox root (and the collections modal) while shown.
pub const OPEN_CLASS: &str = "open";

/// Resolve any integer index into `[0, len)`. `len` must be non-zero.
pub fn wrap_index(index: i64, len: usize) -> usize {
    let n = len as i64;
    (((index % n) + n) % n) as usize
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewerState {
    current: usize,
    open: bool,
}

impl ViewerState {
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Open at `index` (any integer). Returns the resolved index, or `None`
    /// when there is nothing to show.
    pub fn open_at(&mut self, index: i64, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        self.current = wrap_index(index, len);
        self.open = true;
        Some(self.current)
    }

    pub fn next(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        self.current = (self.current + 1) % len;
        Some(self.current)
    }

    pub fn prev(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        self.current = (self.current % len + len - 1) % len;
        Some(self.current)
    }

    /// Returns whether the viewer was open.
    pub fn close(&mut self) -> bool {
        std::mem::replace(&mut self.open, false)
    }

    /// Point at `position` without opening or closing.
    pub fn retarget(&mut self, position: usize) {
        self.current = position;
    }

    /// Keep `current` inside a rebuilt list of `len` entries.
    pub fn fit(&mut self, len: usize) {
        self.current = match len {
            0 => 0,
            n => self.current.min(n - 1),
        };
    }
}

/// The lightbox panel: a backdrop root holding the image stage and controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightboxSurface {
    pub root: NodeId,
    pub stage: Option<NodeId>,
    pub image: Option<NodeId>,
    pub caption: Option<NodeId>,
    pub prev: Option<NodeId>,
    pub next: Option<NodeId>,
    pub close: Option<NodeId>,
}

impl LightboxSurface {
    /// Find the lightbox root and its parts. Missing parts are tolerated;
    /// a missing root means there is no surface at all.
    pub fn locate(doc: &Document, selectors: &Selectors) -> Option<Self> {
        let root = doc.find(&selectors.lightbox)?;
        Some(Self {
            root,
            stage: doc.select_first(root, &selectors.stage),
            image: doc.select_first(root, &selectors.image),
            caption: doc.select_first(root, &selectors.caption),
            prev: doc.select_first(root, &selectors.prev),
            next: doc.select_first(root, &selectors.next),
            close: doc.select_first(root, &selectors.close),
        })
    }

    pub fn is_shown(&self, doc: &Document) -> bool {
        doc.has_class(self.root, OPEN_CLASS)
    }

    /// Reveal the panel and lock page scrolling.
    pub fn show(&self, doc: &mut Document) {
        doc.add_class(self.root, OPEN_CLASS);
        doc.set_attribute(self.root, "aria-hidden", "false");
        let body = doc.body();
        doc.set_style(body, "overflow", "hidden");
    }

    /// Hide the panel and restore page scrolling.
    pub fn hide(&self, doc: &mut Document) {
        doc.set_class(self.root, OPEN_CLASS, false);
        doc.set_attribute(self.root, "aria-hidden", "true");
        let body = doc.body();
        doc.remove_style(body, "overflow");
    }

    /// First half of a display update: hide the current image.
    pub fn fade_out(&self, doc: &mut Document) {
        if let Some(image) = self.image {
            doc.set_style(image, "opacity", "0");
        }
    }

    /// Second half of a display update: swap source and caption, then reveal.
    pub fn present(&self, doc: &mut Document, url: &str, caption: &str) {
        if let Some(image) = self.image {
            doc.set_attribute(image, "src", url);
            doc.set_attribute(image, "alt", caption);
            doc.set_style(image, "opacity", "1");
        }
        if let Some(node) = self.caption {
            doc.set_text(node, caption);
        }
    }

    /// Whether `target` is one of the controls or inside one.
    pub fn control_at(&self, doc: &Document, target: NodeId) -> Option<Control> {
        let hit = |part: Option<NodeId>| part.is_some_and(|p| doc.contains(p, target));
        if hit(self.prev) {
            Some(Control::Prev)
        } else if hit(self.next) {
            Some(Control::Next)
        } else if hit(self.close) {
            Some(Control::Close)
        } else {
            None
        }
    }

    pub fn in_stage(&self, doc: &Document, target: NodeId) -> bool {
        self.stage.is_some_and(|stage| doc.contains(stage, target))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Prev,
    Next,
    Close,
}
