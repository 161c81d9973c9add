//! Collapsible navbar menu.

use crate::config::Selectors;
use crate::dom::{Document, NodeId};
use crate::viewer::OPEN_CLASS;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Navbar {
    toggle: Option<NodeId>,
    menu: Option<NodeId>,
}

impl Navbar {
    pub fn locate(doc: &Document, selectors: &Selectors) -> Self {
        Self {
            toggle: doc.find(&selectors.nav_toggle),
            menu: doc.find(&selectors.nav_menu),
        }
    }

    pub fn is_open(&self, doc: &Document) -> bool {
        self.menu.is_some_and(|menu| doc.has_class(menu, OPEN_CLASS))
    }

    /// Flip the menu. Returns whether it is now open.
    pub fn toggle(&self, doc: &mut Document) -> bool {
        let Some(menu) = self.menu else {
            return false;
        };
        let open = doc.toggle_class(menu, OPEN_CLASS);
        self.sync_toggle(doc, open);
        open
    }

    /// Close the menu. Returns whether it was open.
    pub fn close(&self, doc: &mut Document) -> bool {
        if !self.is_open(doc) {
            return false;
        }
        if let Some(menu) = self.menu {
            doc.set_class(menu, OPEN_CLASS, false);
        }
        self.sync_toggle(doc, false);
        true
    }

    fn sync_toggle(&self, doc: &mut Document, open: bool) {
        if let Some(toggle) = self.toggle {
            doc.set_attribute(toggle, "aria-expanded", if open { "true" } else { "false" });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[test]
    fn toggle_flips_menu_and_aria() {
        let mut doc = document_with(&[]);
        let selectors = Selectors::default();
        let nav = Navbar::locate(&doc, &selectors);
        let toggle = doc.find(&selectors.nav_toggle).unwrap();

        assert!(nav.toggle(&mut doc));
        assert!(nav.is_open(&doc));
        assert_eq!(doc.attribute(toggle, "aria-expanded"), Some("true"));

        assert!(!nav.toggle(&mut doc));
        assert_eq!(doc.attribute(toggle, "aria-expanded"), Some("false"));
    }

    #[test]
    fn close_reports_whether_it_was_open() {
        let mut doc = document_with(&[]);
        let nav = Navbar::locate(&doc, &Selectors::default());
        assert!(!nav.close(&mut doc));
        nav.toggle(&mut doc);
        assert!(nav.close(&mut doc));
        assert!(!nav.is_open(&doc));
    }

    #[test]
    fn missing_menu_is_inert() {
        let mut doc = Document::new();
        let nav = Navbar::locate(&doc, &Selectors::default());
        assert!(!nav.toggle(&mut doc));
        assert!(!nav.close(&mut doc));
    }
}
