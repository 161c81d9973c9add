//! Override hooks and host effects.
//!
//! A page runs built-in behavior for search and upload unless the embedding
//! host installs its own handler. Effects a browser would perform outside
//! the document (a notice, navigating to an asset) are queued as
//! [`HostAction`]s for the host to drain.

use crate::config::Selectors;
use crate::dom::Document;
use crate::search;
use serde::Serialize;

/// Notice posted by the default upload handler.
pub const UPLOAD_UNAVAILABLE: &str = "Upload is not available for this gallery";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum HostAction {
    /// Show a short message to the visitor.
    Notice(String),
    /// Open an image directly, outside the viewer.
    OpenAsset(String),
}

pub type SearchHandler = Box<dyn FnMut(&mut Document, &Selectors, &str)>;
pub type UploadHandler = Box<dyn FnMut() -> Option<HostAction>>;

#[derive(Default)]
pub struct Hooks {
    search: Option<SearchHandler>,
    upload: Option<UploadHandler>,
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("search", &self.search.is_some())
            .field("upload", &self.upload.is_some())
            .finish()
    }
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_search(mut self, handler: impl FnMut(&mut Document, &Selectors, &str) + 'static) -> Self {
        self.search = Some(Box::new(handler));
        self
    }

    pub fn on_upload(mut self, handler: impl FnMut() -> Option<HostAction> + 'static) -> Self {
        self.upload = Some(Box::new(handler));
        self
    }

    pub fn search(&mut self, doc: &mut Document, selectors: &Selectors, query: &str) {
        match self.search.as_mut() {
            Some(handler) => handler(doc, selectors, query),
            None => {
                search::filter_items(doc, selectors, query);
            }
        }
    }

    pub fn upload(&mut self) -> Option<HostAction> {
        match self.upload.as_mut() {
            Some(handler) => handler(),
            None => Some(HostAction::Notice(UPLOAD_UNAVAILABLE.to_string())),
        }
    }
}
