//! # Gallery Lightbox
//!
//! The interactive layer of a photo gallery page: a lightbox viewer with
//! wraparound navigation, a gallery index that follows the page as it
//! changes, neighbour preloading, keyboard/click/swipe routing, a
//! collapsible navbar with search, and a collections browser.
//!
//! # Architecture: Page Model
//!
//! The page is an in-memory element tree ([`dom::Document`]) with mutation
//! observers, driven by virtual time ([`scheduler::Scheduler`]). Everything a
//! browser would do asynchronously, a fade continuation or a debounced
//! re-scan, is a scheduled task that runs when the host advances the clock:
//!
//! ```text
//! InputEvent ──route──▶ Action ──apply──▶ Page ──schedule──▶ Task
//!                                          ▲                   │
//!                                          └────── advance ────┘
//! ```
//!
//! This keeps every timing rule deterministic and testable without a
//! browser. The same structure is rendered to static HTML by [`render`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`dom`] | Element tree, selectors and mutation observers |
//! | [`scheduler`] | Virtual-time task queue with cancellable handles |
//! | [`gallery`] | Ordered gallery index, rebuilt after debounced container changes |
//! | [`viewer`] | Viewer state machine and the lightbox surface it writes to |
//! | [`preload`] | Fire-and-forget neighbour prefetching |
//! | [`input`] | Keyboard, click and swipe routing to [`input::Action`]s |
//! | [`navbar`] | Collapsible menu toggle |
//! | [`search`] | Default caption filter |
//! | [`collections`] | Collections modal: cards, members and selection |
//! | [`hooks`] | Host-replaceable search and upload behaviour |
//! | [`page`] | The mounted page tying it all together |
//! | [`config`] | `config.toml` loading, merging and validation |
//! | [`types`] | Gallery items shared by scan, layout and render |
//! | [`scan`] | Content directory → item manifest |
//! | [`layout`] | Builds the page as a live document |
//! | [`render`] | Writes the page as HTML using Maud |
//! | [`script`] | Scripted sessions played against a page |
//! | [`output`] | CLI output formatting |
//! | [`logging`] | tracing subscriber setup |
//!
//! # Design Decisions
//!
//! ## One Writer for the Viewer Image
//!
//! Every transition fades the image out immediately and queues the swap.
//! Only that queued continuation writes the image source and caption. The
//! page keeps the handle of the waiting swap and cancels it when the next
//! transition starts, so rapid presses settle on the last transition and
//! never flash an image the user already moved past.
//!
//! ## Debounced, Not Synchronous, Re-scan
//!
//! Page scripts often add or hide many items in a burst. Each container
//! mutation restarts a short timer and the index is rebuilt once when it
//! fires. Hosts that need the index immediately call
//! [`page::LightboxControl::refresh`].
//!
//! ## Hooks Instead of Features
//!
//! Upload and search are host concerns. The page routes the button press or
//! query to [`hooks::Hooks`], whose defaults post a notice or filter by
//! caption. Effects that leave the page are queued as
//! [`hooks::HostAction`]s for the host to drain.

pub mod collections;
pub mod config;
pub mod dom;
pub mod gallery;
pub mod hooks;
pub mod input;
pub mod layout;
pub mod logging;
pub mod navbar;
pub mod output;
pub mod page;
pub mod preload;
pub mod render;
pub mod scan;
pub mod scheduler;
pub mod script;
pub mod search;
pub mod types;
pub mod viewer;

#[cfg(test)]
pub(crate) mod test_helpers;
