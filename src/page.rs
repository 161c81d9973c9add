//! The mounted gallery page.
//!
//! [`Page`] owns the document and every component that works on it: the
//! gallery index, viewer state and surface, preloader, input router,
//! navbar, collections modal and hooks. Hosts talk to it through three
//! doors:
//!
//! - [`Page::dispatch`] delivers an input event,
//! - [`Page::mutate`] changes the document the way page scripts would,
//! - [`Page::advance`] lets virtual time pass and runs due continuations.
//!
//! After each of these the page drains the gallery observer, so container
//! mutations always turn into a debounced re-scan rather than a synchronous
//! one. The [`LightboxControl`] trait is the programmatic surface for
//! embedding code.
//!
//! ## Display updates
//!
//! Every viewer transition fades the image out at once and schedules a
//! [`Task::ShowEntry`] after the fade delay. That continuation is the only
//! writer of the viewer image source and caption. At most one is waiting:
//! a new transition cancels the previous swap before queueing its own, so
//! an earlier image is never revealed while a later one is fading in.
//!
//! A re-scan while the viewer is open keeps showing the same image when its
//! item survived, following it to its new position. Otherwise the position
//! is clamped into the new list and whatever now sits there is displayed.

use crate::collections::{CollectionsModal, ModalView, build_collections};
use crate::config::{ConfigError, GalleryConfig, Selectors};
use crate::dom::Document;
use crate::gallery::{GalleryEntry, GalleryIndex};
use crate::hooks::{HostAction, Hooks};
use crate::input::{Action, InputEvent, InputRouter, RouteContext};
use crate::navbar::Navbar;
use crate::preload::{Fetcher, Preloader};
use crate::scheduler::{Scheduler, TaskHandle};
use crate::viewer::{LightboxSurface, ViewerState};
use serde::Serialize;
use std::time::Duration;

/// Programmatic viewer controls.
pub trait LightboxControl {
    /// Open the viewer at `index`, wrapping any integer into range.
    fn open_at(&mut self, index: i64);
    fn close(&mut self);
    fn next(&mut self);
    fn prev(&mut self);
    /// Rebuild the gallery index now, cancelling any pending re-scan.
    fn refresh(&mut self);
}

/// Deferred work queued on the page scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Debounced gallery re-scan.
    Rescan,
    /// Second half of a display update.
    ShowEntry { url: String, caption: String },
}

/// Observable page state, for transcripts and assertions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub time_ms: u64,
    pub entries: usize,
    pub open: bool,
    pub current: usize,
    /// What the viewer image currently shows.
    pub displayed: Option<String>,
    pub caption: Option<String>,
    /// A swap is waiting for the fade to finish.
    pub fading: bool,
    pub nav_open: bool,
    /// `closed`, `cards` or the collection being listed.
    pub collections: String,
    pub pending_tasks: usize,
    pub rebuilds: u64,
}

#[derive(Debug)]
pub struct Page {
    doc: Document,
    config: GalleryConfig,
    selectors: Selectors,
    gallery: GalleryIndex,
    viewer: ViewerState,
    surface: Option<LightboxSurface>,
    navbar: Navbar,
    modal: Option<CollectionsModal>,
    router: InputRouter,
    preloader: Preloader,
    scheduler: Scheduler<Task>,
    fade: Option<TaskHandle>,
    hooks: Hooks,
    outbox: Vec<HostAction>,
}

impl Page {
    /// Validate `config`, locate every part of `doc` and build the initial
    /// gallery index.
    pub fn mount(
        mut doc: Document,
        config: GalleryConfig,
        fetcher: impl Fetcher + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let selectors = config.selectors.resolve()?;
        let gallery = GalleryIndex::attach(&mut doc, &selectors);
        let surface = LightboxSurface::locate(&doc, &selectors);
        if surface.is_none() {
            tracing::info!(selector = %selectors.lightbox, "no lightbox surface, viewer writes disabled");
        }
        let navbar = Navbar::locate(&doc, &selectors);
        let modal = CollectionsModal::locate(&doc, &selectors);
        let router = InputRouter::new(config.gestures.swipe_threshold);
        tracing::info!(entries = gallery.len(), "page mounted");

        Ok(Self {
            doc,
            config,
            selectors,
            gallery,
            viewer: ViewerState::default(),
            surface,
            navbar,
            modal,
            router,
            preloader: Preloader::new(fetcher),
            scheduler: Scheduler::new(),
            fade: None,
            hooks: Hooks::default(),
            outbox: Vec::new(),
        })
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn selectors(&self) -> &Selectors {
        &self.selectors
    }

    pub fn entries(&self) -> &[GalleryEntry] {
        self.gallery.entries()
    }

    pub fn gallery(&self) -> &GalleryIndex {
        &self.gallery
    }

    pub fn viewer(&self) -> ViewerState {
        self.viewer
    }

    pub fn current_entry(&self) -> Option<&GalleryEntry> {
        if self.viewer.is_open() {
            self.gallery.get(self.viewer.current())
        } else {
            None
        }
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn fetches_issued(&self) -> u64 {
        self.preloader.issued()
    }

    /// Drain the effects queued for the host.
    pub fn take_host_actions(&mut self) -> Vec<HostAction> {
        std::mem::take(&mut self.outbox)
    }

    /// Change the document from outside, then react to what changed.
    pub fn mutate<R>(&mut self, f: impl FnOnce(&mut Document) -> R) -> R {
        let result = f(&mut self.doc);
        self.pump_mutations();
        result
    }

    /// Route one input event and apply the resulting action.
    pub fn dispatch(&mut self, event: &InputEvent) -> Option<Action> {
        let ctx = RouteContext {
            doc: &self.doc,
            selectors: &self.selectors,
            gallery: &self.gallery,
            surface: self.surface.as_ref(),
            viewer_open: self.viewer.is_open(),
        };
        let action = self.router.route(&ctx, event)?;
        self.apply(action.clone());
        Some(action)
    }

    /// Let `duration` of virtual time pass, running every continuation that
    /// falls due in order. Continuations scheduled inside the window run too.
    pub fn advance(&mut self, duration: Duration) {
        let until = self.scheduler.now() + duration;
        while let Some(task) = self.scheduler.pop_due(until) {
            self.run(task);
            self.pump_mutations();
        }
        self.scheduler.advance_clock(until);
    }

    /// Turn queued container mutations into a debounced re-scan.
    pub fn pump_mutations(&mut self) {
        if self.gallery.take_mutations(&mut self.doc) {
            let delay = self.config.timing.debounce();
            self.gallery
                .schedule_rescan(&mut self.scheduler, delay, Task::Rescan);
            tracing::trace!(?delay, "re-scan scheduled");
        }
    }

    pub fn apply(&mut self, action: Action) {
        tracing::debug!(?action, "apply");
        match action {
            Action::OpenAt(index) => self.open_at(index),
            Action::Next => self.next(),
            Action::Prev => self.prev(),
            Action::Close => self.close(),
            Action::ToggleNav => {
                self.navbar.toggle(&mut self.doc);
            }
            Action::CloseNav => {
                self.navbar.close(&mut self.doc);
            }
            Action::Search(query) => {
                self.hooks.search(&mut self.doc, &self.selectors, &query);
            }
            Action::Upload => {
                if let Some(effect) = self.hooks.upload() {
                    self.outbox.push(effect);
                }
            }
            Action::OpenCollections => {
                self.navbar.close(&mut self.doc);
                let collections = build_collections(&self.doc, &self.selectors);
                if let Some(modal) = self.modal.as_mut() {
                    modal.open(&mut self.doc, collections);
                }
            }
            Action::CloseCollections => {
                if let Some(modal) = self.modal.as_mut() {
                    modal.close(&mut self.doc);
                }
            }
            Action::ShowCollection(name) => {
                if let Some(modal) = self.modal.as_mut() {
                    modal.show_collection(&mut self.doc, &name);
                }
            }
            Action::BackToCollections => {
                if let Some(modal) = self.modal.as_mut() {
                    modal.back(&mut self.doc);
                }
            }
            Action::SelectMember(url) => self.select_member(&url),
        }
        self.pump_mutations();
    }

    /// Open the gallery entry whose full URL is `url`. A miss refreshes the
    /// index once and retries; a second miss hands the URL to the host.
    /// Changes still waiting for the debounce are applied before the first
    /// lookup.
    pub fn select_member(&mut self, url: &str) {
        if self.gallery.has_pending_rescan() {
            self.refresh();
        }
        let position = match self.gallery.position_of_full_url(url) {
            Some(position) => Some(position),
            None => {
                self.refresh();
                self.gallery.position_of_full_url(url)
            }
        };
        match position {
            Some(position) => {
                if let Some(modal) = self.modal.as_mut() {
                    modal.close(&mut self.doc);
                }
                self.open_at(position as i64);
            }
            None => {
                tracing::debug!(%url, "collection member not in gallery, opening directly");
                self.outbox.push(HostAction::OpenAsset(url.to_string()));
            }
        }
    }

    fn run(&mut self, task: Task) {
        tracing::trace!(?task, now = ?self.scheduler.now(), "run");
        match task {
            Task::Rescan => {
                self.gallery.clear_pending(&mut self.scheduler);
                self.rebuild();
            }
            Task::ShowEntry { url, caption } => {
                self.fade = None;
                if let Some(surface) = &self.surface {
                    surface.present(&mut self.doc, &url, &caption);
                }
            }
        }
    }

    fn rebuild(&mut self) {
        let shown = self
            .current_entry()
            .map(|entry| (entry.element, entry.full_url.clone()));
        self.gallery.rebuild(&mut self.doc);
        let Some((element, url)) = shown else {
            self.viewer.fit(self.gallery.len());
            return;
        };
        match self.gallery.position_of_element(element) {
            Some(position) if self.gallery.get(position).is_some_and(|e| e.full_url == url) => {
                self.viewer.retarget(position);
            }
            _ => {
                self.viewer.fit(self.gallery.len());
                tracing::debug!(current = self.viewer.current(), "shown entry gone, redisplaying");
                self.display(self.viewer.current());
            }
        }
    }

    /// Fade out, schedule the swap, then warm both neighbours.
    fn display(&mut self, index: usize) {
        let Some(entry) = self.gallery.get(index) else {
            return;
        };
        tracing::debug!(index, url = %entry.full_url, "display");
        if let Some(surface) = &self.surface {
            surface.fade_out(&mut self.doc);
            let task = Task::ShowEntry {
                url: entry.full_url.clone(),
                caption: entry.caption.clone(),
            };
            if let Some(stale) = self.fade.take() {
                self.scheduler.cancel(stale);
            }
            self.fade = Some(self.scheduler.schedule(self.config.timing.fade(), task));
        }
        self.preloader
            .preload_neighbors(self.gallery.entries(), index);
    }

    pub fn snapshot(&self) -> Snapshot {
        let image = self.surface.as_ref().and_then(|s| s.image);
        let caption = self.surface.as_ref().and_then(|s| s.caption);
        Snapshot {
            time_ms: self.scheduler.now().as_millis() as u64,
            entries: self.gallery.len(),
            open: self.viewer.is_open(),
            current: self.viewer.current(),
            displayed: image
                .and_then(|node| self.doc.attribute(node, "src"))
                .map(String::from),
            caption: caption
                .map(|node| self.doc.text(node))
                .filter(|text| !text.is_empty())
                .map(String::from),
            fading: self.fade.is_some_and(|handle| self.scheduler.is_pending(handle)),
            nav_open: self.navbar.is_open(&self.doc),
            collections: match self.modal.as_ref().map(CollectionsModal::view) {
                None | Some(ModalView::Closed) => "closed".to_string(),
                Some(ModalView::Cards) => "cards".to_string(),
                Some(ModalView::Members(name)) => name.clone(),
            },
            pending_tasks: self.scheduler.len(),
            rebuilds: self.gallery.rebuilds(),
        }
    }
}

impl LightboxControl for Page {
    fn open_at(&mut self, index: i64) {
        let Some(current) = self.viewer.open_at(index, self.gallery.len()) else {
            tracing::debug!(index, "open ignored, gallery is empty");
            return;
        };
        if let Some(surface) = &self.surface {
            surface.show(&mut self.doc);
        }
        self.display(current);
    }

    fn close(&mut self) {
        let Some(surface) = &self.surface else {
            return;
        };
        if self.viewer.close() {
            surface.hide(&mut self.doc);
            tracing::debug!("viewer closed");
        }
    }

    fn next(&mut self) {
        if let Some(current) = self.viewer.next(self.gallery.len()) {
            self.display(current);
        }
    }

    fn prev(&mut self) {
        if let Some(current) = self.viewer.prev(self.gallery.len()) {
            self.display(current);
        }
    }

    fn refresh(&mut self) {
        self.gallery.clear_pending(&mut self.scheduler);
        self.rebuild();
    }
}
