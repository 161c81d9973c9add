//! Scripted page sessions.
//!
//! A script is a TOML file of `[[step]]` tables, each naming exactly one
//! thing a visitor (or page code) does. The runner builds the page in
//! memory, plays the steps in order and records what the page looks like
//! after each one.
//!
//! ```toml
//! [[step]]
//! click = "item:0"          # open the first image
//!
//! [[step]]
//! key = "ArrowRight"
//!
//! [[step]]
//! wait_ms = 150             # let the fade finish
//!
//! [[step]]
//! drag = [200.0, 80.0]      # swipe left on the stage
//!
//! [[step]]
//! hide_item = 2             # page code hides an item
//! ```
//!
//! ## Click targets
//!
//! | Target | Element |
//! |--------|---------|
//! | `item:N` | the N-th gallery item (0-based, hidden ones included) |
//! | `prev`, `next`, `close` | lightbox controls |
//! | `backdrop`, `stage`, `image` | lightbox root, stage, image |
//! | `nav-toggle`, `nav-link` | navbar toggle, first link in the menu |
//! | `upload`, `collections` | navbar buttons |
//! | `collection:NAME` | collection card |
//! | `member:URL` | collection member tile |
//! | `back`, `modal-close`, `modal` | collections modal controls and backdrop |
//!
//! A click whose target is not on the page is recorded with a note and
//! otherwise ignored; that is a property of the page, not a script error.

use crate::collections::{BACK_CLASS, CARD_CLASS, CLOSE_CLASS, MEMBER_CLASS};
use crate::config::{ConfigError, GalleryConfig};
use crate::dom::{NodeId, Selector};
use crate::hooks::HostAction;
use crate::input::{Action, InputEvent, Key};
use crate::layout::build_document;
use crate::page::{LightboxControl, Page, Snapshot};
use crate::preload::RecordingFetcher;
use crate::types::GalleryItem;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("step {index}: {message}")]
    Step { index: usize, message: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

/// One `[[step]]` table. Exactly one action field must be set; `target`
/// only qualifies `key`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Step {
    pub key: Option<String>,
    pub target: Option<String>,
    pub click: Option<String>,
    pub drag: Option<[f64; 2]>,
    pub cancel_drag: Option<[f64; 2]>,
    pub search: Option<String>,
    pub open: Option<i64>,
    pub refresh: Option<bool>,
    pub wait_ms: Option<u64>,
    pub remove_item: Option<usize>,
    pub hide_item: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Key { key: Key, target: Option<ClickTarget> },
    Click(ClickTarget),
    Drag { from: f64, to: f64 },
    CancelDrag { from: f64, to: f64 },
    Search(String),
    Open(i64),
    Refresh,
    Wait(Duration),
    RemoveItem(usize),
    HideItem(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickTarget {
    Item(usize),
    Prev,
    Next,
    Close,
    Backdrop,
    Stage,
    Image,
    NavToggle,
    NavLink,
    Upload,
    Collections,
    Collection(String),
    Member(String),
    Back,
    ModalClose,
    Modal,
}

impl ClickTarget {
    pub fn parse(raw: &str) -> Option<Self> {
        if let Some(n) = raw.strip_prefix("item:") {
            return n.trim().parse().ok().map(ClickTarget::Item);
        }
        if let Some(name) = raw.strip_prefix("collection:") {
            return Some(ClickTarget::Collection(name.to_string()));
        }
        if let Some(url) = raw.strip_prefix("member:") {
            return Some(ClickTarget::Member(url.to_string()));
        }
        Some(match raw {
            "prev" => ClickTarget::Prev,
            "next" => ClickTarget::Next,
            "close" => ClickTarget::Close,
            "backdrop" => ClickTarget::Backdrop,
            "stage" => ClickTarget::Stage,
            "image" => ClickTarget::Image,
            "nav-toggle" => ClickTarget::NavToggle,
            "nav-link" => ClickTarget::NavLink,
            "upload" => ClickTarget::Upload,
            "collections" => ClickTarget::Collections,
            "back" => ClickTarget::Back,
            "modal-close" => ClickTarget::ModalClose,
            "modal" => ClickTarget::Modal,
            _ => return None,
        })
    }

    /// The element this target names on `page`, if present.
    pub fn resolve(&self, page: &Page) -> Option<NodeId> {
        let doc = page.document();
        let s = page.selectors();
        let class = |name: &str| Selector::Class(name.to_string());
        let with_attr = |selector: Selector, attr: &str, value: &str| {
            doc.select(doc.body(), &selector)
                .into_iter()
                .find(|&n| doc.attribute(n, attr) == Some(value))
        };
        match self {
            ClickTarget::Item(n) => {
                let container = doc.find(&s.gallery)?;
                doc.select(container, &s.item).get(*n).copied()
            }
            ClickTarget::Prev => doc.find(&s.prev),
            ClickTarget::Next => doc.find(&s.next),
            ClickTarget::Close => doc.find(&s.close),
            ClickTarget::Backdrop => doc.find(&s.lightbox),
            ClickTarget::Stage => doc.find(&s.stage),
            ClickTarget::Image => doc.find(&s.image),
            ClickTarget::NavToggle => doc.find(&s.nav_toggle),
            ClickTarget::NavLink => {
                let menu = doc.find(&s.nav_menu)?;
                doc.select_first(menu, &Selector::Tag("a".to_string()))
            }
            ClickTarget::Upload => doc.find(&s.upload_button),
            ClickTarget::Collections => doc.find(&s.collections_button),
            ClickTarget::Collection(name) => with_attr(class(CARD_CLASS), "data-collection", name),
            ClickTarget::Member(url) => with_attr(class(MEMBER_CLASS), "data-full", url),
            ClickTarget::Back => doc.find(&class(BACK_CLASS)),
            ClickTarget::ModalClose => doc.find(&class(CLOSE_CLASS)),
            ClickTarget::Modal => doc.find(&s.collections_modal),
        }
    }
}

impl Step {
    /// Turn the table into a command, checking exactly one action is set.
    pub fn command(&self, index: usize) -> Result<Command, ScriptError> {
        let fail = |message: String| ScriptError::Step { index, message };
        let target = |raw: &str| {
            ClickTarget::parse(raw).ok_or_else(|| fail(format!("unknown click target '{raw}'")))
        };

        let mut commands = Vec::new();
        if let Some(key) = &self.key {
            let target = self.target.as_deref().map(target).transpose()?;
            commands.push(Command::Key {
                key: Key::from_name(key),
                target,
            });
        } else if self.target.is_some() {
            return Err(fail("'target' only applies to 'key'".into()));
        }
        if let Some(raw) = &self.click {
            commands.push(Command::Click(target(raw)?));
        }
        if let Some([from, to]) = self.drag {
            commands.push(Command::Drag { from, to });
        }
        if let Some([from, to]) = self.cancel_drag {
            commands.push(Command::CancelDrag { from, to });
        }
        if let Some(query) = &self.search {
            commands.push(Command::Search(query.clone()));
        }
        if let Some(index) = self.open {
            commands.push(Command::Open(index));
        }
        if self.refresh == Some(true) {
            commands.push(Command::Refresh);
        }
        if let Some(ms) = self.wait_ms {
            commands.push(Command::Wait(Duration::from_millis(ms)));
        }
        if let Some(n) = self.remove_item {
            commands.push(Command::RemoveItem(n));
        }
        if let Some(n) = self.hide_item {
            commands.push(Command::HideItem(n));
        }

        match commands.len() {
            1 => Ok(commands.remove(0)),
            0 => Err(fail("no action".into())),
            n => Err(fail(format!("{n} actions, expected exactly one"))),
        }
    }
}

pub fn parse_script(content: &str) -> Result<Script, ScriptError> {
    Ok(toml::from_str(content)?)
}

pub fn load_script(path: &Path) -> Result<Script, ScriptError> {
    let content = fs::read_to_string(path)?;
    parse_script(&content)
}

/// What happened at one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub index: usize,
    pub command: String,
    /// The action the input router produced, for input steps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fetches: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub host_actions: Vec<HostAction>,
    pub state: Snapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    pub initial: Snapshot,
    pub steps: Vec<StepRecord>,
}

/// Build the page for `items`, then play `script` against it.
pub fn run_script(
    items: &[GalleryItem],
    config: &GalleryConfig,
    script: &Script,
) -> Result<Transcript, ScriptError> {
    let commands = script
        .steps
        .iter()
        .enumerate()
        .map(|(i, step)| step.command(i + 1))
        .collect::<Result<Vec<_>, _>>()?;

    let selectors = config.selectors.resolve()?;
    let doc = build_document(items, &config.page, &selectors);
    let fetches = RecordingFetcher::new();
    let mut page = Page::mount(doc, config.clone(), fetches.clone())?;

    let initial = page.snapshot();
    let mut steps = Vec::with_capacity(commands.len());
    for (i, command) in commands.into_iter().enumerate() {
        let (action, note) = play(&mut page, &command);
        tracing::debug!(step = i + 1, ?command, ?action, "step played");
        steps.push(StepRecord {
            index: i + 1,
            command: describe(&command),
            action: action.map(|a| format!("{a:?}")),
            note,
            fetches: fetches.take(),
            host_actions: page.take_host_actions(),
            state: page.snapshot(),
        });
    }
    Ok(Transcript { initial, steps })
}

fn play(page: &mut Page, command: &Command) -> (Option<Action>, Option<String>) {
    let missing = |what: &str| (None, Some(format!("{what} not on page")));
    match command {
        Command::Key { key, target } => {
            let target = match target {
                Some(t) => match t.resolve(page) {
                    Some(node) => Some(node),
                    None => return missing(&format!("{t:?}")),
                },
                None => None,
            };
            let event = InputEvent::KeyDown {
                key: key.clone(),
                target,
            };
            (page.dispatch(&event), None)
        }
        Command::Click(target) => match target.resolve(page) {
            Some(node) => (page.dispatch(&InputEvent::Click { target: node }), None),
            None => missing(&format!("{target:?}")),
        },
        Command::Drag { from, to } | Command::CancelDrag { from, to } => {
            let Some(stage) = page.document().find(&page.selectors().stage) else {
                return missing("stage");
            };
            page.dispatch(&InputEvent::PointerDown {
                target: stage,
                x: *from,
            });
            if matches!(command, Command::CancelDrag { .. }) {
                page.dispatch(&InputEvent::PointerCancel);
            }
            (page.dispatch(&InputEvent::PointerUp { x: *to }), None)
        }
        Command::Search(query) => {
            let Some(input) = page.document().find(&page.selectors().search_input) else {
                return missing("search input");
            };
            let event = InputEvent::Input {
                target: input,
                value: query.clone(),
            };
            (page.dispatch(&event), None)
        }
        Command::Open(index) => {
            page.open_at(*index);
            (None, None)
        }
        Command::Refresh => {
            page.refresh();
            (None, None)
        }
        Command::Wait(duration) => {
            page.advance(*duration);
            (None, None)
        }
        Command::RemoveItem(n) | Command::HideItem(n) => {
            let Some(item) = ClickTarget::Item(*n).resolve(page) else {
                return missing(&format!("item {n}"));
            };
            let hide = matches!(command, Command::HideItem(_));
            page.mutate(|doc| {
                if hide {
                    doc.set_style(item, "display", "none");
                } else {
                    doc.remove(item);
                }
            });
            (None, None)
        }
    }
}

fn describe(command: &Command) -> String {
    match command {
        Command::Key { key, target: None } => format!("key {key:?}"),
        Command::Key {
            key,
            target: Some(target),
        } => format!("key {key:?} on {target:?}"),
        Command::Click(target) => format!("click {target:?}"),
        Command::Drag { from, to } => format!("drag {from} → {to}"),
        Command::CancelDrag { from, to } => format!("cancelled drag {from} → {to}"),
        Command::Search(query) => format!("search {query:?}"),
        Command::Open(index) => format!("open {index}"),
        Command::Refresh => "refresh".to_string(),
        Command::Wait(duration) => format!("wait {}ms", duration.as_millis()),
        Command::RemoveItem(n) => format!("remove item {n}"),
        Command::HideItem(n) => format!("hide item {n}"),
    }
}
