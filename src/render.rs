//! HTML page rendering.
//!
//! Writes the scanned gallery as a single static `index.html` with the same
//! structure [`layout::build_document`](crate::layout::build_document) builds
//! in memory: navbar, gallery grid, lightbox panel and collections modal.
//!
//! ## Selectors
//!
//! Every part carries the `id` or `class` its configured selector names, so
//! the rendered page and the in-memory page agree. Element tags are fixed by
//! the template, which means bare tag selectors cannot be honored here; they
//! are rejected with [`RenderError::TagSelector`].
//!
//! ## CSS
//!
//! `static/style.css` is embedded at compile time. Nothing else is inlined.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Templates are type-safe Rust code with automatic XSS escaping.

use crate::collections::{BACK_CLASS, CLOSE_CLASS, PANEL_CLASS, TITLE_CLASS};
use crate::config::{ConfigError, PageConfig, Selectors};
use crate::dom::Selector;
use crate::layout::gallery_anchor;
use crate::scan::Manifest;
use crate::types::GalleryItem;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("selectors.{key} = '{selector}': HTML output needs an #id or .class selector")]
    TagSelector { key: &'static str, selector: String },
}

const CSS: &str = include_str!("../static/style.css");

/// The `id` and `class` attributes that make an element match a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Hook<'a> {
    id: Option<&'a str>,
    class: Option<&'a str>,
}

fn hook(selector: &Selector) -> Hook<'_> {
    match selector {
        Selector::Id(id) => Hook {
            id: Some(id.as_str()),
            class: None,
        },
        Selector::Class(class) => Hook {
            id: None,
            class: Some(class.as_str()),
        },
        Selector::Tag(_) => Hook {
            id: None,
            class: None,
        },
    }
}

/// Render the manifest and write `index.html` into `output_dir`.
pub fn render(manifest: &Manifest, output_dir: &Path) -> Result<PathBuf, RenderError> {
    let markup = render_page(manifest)?;
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join("index.html");
    fs::write(&path, markup.into_string())?;
    tracing::info!(path = %path.display(), items = manifest.items.len(), "page rendered");
    Ok(path)
}

pub fn render_page(manifest: &Manifest) -> Result<Markup, RenderError> {
    let selectors = manifest.config.selectors.resolve()?;
    if let Some((key, selector)) = selectors
        .named()
        .into_iter()
        .find(|(_, s)| matches!(s, Selector::Tag(_)))
    {
        return Err(RenderError::TagSelector {
            key,
            selector: selector.to_string(),
        });
    }

    let page = &manifest.config.page;
    let content = html! {
        (render_nav(page, &selectors))
        (render_gallery(&manifest.items, &selectors))
        (render_lightbox(&selectors))
        (render_collections_modal(&selectors))
    };
    Ok(base_document(&page.title, content))
}

fn base_document(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body {
                (content)
            }
        }
    }
}

fn render_nav(page: &PageConfig, selectors: &Selectors) -> Markup {
    let toggle = hook(&selectors.nav_toggle);
    let menu = hook(&selectors.nav_menu);
    let search = hook(&selectors.search_input);
    let collections = hook(&selectors.collections_button);
    let upload = hook(&selectors.upload_button);
    html! {
        nav.navbar {
            span.nav-brand { (page.title) }
            button id=[toggle.id] class=[toggle.class] aria-expanded="false" aria-label="Menu" {
                "☰"
            }
            div id=[menu.id] class=[menu.class] {
                a href={ "#" (gallery_anchor(selectors)) } { "Gallery" }
                input id=[search.id] class=[search.class] type="search" placeholder="Search";
                button id=[collections.id] class=[collections.class] { "Collections" }
                @if page.upload_enabled {
                    button id=[upload.id] class=[upload.class] { "Upload" }
                }
            }
        }
    }
}

fn render_gallery(items: &[GalleryItem], selectors: &Selectors) -> Markup {
    let gallery = hook(&selectors.gallery);
    let item = hook(&selectors.item);
    html! {
        div id=[gallery.id] class=[gallery.class] {
            @for entry in items {
                div id=[item.id] class=[item.class] {
                    img src=(entry.src)
                        data-large=[entry.large.as_deref()]
                        alt=[entry.alt.as_deref()]
                        data-title=[entry.title.as_deref()]
                        data-collections=[entry.collections_attr()]
                        loading="lazy";
                }
            }
        }
    }
}

fn render_lightbox(selectors: &Selectors) -> Markup {
    let root = hook(&selectors.lightbox);
    let stage = hook(&selectors.stage);
    let image = hook(&selectors.image);
    let caption = hook(&selectors.caption);
    let prev = hook(&selectors.prev);
    let next = hook(&selectors.next);
    let close = hook(&selectors.close);
    html! {
        div id=[root.id] class=[root.class] aria-hidden="true" {
            div id=[stage.id] class=[stage.class] {
                img id=[image.id] class=[image.class] alt="";
                div id=[caption.id] class=[caption.class] {}
            }
            button id=[prev.id] class=[prev.class] aria-label="Previous" { "‹" }
            button id=[next.id] class=[next.class] aria-label="Next" { "›" }
            button id=[close.id] class=[close.class] aria-label="Close" { "×" }
        }
    }
}

fn render_collections_modal(selectors: &Selectors) -> Markup {
    let modal = hook(&selectors.collections_modal);
    let grid = hook(&selectors.collections_grid);
    html! {
        div id=[modal.id] class=[modal.class] aria-hidden="true" {
            div class=(PANEL_CLASS) {
                h2 class=(TITLE_CLASS) { "Collections" }
                button class=(BACK_CLASS) style="display: none" { "Back" }
                button class=(CLOSE_CLASS) aria-label="Close" { "×" }
                div id=[grid.id] class=[grid.class] {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GalleryConfig, SelectorConfig};
    use crate::test_helpers::*;

    fn manifest(items: Vec<GalleryItem>) -> Manifest {
        Manifest {
            items,
            config: GalleryConfig::default(),
        }
    }

    fn render_string(manifest: &Manifest) -> String {
        render_page(manifest).unwrap().into_string()
    }

    #[test]
    fn page_includes_doctype_and_title() {
        let mut m = manifest(vec![]);
        m.config.page.title = "Coast".into();
        let html = render_string(&m);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Coast</title>"));
    }

    #[test]
    fn items_carry_data_attributes() {
        let mut tagged = item("thumbs/a.jpg", Some("a.jpg"), Some("Dawn"));
        tagged.collections = vec!["Sea".into(), "Sky".into()];
        let html = render_string(&manifest(vec![tagged, GalleryItem::new("b.jpg")]));
        assert!(html.contains(r#"src="thumbs/a.jpg""#));
        assert!(html.contains(r#"data-large="a.jpg""#));
        assert!(html.contains(r#"alt="Dawn""#));
        assert!(html.contains(r#"data-collections="Sea,Sky""#));
        assert_eq!(html.matches(r#"class="item""#).count(), 2);
    }

    #[test]
    fn structure_uses_configured_hooks() {
        let mut m = manifest(vec![]);
        m.config.selectors = SelectorConfig {
            gallery: ".photos".into(),
            lightbox: "#viewer".into(),
            ..SelectorConfig::default()
        };
        let html = render_string(&m);
        assert!(html.contains(r#"class="photos""#));
        assert!(html.contains(r#"id="viewer""#));
        assert!(!html.contains(r#"id="gallery""#));
    }

    #[test]
    fn upload_button_optional() {
        let mut m = manifest(vec![]);
        assert!(render_string(&m).contains("upload-btn"));
        m.config.page.upload_enabled = false;
        assert!(!render_string(&m).contains("upload-btn"));
    }

    #[test]
    fn tag_selectors_rejected() {
        let mut m = manifest(vec![]);
        m.config.selectors.item = "figure".into();
        let result = render_page(&m);
        assert!(matches!(result, Err(RenderError::TagSelector { key: "item", .. })));
    }

    #[test]
    fn captions_are_escaped() {
        let html = render_string(&manifest(vec![item("a.jpg", None, Some("<b>bold</b>"))]));
        assert!(!html.contains("<b>bold"));
        assert!(html.contains("&lt;b&gt;"));
    }

    #[test]
    fn render_writes_index_html() {
        let tmp = content_dir(&[]);
        let out = tmp.path().join("dist");
        let path = render(&manifest(urls(&["a.jpg"])), &out).unwrap();
        assert_eq!(path, out.join("index.html"));
        let html = std::fs::read_to_string(path).unwrap();
        assert!(html.contains("lightbox-stage"));
    }
}
