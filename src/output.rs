//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Each image leads with
//! its positional index and title; filenames, thumbnails and captions follow
//! as indented context lines. Simulation transcripts lead with the step and
//! what it did, followed by the resulting viewer state.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Images
//! 001 dawn
//!     Source: 001-dawn.jpg
//!     Thumbnail: thumbs/001-dawn.jpg
//!     Caption: First light over the bay
//!     Collections: Sea
//! 002 (0042.jpg)
//!
//! Collections
//! 001 Sea (2 photos)
//!
//! Config
//!     config.toml
//! ```
//!
//! ## Simulate
//!
//! ```text
//! Start: viewer closed, 3 photos
//! 001 click Item(0) → OpenAt(0)
//!     viewer 1/3, fading in · 1 pending @ 0ms
//!     prefetch: c.jpg, b.jpg
//! 002 wait 150ms
//!     viewer 1/3, showing a.jpg "Image 1" @ 150ms
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure and do no I/O.

use crate::hooks::HostAction;
use crate::page::Snapshot;
use crate::scan::Manifest;
use crate::script::Transcript;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an image line: titled images show title, untitled show filename in parens.
///
/// ```text
/// 001 The Sunset        // titled
/// 001 (010.avif)        // untitled: the filename is the identity
/// ```
fn image_line(index: usize, title: Option<&str>, filename: &str) -> String {
    match title {
        Some(t) if !t.is_empty() => format!("{} {}", format_index(index), t),
        _ => format!("{} ({})", format_index(index), filename),
    }
}

fn photo_count(n: usize) -> String {
    match n {
        1 => "1 photo".to_string(),
        n => format!("{n} photos"),
    }
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    }
}

// ============================================================================
// Scan output
// ============================================================================

/// Format scan output: the image inventory, collections and config.
pub fn format_scan_output(manifest: &Manifest, source_root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Images".to_string());
    for (i, item) in manifest.items.iter().enumerate() {
        lines.push(image_line(i + 1, item.title.as_deref(), &item.filename));
        let context = indent(1);
        if item.title.is_some() {
            lines.push(format!("{context}Source: {}", item.filename));
        }
        if item.large.is_some() {
            lines.push(format!("{context}Thumbnail: {}", item.src));
        }
        if let Some(alt) = &item.alt {
            lines.push(format!("{context}Caption: {}", truncate(alt, 60)));
        }
        if !item.collections.is_empty() {
            lines.push(format!("{context}Collections: {}", item.collections.join(", ")));
        }
    }

    let names = manifest.collection_names();
    if !names.is_empty() {
        lines.push(String::new());
        lines.push("Collections".to_string());
        for (i, name) in names.iter().enumerate() {
            let count = manifest
                .items
                .iter()
                .filter(|item| item.collections.iter().any(|c| c == name))
                .count();
            lines.push(format!("{} {} ({})", format_index(i + 1), name, photo_count(count)));
        }
    }

    lines.push(String::new());
    lines.push("Config".to_string());
    if source_root.join("config.toml").exists() {
        lines.push(format!("{}config.toml", indent(1)));
    } else {
        lines.push(format!("{}(defaults)", indent(1)));
    }

    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(manifest: &Manifest, source_root: &Path) {
    for line in format_scan_output(manifest, source_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Render output
// ============================================================================

pub fn format_render_output(manifest: &Manifest, page_path: &Path) -> Vec<String> {
    vec![format!(
        "Rendered {} → {}",
        photo_count(manifest.items.len()),
        page_path.display()
    )]
}

pub fn print_render_output(manifest: &Manifest, page_path: &Path) {
    for line in format_render_output(manifest, page_path) {
        println!("{}", line);
    }
}

// ============================================================================
// Check output
// ============================================================================

pub fn format_check_output(manifest: &Manifest) -> Vec<String> {
    let config = &manifest.config;
    vec![
        "Config OK".to_string(),
        format!(
            "{}{}, {} collections",
            indent(1),
            photo_count(manifest.items.len()),
            manifest.collection_names().len()
        ),
        format!(
            "{}fade {}ms, debounce {}ms, swipe {}px",
            indent(1),
            config.timing.fade_ms,
            config.timing.debounce_ms,
            config.gestures.swipe_threshold
        ),
    ]
}

pub fn print_check_output(manifest: &Manifest) {
    for line in format_check_output(manifest) {
        println!("{}", line);
    }
}

// ============================================================================
// Simulation transcript
// ============================================================================

/// One-line summary of the page state.
fn format_state(state: &Snapshot) -> String {
    let mut parts = Vec::new();
    if state.open {
        let position = format!("viewer {}/{}", state.current + 1, state.entries);
        let showing = match (&state.displayed, state.fading) {
            (Some(url), false) => match &state.caption {
                Some(caption) => format!("showing {url} \"{caption}\""),
                None => format!("showing {url}"),
            },
            (Some(url), true) => format!("fading from {url}"),
            (None, _) => "fading in".to_string(),
        };
        parts.push(format!("{position}, {showing}"));
    } else {
        parts.push(format!("viewer closed, {}", photo_count(state.entries)));
    }
    if state.nav_open {
        parts.push("menu open".to_string());
    }
    if state.collections != "closed" {
        parts.push(format!("collections: {}", state.collections));
    }
    if state.pending_tasks > 0 {
        parts.push(format!("{} pending", state.pending_tasks));
    }
    parts.join(" · ")
}

fn format_host_action(action: &HostAction) -> String {
    match action {
        HostAction::Notice(message) => format!("notice: {message}"),
        HostAction::OpenAsset(url) => format!("open asset: {url}"),
    }
}

pub fn format_transcript(transcript: &Transcript) -> Vec<String> {
    let mut lines = vec![format!("Start: {}", format_state(&transcript.initial))];
    for step in &transcript.steps {
        let header = match &step.action {
            Some(action) => format!("{} {} → {}", format_index(step.index), step.command, action),
            None => format!("{} {}", format_index(step.index), step.command),
        };
        lines.push(header);
        let context = indent(1);
        if let Some(note) = &step.note {
            lines.push(format!("{context}({note})"));
        }
        lines.push(format!("{context}{} @ {}ms", format_state(&step.state), step.state.time_ms));
        if !step.fetches.is_empty() {
            lines.push(format!("{context}prefetch: {}", step.fetches.join(", ")));
        }
        for action in &step.host_actions {
            lines.push(format!("{context}{}", format_host_action(action)));
        }
    }
    lines
}

pub fn print_transcript(transcript: &Transcript) {
    for line in format_transcript(transcript) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GalleryConfig;
    use crate::script::{parse_script, run_script};
    use crate::test_helpers::*;
    use crate::types::GalleryItem;

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn image_line_title_or_filename() {
        assert_eq!(image_line(1, Some("dawn"), "001-dawn.jpg"), "001 dawn");
        assert_eq!(image_line(2, None, "0042.jpg"), "002 (0042.jpg)");
        assert_eq!(image_line(3, Some(""), "x.jpg"), "003 (x.jpg)");
    }

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééé", 3), "ééé...");
    }

    // =========================================================================
    // Scan output
    // =========================================================================

    #[test]
    fn scan_output_lists_images_and_collections() {
        let tmp = setup_content();
        let manifest = crate::scan::scan(tmp.path()).unwrap();
        let lines = format_scan_output(&manifest, tmp.path());
        assert_eq!(lines[0], "Images");
        assert_eq!(lines[1], "001 dawn");
        assert!(lines.contains(&"    Thumbnail: thumbs/001-dawn.jpg".to_string()));
        assert!(lines.contains(&"    Caption: First light over the bay".to_string()));
        assert!(lines.contains(&"001 Sea (2 photos)".to_string()));
        assert_eq!(lines.last().unwrap(), "    config.toml");
    }

    #[test]
    fn scan_output_without_config_shows_defaults() {
        let tmp = content_dir(&[("0042.jpg", "")]);
        let manifest = crate::scan::scan(tmp.path()).unwrap();
        let lines = format_scan_output(&manifest, tmp.path());
        assert_eq!(lines[1], "001 (0042.jpg)");
        assert!(!lines.contains(&"Collections".to_string()));
        assert_eq!(lines.last().unwrap(), "    (defaults)");
    }

    #[test]
    fn check_output_summarizes() {
        let manifest = Manifest {
            items: vec![GalleryItem::new("a.jpg")],
            config: GalleryConfig::default(),
        };
        let lines = format_check_output(&manifest);
        assert_eq!(lines[0], "Config OK");
        assert_eq!(lines[1], "    1 photo, 0 collections");
    }

    // =========================================================================
    // Transcript
    // =========================================================================

    #[test]
    fn transcript_shows_fade_then_image() {
        let script =
            parse_script("[[step]]\nclick = \"item:0\"\n\n[[step]]\nwait_ms = 150\n").unwrap();
        let transcript =
            run_script(&urls(&["a.jpg", "b.jpg"]), &GalleryConfig::default(), &script).unwrap();
        let lines = format_transcript(&transcript);
        assert_eq!(lines[0], "Start: viewer closed, 2 photos");
        assert_eq!(lines[1], "001 click Item(0) → OpenAt(0)");
        assert_eq!(lines[2], "    viewer 1/2, fading in · 1 pending @ 0ms");
        assert_eq!(lines[3], "    prefetch: b.jpg, b.jpg");
        assert_eq!(lines[4], "002 wait 150ms");
        assert_eq!(lines[5], "    viewer 1/2, showing a.jpg \"Image 1\" @ 150ms");
    }

    #[test]
    fn pending_rescan_is_not_a_fade() {
        let script = parse_script(
            "[[step]]\nclick = \"item:0\"\n\n[[step]]\nwait_ms = 150\n\n[[step]]\nsearch = \"zzz\"\n",
        )
        .unwrap();
        let transcript =
            run_script(&urls(&["a.jpg", "b.jpg"]), &GalleryConfig::default(), &script).unwrap();
        let lines = format_transcript(&transcript);
        assert_eq!(
            lines.last().unwrap(),
            "    viewer 1/2, showing a.jpg \"Image 1\" · 1 pending @ 150ms"
        );
    }

    #[test]
    fn transcript_shows_host_actions() {
        let script = parse_script("[[step]]\nclick = \"upload\"\n").unwrap();
        let transcript = run_script(&urls(&["a.jpg"]), &GalleryConfig::default(), &script).unwrap();
        let lines = format_transcript(&transcript);
        assert!(lines.iter().any(|l| l.starts_with("    notice: ")));
    }
}
