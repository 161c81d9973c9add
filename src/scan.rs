//! Content directory scanning.
//!
//! Turns a flat directory of images into the ordered [`GalleryItem`] list
//! the page is built from.
//!
//! ## Directory Structure
//!
//! ```text
//! photos/                          # Content root
//! ├── config.toml                  # Page configuration (optional)
//! ├── 001-dawn.jpg                 # Numbered image
//! ├── 001-dawn.txt                 # Caption sidecar (optional)
//! ├── 002-harbor-lights.png
//! ├── sketch.webp                  # Unnumbered: sorted after numbered
//! └── thumbs/
//!     └── 001-dawn.jpg             # Thumbnail (optional)
//! ```
//!
//! ## Naming Conventions
//!
//! - **Numbered images** (`NNN-name.ext`): sorted by number; duplicates are an error
//! - **Unnumbered images**: follow the numbered ones, sorted by filename
//! - **Titles**: the name after the prefix with dashes as spaces (`002-harbor-lights` → "harbor lights")
//!
//! ## Item Resolution
//!
//! - `src`: `thumbs/<filename>` when that file exists, otherwise the image itself
//! - `large`: the image itself, only when a thumbnail was used
//! - `alt`: trimmed contents of `<stem>.txt`, when present and non-empty
//! - `collections`: every `[collections]` entry listing the filename

use crate::config::{self, GalleryConfig};
use crate::types::GalleryItem;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Duplicate image number {0} in {1}")]
    DuplicateNumber(u32, PathBuf),
}

/// Manifest output from the scan stage.
#[derive(Debug, Serialize)]
pub struct Manifest {
    pub items: Vec<GalleryItem>,
    pub config: GalleryConfig,
}

impl Manifest {
    /// Collection names in use, in first-appearance order.
    pub fn collection_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for name in self.items.iter().flat_map(|i| &i.collections) {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        names
    }
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "avif"];
const THUMBS_DIR: &str = "thumbs";

pub fn scan(root: &Path) -> Result<Manifest, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }
    // Uses defaults if config.toml doesn't exist
    let config = config::load_config(root)?;

    let mut numbered: BTreeMap<u32, PathBuf> = BTreeMap::new();
    let mut unnumbered: Vec<PathBuf> = Vec::new();
    for path in collect_images(root)? {
        let number = parse_number_prefix(&path.file_name().unwrap_or_default().to_string_lossy());
        match number {
            Some(num) => {
                if numbered.insert(num, path.clone()).is_some() {
                    return Err(ScanError::DuplicateNumber(num, root.to_path_buf()));
                }
            }
            None => unnumbered.push(path),
        }
    }
    unnumbered.sort();

    let mut items = Vec::with_capacity(numbered.len() + unnumbered.len());
    for (number, path) in numbered
        .into_iter()
        .chain(unnumbered.into_iter().map(|p| (u32::MAX, p)))
    {
        items.push(build_item(root, &path, number, &config)?);
    }

    for (name, files) in &config.collections {
        for file in files {
            if !items.iter().any(|item| &item.filename == file) {
                tracing::warn!(collection = %name, %file, "collection lists a missing image");
            }
        }
    }

    tracing::info!(items = items.len(), root = %root.display(), "content scanned");
    Ok(Manifest { items, config })
}

fn collect_images(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut images: Vec<PathBuf> = fs::read_dir(root)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            let hidden = p
                .file_name()
                .is_some_and(|n| n.to_string_lossy().starts_with('.'));
            !hidden && is_image(p)
        })
        .collect();
    images.sort();
    Ok(images)
}

fn is_image(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

fn build_item(
    root: &Path,
    path: &Path,
    number: u32,
    config: &GalleryConfig,
) -> Result<GalleryItem, ScanError> {
    let filename = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let stem = path
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    let (src, large) = if root.join(THUMBS_DIR).join(&filename).is_file() {
        (format!("{THUMBS_DIR}/{filename}"), Some(filename.clone()))
    } else {
        (filename.clone(), None)
    };

    let sidecar = root.join(format!("{stem}.txt"));
    let alt = if sidecar.is_file() {
        let content = fs::read_to_string(&sidecar)?.trim().to_string();
        if content.is_empty() { None } else { Some(content) }
    } else {
        None
    };

    let collections = config
        .collections
        .iter()
        .filter(|(_, files)| files.contains(&filename))
        .map(|(name, _)| name.clone())
        .collect();

    Ok(GalleryItem {
        number,
        title: parse_image_title(&stem),
        filename,
        src,
        large,
        alt,
        collections,
    })
}

/// Leading digits of a name followed by a dash (or nothing).
fn parse_number_prefix(name: &str) -> Option<u32> {
    let digits = name.len() - name.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    let rest = &name[digits..];
    if rest.is_empty() || rest.starts_with('-') || rest.starts_with('.') {
        name[..digits].parse().ok()
    } else {
        None
    }
}

/// Display title from a filename stem.
///
/// - `001-dawn` → Some("dawn")
/// - `002-harbor-lights` → Some("harbor lights")
/// - `001` and `001-` → None
/// - `sketch-pad` → Some("sketch pad")
fn parse_image_title(stem: &str) -> Option<String> {
    let name = match parse_number_prefix(stem) {
        Some(_) => stem
            .trim_start_matches(|c: char| c.is_ascii_digit())
            .trim_start_matches('-'),
        None => stem,
    };
    let title = name.replace('-', " ").trim().to_string();
    (!title.is_empty()).then_some(title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    fn filenames(manifest: &Manifest) -> Vec<&str> {
        manifest.items.iter().map(|i| i.filename.as_str()).collect()
    }

    // =========================================================================
    // Name parsing
    // =========================================================================

    #[test]
    fn number_prefix_requires_dash_or_end() {
        assert_eq!(parse_number_prefix("001-dawn.jpg"), Some(1));
        assert_eq!(parse_number_prefix("010.jpg"), Some(10));
        assert_eq!(parse_number_prefix("2020s.jpg"), None);
        assert_eq!(parse_number_prefix("dawn.jpg"), None);
    }

    #[test]
    fn image_titles() {
        assert_eq!(parse_image_title("001-dawn").as_deref(), Some("dawn"));
        assert_eq!(parse_image_title("002-harbor-lights").as_deref(), Some("harbor lights"));
        assert_eq!(parse_image_title("001"), None);
        assert_eq!(parse_image_title("001-"), None);
        assert_eq!(parse_image_title("sketch-pad").as_deref(), Some("sketch pad"));
    }

    // =========================================================================
    // Scanning
    // =========================================================================

    #[test]
    fn images_sorted_by_number_then_unnumbered() {
        let tmp = content_dir(&[
            ("zebra.jpg", ""),
            ("010-dusk.webp", ""),
            ("002-noon.png", ""),
            ("apple.avif", ""),
        ]);
        let manifest = scan(tmp.path()).unwrap();
        assert_eq!(
            filenames(&manifest),
            vec!["002-noon.png", "010-dusk.webp", "apple.avif", "zebra.jpg"]
        );
        assert_eq!(manifest.items[0].number, 2);
        assert_eq!(manifest.items[3].number, u32::MAX);
    }

    #[test]
    fn non_images_and_hidden_files_ignored() {
        let tmp = content_dir(&[("001-a.jpg", ""), (".002-b.jpg", ""), ("notes.md", "")]);
        let manifest = scan(tmp.path()).unwrap();
        assert_eq!(filenames(&manifest), vec!["001-a.jpg"]);
    }

    #[test]
    fn thumbnail_moves_original_to_large() {
        let tmp = setup_content();
        let manifest = scan(tmp.path()).unwrap();
        let dawn = &manifest.items[0];
        assert_eq!(dawn.src, "thumbs/001-dawn.jpg");
        assert_eq!(dawn.large.as_deref(), Some("001-dawn.jpg"));
        let harbor = &manifest.items[1];
        assert_eq!(harbor.src, "002-harbor-lights.png");
        assert_eq!(harbor.large, None);
    }

    #[test]
    fn sidecar_becomes_caption() {
        let tmp = setup_content();
        let manifest = scan(tmp.path()).unwrap();
        assert_eq!(manifest.items[0].alt.as_deref(), Some("First light over the bay"));
        assert_eq!(manifest.items[1].alt, None);
        assert_eq!(manifest.items[1].title.as_deref(), Some("harbor lights"));
    }

    #[test]
    fn collections_assigned_from_config() {
        let tmp = setup_content();
        let manifest = scan(tmp.path()).unwrap();
        assert_eq!(manifest.config.page.title, "Coast");
        assert_eq!(manifest.items[0].collections, vec!["Sea"]);
        assert!(manifest.items[1].collections.is_empty());
        assert_eq!(manifest.collection_names(), vec!["Sea"]);
    }

    #[test]
    fn duplicate_number_is_error() {
        let tmp = content_dir(&[("001-first.jpg", ""), ("001-second.jpg", "")]);
        let result = scan(tmp.path());
        assert!(matches!(result, Err(ScanError::DuplicateNumber(1, _))));
    }

    #[test]
    fn missing_root_is_error() {
        let tmp = content_dir(&[]);
        let result = scan(&tmp.path().join("nope"));
        assert!(matches!(result, Err(ScanError::NotADirectory(_))));
    }

    #[test]
    fn invalid_config_is_error() {
        let tmp = content_dir(&[("config.toml", "[gestures]\nswipe_threshold = -1.0\n")]);
        assert!(matches!(scan(tmp.path()), Err(ScanError::Config(_))));
    }

    #[test]
    fn empty_directory_is_empty_manifest() {
        let tmp = content_dir(&[]);
        assert!(scan(tmp.path()).unwrap().items.is_empty());
    }
}
