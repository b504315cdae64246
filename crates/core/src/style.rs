//! Style catalog: preview images whose file names carry a style code.
//!
//! Files are named `<style name>__<sref code>.<ext>`. Later roots
//! override earlier ones for the same style name.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CoreError;

/// Image extensions recognised as style previews (lowercase).
pub const STYLE_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

/// Separator between the style name and its code in a file stem.
pub const STYLE_NAME_SEPARATOR: &str = "__";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Style {
    pub name: String,
    /// Style reference code to pass as `sref`.
    pub sref: String,
    /// Preview image.
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct StyleCatalog {
    styles: BTreeMap<String, Style>,
}

impl StyleCatalog {
    pub fn load<P: AsRef<Path>>(roots: &[P]) -> Result<Self, CoreError> {
        let mut styles = BTreeMap::new();
        for root in roots {
            let root = root.as_ref();
            if !root.is_dir() {
                continue;
            }
            let mut paths = fs::read_dir(root)?
                .map(|e| e.map(|e| e.path()))
                .collect::<Result<Vec<_>, _>>()?;
            paths.sort();
            for path in paths {
                if let Some(style) = parse_style_file(&path) {
                    styles.insert(style.name.clone(), style);
                }
            }
        }
        Ok(Self { styles })
    }

    pub fn names(&self) -> Vec<&str> {
        self.styles.keys().map(String::as_str).collect()
    }

    pub fn select(&self, name: &str) -> Option<&Style> {
        self.styles.get(name)
    }
}

/// Parse a preview file path into a [`Style`]. Returns `None` for files
/// that do not follow the naming rule.
pub fn parse_style_file(path: &Path) -> Option<Style> {
    if !path.is_file() {
        return None;
    }
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if !STYLE_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let (name, sref) = stem.split_once(STYLE_NAME_SEPARATOR)?;
    Some(Style {
        name: name.to_string(),
        sref: sref.to_string(),
        path: path.to_path_buf(),
    })
}
