//! Keyword catalog loaded from plain-text files.
//!
//! Each `*.txt` file is a category holding one keyword per line; blank
//! lines and lines starting with `#` are skipped. Files one directory
//! level down become `"<subfolder>/<stem>"` categories. When several
//! roots define the same category, the later root wins, so a user
//! directory listed after the bundled one overrides it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;

use crate::error::CoreError;
use crate::options::PromptPosition;

/// Extension of keyword list files.
pub const KEYWORD_FILE_EXTENSION: &str = "txt";

/// Separators offered for joining keywords.
pub const JOIN_SEPARATORS: &[&str] = &[", ", " ", " | ", " + "];

/// Category name → keywords, sorted by category.
#[derive(Debug, Clone, Default)]
pub struct KeywordCatalog {
    categories: BTreeMap<String, Vec<String>>,
}

impl KeywordCatalog {
    /// Scan every root in order. Missing roots are skipped.
    pub fn load<P: AsRef<Path>>(roots: &[P]) -> Result<Self, CoreError> {
        let mut files: BTreeMap<String, PathBuf> = BTreeMap::new();
        for root in roots {
            collect_keyword_files(root.as_ref(), &mut files)?;
        }

        let mut categories = BTreeMap::new();
        for (category, path) in files {
            let keywords = parse_keywords(&fs::read_to_string(&path)?);
            if keywords.is_empty() {
                tracing::debug!(category, "Skipping empty keyword file");
                continue;
            }
            categories.insert(category, keywords);
        }

        tracing::debug!(count = categories.len(), "Loaded keyword categories");
        Ok(Self { categories })
    }

    /// Build a catalog from in-memory lists. Empty lists are dropped.
    pub fn from_lists<I, K>(lists: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<String>)>,
        K: Into<String>,
    {
        let categories = lists
            .into_iter()
            .filter(|(_, kws)| !kws.is_empty())
            .map(|(k, kws)| (k.into(), kws))
            .collect();
        Self { categories }
    }

    pub fn categories(&self) -> Vec<&str> {
        self.categories.keys().map(String::as_str).collect()
    }

    pub fn keywords(&self, category: &str) -> Option<&[String]> {
        self.categories.get(category).map(Vec::as_slice)
    }

    /// Pick one keyword from `category`, deterministically for `seed`.
    ///
    /// Unknown categories yield an empty string.
    pub fn random(&self, category: &str, seed: u64) -> String {
        let Some(keywords) = self.categories.get(category) else {
            return String::new();
        };
        let mut rng = StdRng::seed_from_u64(seed);
        keywords.choose(&mut rng).cloned().unwrap_or_default()
    }
}

/// Parse one keyword file body.
pub fn parse_keywords(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn collect_keyword_files(root: &Path, out: &mut BTreeMap<String, PathBuf>) -> Result<(), CoreError> {
    if !root.is_dir() {
        return Ok(());
    }
    for entry in sorted_entries(root)? {
        if entry.is_dir() {
            let Some(sub) = entry.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            for nested in sorted_entries(&entry)? {
                if let Some(stem) = keyword_stem(&nested) {
                    out.insert(format!("{sub}/{stem}"), nested);
                }
            }
        } else if let Some(stem) = keyword_stem(&entry) {
            out.insert(stem, entry);
        }
    }
    Ok(())
}

fn keyword_stem(path: &Path) -> Option<String> {
    if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(KEYWORD_FILE_EXTENSION) {
        return None;
    }
    path.file_stem().and_then(|s| s.to_str()).map(str::to_string)
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, CoreError> {
    let mut paths = fs::read_dir(dir)?
        .map(|e| e.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?;
    paths.sort();
    Ok(paths)
}

/// Join a base prompt with keyword parts.
///
/// Parts are trimmed and empty ones dropped; the base goes first or last
/// according to `position`.
pub fn join_keywords<S: AsRef<str>>(
    keywords: &[S],
    base: &str,
    position: PromptPosition,
    separator: &str,
) -> String {
    let kw_parts = keywords
        .iter()
        .map(|k| k.as_ref().trim())
        .filter(|k| !k.is_empty());
    let base = base.trim();
    let base_part = (!base.is_empty()).then_some(base);

    let parts: Vec<&str> = match position {
        PromptPosition::First => base_part.into_iter().chain(kw_parts).collect(),
        PromptPosition::Last => kw_parts.chain(base_part).collect(),
    };
    parts.join(separator)
}
