//! Named parameter presets persisted as one JSON file per preset.
//!
//! A preset is a snapshot of [`RequestParams`] stored at
//! `<dir>/<name>.json` as indented UTF-8 JSON. Saving under an existing
//! name overwrites it. Loading does not check the keys against the
//! current parameter schema.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CoreError;
use crate::params::RequestParams;

/// Maximum length for a preset name.
pub const MAX_PRESET_NAME_LEN: usize = 200;

/// File extension for preset files.
pub const PRESET_EXTENSION: &str = "json";

/// Validate a preset name: non-empty, within length limit, and usable as a
/// single file name.
pub fn validate_preset_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(
            "Preset name must not be empty".to_string(),
        ));
    }
    if name.len() > MAX_PRESET_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Preset name too long: {} chars (max {MAX_PRESET_NAME_LEN})",
            name.len()
        )));
    }
    if name.starts_with('.') {
        return Err(CoreError::Validation(format!(
            "Preset name '{name}' must not start with '.'"
        )));
    }
    if name
        .chars()
        .any(|c| matches!(c, '/' | '\\' | ':' | '\0') || c.is_control())
    {
        return Err(CoreError::Validation(format!(
            "Preset name '{name}' contains a path separator or control character"
        )));
    }
    Ok(())
}

/// Directory-backed preset store.
#[derive(Debug, Clone)]
pub struct PresetStore {
    dir: PathBuf,
}

impl PresetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a preset with this name is stored at.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{PRESET_EXTENSION}"))
    }

    /// Write `params` under `name`, replacing any existing preset.
    pub fn save(&self, name: &str, params: &RequestParams) -> Result<PathBuf, CoreError> {
        validate_preset_name(name)?;
        fs::create_dir_all(&self.dir)?;

        let path = self.path_for(name);
        let json = serde_json::to_string_pretty(params)?;
        fs::write(&path, json)?;

        tracing::debug!(preset = name, path = %path.display(), "Saved preset");
        Ok(path)
    }

    /// Read the preset stored under `name`.
    pub fn load(&self, name: &str) -> Result<RequestParams, CoreError> {
        validate_preset_name(name)?;
        let path = self.path_for(name);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CoreError::NotFound {
                    entity: "Preset",
                    id: name.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let params: RequestParams = serde_json::from_str(&text)?;
        Ok(params)
    }

    /// Sorted names of all stored presets. Creates the directory if needed.
    pub fn list(&self) -> Result<Vec<String>, CoreError> {
        fs::create_dir_all(&self.dir)?;

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some(PRESET_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Remove a stored preset.
    pub fn delete(&self, name: &str) -> Result<(), CoreError> {
        validate_preset_name(name)?;
        match fs::remove_file(self.path_for(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(CoreError::NotFound {
                entity: "Preset",
                id: name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

/* --------------------------------------------------------------------------
   Tests
   -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::{json, Value};

    use super::*;

    fn sample_params() -> RequestParams {
        match json!({
            "ar": "16:9",
            "stylize": 250,
            "iw": 1.0,
            "raw": true,
            "mode": "relax",
            "personalize": "",
            "sref": "스타일 코드",
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = PresetStore::new(dir.path());
        let params = sample_params();

        store.save("portrait", &params).unwrap();
        let loaded = store.load("portrait").unwrap();

        assert_eq!(loaded, params);
        assert!(loaded["iw"].is_f64());
        assert!(loaded["stylize"].is_u64());
    }

    #[test]
    fn file_is_indented_utf8_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = PresetStore::new(dir.path());
        let path = store.save("styled", &sample_params()).unwrap();

        assert_eq!(path, dir.path().join("styled.json"));
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("\n  \""));
        assert!(text.contains("스타일 코드"));
    }

    #[test]
    fn resave_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = PresetStore::new(dir.path());
        store.save("p", &sample_params()).unwrap();

        let mut replacement = RequestParams::new();
        replacement.insert("chaos".into(), json!(10));
        store.save("p", &replacement).unwrap();

        assert_eq!(store.load("p").unwrap(), replacement);
    }

    #[test]
    fn save_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = PresetStore::new(dir.path().join("nested").join("presets"));
        store.save("x", &sample_params()).unwrap();
        assert!(store.path_for("x").is_file());
    }

    #[test]
    fn load_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = PresetStore::new(dir.path());
        assert_matches!(
            store.load("ghost"),
            Err(CoreError::NotFound { entity: "Preset", .. })
        );
    }

    #[test]
    fn load_keeps_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = PresetStore::new(dir.path());
        std::fs::write(
            store.path_for("old"),
            r#"{"legacy_option": 3, "stylize": 10}"#,
        )
        .unwrap();
        let loaded = store.load("old").unwrap();
        assert_eq!(loaded["legacy_option"], json!(3));
    }

    #[test]
    fn list_returns_sorted_json_stems() {
        let dir = tempfile::tempdir().unwrap();
        let store = PresetStore::new(dir.path());
        store.save("zeta", &sample_params()).unwrap();
        store.save("alpha", &sample_params()).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        assert_eq!(store.list().unwrap(), vec!["alpha", "zeta"]);
    }

    #[test]
    fn delete_removes_preset() {
        let dir = tempfile::tempdir().unwrap();
        let store = PresetStore::new(dir.path());
        store.save("gone", &sample_params()).unwrap();
        store.delete("gone").unwrap();
        assert!(store.list().unwrap().is_empty());
        assert_matches!(store.delete("gone"), Err(CoreError::NotFound { .. }));
    }

    #[test]
    fn unsafe_names_rejected() {
        for name in ["", "   ", "../escape", "a/b", "a\\b", ".hidden"] {
            assert_matches!(validate_preset_name(name), Err(CoreError::Validation(_)), "{name}");
        }
        let long = "x".repeat(MAX_PRESET_NAME_LEN + 1);
        assert_matches!(validate_preset_name(&long), Err(CoreError::Validation(_)));
        assert!(validate_preset_name("my_preset 2").is_ok());
    }
}
