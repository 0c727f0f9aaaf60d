//! Previously seen nicknames, kept on disk to offer name suggestions.
//!
//! Persistence is best-effort: write failures are logged and otherwise
//! ignored, and nothing here is ever needed to rebuild the room.

use std::fs;
use std::path::{Path, PathBuf};

const NICKNAMES_FILE: &str = "nicknames.json";
const CONTINUITY_FILE: &str = "migration-nicknames.json";

pub struct NicknameStore {
    path: PathBuf,
    continuity_path: PathBuf,
    names: Vec<String>,
    dirty: bool,
}

fn read_names(path: &Path) -> Option<Vec<String>> {
    let data = fs::read_to_string(path).ok()?;
    serde_json::from_str(&data).ok()
}

fn write_names(path: &Path, names: &[String]) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(names)?;
    fs::write(path, json)
}

impl NicknameStore {
    /// Load the store from `data_dir`, folding in and consuming any continuity
    /// snapshot left by a previous process.
    pub fn load(data_dir: &Path) -> Self {
        let mut store = Self {
            path: data_dir.join(NICKNAMES_FILE),
            continuity_path: data_dir.join(CONTINUITY_FILE),
            names: Vec::new(),
            dirty: false,
        };
        store.names = read_names(&store.path).unwrap_or_default();

        if let Some(carried) = read_names(&store.continuity_path) {
            let added = carried.iter().filter(|name| store.insert(name)).count();
            tracing::info!("Carried over {} nicknames from the previous session", added);
            store.flush();
            if let Err(e) = fs::remove_file(&store.continuity_path) {
                tracing::error!("Failed to remove continuity snapshot: {}", e);
            }
        }

        store
    }

    fn insert(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.names.push(name.to_string());
        self.dirty = true;
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        let lower = name.trim().to_lowercase();
        self.names.iter().any(|n| n.to_lowercase() == lower)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn register(&mut self, name: &str) -> bool {
        self.insert(name)
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        let lower = name.trim().to_lowercase();
        let Some(idx) = self.names.iter().position(|n| n.to_lowercase() == lower) else {
            return false;
        };
        self.names.remove(idx);
        self.dirty = true;
        true
    }

    /// Stored names not currently taken in the room.
    pub fn available<'a>(&self, occupied: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        let taken: Vec<String> = occupied.into_iter().map(str::to_lowercase).collect();
        self.names
            .iter()
            .filter(|n| !taken.contains(&n.to_lowercase()))
            .cloned()
            .collect()
    }

    /// Write the name list if it changed since the last flush.
    pub fn flush(&mut self) {
        if !self.dirty {
            return;
        }
        match write_names(&self.path, &self.names) {
            Ok(()) => self.dirty = false,
            Err(e) => tracing::error!("Failed to save nicknames: {}", e),
        }
    }

    /// Record who is seated right now so the next process can suggest them.
    pub fn save_continuity<'a>(&self, occupants: impl IntoIterator<Item = &'a str>) {
        let names: Vec<String> = occupants
            .into_iter()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect();
        if names.is_empty() {
            return;
        }
        if let Err(e) = write_names(&self.continuity_path, &names) {
            tracing::error!("Failed to save continuity snapshot: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = NicknameStore::load(dir.path());
        assert!(store.register(" Kay "));
        assert!(!store.register("KAY"));
        assert!(!store.register("  "));
        assert_eq!(store.names(), &["Kay".to_string()]);

        assert!(store.unregister("kay"));
        assert!(!store.unregister("kay"));
        assert!(store.names().is_empty());
    }

    #[test]
    fn flush_persists_between_loads() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = NicknameStore::load(dir.path());
        store.register("Kay");
        store.register("Jett");
        store.flush();

        let reloaded = NicknameStore::load(dir.path());
        assert_eq!(reloaded.names(), &["Kay".to_string(), "Jett".to_string()]);
    }

    #[test]
    fn available_skips_occupied_names() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = NicknameStore::load(dir.path());
        store.register("Kay");
        store.register("Jett");
        store.register("Omen");

        assert_eq!(store.available(["jett", "Nobody"]), vec!["Kay", "Omen"]);
    }

    #[test]
    fn continuity_snapshot_is_consumed_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = NicknameStore::load(dir.path());
        store.register("Kay");
        store.flush();
        store.save_continuity(["kay", " Sage ", ""]);
        assert!(dir.path().join(CONTINUITY_FILE).exists());

        let next = NicknameStore::load(dir.path());
        assert_eq!(next.names(), &["Kay".to_string(), "Sage".to_string()]);
        assert!(!dir.path().join(CONTINUITY_FILE).exists());

        let again = NicknameStore::load(dir.path());
        assert_eq!(again.names().len(), 2);
    }

    #[test]
    fn empty_room_writes_no_continuity() {
        let dir = tempfile::tempdir().unwrap();
        let store = NicknameStore::load(dir.path());
        store.save_continuity(std::iter::empty());
        assert!(!dir.path().join(CONTINUITY_FILE).exists());
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(NICKNAMES_FILE), "not json").unwrap();
        let store = NicknameStore::load(dir.path());
        assert!(store.names().is_empty());
    }
}
