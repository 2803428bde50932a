use super::{load_json, save_json, KeyValueStore, GUEST_ID_KEY, THEMES_KEY};
use crate::error::StorageError;

/// Theme every player owns from the start.
pub const DEFAULT_THEME_ID: &str = "classic";

/// Return the stored guest id, generating and persisting one on first use.
pub fn load_or_create_guest_id(store: &dyn KeyValueStore) -> Result<String, StorageError> {
    if let Some(id) = store.get(GUEST_ID_KEY)? {
        if !id.is_empty() {
            return Ok(id);
        }
    }
    let id = format!("guest_{}", uuid::Uuid::new_v4().simple());
    store.set(GUEST_ID_KEY, &id)?;
    tracing::info!(guest_id = %id, "generated guest id");
    Ok(id)
}

/// Unlocked and selected cosmetic theme ids. The ids are opaque here.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ThemeSelection {
    unlocked: Vec<String>,
    selected: String,
}

impl Default for ThemeSelection {
    fn default() -> Self {
        ThemeSelection {
            unlocked: vec![DEFAULT_THEME_ID.to_string()],
            selected: DEFAULT_THEME_ID.to_string(),
        }
    }
}

impl ThemeSelection {
    pub fn load(store: &dyn KeyValueStore) -> Result<Self, StorageError> {
        let mut selection: ThemeSelection = load_json(store, THEMES_KEY)?.unwrap_or_default();
        if !selection.is_unlocked(DEFAULT_THEME_ID) {
            selection.unlocked.insert(0, DEFAULT_THEME_ID.to_string());
        }
        if !selection.is_unlocked(&selection.selected) {
            selection.selected = DEFAULT_THEME_ID.to_string();
        }
        Ok(selection)
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StorageError> {
        save_json(store, THEMES_KEY, self)
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    pub fn unlocked(&self) -> &[String] {
        &self.unlocked
    }

    pub fn is_unlocked(&self, theme_id: &str) -> bool {
        self.unlocked.iter().any(|t| t == theme_id)
    }

    pub fn unlock(&mut self, theme_id: &str) {
        if !self.is_unlocked(theme_id) {
            self.unlocked.push(theme_id.to_string());
        }
    }

    /// Select an unlocked theme. Returns false and keeps the current
    /// selection when the theme is locked.
    pub fn select(&mut self, theme_id: &str) -> bool {
        if !self.is_unlocked(theme_id) {
            return false;
        }
        self.selected = theme_id.to_string();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_guest_id_is_stable() {
        let store = MemoryStore::new();
        let first = load_or_create_guest_id(&store).unwrap();
        let second = load_or_create_guest_id(&store).unwrap();
        assert!(first.starts_with("guest_"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_default_theme_always_unlocked() {
        let store = MemoryStore::new();
        let selection = ThemeSelection::load(&store).unwrap();
        assert_eq!(selection.selected(), DEFAULT_THEME_ID);
        assert!(selection.is_unlocked(DEFAULT_THEME_ID));
    }

    #[test]
    fn test_select_requires_unlock() {
        let store = MemoryStore::new();
        let mut selection = ThemeSelection::load(&store).unwrap();
        assert!(!selection.select("neon"));
        assert_eq!(selection.selected(), DEFAULT_THEME_ID);

        selection.unlock("neon");
        assert!(selection.select("neon"));
        selection.save(&store).unwrap();

        let reloaded = ThemeSelection::load(&store).unwrap();
        assert_eq!(reloaded.selected(), "neon");
        assert_eq!(reloaded.unlocked().len(), 2);
    }
}
