//! The two-slot snapshot store behind apply/revert.

use std::path::Path;

use crate::error::SettingsError;
use crate::settings::Settings;

/// Owns the *active* settings slot the UI edits and the *backup* slot it
/// can fall back to.
///
/// `apply` commits the active slot; `revert` restores it. Both are whole
/// deep copies of owned [`Settings`] values — the two slots never alias,
/// so edits to one can never leak into the other.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    active: Settings,
    backup: Settings,
}

impl SettingsStore {
    /// Load the active slot from candidate files (see
    /// [`Settings::load`]), overlay defaults, and seed the backup with a
    /// copy of the result.
    pub fn load<P: AsRef<Path>, K: AsRef<str>, V: AsRef<str>>(
        paths: &[P],
        defaults: &[(K, V)],
    ) -> Self {
        let mut active = Settings::load(paths);
        active.apply_defaults(defaults);
        Self::from_settings(active)
    }

    /// Wrap an existing slot, seeding the backup with a copy of it.
    pub fn from_settings(active: Settings) -> Self {
        let backup = active.clone();
        SettingsStore { active, backup }
    }

    /// The active slot.
    pub fn active(&self) -> &Settings {
        &self.active
    }

    /// The active slot, writable.
    pub fn active_mut(&mut self) -> &mut Settings {
        &mut self.active
    }

    /// The backup slot.
    pub fn backup(&self) -> &Settings {
        &self.backup
    }

    /// Commit: copy active → backup.
    pub fn apply(&mut self) {
        tracing::debug!("settings: apply (active -> backup)");
        self.backup = self.active.clone();
    }

    /// Roll back: copy backup → active. Returns the restored slot so the
    /// caller can re-drive everything that depends on its values.
    pub fn revert(&mut self) -> &Settings {
        tracing::debug!("settings: revert (backup -> active)");
        self.active = self.backup.clone();
        &self.active
    }

    /// Persist the active slot to its remembered target.
    pub fn save(&mut self) -> Result<bool, SettingsError> {
        self.active.save(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SettingsStore {
        let mut s = Settings::new();
        s.set("audio", "gain", -6.0);
        SettingsStore::from_settings(s)
    }

    #[test]
    fn revert_restores_the_backup() {
        let mut store = store();
        store.active_mut().set("audio", "gain", 3.0);
        let restored = store.revert();
        assert_eq!(restored.get_float("audio", "gain").unwrap(), Some(-6.0));
        assert_eq!(store.active().get_float("audio", "gain").unwrap(), Some(-6.0));
    }

    #[test]
    fn apply_commits_the_active_slot() {
        let mut store = store();
        store.active_mut().set("audio", "gain", 3.0);
        store.apply();
        store.active_mut().set("audio", "gain", 9.0);
        let restored = store.revert();
        assert_eq!(restored.get_float("audio", "gain").unwrap(), Some(3.0));
    }

    #[test]
    fn slots_never_alias() {
        let mut store = store();
        store.active_mut().set("audio", "gain", 3.0);
        assert_eq!(store.backup().get_float("audio", "gain").unwrap(), Some(-6.0));
    }
}
