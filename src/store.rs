//! The process-owned island store and its local mutation surface.
use log::{debug, info, warn};

use crate::{Island, IslandCollection, IslandError, IslandPatch, IslandStorage, Result};

/// Owns the in-memory collection and the file it is persisted to.
///
/// Every mutation is applied to a copy, saved, and only then committed, so
/// a failed save leaves the in-memory state as it was.
pub struct IslandStore {
    storage: IslandStorage,
    islands: IslandCollection,
}

impl IslandStore {
    /// Opens the store, loading whatever the backing file holds
    pub fn open(storage: IslandStorage) -> Result<Self> {
        let islands = storage.load()?;
        Ok(Self { storage, islands })
    }

    pub fn islands(&self) -> &IslandCollection {
        &self.islands
    }

    pub fn get(&self, id: &str) -> Result<&Island> {
        self.islands
            .get(id)
            .ok_or_else(|| IslandError::not_found(id))
    }

    pub fn storage(&self) -> &IslandStorage {
        &self.storage
    }

    /// Re-reads the backing file, replacing the in-memory collection
    pub fn reload(&mut self) -> Result<()> {
        self.islands = self.storage.load()?;
        Ok(())
    }

    fn commit(&mut self, next: IslandCollection) -> Result<()> {
        self.storage.save(&next)?;
        self.islands = next;
        Ok(())
    }

    /// Creates an empty island and returns its id
    pub fn create_island(&mut self, name: &str) -> Result<String> {
        let name = validate_name(name)?;
        let island = Island::new(name.to_string());
        let id = island.id.clone();

        let mut next = self.islands.clone();
        next.insert(island);
        self.commit(next)?;

        info!("Created island '{}' ({})", name, id);
        Ok(id)
    }

    /// Applies `patch` to an existing island
    pub fn update_island(&mut self, id: &str, patch: &IslandPatch) -> Result<()> {
        if !self.islands.contains(id) {
            return Err(IslandError::not_found(id));
        }
        if let Some(name) = &patch.name {
            validate_name(name)?;
        }
        if patch.is_empty() {
            debug!("Nothing to update for island {}", id);
            return Ok(());
        }

        let patch = patch.normalized();

        let mut next = self.islands.clone();
        if let Some(island) = next.get_mut(id) {
            island.apply(&patch);
        }
        self.commit(next)?;

        info!("Updated island {}", id);
        Ok(())
    }

    /// Removes an island, returning it
    pub fn delete_island(&mut self, id: &str) -> Result<Island> {
        let mut next = self.islands.clone();
        let removed = next.remove(id).ok_or_else(|| IslandError::not_found(id))?;
        self.commit(next)?;

        info!("Deleted island '{}' ({})", removed.name, id);
        Ok(removed)
    }

    /// Replaces the whole collection
    pub fn replace_all(&mut self, islands: IslandCollection) -> Result<()> {
        let count = islands.len();
        self.commit(islands)?;
        warn!("Replaced entire collection with {} islands", count);
        Ok(())
    }

    /// Moves an island to a new id, keeping its data
    pub fn rekey(&mut self, old_id: &str, new_id: &str) -> Result<()> {
        let mut next = self.islands.clone();
        next.rekey(old_id, new_id)?;
        self.commit(next)?;

        debug!("Island {} is now {}", old_id, new_id);
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(IslandError::invalid_input("island name must not be empty"));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn open_store() -> (TempDir, IslandStore) {
        let dir = tempdir().unwrap();
        let store = IslandStore::open(IslandStorage::new(dir.path().join("islands.json"))).unwrap();
        (dir, store)
    }

    #[test]
    fn create_persists_a_fresh_island() {
        let (_dir, mut store) = open_store();
        let id = store.create_island("  Trip Ideas ").unwrap();

        let island = store.get(&id).unwrap();
        assert_eq!(island.name, "Trip Ideas");
        assert_eq!(island.content, "");
        assert_eq!(island.created_at, island.updated_at);

        let on_disk = store.storage().load().unwrap();
        assert_eq!(&on_disk, store.islands());
    }

    #[test]
    fn create_rejects_blank_names() {
        let (dir, mut store) = open_store();
        assert!(matches!(
            store.create_island("   "),
            Err(IslandError::InvalidInput { .. })
        ));
        assert!(store.islands().is_empty());
        assert!(!dir.path().join("islands.json").exists());
    }

    #[test]
    fn update_changes_fields_and_bumps_timestamp() {
        let (_dir, mut store) = open_store();
        let id = store.create_island("Trip").unwrap();
        let created = store.get(&id).unwrap().updated_at;

        store
            .update_island(
                &id,
                &IslandPatch {
                    content: Some("a\nb".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        let island = store.get(&id).unwrap();
        assert_eq!(island.content, "a\nb");
        assert_eq!(island.name, "Trip");
        assert!(island.updated_at >= created);
    }

    #[test]
    fn update_and_delete_of_unknown_ids_fail() {
        let (_dir, mut store) = open_store();
        assert!(matches!(
            store.update_island("nope", &IslandPatch::default()),
            Err(IslandError::NotFound { .. })
        ));
        assert!(matches!(
            store.delete_island("nope"),
            Err(IslandError::NotFound { .. })
        ));
    }

    #[test]
    fn delete_removes_without_tombstone() {
        let (_dir, mut store) = open_store();
        let id = store.create_island("Gone soon").unwrap();
        store.delete_island(&id).unwrap();

        assert!(store.islands().is_empty());
        assert!(store.storage().load().unwrap().is_empty());
    }

    #[test]
    fn failed_save_keeps_previous_state() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let mut store = IslandStore::open(IslandStorage::new(blocker.join("islands.json"))).unwrap();
        let err = store.create_island("Doomed").unwrap_err();

        assert!(matches!(err, IslandError::Storage { .. }));
        assert!(store.islands().is_empty());
    }

    #[test]
    fn replace_all_and_rekey() {
        let (_dir, mut store) = open_store();
        store.create_island("Old").unwrap();

        let fresh = Island::new("Fresh".to_string());
        let fresh_id = fresh.id.clone();
        store
            .replace_all([fresh].into_iter().collect())
            .unwrap();
        assert_eq!(store.islands().len(), 1);

        store.rekey(&fresh_id, "server-id").unwrap();
        assert_eq!(store.get("server-id").unwrap().name, "Fresh");

        store.reload().unwrap();
        assert!(store.islands().contains("server-id"));
        assert!(!store.islands().contains(&fresh_id));
    }
}
