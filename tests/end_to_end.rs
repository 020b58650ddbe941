use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use idea_islands::{
    DeleteMode, IslandCollection, IslandError, IslandPatch, IslandQuery, IslandStorage,
    IslandStore, PeerClient, Result, SyncCoordinator,
};
use tempfile::tempdir;

/// Applies forwarded mutations to a second store, like the query-side service would
struct StorePeer {
    store: Mutex<IslandStore>,
}

#[async_trait]
impl PeerClient for StorePeer {
    async fn create_island(&self, name: &str) -> Result<String> {
        self.store.lock().unwrap().create_island(name)
    }

    async fn update_island(&self, id: &str, patch: &IslandPatch) -> Result<()> {
        self.store.lock().unwrap().update_island(id, patch)
    }

    async fn delete_island(&self, id: &str) -> Result<()> {
        self.store.lock().unwrap().delete_island(id).map(|_| ())
    }

    async fn replace_all(&self, islands: &IslandCollection) -> Result<()> {
        self.store.lock().unwrap().replace_all(islands.clone())
    }
}

#[test]
fn create_update_and_sample() {
    let dir = tempdir().unwrap();
    let storage = IslandStorage::new(dir.path().join("islands.json"));
    let mut store = IslandStore::open(storage.clone()).unwrap();
    assert!(store.islands().is_empty());

    let id = store.create_island("Trip Ideas").unwrap();
    store
        .update_island(
            &id,
            &IslandPatch {
                content: Some("Visit museum\nTry local food\n\nBook hotel".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

    let ideas = IslandQuery::new(storage).list_ideas(&id, 2).unwrap();
    assert_eq!(ideas.island_name, "Trip Ideas");
    assert_eq!(ideas.ideas.len(), 2);

    let pool: HashSet<&str> = ["Visit museum", "Try local food", "Book hotel"].into();
    let picked: HashSet<&str> = ideas.ideas.iter().map(String::as_str).collect();
    assert_eq!(picked.len(), 2);
    assert!(picked.is_subset(&pool));
}

#[tokio::test]
async fn edits_replicate_to_the_query_side() {
    let editor_dir = tempdir().unwrap();
    let query_dir = tempdir().unwrap();
    let query_storage = IslandStorage::new(query_dir.path().join("islands.json"));

    let mut editor = IslandStore::open(IslandStorage::new(editor_dir.path().join("islands.json")))
        .unwrap();
    let sync = SyncCoordinator::new(StorePeer {
        store: Mutex::new(IslandStore::open(query_storage.clone()).unwrap()),
    });
    let query = IslandQuery::new(query_storage);

    let created = sync.create(&mut editor, "Weekend").await.unwrap();
    assert!(created.is_synced());
    // Both sides now share the id the peer assigned
    assert!(editor.islands().contains(&created.id));
    assert_eq!(query.list_islands().unwrap()[0].id, created.id);

    let patch = IslandPatch {
        content: Some("hike\nbake bread".to_string()),
        ..Default::default()
    };
    sync.update(&mut editor, &created.id, &patch).await.unwrap();
    assert_eq!(
        query.list_all_ideas(&created.id).unwrap().ideas,
        vec!["hike", "bake bread"]
    );

    sync.delete(&mut editor, &created.id, DeleteMode::RequirePeer)
        .await
        .unwrap();
    assert!(editor.islands().is_empty());
    assert!(matches!(
        query.get_raw_content(&created.id),
        Err(IslandError::NotFound { .. })
    ));
}

#[tokio::test]
async fn full_sync_overwrites_the_peer() {
    let editor_dir = tempdir().unwrap();
    let query_dir = tempdir().unwrap();
    let query_storage = IslandStorage::new(query_dir.path().join("islands.json"));

    let mut peer_store = IslandStore::open(query_storage.clone()).unwrap();
    peer_store.create_island("Only on peer").unwrap();

    let mut editor = IslandStore::open(IslandStorage::new(editor_dir.path().join("islands.json")))
        .unwrap();
    editor.create_island("Local one").unwrap();
    editor.create_island("Local two").unwrap();

    let sync = SyncCoordinator::new(StorePeer {
        store: Mutex::new(peer_store),
    });
    sync.full_sync(&editor).await.unwrap();

    let on_peer = query_storage.load().unwrap();
    assert_eq!(&on_peer, editor.islands());
}
