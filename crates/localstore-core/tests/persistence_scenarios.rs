//! End-to-end scenarios across simulated restarts with on-disk backends

use localstore_core::{
    Configuration, JsonFileKv, LocalStore, PersistentKv, SqliteKv, StoreEvent, VersionRegistry,
    RESET_LOCAL_FLAG,
};
use tempfile::TempDir;

fn defaults() -> Configuration {
    Configuration::new("en")
}

fn reset_gate() -> VersionRegistry {
    VersionRegistry::new().with_flag(RESET_LOCAL_FLAG)
}

#[tokio::test]
async fn test_persisted_language_wins_after_restart() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("local.db");

    SqliteKv::open(&db)
        .unwrap()
        .set_item("language", "fr")
        .unwrap();

    let store = LocalStore::initialize(defaults(), SqliteKv::open(&db).unwrap(), &false).unwrap();
    assert_eq!(store.get("language"), "fr");
}

#[tokio::test]
async fn test_reset_gate_restores_defaults() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("local.db");

    SqliteKv::open(&db)
        .unwrap()
        .set_item("language", "fr")
        .unwrap();

    let store =
        LocalStore::initialize(defaults(), SqliteKv::open(&db).unwrap(), &reset_gate()).unwrap();
    assert_eq!(store.get("language"), "en");
    assert!(SqliteKv::open(&db).unwrap().is_empty().unwrap());
}

#[tokio::test]
async fn test_writes_survive_restart_after_flush() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("local.db");

    {
        let store =
            LocalStore::initialize(defaults(), SqliteKv::open(&db).unwrap(), &false).unwrap();
        store.set("language", "ko");
        store.set("music", "false");
        store.flush().await.unwrap();
        assert_eq!(store.stats().persisted, 2);
    }

    let store = LocalStore::initialize(defaults(), SqliteKv::open(&db).unwrap(), &false).unwrap();
    assert_eq!(store.get("language"), "ko");
    assert_eq!(store.get("music"), "false");
    assert_eq!(store.get("sound"), "true");
}

#[tokio::test]
async fn test_set_after_reset_is_readable_again() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("local.json");

    JsonFileKv::open(&path).set_item("language", "fr").unwrap();

    {
        let store =
            LocalStore::initialize(defaults(), JsonFileKv::open(&path), &reset_gate()).unwrap();
        assert_eq!(store.get("language"), "en");
        store.set("language", "nl");
        store.flush().await.unwrap();
    }

    let store = LocalStore::initialize(defaults(), JsonFileKv::open(&path), &false).unwrap();
    assert_eq!(store.get("language"), "nl");
}

#[tokio::test]
async fn test_events_follow_write_order() {
    let store = LocalStore::initialize(defaults(), SqliteKv::open_in_memory().unwrap(), &false)
        .unwrap();
    let mut events = store.subscribe();

    store.set("language", "a");
    store.set("sound", "false");
    store.set("language", "b");
    store.flush().await.unwrap();

    let mut keys = Vec::new();
    for _ in 0..3 {
        match events.recv().await.unwrap() {
            StoreEvent::Persisted { key } => keys.push(key),
            other => panic!("unexpected event: {:?}", other),
        }
    }
    assert_eq!(keys, vec!["language", "sound", "language"]);
}

#[tokio::test]
async fn test_defaults_loaded_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("defaults.toml");
    std::fs::write(
        &path,
        "language = \"sv\"\nmusic = true\nsound = true\nmaster_volume = 0.75\n",
    )
    .unwrap();

    let config = Configuration::load(&path).unwrap();
    let store =
        LocalStore::initialize(config, SqliteKv::open_in_memory().unwrap(), &false).unwrap();

    assert_eq!(store.get("language"), "sv");
    assert_eq!(store.get("master_volume"), "0.75");
}
