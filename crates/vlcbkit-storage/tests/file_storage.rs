use tempfile::TempDir;
use vlcbkit_storage::{
    EventLayout, EventStore, FileStorage, Storage, StorageError, ERASED,
};

#[test]
fn test_open_creates_erased_image() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("node").join("eeprom.bin");

    let storage = FileStorage::open(&path, 64).unwrap();
    assert_eq!(storage.capacity(), 64);
    assert!(!storage.is_dirty());

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 64);
    assert!(bytes.iter().all(|&b| b == ERASED));
}

#[test]
fn test_writes_persist_only_after_commit() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("eeprom.bin");

    let mut storage = FileStorage::open(&path, 8).unwrap();
    storage.write(2, 0x42).unwrap();
    assert!(storage.is_dirty());
    assert_eq!(std::fs::read(&path).unwrap()[2], ERASED);

    storage.commit().unwrap();
    assert!(!storage.is_dirty());
    assert_eq!(std::fs::read(&path).unwrap()[2], 0x42);
}

#[test]
fn test_size_mismatch_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("eeprom.bin");
    std::fs::write(&path, [0u8; 10]).unwrap();

    let result = FileStorage::open(&path, 16);
    assert!(matches!(
        result,
        Err(StorageError::ImageSizeMismatch { expected: 16, found: 10 })
    ));
}

#[test]
fn test_learned_events_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("eeprom.bin");
    let layout = EventLayout::new(8, 2);

    {
        let storage = FileStorage::open(&path, layout.required_size()).unwrap();
        let mut store = EventStore::open(Box::new(storage), layout).unwrap();
        store.write_event(3, 0x0104, 0x0007).unwrap();
        store.update_ev_hash_entry(3).unwrap();
        store.write_event_variable(3, 2, 99).unwrap();
        store.commit().unwrap();
    }

    let storage = FileStorage::open(&path, layout.required_size()).unwrap();
    let store = EventStore::open(Box::new(storage), layout).unwrap();
    assert_eq!(store.lookup(0x0104, 0x0007), Some(3));
    assert_eq!(store.read_event_variable(3, 2).unwrap(), 99);
    assert_eq!(store.event_count(), 1);
}
