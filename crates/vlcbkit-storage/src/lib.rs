//! # VLCBKit Storage
//!
//! Persisted event table for VLCB nodes: the byte-addressed storage
//! collaborator and the hashed event store built on it.

pub mod error;
pub mod event_store;
pub mod storage;

pub use error::{EventStoreError, EventStoreResult, StorageError, StorageResult};
pub use event_store::{event_hash, EventLayout, EventSlot, EventStore, HASH_LENGTH};
pub use storage::{FileStorage, MemoryStorage, Storage, ERASED};
