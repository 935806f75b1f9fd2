//! Event table
//!
//! A fixed number of slots persisted in [`Storage`], each holding an event
//! key and its event variables, plus an in-memory hash index used by the
//! consumer hot path.
//!
//! Slot record layout:
//!
//! ```text
//! +------+------+------+------+------+-----+-----+-----+
//! | flag | nnHi | nnLo | enHi | enLo | ev1 | ... | evN |
//! +------+------+------+------+------+-----+-----+-----+
//! ```
//!
//! `flag` is 0xFF (erased) for a free slot and 0x00 for an occupied one.
//!
//! Writing a slot does not touch the index. The key only becomes visible to
//! [`EventStore::lookup`] after [`EventStore::update_ev_hash_entry`] is called
//! for that slot, the same write-then-index order used when the table lives in
//! flash.

use crate::error::{EventStoreError, EventStoreResult, StorageError};
use crate::storage::{Storage, ERASED};
use vlcbkit_core::EventKey;

/// Number of hash buckets.
pub const HASH_LENGTH: usize = 128;

/// Bytes in a slot record before the event variables.
pub const SLOT_HEADER_LEN: usize = 5;

const SLOT_OCCUPIED: u8 = 0x00;

/// Hash an event key into `0..HASH_LENGTH`.
///
/// Spreads node and event numbers over the buckets using 8-bit arithmetic so
/// the result matches hashes computed by other node firmware.
pub fn event_hash(key: EventKey) -> u8 {
    let nn = key.node_number;
    let en = key.event_number;
    let hash = (nn ^ (nn >> 8)) as u8;
    let hash = hash.wrapping_mul(7).wrapping_add((en ^ (en >> 8)) as u8);
    hash % HASH_LENGTH as u8
}

/// Placement and shape of the event table within storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventLayout {
    /// First storage address used by slot 0
    pub base_address: usize,
    /// Number of slots
    pub max_events: u8,
    /// Event variables per slot
    pub num_evs: u8,
}

impl EventLayout {
    /// Layout starting at address 0
    pub fn new(max_events: u8, num_evs: u8) -> Self {
        Self {
            base_address: 0,
            max_events,
            num_evs,
        }
    }

    /// Move the table to a different base address
    pub fn with_base_address(mut self, base_address: usize) -> Self {
        self.base_address = base_address;
        self
    }

    /// Bytes occupied by one slot record
    pub fn slot_size(&self) -> usize {
        SLOT_HEADER_LEN + self.num_evs as usize
    }

    /// Storage bytes needed for the whole table
    pub fn required_size(&self) -> usize {
        self.base_address + self.slot_size() * self.max_events as usize
    }

    fn slot_address(&self, slot: u8) -> usize {
        self.base_address + self.slot_size() * slot as usize
    }
}

/// Contents of an occupied slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSlot {
    /// Slot index
    pub index: u8,
    /// Stored event key
    pub key: EventKey,
    /// Event variables, EV1 first
    pub event_variables: Vec<u8>,
}

/// Persisted event table with a hash index over its keys.
pub struct EventStore {
    storage: Box<dyn Storage>,
    layout: EventLayout,
    /// Candidate slots per hash bucket
    buckets: Vec<Vec<u8>>,
    /// Key each slot was indexed under by its last index update
    indexed_keys: Vec<Option<EventKey>>,
}

impl EventStore {
    /// Open the table over `storage` and index every occupied slot
    pub fn open(storage: Box<dyn Storage>, layout: EventLayout) -> EventStoreResult<Self> {
        let required = layout.required_size();
        if storage.capacity() < required {
            return Err(StorageError::TooSmall {
                required,
                capacity: storage.capacity(),
            }
            .into());
        }

        let mut store = Self {
            storage,
            layout,
            buckets: vec![Vec::new(); HASH_LENGTH],
            indexed_keys: vec![None; layout.max_events as usize],
        };
        store.rebuild_index()?;
        Ok(store)
    }

    /// The table layout
    pub fn layout(&self) -> EventLayout {
        self.layout
    }

    /// Number of slots
    pub fn max_events(&self) -> u8 {
        self.layout.max_events
    }

    /// Event variables per slot
    pub fn num_evs(&self) -> u8 {
        self.layout.num_evs
    }

    /// Find the slot holding `(node_number, event_number)`.
    ///
    /// Only slots whose index entry has been refreshed since their last write
    /// are considered. Never mutates the table.
    pub fn lookup(&self, node_number: u16, event_number: u16) -> Option<u8> {
        self.lookup_key(EventKey::new(node_number, event_number))
    }

    /// Find the slot holding `key`
    pub fn lookup_key(&self, key: EventKey) -> Option<u8> {
        let bucket = &self.buckets[event_hash(key) as usize];
        bucket.iter().copied().find(|&slot| {
            if self.indexed_keys[slot as usize] != Some(key) {
                return false;
            }
            // A slot rewritten since its last index update is not visible.
            match self.stored_key(slot) {
                Ok(Some(stored)) => stored == key,
                Ok(None) => false,
                Err(e) => {
                    tracing::warn!("Failed to read event slot {}: {}", slot, e);
                    false
                }
            }
        })
    }

    /// Store `(node_number, event_number)` in `slot`, replacing its key.
    ///
    /// Event variables are left as they are. Call
    /// [`update_ev_hash_entry`](Self::update_ev_hash_entry) afterwards to make
    /// the key visible to lookups.
    pub fn write_event(
        &mut self,
        slot: u8,
        node_number: u16,
        event_number: u16,
    ) -> EventStoreResult<()> {
        self.check_slot(slot)?;
        let key = EventKey::new(node_number, event_number);
        let mut record = [SLOT_OCCUPIED; SLOT_HEADER_LEN];
        record[1..].copy_from_slice(&key.to_bytes());
        self.storage
            .write_block(self.layout.slot_address(slot), &record)?;
        tracing::info!("Learned event {} in slot {}", key, slot);
        Ok(())
    }

    /// Refresh the index entry for `slot` from its stored key.
    ///
    /// Idempotent. A free slot is removed from the index.
    pub fn update_ev_hash_entry(&mut self, slot: u8) -> EventStoreResult<()> {
        self.check_slot(slot)?;

        if let Some(old) = self.indexed_keys[slot as usize].take() {
            self.buckets[event_hash(old) as usize].retain(|&s| s != slot);
        }

        if let Some(key) = self.stored_key(slot)? {
            let hash = event_hash(key);
            self.buckets[hash as usize].push(slot);
            self.indexed_keys[slot as usize] = Some(key);
        }
        Ok(())
    }

    /// Set event variable `ev_index` (1-based) of an occupied slot
    pub fn write_event_variable(&mut self, slot: u8, ev_index: u8, value: u8) -> EventStoreResult<()> {
        let address = self.ev_address(slot, ev_index)?;
        self.storage.write(address, value)?;
        Ok(())
    }

    /// Read event variable `ev_index` (1-based) of an occupied slot
    pub fn read_event_variable(&self, slot: u8, ev_index: u8) -> EventStoreResult<u8> {
        let address = self.ev_address(slot, ev_index)?;
        Ok(self.storage.read(address)?)
    }

    /// Read the key and event variables of an occupied slot
    pub fn read_event(&self, slot: u8) -> EventStoreResult<EventSlot> {
        self.check_slot(slot)?;
        let key = self
            .stored_key(slot)?
            .ok_or(EventStoreError::InvalidSlot { slot })?;

        let mut event_variables = vec![0u8; self.layout.num_evs as usize];
        self.storage.read_block(
            self.layout.slot_address(slot) + SLOT_HEADER_LEN,
            &mut event_variables,
        )?;

        Ok(EventSlot {
            index: slot,
            key,
            event_variables,
        })
    }

    /// True when `slot` holds an event
    pub fn is_occupied(&self, slot: u8) -> EventStoreResult<bool> {
        self.check_slot(slot)?;
        Ok(self.stored_key(slot)?.is_some())
    }

    /// Mark `slot` free.
    ///
    /// As with writes, the index keeps the old entry until
    /// [`update_ev_hash_entry`](Self::update_ev_hash_entry) is called.
    pub fn clear_event(&mut self, slot: u8) -> EventStoreResult<()> {
        self.check_slot(slot)?;
        let record = [ERASED; SLOT_HEADER_LEN];
        self.storage
            .write_block(self.layout.slot_address(slot), &record)?;
        tracing::info!("Cleared event slot {}", slot);
        Ok(())
    }

    /// Lowest free slot, if any
    pub fn find_free_slot(&self) -> Option<u8> {
        (0..self.layout.max_events).find(|&slot| matches!(self.stored_key(slot), Ok(None)))
    }

    /// Number of occupied slots
    pub fn event_count(&self) -> usize {
        (0..self.layout.max_events)
            .filter(|&slot| matches!(self.stored_key(slot), Ok(Some(_))))
            .count()
    }

    /// Erase every slot and empty the index
    pub fn clear_all(&mut self) -> EventStoreResult<()> {
        let erased = vec![ERASED; self.layout.required_size() - self.layout.base_address];
        self.storage
            .write_block(self.layout.base_address, &erased)?;
        self.buckets.iter_mut().for_each(Vec::clear);
        self.indexed_keys.iter_mut().for_each(|k| *k = None);
        tracing::info!("Cleared all {} event slots", self.layout.max_events);
        Ok(())
    }

    /// Rebuild the whole index from storage
    pub fn rebuild_index(&mut self) -> EventStoreResult<()> {
        self.buckets.iter_mut().for_each(Vec::clear);
        self.indexed_keys.iter_mut().for_each(|k| *k = None);
        for slot in 0..self.layout.max_events {
            self.update_ev_hash_entry(slot)?;
        }
        tracing::debug!(
            "Indexed {} of {} event slots",
            self.indexed_keys.iter().filter(|k| k.is_some()).count(),
            self.layout.max_events
        );
        Ok(())
    }

    /// Make pending writes durable
    pub fn commit(&mut self) -> EventStoreResult<()> {
        self.storage.commit()?;
        Ok(())
    }

    fn check_slot(&self, slot: u8) -> EventStoreResult<()> {
        if slot >= self.layout.max_events {
            return Err(EventStoreError::InvalidSlot { slot });
        }
        Ok(())
    }

    fn ev_address(&self, slot: u8, ev_index: u8) -> EventStoreResult<usize> {
        self.check_slot(slot)?;
        if ev_index == 0 || ev_index > self.layout.num_evs {
            return Err(EventStoreError::OutOfRange {
                ev_index,
                max: self.layout.num_evs,
            });
        }
        if self.stored_key(slot)?.is_none() {
            return Err(EventStoreError::InvalidSlot { slot });
        }
        Ok(self.layout.slot_address(slot) + SLOT_HEADER_LEN + ev_index as usize - 1)
    }

    fn stored_key(&self, slot: u8) -> Result<Option<EventKey>, StorageError> {
        let mut record = [0u8; SLOT_HEADER_LEN];
        self.storage
            .read_block(self.layout.slot_address(slot), &mut record)?;
        if record[0] != SLOT_OCCUPIED {
            return Ok(None);
        }
        Ok(Some(EventKey::from_bytes([
            record[1], record[2], record[3], record[4],
        ])))
    }
}

impl std::fmt::Debug for EventStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStore")
            .field("layout", &self.layout)
            .field("indexed", &self.indexed_keys.iter().filter(|k| k.is_some()).count())
            .finish()
    }
}
