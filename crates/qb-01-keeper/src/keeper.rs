//! # Keeper
//!
//! Typed access to bridge state with a per-message write-set.
//!
//! All writes land in the write-set first. `commit()` flushes them through
//! one `atomic_batch_write` and publishes the buffered events; `discard()`
//! drops both, leaving the store as it was before the message.

use crate::error::{KeeperError, KeeperResult};
use crate::keys;
use crate::ports::events::EventSink;
use crate::ports::store::{BatchOperation, KeyValueStore};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{BridgeEvent, ConstantValues};
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

/// Position in the current write-set that a handler can roll back to.
///
/// Only valid for the message it was taken in.
#[derive(Clone, Debug)]
pub struct Checkpoint {
    write_set: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
    events: usize,
}

pub struct Keeper {
    store: Box<dyn KeyValueStore>,
    /// `None` marks a pending delete.
    write_set: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
    pending_events: Vec<BridgeEvent>,
    sink: Arc<dyn EventSink>,
    constants: ConstantValues,
    height: u64,
}

impl Keeper {
    pub fn new(
        store: Box<dyn KeyValueStore>,
        sink: Arc<dyn EventSink>,
        constants: ConstantValues,
    ) -> Self {
        Self {
            store,
            write_set: BTreeMap::new(),
            pending_events: Vec::new(),
            sink,
            constants,
            height: 0,
        }
    }

    pub fn block_height(&self) -> u64 {
        self.height
    }

    pub fn set_block_height(&mut self, height: u64) {
        self.height = height;
    }

    /// Compiled-in constants, before mimir overrides.
    pub fn constants(&self) -> &ConstantValues {
        &self.constants
    }

    // =========================================================================
    // WRITE-SET LIFECYCLE
    // =========================================================================

    /// Start a message. Leftovers from an unfinished message are dropped.
    pub fn begin(&mut self) {
        if self.has_pending_writes() {
            warn!(
                writes = self.write_set.len(),
                events = self.pending_events.len(),
                "[qb-01] Dropping unfinished write-set"
            );
            self.discard();
        }
    }

    /// Flush the write-set atomically and publish buffered events.
    pub fn commit(&mut self) -> KeeperResult<()> {
        let write_set = std::mem::take(&mut self.write_set);
        let operations: Vec<BatchOperation> = write_set
            .into_iter()
            .map(|(key, value)| match value {
                Some(value) => BatchOperation::put(key, value),
                None => BatchOperation::delete(key),
            })
            .collect();
        let count = operations.len();

        if let Err(e) = self.store.atomic_batch_write(operations) {
            self.pending_events.clear();
            return Err(e.into());
        }

        let events = std::mem::take(&mut self.pending_events);
        debug!(
            writes = count,
            events = events.len(),
            height = self.height,
            "[qb-01] Committed write-set"
        );
        if !events.is_empty() {
            self.sink.publish(events);
        }
        Ok(())
    }

    /// Drop every write and event of the current message.
    pub fn discard(&mut self) {
        self.write_set.clear();
        self.pending_events.clear();
    }

    /// Mark the current write-set so a failed sub-step can be undone
    /// without dropping the rest of the message.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            write_set: self.write_set.clone(),
            events: self.pending_events.len(),
        }
    }

    /// Undo every write and event since `checkpoint` was taken.
    pub fn rollback_to(&mut self, checkpoint: Checkpoint) {
        debug!(
            dropped_events = self.pending_events.len().saturating_sub(checkpoint.events),
            "[qb-01] Rolled back to checkpoint"
        );
        self.write_set = checkpoint.write_set;
        self.pending_events.truncate(checkpoint.events);
    }

    pub fn has_pending_writes(&self) -> bool {
        !self.write_set.is_empty() || !self.pending_events.is_empty()
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    /// Buffer an audit event until commit.
    pub fn emit(&mut self, event: BridgeEvent) {
        self.pending_events.push(event);
    }

    pub fn pending_events(&self) -> &[BridgeEvent] {
        &self.pending_events
    }

    // =========================================================================
    // RAW TYPED ACCESS
    // =========================================================================

    pub fn get<T: DeserializeOwned>(&self, key: &[u8]) -> KeeperResult<Option<T>> {
        let raw = match self.write_set.get(key) {
            Some(Some(value)) => Some(value.clone()),
            Some(None) => None,
            None => self.store.get(key)?,
        };
        raw.map(|bytes| decode(key, &bytes)).transpose()
    }

    pub fn set<T: Serialize>(&mut self, key: Vec<u8>, value: &T) -> KeeperResult<()> {
        let bytes = bincode::serialize(value).map_err(|e| KeeperError::Codec {
            key: keys::display(&key),
            reason: e.to_string(),
        })?;
        self.write_set.insert(key, Some(bytes));
        Ok(())
    }

    pub fn delete(&mut self, key: Vec<u8>) {
        self.write_set.insert(key, None);
    }

    pub fn has(&self, key: &[u8]) -> KeeperResult<bool> {
        match self.write_set.get(key) {
            Some(value) => Ok(value.is_some()),
            None => Ok(self.store.exists(key)?),
        }
    }

    /// Lazy iterator over every record under `prefix`, in key order, with the
    /// write-set overlaid on the store.
    pub fn iter<T: DeserializeOwned>(&self, prefix: &str) -> KeeperResult<TypedIter<T>> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> =
            self.store.prefix_scan(prefix.as_bytes())?.into_iter().collect();

        for (key, value) in self
            .write_set
            .range(prefix.as_bytes().to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix.as_bytes()))
        {
            match value {
                Some(bytes) => {
                    merged.insert(key.clone(), bytes.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }

        Ok(TypedIter {
            inner: merged.into_iter(),
            _marker: PhantomData,
        })
    }
}

/// Records under one prefix, decoded one at a time as the caller advances.
pub struct TypedIter<T> {
    inner: std::collections::btree_map::IntoIter<Vec<u8>, Vec<u8>>,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> TypedIter<T> {
    /// Yield `(key, record)` pairs instead of bare records.
    pub fn with_keys(self) -> impl Iterator<Item = KeeperResult<(Vec<u8>, T)>> {
        self.inner
            .map(|(key, bytes)| decode(&key, &bytes).map(|value| (key, value)))
    }
}

impl<T: DeserializeOwned> Iterator for TypedIter<T> {
    type Item = KeeperResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let (key, bytes) = self.inner.next()?;
        Some(decode(&key, &bytes))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

fn decode<T: DeserializeOwned>(key: &[u8], bytes: &[u8]) -> KeeperResult<T> {
    bincode::deserialize(bytes).map_err(|e| KeeperError::Codec {
        key: keys::display(key),
        reason: e.to_string(),
    })
}
