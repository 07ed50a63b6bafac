use crate::{Clock, DeckIdentity, Hand, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub const DECK_KEY: &str = "deck";
pub const HAND_KEY: &str = "hand";
pub const DEALT_KEY: &str = "dealt";

/// String key/value storage that outlives the process.
pub trait PersistenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: PersistenceStore + ?Sized> PersistenceStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl PersistenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Everything needed to pick a round back up after a restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub identity: DeckIdentity,
    pub hand: Hand,
    pub dealt: bool,
}

impl Snapshot {
    /// Reads a complete snapshot. Missing, malformed, or expired pieces
    /// make the whole snapshot absent.
    pub fn load<S, C>(store: &S, clock: &C) -> Option<Snapshot>
    where
        S: PersistenceStore + ?Sized,
        C: Clock + ?Sized,
    {
        let identity: DeckIdentity = read_json(store, DECK_KEY)?;
        if !identity.is_live_at(clock.now()) {
            debug!(deck_id = %identity.id, "stored deck expired");
            return None;
        }
        let hand: Hand = read_json(store, HAND_KEY)?;
        let dealt = read_json::<S, bool>(store, DEALT_KEY).unwrap_or(false);
        Some(Snapshot {
            identity,
            hand,
            dealt,
        })
    }

    /// All or nothing: the deck pointer is taken down first and written
    /// back last, so an interrupted save reads as no round at all.
    pub fn save<S>(&self, store: &S) -> Result<(), StoreError>
    where
        S: PersistenceStore + ?Sized,
    {
        store.remove(DECK_KEY)?;
        let written = write_json(store, HAND_KEY, &self.hand)
            .and_then(|()| write_json(store, DEALT_KEY, &self.dealt))
            .and_then(|()| write_json(store, DECK_KEY, &self.identity));
        if written.is_err() {
            if let Err(err) = Self::clear(store) {
                warn!(error = %err, "failed to discard partial round");
            }
        }
        written
    }

    pub fn clear<S>(store: &S) -> Result<(), StoreError>
    where
        S: PersistenceStore + ?Sized,
    {
        for key in [DECK_KEY, HAND_KEY, DEALT_KEY] {
            store.remove(key)?;
        }
        Ok(())
    }
}

fn read_json<S, T>(store: &S, key: &str) -> Option<T>
where
    S: PersistenceStore + ?Sized,
    T: DeserializeOwned,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            warn!(key, error = %err, "failed to read stored value");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(key, error = %err, "ignoring malformed stored value");
            None
        }
    }
}

fn write_json<S, T>(store: &S, key: &str, value: &T) -> Result<(), StoreError>
where
    S: PersistenceStore + ?Sized,
    T: Serialize + ?Sized,
{
    let body = serde_json::to_string(value)?;
    store.set(key, &body)
}
