use crate::{Card, DeckError, Hand, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier the deck service hands out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeckId(String);

impl DeckId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDeck {
    pub id: DeckId,
    pub expiry: Timestamp,
    pub hand: Hand,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartedDeck {
    pub expiry: Timestamp,
    pub hand: Hand,
}

/// The four calls the deck service answers. Implementations report
/// unknown decks as `DeckNotFound` and everything else that goes wrong
/// on the wire as `RemoteUnavailable`.
pub trait RemoteDeck {
    fn create(&self) -> Result<NewDeck, DeckError>;

    fn probe(&self, id: &DeckId) -> Result<(), DeckError>;

    fn deal(&self, id: &DeckId, count: usize) -> Result<Vec<Card>, DeckError>;

    fn restart(&self, id: &DeckId) -> Result<RestartedDeck, DeckError>;
}

impl<R: RemoteDeck + ?Sized> RemoteDeck for &R {
    fn create(&self) -> Result<NewDeck, DeckError> {
        (**self).create()
    }

    fn probe(&self, id: &DeckId) -> Result<(), DeckError> {
        (**self).probe(id)
    }

    fn deal(&self, id: &DeckId, count: usize) -> Result<Vec<Card>, DeckError> {
        (**self).deal(id, count)
    }

    fn restart(&self, id: &DeckId) -> Result<RestartedDeck, DeckError> {
        (**self).restart(id)
    }
}
