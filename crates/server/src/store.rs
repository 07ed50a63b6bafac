use crate::config::DECK_ID_LEN;
use fivedraw_core::{Card, Deck, RngState, Timestamp, HAND_SIZE};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

#[derive(Debug)]
pub struct DeckEntry {
    pub deck: Deck,
    pub expires: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DealRefusal {
    NotFound,
    Exhausted { requested: usize, remaining: usize },
}

/// Live decks keyed by id. Expired decks are dropped the next time
/// anyone asks for them.
#[derive(Debug)]
pub struct DeckStore {
    decks: HashMap<String, DeckEntry>,
    rng: RngState,
    ttl: Duration,
}

impl DeckStore {
    pub fn new(rng: RngState, ttl: Duration) -> Self {
        Self {
            decks: HashMap::new(),
            rng,
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.decks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decks.is_empty()
    }

    /// Shuffles a new deck and deals its opening hand. Decks that have
    /// expired by `now` are dropped first.
    pub fn create(&mut self, now: Timestamp) -> (String, Timestamp, Vec<Card>) {
        self.purge_expired(now);
        let id = self.unique_id();
        let mut deck = Deck::shuffled(&mut self.rng);
        let hand = deck.draw_cards(HAND_SIZE).unwrap_or_default();
        let expires = now.saturating_add(self.ttl);
        self.decks.insert(id.clone(), DeckEntry { deck, expires });
        (id, expires, hand)
    }

    pub fn get(&mut self, id: &str, now: Timestamp) -> Option<&DeckEntry> {
        self.live_entry(id, now).map(|entry| &*entry)
    }

    pub fn deal(&mut self, id: &str, count: usize, now: Timestamp) -> Result<Vec<Card>, DealRefusal> {
        let entry = self.live_entry(id, now).ok_or(DealRefusal::NotFound)?;
        let remaining = entry.deck.remaining();
        entry.deck.draw_cards(count).ok_or(DealRefusal::Exhausted {
            requested: count,
            remaining,
        })
    }

    /// Replaces the deck behind `id` with a fresh shuffle and renews its
    /// lifetime.
    pub fn restart(&mut self, id: &str, now: Timestamp) -> Option<(Timestamp, Vec<Card>)> {
        self.live_entry(id, now)?;
        let mut deck = Deck::shuffled(&mut self.rng);
        let hand = deck.draw_cards(HAND_SIZE).unwrap_or_default();
        let expires = now.saturating_add(self.ttl);
        self.decks.insert(id.to_string(), DeckEntry { deck, expires });
        Some((expires, hand))
    }

    pub fn random_card(&mut self) -> Option<Card> {
        let deck = Deck::standard52();
        self.rng.choose(&deck.draw).copied()
    }

    fn purge_expired(&mut self, now: Timestamp) {
        let before = self.decks.len();
        self.decks.retain(|_, entry| entry.expires >= now);
        let purged = before - self.decks.len();
        if purged > 0 {
            debug!(purged, "dropped expired decks");
        }
    }

    fn live_entry(&mut self, id: &str, now: Timestamp) -> Option<&mut DeckEntry> {
        let expired = self.decks.get(id)?.expires < now;
        if expired {
            debug!(deck_id = id, "dropping expired deck");
            self.decks.remove(id);
            return None;
        }
        self.decks.get_mut(id)
    }

    fn unique_id(&mut self) -> String {
        loop {
            let id = self.rng.token(DECK_ID_LEN);
            if !self.decks.contains_key(&id) {
                return id;
            }
        }
    }
}
