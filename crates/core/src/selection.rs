use crate::{Hand, HAND_SIZE};
use std::collections::BTreeSet;

/// Most positions a player may exchange without the ace-retention rule.
pub const MAX_PLAIN_SELECTION: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Added,
    Removed,
    /// The addition would break the selection cap; nothing changed.
    Rejected,
    /// The index does not name a hand position; nothing changed.
    OutOfRange,
    /// The round's draw already happened, so the selection was emptied.
    Cleared,
}

/// Hand positions marked for exchange, iterated in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    positions: BTreeSet<usize>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.positions.contains(&index)
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.positions.iter().copied()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }

    /// Flips `index` in or out. A fourth position is only let in when the
    /// one card left unselected is an ace; a fifth never is.
    pub fn toggle(&mut self, index: usize, hand: &Hand) -> SelectionChange {
        if index >= HAND_SIZE {
            return SelectionChange::OutOfRange;
        }
        if self.positions.remove(&index) {
            return SelectionChange::Removed;
        }
        if self.positions.len() >= MAX_PLAIN_SELECTION && !self.keeps_only_an_ace(index, hand) {
            return SelectionChange::Rejected;
        }
        self.positions.insert(index);
        SelectionChange::Added
    }

    fn keeps_only_an_ace(&self, adding: usize, hand: &Hand) -> bool {
        let mut remaining = (0..HAND_SIZE).filter(|pos| *pos != adding && !self.contains(*pos));
        match (remaining.next(), remaining.next()) {
            (Some(last), None) => hand.get(last).is_some_and(|card| card.is_ace()),
            _ => false,
        }
    }
}
