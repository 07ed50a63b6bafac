use crate::{Card, DeckError, Rank};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub const HAND_SIZE: usize = 5;

/// The five visible cards. Positions are significant: exchanges write
/// back into the slot they replace.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Hand([Card; HAND_SIZE]);

impl Hand {
    pub fn new(cards: [Card; HAND_SIZE]) -> Self {
        Self(cards)
    }

    pub fn cards(&self) -> &[Card; HAND_SIZE] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&Card> {
        self.0.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.0.iter()
    }

    /// Writes `replacements` into `positions` in ascending position order.
    /// Every other slot keeps its card.
    pub fn replace_positions(
        &self,
        positions: impl IntoIterator<Item = usize>,
        replacements: &[Card],
    ) -> Result<Hand, DeckError> {
        let mut positions: Vec<usize> = positions.into_iter().collect();
        positions.sort_unstable();
        positions.dedup();
        if positions.len() != replacements.len() {
            return Err(DeckError::InvalidArgument(format!(
                "{} positions but {} replacement cards",
                positions.len(),
                replacements.len()
            )));
        }
        let mut cards = self.0;
        for (position, card) in positions.into_iter().zip(replacements) {
            let slot = cards.get_mut(position).ok_or_else(|| {
                DeckError::InvalidArgument(format!("hand position {position} out of range"))
            })?;
            *slot = *card;
        }
        Ok(Hand(cards))
    }

    pub fn kind(&self) -> HandKind {
        evaluate_hand(&self.0)
    }
}

impl TryFrom<Vec<Card>> for Hand {
    type Error = DeckError;

    fn try_from(cards: Vec<Card>) -> Result<Self, Self::Error> {
        let len = cards.len();
        let cards: [Card; HAND_SIZE] = cards.try_into().map_err(|_| {
            DeckError::RemoteUnavailable(format!("expected {HAND_SIZE} cards, got {len}"))
        })?;
        Ok(Hand(cards))
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<String> = self.0.iter().map(Card::to_string).collect();
        write!(f, "{}", codes.join(" "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HandKind {
    HighCard,
    OnePair,
    TwoPairs,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

impl HandKind {
    pub fn display_name(self) -> &'static str {
        match self {
            HandKind::HighCard => "High Card",
            HandKind::OnePair => "One Pair",
            HandKind::TwoPairs => "Two Pairs",
            HandKind::ThreeOfAKind => "Three of a Kind",
            HandKind::Straight => "Straight",
            HandKind::Flush => "Flush",
            HandKind::FullHouse => "Full House",
            HandKind::FourOfAKind => "Four of a Kind",
            HandKind::StraightFlush => "Straight Flush",
        }
    }
}

impl fmt::Display for HandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Ranks a five card hand. Shorter slices can only score pairs and sets.
pub fn evaluate_hand(cards: &[Card]) -> HandKind {
    if cards.is_empty() {
        return HandKind::HighCard;
    }

    let mut rank_counts: HashMap<Rank, usize> = HashMap::new();
    for card in cards {
        *rank_counts.entry(card.rank).or_insert(0) += 1;
    }
    let mut counts: Vec<usize> = rank_counts.values().copied().collect();
    counts.sort_by(|a, b| b.cmp(a));

    let full = cards.len() == HAND_SIZE;
    let is_flush = full && cards.iter().all(|card| card.suit == cards[0].suit);
    let is_straight = full && counts.len() == HAND_SIZE && is_straight(cards);

    if is_straight && is_flush {
        return HandKind::StraightFlush;
    }
    match counts.as_slice() {
        [4, ..] => return HandKind::FourOfAKind,
        [3, 2] => return HandKind::FullHouse,
        _ => {}
    }
    if is_flush {
        return HandKind::Flush;
    }
    if is_straight {
        return HandKind::Straight;
    }
    match counts.as_slice() {
        [3, ..] => HandKind::ThreeOfAKind,
        [2, 2, ..] => HandKind::TwoPairs,
        [2, ..] => HandKind::OnePair,
        _ => HandKind::HighCard,
    }
}

// Assumes distinct ranks.
fn is_straight(cards: &[Card]) -> bool {
    let mut values: Vec<u8> = cards.iter().map(|card| card.rank.value()).collect();
    values.sort_unstable();
    let consecutive = values.windows(2).all(|pair| pair[1] == pair[0] + 1);
    let wheel = values == [0, 1, 2, 3, Rank::Ace.value()];
    consecutive || wheel
}
