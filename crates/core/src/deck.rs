use crate::{Card, Rank, RngState, Suit};

/// Server-side pile of cards. The top of the deck is the end of `draw`.
#[derive(Debug, Default, Clone)]
pub struct Deck {
    pub draw: Vec<Card>,
}

impl Deck {
    pub fn standard52() -> Self {
        let mut draw = Vec::with_capacity(52);
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                draw.push(Card::new(rank, suit));
            }
        }
        Self { draw }
    }

    pub fn shuffled(rng: &mut RngState) -> Self {
        let mut deck = Self::standard52();
        deck.shuffle(rng);
        deck
    }

    pub fn shuffle(&mut self, rng: &mut RngState) {
        rng.shuffle(&mut self.draw);
    }

    pub fn remaining(&self) -> usize {
        self.draw.len()
    }

    /// Takes `count` cards off the top, or nothing when fewer are left.
    pub fn draw_cards(&mut self, count: usize) -> Option<Vec<Card>> {
        if count > self.draw.len() {
            return None;
        }
        let mut cards = Vec::with_capacity(count);
        for _ in 0..count {
            if let Some(card) = self.draw.pop() {
                cards.push(card);
            }
        }
        Some(cards)
    }
}
