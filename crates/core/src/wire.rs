//! JSON bodies exchanged with the deck service.

use crate::{Card, DeckError, DeckId, Hand, HandKind, NewDeck, RestartedDeck, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardsPayload {
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDeckResponse {
    pub deck_id: String,
    /// Epoch seconds.
    pub expires: f64,
    pub hand: CardsPayload,
}

impl TryFrom<NewDeckResponse> for NewDeck {
    type Error = DeckError;

    fn try_from(value: NewDeckResponse) -> Result<Self, Self::Error> {
        Ok(NewDeck {
            id: DeckId::new(value.deck_id),
            expiry: Timestamp::from_epoch_seconds(value.expires),
            hand: Hand::try_from(value.hand.cards)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckStatusResponse {
    pub deck_id: String,
    pub expires: f64,
    pub remaining: usize,
}

pub type DealResponse = CardsPayload;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestartResponse {
    pub hand: CardsPayload,
    pub expires: f64,
}

impl TryFrom<RestartResponse> for RestartedDeck {
    type Error = DeckError;

    fn try_from(value: RestartResponse) -> Result<Self, Self::Error> {
        Ok(RestartedDeck {
            expiry: Timestamp::from_epoch_seconds(value.expires),
            hand: Hand::try_from(value.hand.cards)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingResponse {
    pub ranking: String,
    pub kind: HandKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
