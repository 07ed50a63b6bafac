use crate::store::{DealRefusal, DeckStore};
use fivedraw_core::wire::{
    CardsPayload, DeckStatusResponse, ErrorResponse, MessageResponse, NewDeckResponse,
    RankingResponse, RestartResponse,
};
use fivedraw_core::{evaluate_hand, Card, Clock, HAND_SIZE};
use serde::Serialize;
use serde_json::Value;
use std::sync::Mutex;
use tiny_http::Method;
use tracing::{info, warn};

/// Status code plus optional JSON body, independent of the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply {
    pub status: u16,
    pub body: Option<Value>,
}

impl ApiReply {
    fn ok<T: Serialize>(body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => Self {
                status: 200,
                body: Some(value),
            },
            Err(err) => Self::error(500, format!("failed to encode response: {err}")),
        }
    }

    fn empty(status: u16) -> Self {
        Self { status, body: None }
    }

    fn error(status: u16, detail: impl Into<String>) -> Self {
        let body = ErrorResponse {
            detail: detail.into(),
        };
        Self {
            status,
            body: serde_json::to_value(body).ok(),
        }
    }

    fn deck_not_found(id: &str) -> Self {
        Self::error(404, format!("Deck {id} not found"))
    }
}

pub struct DeckService {
    store: Mutex<DeckStore>,
    clock: Box<dyn Clock + Send + Sync>,
}

impl DeckService {
    pub fn new(store: DeckStore, clock: Box<dyn Clock + Send + Sync>) -> Self {
        Self {
            store: Mutex::new(store),
            clock,
        }
    }

    pub fn handle(&self, method: &Method, url: &str) -> ApiReply {
        let (path, query) = url.split_once('?').unwrap_or((url, ""));
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        match (method, segments.as_slice()) {
            (Method::Get, ["api", "v1", "hello"]) => ApiReply::ok(&MessageResponse {
                message: "Hello World!".to_string(),
            }),
            (Method::Get, ["api", "v1", "deal"]) => self.random_card(),
            (Method::Post, ["api", "v2", "deck", "new"]) => self.create_deck(),
            (Method::Get, ["api", "v2", "deck", "get-ranking"]) => rank_cards(query),
            (Method::Head, ["api", "v2", "deck", id]) => self.probe(id, false),
            (Method::Get, ["api", "v2", "deck", id]) => self.probe(id, true),
            (Method::Post, ["api", "v2", "deck", id, "deal", count]) => self.deal(id, count),
            (Method::Post, ["api", "v2", "deck", id, "restart-game"]) => self.restart(id),
            _ => ApiReply::error(404, "Not Found"),
        }
    }

    fn lock_store(&self) -> std::sync::MutexGuard<'_, DeckStore> {
        self.store
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn random_card(&self) -> ApiReply {
        match self.lock_store().random_card() {
            Some(card) => ApiReply::ok(&card),
            None => ApiReply::error(500, "no card available"),
        }
    }

    fn create_deck(&self) -> ApiReply {
        let now = self.clock.now();
        let mut store = self.lock_store();
        let (deck_id, expires, cards) = store.create(now);
        info!(deck_id = %deck_id, live_decks = store.len(), "created deck");
        drop(store);
        ApiReply::ok(&NewDeckResponse {
            deck_id,
            expires: expires.as_epoch_seconds(),
            hand: CardsPayload { cards },
        })
    }

    fn probe(&self, id: &str, with_body: bool) -> ApiReply {
        let now = self.clock.now();
        let mut store = self.lock_store();
        let Some(entry) = store.get(id, now) else {
            return ApiReply::deck_not_found(id);
        };
        if !with_body {
            return ApiReply::empty(200);
        }
        ApiReply::ok(&DeckStatusResponse {
            deck_id: id.to_string(),
            expires: entry.expires.as_epoch_seconds(),
            remaining: entry.deck.remaining(),
        })
    }

    fn deal(&self, id: &str, count: &str) -> ApiReply {
        let Ok(count) = count.parse::<usize>() else {
            return ApiReply::error(422, format!("count must be a non-negative integer, got {count:?}"));
        };
        let now = self.clock.now();
        match self.lock_store().deal(id, count, now) {
            Ok(cards) => ApiReply::ok(&CardsPayload { cards }),
            Err(DealRefusal::NotFound) => ApiReply::deck_not_found(id),
            Err(DealRefusal::Exhausted {
                requested,
                remaining,
            }) => {
                warn!(deck_id = id, requested, remaining, "deck has too few cards");
                ApiReply::error(500, "Deck has no cards left.")
            }
        }
    }

    fn restart(&self, id: &str) -> ApiReply {
        let now = self.clock.now();
        match self.lock_store().restart(id, now) {
            Some((expires, cards)) => {
                info!(deck_id = id, "restarted deck");
                ApiReply::ok(&RestartResponse {
                    hand: CardsPayload { cards },
                    expires: expires.as_epoch_seconds(),
                })
            }
            None => ApiReply::deck_not_found(id),
        }
    }
}

/// Ranks `cards=AS,10H,...` from the query string.
fn rank_cards(query: &str) -> ApiReply {
    let Some(raw) = url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "cards")
        .map(|(_, value)| value.into_owned())
    else {
        return ApiReply::error(422, "missing cards parameter");
    };
    let cards: Result<Vec<Card>, _> = raw.split(',').map(str::parse::<Card>).collect();
    let cards = match cards {
        Ok(cards) => cards,
        Err(err) => return ApiReply::error(422, err.to_string()),
    };
    if cards.len() != HAND_SIZE {
        return ApiReply::error(
            422,
            format!("expected {HAND_SIZE} cards, got {}", cards.len()),
        );
    }
    let kind = evaluate_hand(&cards);
    ApiReply::ok(&RankingResponse {
        ranking: kind.display_name().to_string(),
        kind,
    })
}
