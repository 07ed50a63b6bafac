use fivedraw_core::{
    Card, Clock, DeckError, DeckId, GameController, Hand, ManualClock, MemoryStore, NewDeck,
    PersistenceStore, Rank, RemoteDeck, RestartedDeck, SelectionChange, Snapshot, StoreError,
    Suit, Timestamp, Transition, DEALT_KEY, DECK_KEY, HAND_KEY, HAND_SIZE,
};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::time::Duration;

const START_MS: u64 = 1_700_000_000_000;
const HOUR: Duration = Duration::from_secs(60 * 60);

/// In-memory stand-in for the deck service. Cards come off a fixed
/// sequence so every dealt card is distinct and predictable.
struct FakeRemote<'c> {
    clock: &'c ManualClock,
    next_card: Cell<usize>,
    decks_created: Cell<u32>,
    probe_ok: Cell<bool>,
    create_fails: Cell<bool>,
    fail_next_deal: RefCell<Option<DeckError>>,
    fail_next_restart: RefCell<Option<DeckError>>,
    scripted_hands: RefCell<VecDeque<Hand>>,
    calls: RefCell<Vec<String>>,
}

impl<'c> FakeRemote<'c> {
    fn new(clock: &'c ManualClock) -> Self {
        Self {
            clock,
            next_card: Cell::new(0),
            decks_created: Cell::new(0),
            probe_ok: Cell::new(true),
            create_fails: Cell::new(false),
            fail_next_deal: RefCell::new(None),
            fail_next_restart: RefCell::new(None),
            scripted_hands: RefCell::new(VecDeque::new()),
            calls: RefCell::new(Vec::new()),
        }
    }

    fn now(&self) -> Timestamp {
        self.clock.now()
    }

    fn card(&self) -> Card {
        let index = self.next_card.get();
        self.next_card.set(index + 1);
        // Skip aces so ace-rule tests control where aces appear.
        let ranks: Vec<Rank> = Rank::ALL
            .iter()
            .copied()
            .filter(|rank| *rank != Rank::Ace)
            .collect();
        let rank = ranks[index % ranks.len()];
        let suit = Suit::ALL[(index / ranks.len()) % Suit::ALL.len()];
        Card::new(rank, suit)
    }

    fn hand(&self) -> Hand {
        if let Some(hand) = self.scripted_hands.borrow_mut().pop_front() {
            return hand;
        }
        Hand::new([self.card(), self.card(), self.card(), self.card(), self.card()])
    }

    fn calls(&self, name: &str) -> usize {
        self.calls.borrow().iter().filter(|call| *call == name).count()
    }
}

impl RemoteDeck for FakeRemote<'_> {
    fn create(&self) -> Result<NewDeck, DeckError> {
        self.calls.borrow_mut().push("create".to_string());
        if self.create_fails.get() {
            return Err(DeckError::RemoteUnavailable("connection refused".to_string()));
        }
        self.decks_created.set(self.decks_created.get() + 1);
        Ok(NewDeck {
            id: DeckId::new(format!("deck-{}", self.decks_created.get())),
            expiry: self.now().saturating_add(HOUR),
            hand: self.hand(),
        })
    }

    fn probe(&self, id: &DeckId) -> Result<(), DeckError> {
        self.calls.borrow_mut().push("probe".to_string());
        if self.probe_ok.get() {
            Ok(())
        } else {
            Err(DeckError::DeckNotFound(id.to_string()))
        }
    }

    fn deal(&self, _id: &DeckId, count: usize) -> Result<Vec<Card>, DeckError> {
        self.calls.borrow_mut().push("deal".to_string());
        if let Some(err) = self.fail_next_deal.borrow_mut().take() {
            return Err(err);
        }
        Ok((0..count).map(|_| self.card()).collect())
    }

    fn restart(&self, _id: &DeckId) -> Result<RestartedDeck, DeckError> {
        self.calls.borrow_mut().push("restart".to_string());
        if let Some(err) = self.fail_next_restart.borrow_mut().take() {
            return Err(err);
        }
        Ok(RestartedDeck {
            expiry: self.now().saturating_add(HOUR * 2),
            hand: self.hand(),
        })
    }
}

fn clock() -> ManualClock {
    ManualClock::new(Timestamp::from_millis(START_MS))
}

fn hand_with_ace_at(position: usize) -> Hand {
    let mut cards = [Card::new(Rank::Nine, Suit::Clubs); HAND_SIZE];
    cards[position] = Card::new(Rank::Ace, Suit::Hearts);
    Hand::new(cards)
}

type Controller<'a> = GameController<&'a FakeRemote<'a>, &'a MemoryStore, &'a ManualClock>;

fn bootstrap<'a>(
    remote: &'a FakeRemote<'a>,
    store: &'a MemoryStore,
    clock: &'a ManualClock,
) -> Controller<'a> {
    GameController::bootstrap(remote, store, clock).expect("bootstrap")
}

#[test]
fn bootstrap_without_stored_round_creates_and_persists() {
    let clock = clock();
    let remote = FakeRemote::new(&clock);
    let store = MemoryStore::new();
    let game = bootstrap(&remote, &store, &clock);

    assert_eq!(game.session().id().as_str(), "deck-1");
    assert!(!game.dealt());
    assert!(game.selection().is_empty());
    assert!(game.can_draw());
    assert!(!game.can_restart());
    assert_eq!(remote.calls("probe"), 0);
    assert_eq!(Snapshot::load(&store, &clock), Some(game.snapshot()));
}

#[test]
fn bootstrap_fails_when_no_deck_can_be_created() {
    let clock = clock();
    let remote = FakeRemote::new(&clock);
    remote.create_fails.set(true);
    let store = MemoryStore::new();
    let result = GameController::bootstrap(&remote, &store, &clock);
    assert!(matches!(result, Err(DeckError::RemoteUnavailable(_))));
    assert!(store.is_empty());
}

#[test]
fn small_selections_toggle_without_ace_rule() {
    let clock = clock();
    let remote = FakeRemote::new(&clock);
    let store = MemoryStore::new();
    let mut game = bootstrap(&remote, &store, &clock);

    for index in [0, 1, 2] {
        assert_eq!(game.toggle_selection(index), SelectionChange::Added);
    }
    assert_eq!(game.toggle_selection(1), SelectionChange::Removed);
    assert_eq!(game.toggle_selection(4), SelectionChange::Added);
    assert_eq!(game.selection().iter().collect::<Vec<_>>(), vec![0, 2, 4]);
}

#[test]
fn fourth_selection_requires_the_kept_card_to_be_an_ace() {
    let clock = clock();
    let remote = FakeRemote::new(&clock);
    remote.scripted_hands.borrow_mut().push_back(hand_with_ace_at(2));
    let store = MemoryStore::new();
    let mut game = bootstrap(&remote, &store, &clock);

    for index in [0, 1, 3] {
        assert_eq!(game.toggle_selection(index), SelectionChange::Added);
    }
    assert_eq!(game.toggle_selection(2), SelectionChange::Rejected);
    assert_eq!(game.toggle_selection(4), SelectionChange::Added);
    assert_eq!(game.selection().len(), 4);
    assert_eq!(game.toggle_selection(2), SelectionChange::Rejected);
    assert_eq!(game.toggle_selection(4), SelectionChange::Removed);
    assert_eq!(game.selection().len(), 3);
}

#[test]
fn draw_replaces_selected_positions_in_ascending_order() {
    let clock = clock();
    let remote = FakeRemote::new(&clock);
    let store = MemoryStore::new();
    let mut game = bootstrap(&remote, &store, &clock);
    let before = *game.hand();

    game.toggle_selection(3);
    game.toggle_selection(0);
    let issued_before = remote.next_card.get();
    assert_eq!(game.draw().expect("draw"), Transition::Applied);

    // The fake deals cards in sequence, so rewind to see what it handed out.
    remote.next_card.set(issued_before);
    let first = remote.card();
    let second = remote.card();
    let after = game.hand().cards();
    assert_eq!(after[0], first);
    assert_eq!(after[3], second);
    for index in [1, 2, 4] {
        assert_eq!(after[index], before.cards()[index]);
    }
    assert!(game.dealt());
    assert!(game.selection().is_empty());
    assert_eq!(game.error_message(), None);
    assert_eq!(Snapshot::load(&store, &clock), Some(game.snapshot()));
}

#[test]
fn after_the_draw_toggles_only_clear_the_selection() {
    let clock = clock();
    let remote = FakeRemote::new(&clock);
    let store = MemoryStore::new();
    let mut game = bootstrap(&remote, &store, &clock);
    game.toggle_selection(1);
    game.draw().expect("draw");
    let hand = *game.hand();

    assert_eq!(game.toggle_selection(2), SelectionChange::Cleared);
    assert!(game.selection().is_empty());
    assert!(game.dealt());
    assert_eq!(game.hand(), &hand);
    assert!(!game.can_draw());
    assert!(game.can_restart());

    assert_eq!(game.draw().expect("draw"), Transition::Ignored);
    assert_eq!(remote.calls("deal"), 1);
}

#[test]
fn empty_draw_still_ends_the_round() {
    let clock = clock();
    let remote = FakeRemote::new(&clock);
    let store = MemoryStore::new();
    let mut game = bootstrap(&remote, &store, &clock);
    let hand = *game.hand();

    assert_eq!(game.draw().expect("draw"), Transition::Applied);
    assert!(game.dealt());
    assert_eq!(game.hand(), &hand);
    assert_eq!(store.get(DEALT_KEY).expect("get").as_deref(), Some("true"));
}

#[test]
fn expired_deck_recovers_without_calling_deal() {
    let clock = clock();
    let remote = FakeRemote::new(&clock);
    let store = MemoryStore::new();
    let mut game = bootstrap(&remote, &store, &clock);
    game.toggle_selection(0);

    clock.advance(HOUR * 2);
    let outcome = game.draw().expect("draw");
    assert!(matches!(
        outcome,
        Transition::Recovered(DeckError::DeckExpired(_))
    ));
    assert_eq!(remote.calls("deal"), 0);
    assert_eq!(game.session().id().as_str(), "deck-2");
    assert!(!game.dealt());
    assert!(game.selection().is_empty());
    assert!(game
        .error_message()
        .is_some_and(|message| message.contains("expired")));
}

#[test]
fn expired_deck_restart_recovers_without_calling_restart() {
    let clock = clock();
    let remote = FakeRemote::new(&clock);
    let store = MemoryStore::new();
    let mut game = bootstrap(&remote, &store, &clock);
    game.draw().expect("draw");

    clock.advance(HOUR + Duration::from_millis(1));
    let outcome = game.restart().expect("restart");
    assert!(matches!(
        outcome,
        Transition::Recovered(DeckError::DeckExpired(_))
    ));
    assert_eq!(remote.calls("restart"), 0);
}

#[test]
fn every_failure_kind_resets_onto_a_new_deck() {
    let failures = [
        DeckError::InvalidArgument("bad count".to_string()),
        DeckError::DeckExpired("deck-1".to_string()),
        DeckError::DeckNotFound("deck-1".to_string()),
        DeckError::RemoteUnavailable("500 Internal Server Error".to_string()),
    ];
    for failure in failures {
        let clock = clock();
        let remote = FakeRemote::new(&clock);
        let store = MemoryStore::new();
        let mut game = bootstrap(&remote, &store, &clock);
        let first_id = game.session().id().clone();
        game.toggle_selection(2);

        *remote.fail_next_deal.borrow_mut() = Some(failure.clone());
        let outcome = game.draw().expect("recovered");
        assert_eq!(outcome, Transition::Recovered(failure.clone()));
        assert_ne!(game.session().id(), &first_id);
        assert!(!game.dealt());
        assert!(game.selection().is_empty());
        assert_eq!(game.error_message(), Some(failure.to_string().as_str()));
        assert_eq!(Snapshot::load(&store, &clock), Some(game.snapshot()));

        game.draw().expect("draw");
        game.restart().expect("restart");
        *remote.fail_next_restart.borrow_mut() = Some(failure.clone());
        game.draw().expect("draw");
        let third_id = game.session().id().clone();
        let outcome = game.restart().expect("recovered");
        assert_eq!(outcome, Transition::Recovered(failure));
        assert_ne!(game.session().id(), &third_id);
        assert!(!game.dealt());
    }
}

#[test]
fn recovery_hand_is_the_new_decks_opening_hand() {
    let clock = clock();
    let remote = FakeRemote::new(&clock);
    let store = MemoryStore::new();
    let mut game = bootstrap(&remote, &store, &clock);
    let fresh = hand_with_ace_at(0);
    remote.scripted_hands.borrow_mut().push_back(fresh);
    *remote.fail_next_deal.borrow_mut() = Some(DeckError::DeckNotFound("deck-1".to_string()));

    game.draw().expect("recovered");
    assert_eq!(game.hand(), &fresh);
}

#[test]
fn failed_recovery_is_fatal() {
    let clock = clock();
    let remote = FakeRemote::new(&clock);
    let store = MemoryStore::new();
    let mut game = bootstrap(&remote, &store, &clock);
    *remote.fail_next_deal.borrow_mut() = Some(DeckError::DeckNotFound("deck-1".to_string()));
    remote.create_fails.set(true);

    let err = game.draw().expect_err("fatal");
    assert!(matches!(err, DeckError::RemoteUnavailable(_)));
    assert!(game.error_message().is_some());
}

#[test]
fn error_message_clears_on_next_success() {
    let clock = clock();
    let remote = FakeRemote::new(&clock);
    let store = MemoryStore::new();
    let mut game = bootstrap(&remote, &store, &clock);
    *remote.fail_next_deal.borrow_mut() =
        Some(DeckError::RemoteUnavailable("timeout".to_string()));

    game.draw().expect("recovered");
    assert!(game.error_message().is_some());
    game.draw().expect("draw");
    assert_eq!(game.error_message(), None);
}

#[test]
fn persisted_round_resumes_as_it_was() {
    let clock = clock();
    let remote = FakeRemote::new(&clock);
    let store = MemoryStore::new();
    let mut game = bootstrap(&remote, &store, &clock);
    game.toggle_selection(4);
    game.draw().expect("draw");
    let before = game.snapshot();
    drop(game);

    clock.advance(Duration::from_secs(60));
    let resumed = bootstrap(&remote, &store, &clock);
    assert_eq!(resumed.snapshot(), before);
    assert_eq!(resumed.session().identity(), &before.identity);
    assert!(resumed.dealt());
    assert_eq!(remote.calls("probe"), 1);
    assert_eq!(remote.calls("create"), 1);
}

#[test]
fn dead_persisted_deck_starts_a_new_round() {
    let clock = clock();
    let remote = FakeRemote::new(&clock);
    let store = MemoryStore::new();
    let mut game = bootstrap(&remote, &store, &clock);
    game.draw().expect("draw");
    drop(game);

    remote.probe_ok.set(false);
    let resumed = bootstrap(&remote, &store, &clock);
    assert_eq!(resumed.session().id().as_str(), "deck-2");
    assert!(!resumed.dealt());
}

#[test]
fn malformed_or_partial_snapshots_start_fresh() {
    let corruptions: [(&str, Option<&str>); 3] = [
        (DECK_KEY, None),
        (HAND_KEY, Some("not json")),
        (DECK_KEY, Some(r#"{"id":"deck-1"}"#)),
    ];
    for (key, value) in corruptions {
        let clock = clock();
        let remote = FakeRemote::new(&clock);
        let store = MemoryStore::new();
        drop(bootstrap(&remote, &store, &clock));
        match value {
            Some(value) => store.set(key, value).expect("set"),
            None => store.remove(key).expect("remove"),
        }

        let game = bootstrap(&remote, &store, &clock);
        assert_eq!(game.session().id().as_str(), "deck-2", "{key} {value:?}");
        assert_eq!(remote.calls("probe"), 0);
    }
}

#[test]
fn restart_resets_round_and_adopts_server_expiry() {
    let clock = clock();
    let remote = FakeRemote::new(&clock);
    let store = MemoryStore::new();
    let mut game = bootstrap(&remote, &store, &clock);
    let id = game.session().id().clone();
    let original_expiry = game.session().expiry();

    clock.advance(Duration::from_secs(30));
    assert_eq!(game.restart().expect("restart"), Transition::Applied);
    assert_eq!(game.session().id(), &id);
    assert_eq!(
        game.session().expiry(),
        Timestamp::from_millis(START_MS + 30_000).saturating_add(HOUR * 2)
    );
    assert_ne!(game.session().expiry(), original_expiry);
    assert!(!game.dealt());
    assert!(game.selection().is_empty());
    assert_eq!(Snapshot::load(&store, &clock), Some(game.snapshot()));
}

/// Memory store whose writes can be switched off, either for every key
/// or for one.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    refuse_all: Cell<bool>,
    refuse_key: Cell<Option<&'static str>>,
}

impl FlakyStore {
    fn refuses(&self, key: &str) -> bool {
        self.refuse_all.get() || self.refuse_key.get() == Some(key)
    }
}

impl PersistenceStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.refuses(key) {
            return Err(StoreError::Io(format!("disk full writing {key}")));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        if self.refuse_all.get() {
            return Err(StoreError::Io(format!("disk full removing {key}")));
        }
        self.inner.remove(key)
    }
}

#[test]
fn failed_writes_never_block_transitions() {
    let clock = clock();
    let remote = FakeRemote::new(&clock);
    let store = FlakyStore::default();
    store.refuse_all.set(true);
    let mut game = GameController::bootstrap(&remote, &store, &clock).expect("bootstrap");
    assert_eq!(game.session().id().as_str(), "deck-1");

    game.toggle_selection(1);
    let before = *game.hand();
    assert_eq!(game.draw().expect("draw"), Transition::Applied);
    assert!(game.dealt());
    assert_ne!(game.hand().cards()[1], before.cards()[1]);

    assert_eq!(game.restart().expect("restart"), Transition::Applied);
    assert!(!game.dealt());

    *remote.fail_next_deal.borrow_mut() = Some(DeckError::DeckNotFound("deck-1".to_string()));
    let outcome = game.draw().expect("recovered");
    assert!(matches!(outcome, Transition::Recovered(DeckError::DeckNotFound(_))));
    assert_eq!(game.session().id().as_str(), "deck-2");
    assert!(!game.dealt());
    assert!(game.error_message().is_some());

    assert!(store.inner.is_empty());
    assert_eq!(Snapshot::load(&store, &clock), None);
}

#[test]
fn interrupted_save_is_not_resumed_as_a_mixed_round() {
    let clock = clock();
    let remote = FakeRemote::new(&clock);
    let store = FlakyStore::default();
    let mut game = GameController::bootstrap(&remote, &store, &clock).expect("bootstrap");
    game.toggle_selection(0);
    game.draw().expect("draw");

    store.refuse_key.set(Some(HAND_KEY));
    *remote.fail_next_restart.borrow_mut() =
        Some(DeckError::RemoteUnavailable("timeout".to_string()));
    let outcome = game.restart().expect("recovered");
    assert!(matches!(outcome, Transition::Recovered(_)));
    assert_eq!(game.session().id().as_str(), "deck-2");
    drop(game);

    store.refuse_key.set(None);
    assert_eq!(Snapshot::load(&store, &clock), None);
    let probes_before = remote.calls("probe");
    let reloaded = GameController::bootstrap(&remote, &store, &clock).expect("bootstrap");
    assert_eq!(reloaded.session().id().as_str(), "deck-3");
    assert!(!reloaded.dealt());
    assert_eq!(remote.calls("probe"), probes_before);
    assert_eq!(Snapshot::load(&store, &clock), Some(reloaded.snapshot()));
}
