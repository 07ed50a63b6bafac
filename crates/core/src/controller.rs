use crate::{
    Clock, DeckError, DeckSession, Hand, HandKind, PersistenceStore, RemoteDeck, Selection,
    SelectionChange, SessionStart, Snapshot,
};
use tracing::{debug, info, warn};

/// Result of a draw or restart that did not end the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Applied,
    /// Not allowed in the current round state; nothing changed.
    Ignored,
    /// The operation failed and the round was restarted on a fresh deck.
    Recovered(DeckError),
}

/// Drives one player's round against a remote deck: selection rules,
/// the single exchange per round, restarts, and recovery. Every confirmed
/// transition is written to the store before the call returns.
pub struct GameController<R, S, C> {
    remote: R,
    store: S,
    clock: C,
    session: DeckSession,
    hand: Hand,
    selection: Selection,
    dealt: bool,
    error_message: Option<String>,
}

impl<R, S, C> GameController<R, S, C>
where
    R: RemoteDeck,
    S: PersistenceStore,
    C: Clock,
{
    /// Picks up the stored round when its deck is still alive, otherwise
    /// starts a new one. Failing to create a deck is fatal.
    pub fn bootstrap(remote: R, store: S, clock: C) -> Result<Self, DeckError> {
        let (session, hand, dealt) = match Snapshot::load(&store, &clock) {
            Some(snapshot) => {
                let start =
                    DeckSession::create_or_resume(&remote, &clock, Some(snapshot.identity))?;
                match start {
                    SessionStart::Resumed(session) => (session, snapshot.hand, snapshot.dealt),
                    SessionStart::Created(session, hand) => (session, hand, false),
                }
            }
            None => {
                debug!("no usable stored round");
                let (session, hand) = DeckSession::create(&remote)?;
                (session, hand, false)
            }
        };

        let controller = Self {
            remote,
            store,
            clock,
            session,
            hand,
            selection: Selection::new(),
            dealt,
            error_message: None,
        };
        controller.persist();
        Ok(controller)
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn hand_kind(&self) -> HandKind {
        self.hand.kind()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn dealt(&self) -> bool {
        self.dealt
    }

    pub fn session(&self) -> &DeckSession {
        &self.session
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn can_draw(&self) -> bool {
        !self.dealt
    }

    pub fn can_restart(&self) -> bool {
        self.dealt
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            identity: self.session.identity().clone(),
            hand: self.hand,
            dealt: self.dealt,
        }
    }

    pub fn toggle_selection(&mut self, index: usize) -> SelectionChange {
        if self.dealt {
            self.selection.clear();
            return SelectionChange::Cleared;
        }
        self.selection.toggle(index, &self.hand)
    }

    /// Exchanges the selected cards. An empty selection still uses up the
    /// round's draw.
    pub fn draw(&mut self) -> Result<Transition, DeckError> {
        if self.dealt {
            return Ok(Transition::Ignored);
        }
        let result = self
            .session
            .deal(&self.remote, &self.clock, self.selection.len())
            .and_then(|cards| self.hand.replace_positions(self.selection.iter(), &cards));
        match result {
            Ok(hand) => {
                info!(
                    deck_id = %self.session.id(),
                    exchanged = self.selection.len(),
                    "exchanged cards"
                );
                self.hand = hand;
                self.selection.clear();
                self.dealt = true;
                self.session = self.session.duplicate();
                self.error_message = None;
                self.persist();
                Ok(Transition::Applied)
            }
            Err(err) => self.recover(err),
        }
    }

    pub fn restart(&mut self) -> Result<Transition, DeckError> {
        match self.session.restart(&self.remote, &self.clock) {
            Ok((session, hand)) => {
                info!(deck_id = %session.id(), expiry = %session.expiry(), "restarted round");
                self.session = session;
                self.hand = hand;
                self.selection.clear();
                self.dealt = false;
                self.error_message = None;
                self.persist();
                Ok(Transition::Applied)
            }
            Err(err) => self.recover(err),
        }
    }

    // Never retries the failed call; the round starts over on a new deck.
    fn recover(&mut self, err: DeckError) -> Result<Transition, DeckError> {
        warn!(
            deck_id = %self.session.id(),
            kind = err.kind(),
            error = %err,
            "deck operation failed, starting over"
        );
        self.error_message = Some(err.to_string());
        if !err.recoverable_by_reset() {
            return Err(err);
        }
        let (session, hand) = DeckSession::create(&self.remote)?;
        self.session = session;
        self.hand = hand;
        self.selection.clear();
        self.dealt = false;
        self.persist();
        Ok(Transition::Recovered(err))
    }

    fn persist(&self) {
        if let Err(err) = self.snapshot().save(&self.store) {
            warn!(deck_id = %self.session.id(), error = %err, "failed to persist round");
        }
    }
}
