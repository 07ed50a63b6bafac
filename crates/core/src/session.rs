use crate::{Card, Clock, DeckError, DeckId, Hand, RemoteDeck, Timestamp, HAND_SIZE};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Persisted pointer to a remote deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckIdentity {
    pub id: DeckId,
    pub expiry: Timestamp,
}

impl DeckIdentity {
    pub fn is_live_at(&self, now: Timestamp) -> bool {
        now < self.expiry
    }
}

/// How a session came to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStart {
    /// The persisted deck is still alive; keep showing the persisted hand.
    Resumed(DeckSession),
    /// A new remote deck was allocated along with its opening hand.
    Created(DeckSession, Hand),
}

impl SessionStart {
    pub fn session(&self) -> &DeckSession {
        match self {
            SessionStart::Resumed(session) | SessionStart::Created(session, _) => session,
        }
    }
}

/// Immutable handle on one remote deck. Operations that change the deck's
/// lifetime hand back a new value instead of mutating this one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckSession {
    identity: DeckIdentity,
}

impl DeckSession {
    pub fn create_or_resume<R, C>(
        remote: &R,
        clock: &C,
        persisted: Option<DeckIdentity>,
    ) -> Result<SessionStart, DeckError>
    where
        R: RemoteDeck + ?Sized,
        C: Clock + ?Sized,
    {
        if let Some(identity) = persisted {
            if identity.is_live_at(clock.now()) {
                match remote.probe(&identity.id) {
                    Ok(()) => {
                        info!(deck_id = %identity.id, "resumed persisted deck");
                        return Ok(SessionStart::Resumed(DeckSession { identity }));
                    }
                    Err(err) => {
                        debug!(deck_id = %identity.id, error = %err, "persisted deck failed probe");
                    }
                }
            } else {
                debug!(deck_id = %identity.id, "persisted deck already expired");
            }
        }

        let (session, hand) = Self::create(remote)?;
        Ok(SessionStart::Created(session, hand))
    }

    /// Allocates a new remote deck and returns it with its opening hand.
    pub fn create<R>(remote: &R) -> Result<(DeckSession, Hand), DeckError>
    where
        R: RemoteDeck + ?Sized,
    {
        let created = remote.create()?;
        info!(deck_id = %created.id, expiry = %created.expiry, "created deck");
        let session = DeckSession {
            identity: DeckIdentity {
                id: created.id,
                expiry: created.expiry,
            },
        };
        Ok((session, created.hand))
    }

    pub fn id(&self) -> &DeckId {
        &self.identity.id
    }

    pub fn expiry(&self) -> Timestamp {
        self.identity.expiry
    }

    pub fn identity(&self) -> &DeckIdentity {
        &self.identity
    }

    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now > self.identity.expiry
    }

    /// Draws `count` cards, returned in the order the service dealt them.
    pub fn deal<R, C>(&self, remote: &R, clock: &C, count: usize) -> Result<Vec<Card>, DeckError>
    where
        R: RemoteDeck + ?Sized,
        C: Clock + ?Sized,
    {
        if count > HAND_SIZE {
            return Err(DeckError::InvalidArgument(format!(
                "cannot deal {count} cards into a hand of {HAND_SIZE}"
            )));
        }
        self.check_expiry(clock)?;
        let cards = remote.deal(self.id(), count)?;
        if cards.len() != count {
            return Err(DeckError::RemoteUnavailable(format!(
                "asked for {count} cards, service dealt {}",
                cards.len()
            )));
        }
        debug!(deck_id = %self.id(), count, "dealt cards");
        Ok(cards)
    }

    /// Resets the remote deck. The returned session carries the lifetime
    /// the service granted.
    pub fn restart<R, C>(&self, remote: &R, clock: &C) -> Result<(DeckSession, Hand), DeckError>
    where
        R: RemoteDeck + ?Sized,
        C: Clock + ?Sized,
    {
        self.check_expiry(clock)?;
        let restarted = remote.restart(self.id())?;
        debug!(deck_id = %self.id(), expiry = %restarted.expiry, "restarted deck");
        let session = DeckSession {
            identity: DeckIdentity {
                id: self.identity.id.clone(),
                expiry: restarted.expiry,
            },
        };
        Ok((session, restarted.hand))
    }

    pub fn duplicate(&self) -> DeckSession {
        DeckSession {
            identity: self.identity.clone(),
        }
    }

    fn check_expiry<C: Clock + ?Sized>(&self, clock: &C) -> Result<(), DeckError> {
        if self.is_expired_at(clock.now()) {
            return Err(DeckError::DeckExpired(self.identity.id.to_string()));
        }
        Ok(())
    }
}
