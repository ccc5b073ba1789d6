//! Keyed speculative snapshots

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use tally_core::{FigureId, UserId, VoteKind};

/// What a projected value tracks for one (user, figure) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectionKind {
    Vote(VoteKind),
    Rating,
    Streak,
}

impl fmt::Display for ProjectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vote(kind) => write!(f, "vote:{kind}"),
            Self::Rating => f.write_str("rating"),
            Self::Streak => f.write_str("streak"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectionKey {
    pub user_id: UserId,
    pub figure_id: FigureId,
    pub kind: ProjectionKind,
}

impl ProjectionKey {
    pub fn new(user_id: UserId, figure_id: FigureId, kind: ProjectionKind) -> Self {
        Self {
            user_id,
            figure_id,
            kind,
        }
    }

    pub fn vote(user_id: UserId, figure_id: FigureId, kind: VoteKind) -> Self {
        Self::new(user_id, figure_id, ProjectionKind::Vote(kind))
    }
}

impl fmt::Display for ProjectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.user_id, self.figure_id, self.kind)
    }
}

/// Projection errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    /// No confirmed snapshot has been recorded for the key
    NotLoaded(ProjectionKey),
    /// A speculative delta is already outstanding for the key
    InFlight(ProjectionKey),
    /// The ticket no longer matches the outstanding delta
    StaleTicket(ProjectionKey),
}

impl fmt::Display for ProjectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotLoaded(key) => write!(f, "No confirmed snapshot for {key}"),
            Self::InFlight(key) => write!(f, "An update for {key} is already in flight"),
            Self::StaleTicket(key) => write!(f, "Ticket for {key} is no longer outstanding"),
        }
    }
}

impl std::error::Error for ProjectionError {}

/// Handle to one outstanding speculative delta
///
/// Consumed by [`ProjectionStore::commit`] or [`ProjectionStore::rollback`].
#[derive(Debug, PartialEq, Eq)]
pub struct Ticket {
    key: ProjectionKey,
    id: u64,
}

impl Ticket {
    pub fn key(&self) -> &ProjectionKey {
        &self.key
    }
}

struct Slot<S> {
    confirmed: S,
    speculative: Option<(u64, S)>,
}

/// Confirmed and speculative snapshots keyed by (user, figure, kind)
///
/// At most one speculative delta is outstanding per key. Snapshots are
/// cloned on every transition, so a rollback restores the confirmed value
/// exactly as it was recorded.
pub struct ProjectionStore<S> {
    slots: DashMap<ProjectionKey, Slot<S>>,
    next_ticket: AtomicU64,
}

impl<S: Clone> Default for ProjectionStore<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Clone> ProjectionStore<S> {
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
            next_ticket: AtomicU64::new(1),
        }
    }

    /// Record an authoritative snapshot read from the store
    ///
    /// An outstanding speculative delta stays outstanding.
    pub fn confirmed(&self, key: ProjectionKey, snapshot: S) {
        match self.slots.entry(key) {
            Entry::Occupied(mut slot) => slot.get_mut().confirmed = snapshot,
            Entry::Vacant(slot) => {
                slot.insert(Slot {
                    confirmed: snapshot,
                    speculative: None,
                });
            }
        }
    }

    /// Apply a speculative delta to a copy of the confirmed snapshot
    pub fn begin<F>(&self, key: &ProjectionKey, apply: F) -> Result<Ticket, ProjectionError>
    where
        F: FnOnce(&mut S),
    {
        let mut slot = self
            .slots
            .get_mut(key)
            .ok_or_else(|| ProjectionError::NotLoaded(key.clone()))?;
        if slot.speculative.is_some() {
            return Err(ProjectionError::InFlight(key.clone()));
        }

        let mut view = slot.confirmed.clone();
        apply(&mut view);
        let id = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        slot.speculative = Some((id, view));

        debug!(key = %key, ticket = id, "Speculative update applied");
        Ok(Ticket {
            key: key.clone(),
            id,
        })
    }

    /// The transaction committed. The authoritative result, when the caller
    /// has one, replaces the speculative view as the new confirmed snapshot.
    pub fn commit(&self, ticket: Ticket, authoritative: Option<S>) -> Result<(), ProjectionError> {
        let mut slot = self.outstanding(&ticket)?;
        let speculative = slot.speculative.take().map(|(_, view)| view);
        if let Some(next) = authoritative.or(speculative) {
            slot.confirmed = next;
        }
        debug!(key = %ticket.key, ticket = ticket.id, "Speculative update confirmed");
        Ok(())
    }

    /// The transaction failed; discard the delta and return the restored snapshot
    pub fn rollback(&self, ticket: Ticket) -> Result<S, ProjectionError> {
        let mut slot = self.outstanding(&ticket)?;
        slot.speculative = None;
        debug!(key = %ticket.key, ticket = ticket.id, "Speculative update rolled back");
        Ok(slot.confirmed.clone())
    }

    /// Current view: the speculative value while one is outstanding
    pub fn view(&self, key: &ProjectionKey) -> Option<S> {
        self.slots.get(key).map(|slot| match &slot.speculative {
            Some((_, view)) => view.clone(),
            None => slot.confirmed.clone(),
        })
    }

    pub fn is_in_flight(&self, key: &ProjectionKey) -> bool {
        self.slots
            .get(key)
            .is_some_and(|slot| slot.speculative.is_some())
    }

    fn outstanding(
        &self,
        ticket: &Ticket,
    ) -> Result<dashmap::mapref::one::RefMut<'_, ProjectionKey, Slot<S>>, ProjectionError> {
        let slot = self
            .slots
            .get_mut(&ticket.key)
            .ok_or_else(|| ProjectionError::NotLoaded(ticket.key.clone()))?;
        match slot.speculative {
            Some((id, _)) if id == ticket.id => Ok(slot),
            _ => Err(ProjectionError::StaleTicket(ticket.key.clone())),
        }
    }
}
