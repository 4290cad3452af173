//! Last-fetched snapshot of the remote catalog.
//!
//! A refresh takes a ticket before fetching. Results are applied only when
//! their ticket is newer than the last applied one, so a slow refresh that
//! finishes late cannot overwrite a fresher snapshot.

use chrono::{DateTime, Utc};
use shared::{
    domain::{EventId, OrganizerId},
    protocol::{Event, Organizer},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

impl RefreshTicket {
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    pub organizers: Vec<Organizer>,
    pub events: Vec<Event>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl CatalogSnapshot {
    pub fn organizer(&self, id: &OrganizerId) -> Option<&Organizer> {
        self.organizers.iter().find(|organizer| &organizer.id == id)
    }

    pub fn event(&self, id: &EventId) -> Option<&Event> {
        self.events.iter().find(|event| &event.id == id)
    }

    pub fn events_for(&self, organizer_id: &OrganizerId) -> impl Iterator<Item = &Event> {
        let organizer_id = organizer_id.clone();
        self.events
            .iter()
            .filter(move |event| event.organizer_id == organizer_id)
    }
}

#[derive(Debug, Default)]
pub struct CatalogCache {
    snapshot: CatalogSnapshot,
    issued: u64,
    applied: Option<RefreshTicket>,
}

impl CatalogCache {
    pub fn snapshot(&self) -> &CatalogSnapshot {
        &self.snapshot
    }

    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued += 1;
        RefreshTicket(self.issued)
    }

    /// Replaces both collections at once. Returns `false`, leaving the cache
    /// untouched, when a newer refresh has already been applied.
    pub fn apply(
        &mut self,
        ticket: RefreshTicket,
        organizers: Vec<Organizer>,
        events: Vec<Event>,
        fetched_at: DateTime<Utc>,
    ) -> bool {
        if self.applied.is_some_and(|applied| applied >= ticket) {
            return false;
        }
        self.snapshot = CatalogSnapshot {
            organizers,
            events,
            fetched_at: Some(fetched_at),
        };
        self.applied = Some(ticket);
        true
    }
}
