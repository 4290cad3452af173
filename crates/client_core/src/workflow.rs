//! Orchestrates the three submit flows against the catalog cache.
//!
//! Every flow runs `Idle -> Validating -> Submitting -> Succeeded | Failed ->
//! Idle`, or drops straight back to `Idle` when validation rejects the draft.
//! The state lock is never held across a network call, so flows may overlap.

use std::{collections::HashMap, future::Future};

use chrono::Utc;
use shared::{
    domain::{EventId, OrganizerId},
    error::ApiError,
    protocol::{Event, Organizer},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    cache::{CatalogCache, CatalogSnapshot, RefreshTicket},
    error::CatalogError,
    forms::{EventDraft, FormAction, FormState, OrganizerDraft, RegistrationDraft, RejectReason},
    transport::CatalogClient,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowKind {
    CreateOrganizer,
    CreateEvent,
    Register,
}

impl FlowKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::CreateOrganizer => "create_organizer",
            Self::CreateEvent => "create_event",
            Self::Register => "register",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FlowState {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed(ApiError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied(RefreshTicket),
    /// Fetched fine, but a newer refresh had already been applied.
    Superseded(RefreshTicket),
    Failed(ApiError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A local precondition failed; nothing was sent.
    Rejected(RejectReason),
    /// The backend accepted the mutation. The draft was reset and a refresh ran.
    Submitted { refresh: RefreshOutcome },
    /// The backend or the network refused the mutation. Draft kept.
    Failed(ApiError),
}

impl SubmitOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted { .. })
    }
}

#[derive(Debug, Clone)]
pub enum WorkflowEvent {
    FlowTransition { flow: FlowKind, state: FlowState },
    CatalogRefreshed {
        ticket: RefreshTicket,
        organizers: usize,
        events: usize,
    },
    RefreshDiscarded { ticket: RefreshTicket },
    Error(ApiError),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowOptions {
    /// Refuse dependent submissions whose selection is absent from the cache.
    pub strict_selection: bool,
}

struct WorkflowState {
    cache: CatalogCache,
    forms: FormState,
    flows: HashMap<FlowKind, FlowState>,
}

pub struct CatalogWorkflow<R: CatalogClient> {
    remote: R,
    options: WorkflowOptions,
    inner: Mutex<WorkflowState>,
    events: broadcast::Sender<WorkflowEvent>,
}

impl<R: CatalogClient> CatalogWorkflow<R> {
    pub fn new(remote: R) -> Self {
        Self::with_options(remote, WorkflowOptions::default())
    }

    pub fn with_options(remote: R, options: WorkflowOptions) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            remote,
            options,
            inner: Mutex::new(WorkflowState {
                cache: CatalogCache::default(),
                forms: FormState::default(),
                flows: HashMap::new(),
            }),
            events,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.events.subscribe()
    }

    pub async fn dispatch(&self, action: FormAction) {
        self.inner.lock().await.forms.apply(action);
    }

    pub async fn forms(&self) -> FormState {
        self.inner.lock().await.forms.clone()
    }

    pub async fn snapshot(&self) -> CatalogSnapshot {
        self.inner.lock().await.cache.snapshot().clone()
    }

    pub async fn flow_state(&self, flow: FlowKind) -> FlowState {
        self.inner
            .lock()
            .await
            .flows
            .get(&flow)
            .cloned()
            .unwrap_or_default()
    }

    /// Fetches organizers then events and replaces the cache with both, only
    /// when both fetches succeed.
    pub async fn refresh(&self) -> RefreshOutcome {
        let ticket = self.inner.lock().await.cache.begin_refresh();
        let (organizers, events) = match self.fetch_catalog().await {
            Ok(fetched) => fetched,
            Err(err) => {
                let err = ApiError::from(err);
                warn!(ticket = ticket.value(), error = %err, "catalog refresh failed");
                let _ = self.events.send(WorkflowEvent::Error(err.clone()));
                return RefreshOutcome::Failed(err);
            }
        };

        let (organizer_count, event_count) = (organizers.len(), events.len());
        let applied = self
            .inner
            .lock()
            .await
            .cache
            .apply(ticket, organizers, events, Utc::now());
        if applied {
            info!(
                ticket = ticket.value(),
                organizers = organizer_count,
                events = event_count,
                "catalog refreshed"
            );
            let _ = self.events.send(WorkflowEvent::CatalogRefreshed {
                ticket,
                organizers: organizer_count,
                events: event_count,
            });
            RefreshOutcome::Applied(ticket)
        } else {
            warn!(ticket = ticket.value(), "discarding out-of-order catalog refresh");
            let _ = self.events.send(WorkflowEvent::RefreshDiscarded { ticket });
            RefreshOutcome::Superseded(ticket)
        }
    }

    async fn fetch_catalog(&self) -> Result<(Vec<Organizer>, Vec<Event>), CatalogError> {
        let organizers = self.remote.list_organizers().await?;
        let events = self.remote.list_events().await?;
        Ok((organizers, events))
    }

    pub async fn create_organizer(&self) -> SubmitOutcome {
        self.run_flow(
            FlowKind::CreateOrganizer,
            |state| state.forms.organizer.to_request(),
            |request| async move { self.remote.create_organizer(&request).await },
            |forms| forms.organizer = OrganizerDraft::default(),
        )
        .await
    }

    /// The organizer selection survives a successful submission so several
    /// events can be created under it.
    pub async fn create_event(&self) -> SubmitOutcome {
        let strict = self.options.strict_selection;
        self.run_flow(
            FlowKind::CreateEvent,
            |state| {
                let organizer = state.forms.selections.organizer.as_ref();
                let request = state.forms.event.to_request(organizer)?;
                if strict {
                    ensure_known_organizer(state.cache.snapshot(), &request.organizer_id)?;
                }
                Ok(request)
            },
            |request| async move { self.remote.create_event(&request).await },
            |forms| forms.event = EventDraft::default(),
        )
        .await
    }

    /// The event selection survives a successful submission so several
    /// participants can be registered in a row.
    pub async fn register(&self) -> SubmitOutcome {
        let strict = self.options.strict_selection;
        self.run_flow(
            FlowKind::Register,
            |state| {
                let event = state.forms.selections.event.as_ref();
                let prepared = state.forms.registration.to_request(event)?;
                if strict {
                    ensure_known_event(state.cache.snapshot(), &prepared.0)?;
                }
                Ok(prepared)
            },
            |(event_id, request)| async move {
                self.remote.register_participant(&event_id, &request).await
            },
            |forms| forms.registration = RegistrationDraft::default(),
        )
        .await
    }

    async fn run_flow<T, P, S, Fut, Z>(
        &self,
        flow: FlowKind,
        prepare: P,
        send: S,
        reset: Z,
    ) -> SubmitOutcome
    where
        P: FnOnce(&WorkflowState) -> Result<T, RejectReason>,
        S: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<(), CatalogError>>,
        Z: FnOnce(&mut FormState),
    {
        self.transition(flow, FlowState::Validating).await;
        let prepared = {
            let guard = self.inner.lock().await;
            prepare(&*guard)
        };
        let request = match prepared {
            Ok(request) => request,
            Err(reason) => {
                debug!(flow = flow.name(), %reason, "submission rejected locally");
                self.transition(flow, FlowState::Idle).await;
                return SubmitOutcome::Rejected(reason);
            }
        };

        self.transition(flow, FlowState::Submitting).await;
        if let Err(err) = send(request).await {
            let err = ApiError::from(err);
            warn!(flow = flow.name(), error = %err, "submission failed");
            self.transition(flow, FlowState::Failed(err.clone())).await;
            let _ = self.events.send(WorkflowEvent::Error(err.clone()));
            self.transition(flow, FlowState::Idle).await;
            return SubmitOutcome::Failed(err);
        }

        reset(&mut self.inner.lock().await.forms);
        info!(flow = flow.name(), "submission accepted");
        self.transition(flow, FlowState::Succeeded).await;
        let refresh = self.refresh().await;
        self.transition(flow, FlowState::Idle).await;
        SubmitOutcome::Submitted { refresh }
    }

    async fn transition(&self, flow: FlowKind, state: FlowState) {
        debug!(flow = flow.name(), ?state, "flow transition");
        self.inner.lock().await.flows.insert(flow, state.clone());
        let _ = self
            .events
            .send(WorkflowEvent::FlowTransition { flow, state });
    }
}

fn ensure_known_organizer(
    snapshot: &CatalogSnapshot,
    id: &OrganizerId,
) -> Result<(), RejectReason> {
    snapshot
        .organizer(id)
        .map(|_| ())
        .ok_or(RejectReason::UnknownOrganizer)
}

fn ensure_known_event(snapshot: &CatalogSnapshot, id: &EventId) -> Result<(), RejectReason> {
    snapshot
        .event(id)
        .map(|_| ())
        .ok_or(RejectReason::UnknownEvent)
}

#[cfg(test)]
#[path = "tests/workflow_tests.rs"]
mod tests;
