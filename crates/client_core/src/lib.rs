//! Client-side state for the competitions catalog: a cached snapshot of
//! organizers and events, the drafts and selections a user edits, and the
//! workflow that submits them and keeps the snapshot in step with the backend.

pub mod cache;
pub mod error;
pub mod forms;
pub mod transport;
pub mod workflow;

pub use cache::{CatalogCache, CatalogSnapshot, RefreshTicket};
pub use error::CatalogError;
pub use forms::{FormAction, FormState, RejectReason};
pub use transport::{CatalogClient, HttpCatalogClient, DEFAULT_BACKEND_URL};
pub use workflow::{
    CatalogWorkflow, FlowKind, FlowState, RefreshOutcome, SubmitOutcome, WorkflowEvent,
    WorkflowOptions,
};
