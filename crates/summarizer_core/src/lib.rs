//! Summarizer core: job records, store contracts, and view-model helpers.
mod job;
mod store;
mod view_model;

pub use job::{JobId, JobPhase, JobRecord, SourceKind};
pub use store::{CredentialStore, InMemoryCredentialStore, InMemoryJobStore, JobStore};
pub use view_model::{SummarySurface, SummaryView};
