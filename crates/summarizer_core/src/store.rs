use std::sync::Mutex;

use crate::{JobId, JobPhase, JobRecord};

/// Shared store holding the single active job record.
///
/// Reads and writes are atomic at record granularity. `begin` always wins
/// (last trigger replaces any prior record); `finish` only lands if the stored
/// record still belongs to the finishing job and is not yet terminal.
pub trait JobStore: Send + Sync {
    /// Unconditionally replaces the current record with a fresh `Loading` one.
    fn begin(&self, record: JobRecord);

    /// Compare-and-set terminal write keyed by `job_id`.
    ///
    /// Returns `false` when the record was already replaced by a newer job or
    /// has already reached a terminal phase.
    fn finish(&self, job_id: JobId, phase: JobPhase) -> bool;

    /// Atomic snapshot of the current record, if any job ever started.
    fn current(&self) -> Option<JobRecord>;
}

#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    slot: Mutex<Option<JobRecord>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobStore for InMemoryJobStore {
    fn begin(&self, record: JobRecord) {
        let mut slot = self.slot.lock().expect("job store mutex poisoned");
        *slot = Some(record);
    }

    fn finish(&self, job_id: JobId, phase: JobPhase) -> bool {
        let mut slot = self.slot.lock().expect("job store mutex poisoned");
        match slot.as_mut() {
            Some(record) if record.job_id == job_id && !record.is_terminal() => {
                record.phase = phase;
                true
            }
            _ => false,
        }
    }

    fn current(&self) -> Option<JobRecord> {
        self.slot.lock().expect("job store mutex poisoned").clone()
    }
}

/// Read-only view of the saved API credential.
///
/// The settings surface that writes the credential lives outside this core.
pub trait CredentialStore: Send + Sync {
    fn api_key(&self) -> Option<String>;
}

#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    key: Mutex<Option<String>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: Mutex::new(Some(key.into())),
        }
    }

    pub fn set(&self, key: impl Into<String>) {
        let mut slot = self.key.lock().expect("credential mutex poisoned");
        *slot = Some(key.into());
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn api_key(&self) -> Option<String> {
        self.key
            .lock()
            .expect("credential mutex poisoned")
            .clone()
            .filter(|key| !key.trim().is_empty())
    }
}
