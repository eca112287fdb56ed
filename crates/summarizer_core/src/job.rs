use serde::{Deserialize, Serialize};

pub type JobId = u64;

/// Where the summarized content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Web,
    Youtube,
}

/// Lifecycle of a single summarization job.
///
/// A job is created `Loading`, transitions exactly once to `Done` or `Failed`,
/// and is never mutated again. The next trigger replaces the whole record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobPhase {
    Loading,
    Done {
        title: String,
        summary_html: String,
        source: SourceKind,
    },
    Failed {
        message: String,
    },
}

impl JobPhase {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobPhase::Loading)
    }
}

/// The single persisted record for the active job, versioned by `job_id`.
///
/// The identifier lets terminal writes be compare-and-set: a pipeline that was
/// displaced by a newer trigger cannot overwrite the newer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: JobId,
    pub url: String,
    pub phase: JobPhase,
}

impl JobRecord {
    pub fn loading(job_id: JobId, url: impl Into<String>) -> Self {
        Self {
            job_id,
            url: url.into(),
            phase: JobPhase::Loading,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }
}
