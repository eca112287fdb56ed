use crate::{JobPhase, JobRecord, SourceKind};

/// Surface that presents summaries; opened when a job starts so it can begin
/// polling the store.
pub trait SummarySurface: Send + Sync {
    fn open(&self);
}

/// What the polling viewer should render for the current record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryView {
    /// Job still in flight; poll again.
    Pending { url: String },
    Ready {
        url: String,
        title: String,
        summary_html: String,
        badge_label: &'static str,
        badge_class: &'static str,
    },
    Failure {
        url: String,
        message: String,
    },
}

impl SummaryView {
    pub fn from_record(record: &JobRecord) -> Self {
        match &record.phase {
            JobPhase::Loading => SummaryView::Pending {
                url: record.url.clone(),
            },
            JobPhase::Done {
                title,
                summary_html,
                source,
            } => SummaryView::Ready {
                url: record.url.clone(),
                title: title.clone(),
                summary_html: summary_html.clone(),
                badge_label: badge_label(*source),
                badge_class: badge_class(*source),
            },
            JobPhase::Failed { message } => SummaryView::Failure {
                url: record.url.clone(),
                message: message.clone(),
            },
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, SummaryView::Pending { .. })
    }
}

fn badge_label(source: SourceKind) -> &'static str {
    match source {
        SourceKind::Youtube => "YouTube",
        SourceKind::Web => "Web",
    }
}

// The stylesheet keys off these exact class strings.
fn badge_class(source: SourceKind) -> &'static str {
    match source {
        SourceKind::Youtube => "badge badge-youtube",
        SourceKind::Web => "badge badge-web",
    }
}
