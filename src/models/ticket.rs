use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A ticket from the local mirror that still holds at least one live
/// downstream artifact (folder or archive case).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ticket {
    /// Local row id.
    pub id: i64,
    /// Id of the ticket in the helpdesk.
    pub ticket_ref: i64,
    /// Document folder provisioned for the ticket, if any, as recorded at
    /// candidate load time. Reconciliation re-reads the live value.
    pub folder_name: Option<String>,
}

/// A candidate with its closure resolved against the helpdesk.
///
/// `closed_at` of `None` means "not closed, or closure unknown"; the
/// ticket is left alone and picked up again on the next run. Serialized
/// as one line per candidate in snapshot files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCandidate {
    pub ticket: Ticket,
    pub closed_at: Option<DateTime<Utc>>,
}

/// A candidate whose closure cleared the retention cutoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiredCandidate {
    pub ticket: Ticket,
    pub closed_at: DateTime<Utc>,
}

/// One row of the ticket/archive-link join used for reconciliation.
///
/// Ticket columns repeat across the rows of a ticket with several links;
/// a ticket without links produces a single row with a null case id.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ArchiveLinkRow {
    pub ticket_id: i64,
    pub folder_name: Option<String>,
    pub folder_deleted: bool,
    pub archive_deleted: bool,
    pub archive_case_id: Option<String>,
}

/// An expired ticket with its reconciled downstream state, ready for
/// enqueueing and flag updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiredTicket {
    /// Local row id.
    pub id: i64,
    /// Id of the ticket in the helpdesk.
    pub ticket_ref: i64,
    /// When the ticket was closed.
    pub closed_at: DateTime<Utc>,
    /// Folder still live for this ticket. `None` also covers the
    /// empty-string folder names some rows carry.
    pub folder_name: Option<String>,
    /// Live archive cases, deduplicated and sorted.
    pub archive_case_ids: Vec<String>,
}
