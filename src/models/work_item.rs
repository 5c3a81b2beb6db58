use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of deletion a work item instructs a downstream worker to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkItemKind {
    /// Delete a document folder.
    FolderDeletion,
    /// Delete an archive case.
    ArchiveCaseDeletion,
}

impl WorkItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkItemKind::FolderDeletion => "folder_deletion",
            WorkItemKind::ArchiveCaseDeletion => "archive_case_deletion",
        }
    }
}

impl std::fmt::Display for WorkItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A deletion instruction produced by the sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Unique identifier for this work item.
    pub id: Uuid,
    /// Kind of deletion to perform.
    pub kind: WorkItemKind,
    /// Helpdesk ticket the deletion belongs to.
    pub ticket_ref: i64,
    /// What to delete: a folder name or an archive case id, per `kind`.
    pub target: String,
    /// When the item was produced.
    pub created_at: DateTime<Utc>,
}

impl WorkItem {
    /// Create a folder deletion item.
    pub fn folder_deletion(ticket_ref: i64, folder_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: WorkItemKind::FolderDeletion,
            ticket_ref,
            target: folder_name.into(),
            created_at: Utc::now(),
        }
    }

    /// Create an archive case deletion item.
    pub fn archive_case_deletion(ticket_ref: i64, archive_case_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: WorkItemKind::ArchiveCaseDeletion,
            ticket_ref,
            target: archive_case_id.into(),
            created_at: Utc::now(),
        }
    }

    /// JSON payload consumed by the downstream worker. Exactly the two
    /// fields the worker contract names, keyed by `kind`.
    pub fn payload(&self) -> serde_json::Value {
        match self.kind {
            WorkItemKind::FolderDeletion => serde_json::json!({
                "ticket_ref": self.ticket_ref,
                "folder_name": self.target,
            }),
            WorkItemKind::ArchiveCaseDeletion => serde_json::json!({
                "ticket_ref": self.ticket_ref,
                "archive_case_id": self.target,
            }),
        }
    }
}
