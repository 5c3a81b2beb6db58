//! The retention sweep itself.

use std::path::Path;
use std::time::Instant;

use chrono::{Duration, Utc};
use thiserror::Error;

use crate::config::{CustodianConfig, SnapshotMode};
use crate::db::{DbError, DbPool, RunSession};
use crate::helpdesk::HelpdeskClient;
use crate::models::{ResolvedCandidate, WorkItem};
use crate::queue::WorkQueue;

use super::snapshot::SnapshotError;
use super::{filter, reconcile, resolver, snapshot};

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// Results from a single sweep run.
#[derive(Debug, Default)]
pub struct SweepRunResult {
    /// Number of candidate tickets considered.
    pub candidates: u64,
    /// Number of candidates with a resolved closure date.
    pub resolved: u64,
    /// Number of tickets past the retention window.
    pub expired: u64,
    /// Folder deletion work items enqueued.
    pub folder_items: u64,
    /// Archive case deletion work items enqueued.
    pub archive_items: u64,
    /// Work items that failed to enqueue and will be retried next run.
    pub enqueue_failures: u64,
    /// Tickets whose folder flag was set this run.
    pub folder_flags_set: u64,
    /// Tickets whose archive flag was set this run.
    pub archive_flags_set: u64,
    /// Wall-clock duration of the run.
    pub duration_ms: u64,
}

impl SweepRunResult {
    /// Total work items enqueued across both kinds.
    pub fn items_enqueued(&self) -> u64 {
        self.folder_items + self.archive_items
    }

    /// Total deletion flags set across both kinds.
    pub fn flags_set(&self) -> u64 {
        self.folder_flags_set + self.archive_flags_set
    }
}

enum EnqueueOutcome {
    Sent,
    Failed,
    DryRun,
}

/// Run one retention sweep.
///
/// Everything the run reads from and writes to the database happens in a
/// single transaction committed at the end. Enqueue failures do not abort
/// the run: the affected ticket keeps its flags clear and is retried on
/// the next run, at the cost of duplicate work items downstream.
pub async fn run_sweep(
    db: &DbPool,
    helpdesk: &HelpdeskClient,
    queue: &dyn WorkQueue,
    config: &CustodianConfig,
) -> Result<SweepRunResult, SweepError> {
    let start = Instant::now();
    let mut result = SweepRunResult::default();

    let mut session = db.begin_session().await?;

    let resolved = resolve_phase(&mut session, helpdesk, config).await?;
    result.candidates = resolved.len() as u64;
    result.resolved = resolved.iter().filter(|c| c.closed_at.is_some()).count() as u64;

    let cutoff = Utc::now() - Duration::days(config.retention.window_days as i64);
    let expired = filter::expired_candidates(resolved, cutoff);
    result.expired = expired.len() as u64;

    if expired.is_empty() {
        tracing::info!(cutoff = %cutoff, "No tickets past the retention window");
        session.commit().await?;
        result.duration_ms = start.elapsed().as_millis() as u64;
        return Ok(result);
    }

    tracing::info!(
        expired = result.expired,
        cutoff = %cutoff,
        "Tickets past the retention window"
    );

    let expired_ids: Vec<i64> = expired.keys().copied().collect();
    let rows = session.fetch_archive_links(&expired_ids).await?;
    let tickets = reconcile::reconcile(&expired, &rows);

    let dry_run = config.retention.dry_run;
    let mut folder_clear: Vec<i64> = Vec::new();
    let mut archive_clear: Vec<i64> = Vec::new();

    for ticket in &tickets {
        match &ticket.folder_name {
            Some(folder_name) => {
                let item = WorkItem::folder_deletion(ticket.ticket_ref, folder_name.as_str());
                match enqueue_item(queue, &item, dry_run).await {
                    EnqueueOutcome::Sent => result.folder_items += 1,
                    EnqueueOutcome::Failed => result.enqueue_failures += 1,
                    EnqueueOutcome::DryRun => {}
                }
            }
            None => folder_clear.push(ticket.id),
        }

        if ticket.archive_case_ids.is_empty() {
            archive_clear.push(ticket.id);
        } else {
            for case_id in &ticket.archive_case_ids {
                let item = WorkItem::archive_case_deletion(ticket.ticket_ref, case_id.as_str());
                match enqueue_item(queue, &item, dry_run).await {
                    EnqueueOutcome::Sent => result.archive_items += 1,
                    EnqueueOutcome::Failed => result.enqueue_failures += 1,
                    EnqueueOutcome::DryRun => {}
                }
            }
        }
    }

    if dry_run {
        tracing::info!(
            archive_candidates = archive_clear.len(),
            folder_candidates = folder_clear.len(),
            "DRY RUN: Would update deletion flags"
        );
    } else {
        result.archive_flags_set = session.mark_archive_deleted(&archive_clear).await?;
        result.folder_flags_set = session.mark_folder_deleted(&folder_clear).await?;
    }

    session.commit().await?;

    result.duration_ms = start.elapsed().as_millis() as u64;
    Ok(result)
}

/// Produce the resolved candidate set, from the helpdesk or a snapshot.
async fn resolve_phase(
    session: &mut RunSession,
    helpdesk: &HelpdeskClient,
    config: &CustodianConfig,
) -> Result<Vec<ResolvedCandidate>, SweepError> {
    let snapshot_config = &config.retention.snapshot;

    if snapshot_config.mode == SnapshotMode::Replay {
        let path = Path::new(&snapshot_config.path);
        let resolved = snapshot::load_snapshot(path)?;
        tracing::info!(
            path = %path.display(),
            candidates = resolved.len(),
            "Replaying resolved candidates from snapshot"
        );
        return Ok(resolved);
    }

    let candidates = session.load_candidates().await?;
    tracing::info!(candidates = candidates.len(), "Loaded deletion candidates");

    let resolved = resolver::resolve_candidates(helpdesk, &config.helpdesk, candidates).await;

    if snapshot_config.mode == SnapshotMode::Record {
        let path = Path::new(&snapshot_config.path);
        snapshot::write_snapshot(path, &resolved)?;
        tracing::info!(
            path = %path.display(),
            candidates = resolved.len(),
            "Recorded resolved candidates to snapshot"
        );
    }

    Ok(resolved)
}

async fn enqueue_item(queue: &dyn WorkQueue, item: &WorkItem, dry_run: bool) -> EnqueueOutcome {
    if dry_run {
        tracing::info!(
            kind = item.kind.as_str(),
            ticket_ref = item.ticket_ref,
            target = %item.target,
            "DRY RUN: Would enqueue work item"
        );
        return EnqueueOutcome::DryRun;
    }

    match queue.enqueue(item).await {
        Ok(()) => {
            tracing::debug!(
                kind = item.kind.as_str(),
                ticket_ref = item.ticket_ref,
                target = %item.target,
                "Enqueued work item"
            );
            EnqueueOutcome::Sent
        }
        Err(e) => {
            tracing::error!(
                kind = item.kind.as_str(),
                ticket_ref = item.ticket_ref,
                target = %item.target,
                error = %e,
                "Failed to enqueue work item, will retry next run"
            );
            EnqueueOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_run_result_totals() {
        let result = SweepRunResult {
            folder_items: 3,
            archive_items: 5,
            folder_flags_set: 2,
            archive_flags_set: 1,
            ..Default::default()
        };
        assert_eq!(result.items_enqueued(), 8);
        assert_eq!(result.flags_set(), 3);
    }

    #[test]
    fn test_sweep_run_result_default_is_empty() {
        let result = SweepRunResult::default();
        assert_eq!(result.items_enqueued(), 0);
        assert_eq!(result.flags_set(), 0);
        assert_eq!(result.enqueue_failures, 0);
    }
}
