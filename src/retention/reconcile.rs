//! Reconciles expired candidates with their archive links.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{ArchiveLinkRow, ExpiredCandidate, ExpiredTicket};

/// Merge expired candidates with their link rows into per-ticket work state.
///
/// A folder or archive case only counts while its deletion flag is still
/// clear; rows whose flag is set represent work finished by an earlier run.
/// Case ids are deduplicated and sorted, and an empty folder name is
/// normalized to None so downstream code has a single "no folder" shape.
pub fn reconcile(
    expired: &BTreeMap<i64, ExpiredCandidate>,
    rows: &[ArchiveLinkRow],
) -> Vec<ExpiredTicket> {
    let mut folders: BTreeMap<i64, Option<String>> = BTreeMap::new();
    let mut cases: BTreeMap<i64, BTreeSet<String>> = BTreeMap::new();

    for row in rows {
        if !row.folder_deleted {
            folders.insert(row.ticket_id, row.folder_name.clone());
        }

        if !row.archive_deleted
            && let Some(case_id) = &row.archive_case_id
        {
            cases
                .entry(row.ticket_id)
                .or_default()
                .insert(case_id.clone());
        }
    }

    expired
        .values()
        .map(|candidate| {
            let id = candidate.ticket.id;

            let folder_name = folders
                .get(&id)
                .cloned()
                .flatten()
                .filter(|name| !name.is_empty());

            let archive_case_ids: Vec<String> = cases
                .get(&id)
                .map(|set| set.iter().cloned().collect())
                .unwrap_or_default();

            ExpiredTicket {
                id,
                ticket_ref: candidate.ticket.ticket_ref,
                closed_at: candidate.closed_at,
                folder_name,
                archive_case_ids,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::models::Ticket;

    fn expired_map(entries: &[(i64, i64)]) -> BTreeMap<i64, ExpiredCandidate> {
        entries
            .iter()
            .map(|&(id, ticket_ref)| {
                (
                    id,
                    ExpiredCandidate {
                        ticket: Ticket {
                            id,
                            ticket_ref,
                            folder_name: None,
                        },
                        closed_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
                    },
                )
            })
            .collect()
    }

    fn row(
        ticket_id: i64,
        folder_name: Option<&str>,
        folder_deleted: bool,
        archive_deleted: bool,
        archive_case_id: Option<&str>,
    ) -> ArchiveLinkRow {
        ArchiveLinkRow {
            ticket_id,
            folder_name: folder_name.map(String::from),
            folder_deleted,
            archive_deleted,
            archive_case_id: archive_case_id.map(String::from),
        }
    }

    #[test]
    fn test_collects_folder_and_sorted_cases() {
        let expired = expired_map(&[(1, 101)]);
        let rows = vec![
            row(1, Some("F-101"), false, false, Some("C-2")),
            row(1, Some("F-101"), false, false, Some("C-1")),
            row(1, Some("F-101"), false, false, Some("C-2")),
        ];

        let tickets = reconcile(&expired, &rows);
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].folder_name.as_deref(), Some("F-101"));
        assert_eq!(tickets[0].archive_case_ids, vec!["C-1", "C-2"]);
        assert_eq!(tickets[0].ticket_ref, 101);
    }

    #[test]
    fn test_deleted_folder_flag_hides_folder() {
        let expired = expired_map(&[(1, 101)]);
        let rows = vec![row(1, Some("F-101"), true, false, Some("C-1"))];

        let tickets = reconcile(&expired, &rows);
        assert_eq!(tickets[0].folder_name, None);
        assert_eq!(tickets[0].archive_case_ids, vec!["C-1"]);
    }

    #[test]
    fn test_deleted_archive_flag_hides_cases() {
        let expired = expired_map(&[(1, 101)]);
        let rows = vec![row(1, Some("F-101"), false, true, Some("C-1"))];

        let tickets = reconcile(&expired, &rows);
        assert_eq!(tickets[0].folder_name.as_deref(), Some("F-101"));
        assert!(tickets[0].archive_case_ids.is_empty());
    }

    #[test]
    fn test_null_case_ids_are_ignored() {
        let expired = expired_map(&[(1, 101)]);
        let rows = vec![row(1, Some("F-101"), false, false, None)];

        let tickets = reconcile(&expired, &rows);
        assert!(tickets[0].archive_case_ids.is_empty());
    }

    #[test]
    fn test_empty_folder_name_normalized_to_none() {
        let expired = expired_map(&[(1, 101), (2, 102)]);
        let rows = vec![
            row(1, Some(""), false, false, None),
            row(2, None, false, false, None),
        ];

        let tickets = reconcile(&expired, &rows);
        assert_eq!(tickets[0].folder_name, None);
        assert_eq!(tickets[1].folder_name, None);
    }

    #[test]
    fn test_ticket_without_rows_has_nothing_to_delete() {
        let expired = expired_map(&[(1, 101)]);

        let tickets = reconcile(&expired, &[]);
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].folder_name, None);
        assert!(tickets[0].archive_case_ids.is_empty());
    }

    #[test]
    fn test_multiple_tickets_keep_id_order() {
        let expired = expired_map(&[(2, 102), (1, 101)]);
        let rows = vec![
            row(1, Some("F-101"), false, false, Some("C-A")),
            row(2, Some("F-102"), false, false, Some("C-B")),
        ];

        let tickets = reconcile(&expired, &rows);
        let ids: Vec<i64> = tickets.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
