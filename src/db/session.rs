//! The transaction a sweep run operates in.

use crate::models::{ArchiveLinkRow, Ticket};

use super::DbResult;

pub(super) enum SessionTx {
    #[cfg(feature = "database-sqlite")]
    Sqlite(sqlx::Transaction<'static, sqlx::Sqlite>),
    #[cfg(feature = "database-postgres")]
    Postgres(sqlx::Transaction<'static, sqlx::Postgres>),
    #[cfg(not(any(feature = "database-sqlite", feature = "database-postgres")))]
    _None(std::convert::Infallible),
}

/// A single run's database transaction.
///
/// Every read and write of a sweep happens inside one transaction, and
/// nothing is visible to other connections until [`commit`] at the very
/// end of the run. Dropping the session without committing rolls
/// everything back, so a run that dies midway leaves the flags untouched.
///
/// [`commit`]: RunSession::commit
pub struct RunSession {
    tx: SessionTx,
}

impl RunSession {
    pub(super) fn new(tx: SessionTx) -> Self {
        Self { tx }
    }

    /// Load tickets still holding at least one live downstream artifact.
    pub async fn load_candidates(&mut self) -> DbResult<Vec<Ticket>> {
        match &mut self.tx {
            #[cfg(feature = "database-sqlite")]
            SessionTx::Sqlite(tx) => {
                let rows = sqlx::query_as::<_, Ticket>(
                    "SELECT id, ticket_ref, folder_name FROM tickets \
                     WHERE folder_deleted = 0 OR archive_deleted = 0",
                )
                .fetch_all(&mut **tx)
                .await?;
                Ok(rows)
            }
            #[cfg(feature = "database-postgres")]
            SessionTx::Postgres(tx) => {
                let rows = sqlx::query_as::<_, Ticket>(
                    "SELECT id, ticket_ref, folder_name FROM tickets \
                     WHERE folder_deleted = FALSE OR archive_deleted = FALSE",
                )
                .fetch_all(&mut **tx)
                .await?;
                Ok(rows)
            }
            #[cfg(not(any(feature = "database-sqlite", feature = "database-postgres")))]
            SessionTx::_None(infallible) => match *infallible {},
        }
    }

    /// Fetch the ticket/archive-link join for the given local ids.
    ///
    /// An empty id list short-circuits without touching the database, so
    /// no `IN ()` ever reaches the backend.
    pub async fn fetch_archive_links(&mut self, ids: &[i64]) -> DbResult<Vec<ArchiveLinkRow>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        match &mut self.tx {
            #[cfg(feature = "database-sqlite")]
            SessionTx::Sqlite(tx) => {
                let placeholders = vec!["?"; ids.len()].join(", ");
                let sql = format!(
                    "SELECT t.id AS ticket_id, t.folder_name, t.folder_deleted, \
                     t.archive_deleted, l.archive_case_id \
                     FROM tickets t \
                     LEFT JOIN archive_links l ON l.ticket_id = t.id \
                     WHERE t.id IN ({placeholders}) \
                     ORDER BY t.id, l.id"
                );
                let mut query = sqlx::query_as::<_, ArchiveLinkRow>(&sql);
                for id in ids {
                    query = query.bind(id);
                }
                Ok(query.fetch_all(&mut **tx).await?)
            }
            #[cfg(feature = "database-postgres")]
            SessionTx::Postgres(tx) => {
                let placeholders = (1..=ids.len())
                    .map(|i| format!("${i}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                let sql = format!(
                    "SELECT t.id AS ticket_id, t.folder_name, t.folder_deleted, \
                     t.archive_deleted, l.archive_case_id \
                     FROM tickets t \
                     LEFT JOIN archive_links l ON l.ticket_id = t.id \
                     WHERE t.id IN ({placeholders}) \
                     ORDER BY t.id, l.id"
                );
                let mut query = sqlx::query_as::<_, ArchiveLinkRow>(&sql);
                for id in ids {
                    query = query.bind(id);
                }
                Ok(query.fetch_all(&mut **tx).await?)
            }
            #[cfg(not(any(feature = "database-sqlite", feature = "database-postgres")))]
            SessionTx::_None(infallible) => match *infallible {},
        }
    }

    /// Mark tickets as having no archive cases left.
    ///
    /// Only flips rows where the flag is still clear, and returns the
    /// number of rows changed. An empty id list is a no-op.
    pub async fn mark_archive_deleted(&mut self, ids: &[i64]) -> DbResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        match &mut self.tx {
            #[cfg(feature = "database-sqlite")]
            SessionTx::Sqlite(tx) => {
                let placeholders = vec!["?"; ids.len()].join(", ");
                let sql = format!(
                    "UPDATE tickets SET archive_deleted = 1 \
                     WHERE id IN ({placeholders}) AND archive_deleted = 0"
                );
                let mut query = sqlx::query(&sql);
                for id in ids {
                    query = query.bind(id);
                }
                Ok(query.execute(&mut **tx).await?.rows_affected())
            }
            #[cfg(feature = "database-postgres")]
            SessionTx::Postgres(tx) => {
                let placeholders = (1..=ids.len())
                    .map(|i| format!("${i}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                let sql = format!(
                    "UPDATE tickets SET archive_deleted = TRUE \
                     WHERE id IN ({placeholders}) AND archive_deleted = FALSE"
                );
                let mut query = sqlx::query(&sql);
                for id in ids {
                    query = query.bind(id);
                }
                Ok(query.execute(&mut **tx).await?.rows_affected())
            }
            #[cfg(not(any(feature = "database-sqlite", feature = "database-postgres")))]
            SessionTx::_None(infallible) => match *infallible {},
        }
    }

    /// Mark tickets as having no folder left.
    ///
    /// Only flips rows where the flag is still clear, and returns the
    /// number of rows changed. An empty id list is a no-op.
    pub async fn mark_folder_deleted(&mut self, ids: &[i64]) -> DbResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        match &mut self.tx {
            #[cfg(feature = "database-sqlite")]
            SessionTx::Sqlite(tx) => {
                let placeholders = vec!["?"; ids.len()].join(", ");
                let sql = format!(
                    "UPDATE tickets SET folder_deleted = 1 \
                     WHERE id IN ({placeholders}) AND folder_deleted = 0"
                );
                let mut query = sqlx::query(&sql);
                for id in ids {
                    query = query.bind(id);
                }
                Ok(query.execute(&mut **tx).await?.rows_affected())
            }
            #[cfg(feature = "database-postgres")]
            SessionTx::Postgres(tx) => {
                let placeholders = (1..=ids.len())
                    .map(|i| format!("${i}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                let sql = format!(
                    "UPDATE tickets SET folder_deleted = TRUE \
                     WHERE id IN ({placeholders}) AND folder_deleted = FALSE"
                );
                let mut query = sqlx::query(&sql);
                for id in ids {
                    query = query.bind(id);
                }
                Ok(query.execute(&mut **tx).await?.rows_affected())
            }
            #[cfg(not(any(feature = "database-sqlite", feature = "database-postgres")))]
            SessionTx::_None(infallible) => match *infallible {},
        }
    }

    /// Commit the run's work. Consumes the session; without this call the
    /// transaction rolls back on drop.
    pub async fn commit(self) -> DbResult<()> {
        match self.tx {
            #[cfg(feature = "database-sqlite")]
            SessionTx::Sqlite(tx) => Ok(tx.commit().await?),
            #[cfg(feature = "database-postgres")]
            SessionTx::Postgres(tx) => Ok(tx.commit().await?),
            #[cfg(not(any(feature = "database-sqlite", feature = "database-postgres")))]
            SessionTx::_None(infallible) => match infallible {},
        }
    }
}
