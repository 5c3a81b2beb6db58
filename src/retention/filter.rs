//! Retention window filtering.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::models::{ExpiredCandidate, ResolvedCandidate};

/// Keep the candidates whose closure strictly predates the cutoff.
///
/// The result is keyed by local ticket id; if the same id appears more
/// than once, the last expired occurrence wins. Candidates without a
/// resolved closure are dropped here and picked up again on the next run.
pub fn expired_candidates(
    candidates: Vec<ResolvedCandidate>,
    cutoff: DateTime<Utc>,
) -> BTreeMap<i64, ExpiredCandidate> {
    let mut expired = BTreeMap::new();

    for candidate in candidates {
        let Some(closed_at) = candidate.closed_at else {
            continue;
        };

        if closed_at < cutoff {
            expired.insert(
                candidate.ticket.id,
                ExpiredCandidate {
                    ticket: candidate.ticket,
                    closed_at,
                },
            );
        }
    }

    expired
}
