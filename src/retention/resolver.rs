//! Closure resolution against the helpdesk.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use crate::config::HelpdeskConfig;
use crate::helpdesk::{HelpdeskClient, HelpdeskError};
use crate::models::{ResolvedCandidate, Ticket};

/// Closure timestamp assigned to tickets the helpdesk has purged entirely.
///
/// Far enough in the past that any retention window has elapsed, so purged
/// tickets flow straight into cleanup.
pub fn permanently_gone_closure() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap()
}

/// Resolve the closure state of each candidate, in order.
///
/// Lookups are sequential with a configurable delay between them so a
/// scheduled sweep does not hammer the helpdesk. A candidate that cannot
/// be resolved this run keeps `closed_at = None` and is retried on the
/// next run, since it still has a deletion flag clear in the registry.
pub async fn resolve_candidates(
    client: &HelpdeskClient,
    config: &HelpdeskConfig,
    tickets: Vec<Ticket>,
) -> Vec<ResolvedCandidate> {
    let mut resolved = Vec::with_capacity(tickets.len());

    for ticket in tickets {
        let closed_at = resolve_one(client, config, &ticket).await;
        resolved.push(ResolvedCandidate { ticket, closed_at });
    }

    resolved
}

async fn resolve_one(
    client: &HelpdeskClient,
    config: &HelpdeskConfig,
    ticket: &Ticket,
) -> Option<DateTime<Utc>> {
    match client.get_ticket(ticket.ticket_ref).await {
        Ok(status) => {
            if config.require_completion_marker && !status.completion_marker_present {
                tracing::info!(
                    ticket_ref = ticket.ticket_ref,
                    "Ticket not marked complete, skipping"
                );
                return None;
            }

            // The pacing delay only applies to tickets that pass the marker
            // gate. Skipped and failed lookups return immediately.
            if config.lookup_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(config.lookup_delay_ms)).await;
            }

            status.closed_at
        }

        Err(HelpdeskError::NotFound(_)) => {
            tracing::info!(
                ticket_ref = ticket.ticket_ref,
                "Ticket not found, checking search"
            );

            match client.search_has_ticket(ticket.ticket_ref).await {
                Ok(true) => {
                    tracing::debug!(
                        ticket_ref = ticket.ticket_ref,
                        "Ticket still searchable, will retry next run"
                    );
                    None
                }
                Ok(false) => {
                    tracing::info!(
                        ticket_ref = ticket.ticket_ref,
                        "Ticket purged from helpdesk, treating as long closed"
                    );
                    Some(permanently_gone_closure())
                }
                Err(e) => {
                    tracing::warn!(
                        ticket_ref = ticket.ticket_ref,
                        error = %e,
                        "Search fallback failed, will retry next run"
                    );
                    None
                }
            }
        }

        Err(e) => {
            tracing::warn!(
                ticket_ref = ticket.ticket_ref,
                error = %e,
                "Ticket lookup failed, will retry next run"
            );
            None
        }
    }
}
