//! Retention sweep for expired helpdesk tickets.
//!
//! A sweep runs as one pass over the ticket registry:
//! 1. Loads tickets that still have a folder or archive case to clean up
//! 2. Resolves each ticket's closure state against the helpdesk
//! 3. Keeps the tickets whose closure predates the retention window
//! 4. Reconciles them with their archive links in the database
//! 5. Enqueues folder and archive-case deletion work items
//! 6. Marks tickets with nothing left to delete as done
//!
//! All database reads and writes happen in a single transaction that is
//! committed at the very end, so a crashed run leaves the registry
//! untouched. Supports dry-run mode for previewing a sweep.

pub mod filter;
pub mod reconcile;
pub mod resolver;
pub mod snapshot;
pub mod sweep;

pub use sweep::run_sweep;
