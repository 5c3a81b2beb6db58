use async_trait::async_trait;

use super::error::QueueResult;
use crate::models::WorkItem;

/// Work queue trait for handing deletion work to downstream processors.
///
/// Delivery is fire-and-forget: a run enqueues items and moves on, and the
/// deletion flags in the database are only set once nothing is left to
/// enqueue for a ticket. Consumers must tolerate duplicate items, since a
/// run that fails after enqueueing will enqueue again on its next attempt.
#[async_trait]
pub trait WorkQueue: Send + Sync {
    /// Push a work item to the queue.
    async fn enqueue(&self, item: &WorkItem) -> QueueResult<()>;
}
