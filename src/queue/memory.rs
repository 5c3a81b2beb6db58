use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::error::QueueResult;
use super::traits::WorkQueue;
use crate::models::WorkItem;

/// In-memory work queue for testing.
#[derive(Clone, Default)]
pub struct MemoryWorkQueue {
    items: Arc<Mutex<Vec<WorkItem>>>,
}

impl MemoryWorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything enqueued so far, in order.
    pub fn items(&self) -> Vec<WorkItem> {
        self.items.lock().unwrap().clone()
    }
}

#[async_trait]
impl WorkQueue for MemoryWorkQueue {
    async fn enqueue(&self, item: &WorkItem) -> QueueResult<()> {
        self.items.lock().unwrap().push(item.clone());
        Ok(())
    }
}
