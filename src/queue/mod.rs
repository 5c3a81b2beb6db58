pub mod error;
mod http;
#[cfg(test)]
mod memory;
pub mod traits;

use std::sync::Arc;

pub use http::HttpWorkQueue;
#[cfg(test)]
pub use memory::MemoryWorkQueue;
pub use traits::WorkQueue;

use crate::config::QueueConfig;

/// Create the work queue from configuration.
pub fn create_work_queue(
    config: &QueueConfig,
    client: reqwest::Client,
    api_key: Option<String>,
) -> Arc<dyn WorkQueue> {
    Arc::new(HttpWorkQueue::from_config(config, client, api_key))
}
