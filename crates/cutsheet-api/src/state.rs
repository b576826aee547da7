//! Application state.

use std::sync::Arc;

use cutsheet_firestore::FirestoreClient;
use cutsheet_queue::JobQueue;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub firestore: Arc<FirestoreClient>,
    pub queue: Arc<JobQueue>,
}

impl AppState {
    /// Create new application state.
    pub fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let firestore = FirestoreClient::from_env()?;
        let queue = JobQueue::from_env()?;

        Ok(Self {
            config,
            firestore: Arc::new(firestore),
            queue: Arc::new(queue),
        })
    }
}
