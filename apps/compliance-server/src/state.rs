//! Shared application state

use std::sync::Arc;

use corpus_core::CompliancePipeline;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<CompliancePipeline>,
    /// Held for the whole of a document check; uploads share one collection
    pub check_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(pipeline: CompliancePipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            check_lock: Arc::new(Mutex::new(())),
        }
    }
}
