use std::sync::Arc;

use crate::pipeline::{LoadTracker, StatisticsAssembler};

#[derive(Clone)]
pub struct AppState {
    pub assembler: Arc<StatisticsAssembler>,
    pub tracker: Arc<LoadTracker>,
    /// Allowed CORS origin, or "*" for any
    pub cors_origin: String,
}

impl AppState {
    pub fn new(assembler: StatisticsAssembler) -> Self {
        Self {
            assembler: Arc::new(assembler),
            tracker: Arc::new(LoadTracker::new()),
            cors_origin: "*".to_string(),
        }
    }

    pub fn with_cors_origin(mut self, origin: impl Into<String>) -> Self {
        self.cors_origin = origin.into();
        self
    }
}
