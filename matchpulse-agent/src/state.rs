//! Handles shared by the agent's background tasks.

use matchpulse_core::LivePipeline;
use matchpulse_core::source::{CachedSource, HttpSnapshotSource};
use std::sync::Arc;

/// The snapshot source the agent runs with.
pub type AgentSource = CachedSource<HttpSnapshotSource>;

/// Cloneable handle to the running pipeline.
#[derive(Clone)]
pub struct AgentState {
    pub pipeline: Arc<LivePipeline<AgentSource>>,
}

impl AgentState {
    pub fn new(pipeline: LivePipeline<AgentSource>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}
