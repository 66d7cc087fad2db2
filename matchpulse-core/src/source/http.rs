use super::{FetchMode, SnapshotSource, SourceError};
use async_trait::async_trait;
use matchpulse_sdk::client::DataClient;
use matchpulse_sdk::objects::Snapshot;
use tracing::debug;

/// Fetches snapshots from the data endpoint.
#[derive(Debug, Clone)]
pub struct HttpSnapshotSource {
    client: DataClient,
}

impl HttpSnapshotSource {
    pub fn new(client: DataClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &DataClient {
        &self.client
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    async fn fetch(&self, mode: FetchMode) -> Result<Snapshot, SourceError> {
        let snapshot = self
            .client
            .fetch_snapshot(mode == FetchMode::Force)
            .await?;
        debug!(
            live = snapshot.matches.live.len(),
            upcoming = snapshot.matches.upcoming.len(),
            finished = snapshot.matches.finished.len(),
            "Fetched snapshot"
        );
        Ok(snapshot)
    }
}
