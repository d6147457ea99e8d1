use crate::{
    core::geo::Snapshot,
    traits::{AcquisitionStrategy, FeedSource},
    Result,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Fetches the tracking feed once per cycle
pub struct PollingStrategy {
    source: Arc<dyn FeedSource>,
}

impl PollingStrategy {
    pub fn new(source: Arc<dyn FeedSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl AcquisitionStrategy for PollingStrategy {
    async fn fetch(&self) -> Result<Snapshot> {
        let payload = self.source.fetch_feed().await?;
        let snapshot = payload.into_snapshot();
        log::debug!("feed returned {} locations", snapshot.len());
        Ok(snapshot)
    }

    fn name(&self) -> &str {
        "polling"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data::feed::FeedPayload, Error};

    struct StaticFeed(Option<FeedPayload>);

    #[async_trait]
    impl FeedSource for StaticFeed {
        async fn fetch_feed(&self) -> Result<FeedPayload> {
            self.0.clone().ok_or(Error::Http {
                status: 503,
                url: "/api/locations".into(),
            })
        }
    }

    #[tokio::test]
    async fn test_fetch_maps_payload() {
        let strategy = PollingStrategy::new(Arc::new(StaticFeed(Some(FeedPayload {
            coords: Some(vec![[24.86, 67.01], [25.39, 68.37]]),
            locations: Some(vec![Some("Karachi".into())]),
        }))));

        let snapshot = strategy.fetch().await.unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.destination_label(), "Point 2");
    }

    #[tokio::test]
    async fn test_fetch_propagates_network_errors() {
        let strategy = PollingStrategy::new(Arc::new(StaticFeed(None)));
        let err = strategy.fetch().await.unwrap_err();
        assert!(err.is_network());
    }
}
