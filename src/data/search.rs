use crate::{
    core::geo::{LatLng, LocationPoint, Snapshot},
    traits::{AcquisitionStrategy, Geocoder, RouteChecker},
    Error, Result,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Answer of the route existence check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteCheck {
    Found,
    NotFound(String),
}

/// Wire shape: `{}` on success, `{ "error": "..." }` otherwise
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteCheckResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<RouteCheckResponse> for RouteCheck {
    fn from(response: RouteCheckResponse) -> Self {
        match response.error {
            Some(reason) => RouteCheck::NotFound(reason),
            None => RouteCheck::Found,
        }
    }
}

/// Resolves a fixed origin/destination pair into a two-point snapshot
pub struct SearchStrategy {
    origin: String,
    destination: String,
    checker: Arc<dyn RouteChecker>,
    geocoder: Arc<dyn Geocoder>,
}

impl SearchStrategy {
    pub fn new(
        origin: impl Into<String>,
        destination: impl Into<String>,
        checker: Arc<dyn RouteChecker>,
        geocoder: Arc<dyn Geocoder>,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            checker,
            geocoder,
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    fn located(name: &str, coords: Option<LatLng>) -> Result<LocationPoint> {
        match coords {
            Some(ll) => Ok(LocationPoint::new(ll.lat, ll.lng).with_label(name)),
            None => {
                log::warn!("geocoder has no coordinates for {:?}", name);
                Err(Error::ResolutionFailure(name.to_string()))
            }
        }
    }
}

#[async_trait]
impl AcquisitionStrategy for SearchStrategy {
    async fn fetch(&self) -> Result<Snapshot> {
        if let RouteCheck::NotFound(reason) = self
            .checker
            .check_route(&self.origin, &self.destination)
            .await?
        {
            log::info!(
                "no route from {:?} to {:?}: {}",
                self.origin,
                self.destination,
                reason
            );
            return Err(Error::NoRouteFound(reason));
        }

        let (origin, destination) = futures::join!(
            self.geocoder.resolve_location(&self.origin),
            self.geocoder.resolve_location(&self.destination),
        );
        let origin = Self::located(&self.origin, origin?)?;
        let destination = Self::located(&self.destination, destination?)?;

        Ok(Snapshot::new(vec![origin, destination]))
    }

    fn name(&self) -> &str {
        "search"
    }
}
