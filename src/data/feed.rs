//! Wire format of the live-tracking coordinates feed

use crate::core::geo::{placeholder_label, LatLng, LocationPoint, Snapshot};
use serde::{Deserialize, Serialize};

/// `{ coords: [[lat, lon], ...], locations: [name, ...] }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedPayload {
    #[serde(default)]
    pub coords: Option<Vec<[f64; 2]>>,
    #[serde(default)]
    pub locations: Option<Vec<Option<String>>>,
}

impl FeedPayload {
    /// Pairs coordinates with labels by index.
    ///
    /// Missing or blank labels become `Point {n}`. Out-of-range coordinates
    /// are dropped.
    pub fn into_snapshot(self) -> Snapshot {
        let labels = self.locations.unwrap_or_default();
        self.coords
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .filter_map(|(index, [lat, lon])| {
                if !LatLng::new(lat, lon).is_valid() {
                    log::warn!("dropping out-of-range feed coordinate {}: [{}, {}]", index, lat, lon);
                    return None;
                }
                let label = labels
                    .get(index)
                    .and_then(|l| l.as_deref())
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| placeholder_label(index));
                Some(LocationPoint::new(lat, lon).with_label(label))
            })
            .collect()
    }
}
