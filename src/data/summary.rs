//! Distance and travel-time summary of the displayed route

use crate::{core::geo::Snapshot, layers::route::Route};
use serde::{Deserialize, Serialize};

/// One hop between consecutive snapshot points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub from: String,
    pub to: String,
    /// Great-circle distance, rounded to 2 decimals
    pub distance_km: f64,
}

impl RouteLeg {
    pub fn label(&self) -> String {
        format!("{} → {}", self.from, self.to)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub legs: Vec<RouteLeg>,
    /// Sum of the great-circle legs
    pub straight_km: f64,
    /// Distance reported by the router
    pub routed_km: Option<f64>,
    /// Travel time reported by the router, in seconds
    pub duration_s: Option<f64>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `"2h 15m"`, or `"45m"` under an hour
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

pub fn format_distance(km: f64) -> String {
    format!("{} km", round2(km))
}

impl RouteSummary {
    /// `None` when there is nothing to travel between
    pub fn build(snapshot: &Snapshot, route: Option<&Route>) -> Option<Self> {
        if snapshot.len() < 2 {
            return None;
        }
        let legs: Vec<RouteLeg> = snapshot
            .points()
            .windows(2)
            .enumerate()
            .map(|(i, pair)| RouteLeg {
                from: snapshot.display_label(i),
                to: snapshot.display_label(i + 1),
                distance_km: round2(pair[0].lat_lng().distance_to(&pair[1].lat_lng()) / 1000.0),
            })
            .collect();
        let straight_km = round2(legs.iter().map(|leg| leg.distance_km).sum());

        Some(Self {
            legs,
            straight_km,
            routed_km: route.and_then(|r| r.distance_m).map(|m| round2(m / 1000.0)),
            duration_s: route.and_then(|r| r.duration_s),
        })
    }

    /// Routed figures when available, great-circle total otherwise
    pub fn headline(&self) -> String {
        let distance = format_distance(self.routed_km.unwrap_or(self.straight_km));
        match self.duration_s {
            Some(seconds) => format!("{distance} · {}", format_duration(seconds)),
            None => distance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::{LatLng, LocationPoint};

    fn trip() -> Snapshot {
        Snapshot::new(vec![
            LocationPoint::new(24.86, 67.01).with_label("Karachi"),
            LocationPoint::new(25.0, 67.5),
            LocationPoint::new(25.39, 68.37).with_label("Hyderabad"),
        ])
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(45.0 * 60.0), "45m");
        assert_eq!(format_duration(8100.0), "2h 15m");
        assert_eq!(format_duration(3600.0), "1h 0m");
        assert_eq!(format_duration(-5.0), "0m");
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(164.2049), "164.2 km");
        assert_eq!(format_distance(12.346), "12.35 km");
    }

    #[test]
    fn test_legs_follow_snapshot_order() {
        let summary = RouteSummary::build(&trip(), None).unwrap();
        assert_eq!(summary.legs.len(), 2);
        assert_eq!(summary.legs[0].label(), "Karachi → Point 2");
        assert_eq!(summary.legs[1].to, "Hyderabad");
        let sum: f64 = summary.legs.iter().map(|l| l.distance_km).sum();
        assert!((summary.straight_km - sum).abs() < 0.011);
        assert!(summary.headline().ends_with(" km"));
    }

    #[test]
    fn test_routed_figures_win() {
        let route = Route::new(vec![LatLng::new(24.86, 67.01), LatLng::new(25.39, 68.37)])
            .with_metrics(164_200.0, 8_100.0);
        let summary = RouteSummary::build(&trip(), Some(&route)).unwrap();
        assert_eq!(summary.routed_km, Some(164.2));
        assert_eq!(summary.headline(), "164.2 km · 2h 15m");
    }

    #[test]
    fn test_too_short_for_summary() {
        let one = Snapshot::new(vec![LocationPoint::new(1.0, 1.0)]);
        assert!(RouteSummary::build(&one, None).is_none());
        assert!(RouteSummary::build(&Snapshot::empty(), None).is_none());
    }
}
