use crate::core::geo::{LatLng, LatLngBounds};
use geo::HaversineLength;
use geo_types::LineString;
use serde::{Deserialize, Serialize};

/// A computed path returned by the routing service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub polyline: Vec<LatLng>,
    /// Routed distance in metres, when the service reports it
    pub distance_m: Option<f64>,
    /// Routed travel time in seconds, when the service reports it
    pub duration_s: Option<f64>,
}

impl Route {
    pub fn new(polyline: Vec<LatLng>) -> Self {
        Self {
            polyline,
            distance_m: None,
            duration_s: None,
        }
    }

    pub fn with_metrics(mut self, distance_m: f64, duration_s: f64) -> Self {
        self.distance_m = Some(distance_m);
        self.duration_s = Some(duration_s);
        self
    }

    pub fn line_string(&self) -> LineString<f64> {
        self.polyline
            .iter()
            .map(|p| (p.lng, p.lat))
            .collect::<Vec<_>>()
            .into()
    }

    /// Reported distance, or the great-circle length of the polyline
    pub fn length_m(&self) -> f64 {
        self.distance_m
            .unwrap_or_else(|| self.line_string().haversine_length())
    }

    pub fn bounds(&self) -> Option<LatLngBounds> {
        LatLngBounds::from_points(&self.polyline)
    }
}

/// Route control attached to the map: fixed waypoints, no interactive editing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLayer {
    pub waypoints: Vec<LatLng>,
    pub route: Route,
    pub route_while_dragging: bool,
    pub add_waypoints: bool,
    pub draggable_waypoints: bool,
    pub fit_selected_routes: bool,
    pub show_itinerary: bool,
    /// The synchronizer draws its own markers
    pub create_waypoint_markers: bool,
}

impl RouteLayer {
    pub fn new(waypoints: Vec<LatLng>, route: Route) -> Self {
        Self {
            waypoints,
            route,
            route_while_dragging: false,
            add_waypoints: false,
            draggable_waypoints: false,
            fit_selected_routes: true,
            show_itinerary: false,
            create_waypoint_markers: false,
        }
    }

    /// View the map should fit: the polyline, or the waypoints when it is empty
    pub fn fit_bounds(&self) -> Option<LatLngBounds> {
        self.route
            .bounds()
            .or_else(|| LatLngBounds::from_points(&self.waypoints))
    }
}
