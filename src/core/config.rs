//! Configuration accepted by the overlay widget
//!
//! Hosts usually hand the widget a JSON blob; every field is optional and
//! falls back to the defaults in [`crate::core::constants`].

use crate::{
    core::constants::*,
    core::geo::{LatLng, Point},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where the overlay gets its locations from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AcquisitionMode {
    /// Recurring fetch of the coordinates feed
    Polling,
    /// One route search per open
    Search { origin: String, destination: String },
}

impl Default for AcquisitionMode {
    fn default() -> Self {
        Self::Polling
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    pub api_base_url: String,
    pub feed_url: String,
    pub poll_interval_ms: u64,
    pub initially_open: bool,
    pub route_check_url: String,
    pub geocode_url: String,
    pub router_url: String,
    pub tile_url: String,
    pub default_center: LatLng,
    pub default_zoom: f64,
    pub initial_position: Point,
    pub mode: AcquisitionMode,
    pub user_agent: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            feed_url: DEFAULT_FEED_URL.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            initially_open: true,
            route_check_url: DEFAULT_ROUTE_CHECK_URL.to_string(),
            geocode_url: DEFAULT_GEOCODE_URL.to_string(),
            router_url: DEFAULT_ROUTER_URL.to_string(),
            tile_url: DEFAULT_TILE_URL.to_string(),
            default_center: LatLng::new(DEFAULT_CENTER.0, DEFAULT_CENTER.1),
            default_zoom: DEFAULT_ZOOM,
            initial_position: Point::new(DEFAULT_POSITION.0, DEFAULT_POSITION.1),
            mode: AcquisitionMode::Polling,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl WidgetConfig {
    /// Parses and validates a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_feed_url(mut self, url: impl Into<String>) -> Self {
        self.feed_url = url.into();
        self
    }

    pub fn with_poll_interval_ms(mut self, interval_ms: u64) -> Self {
        self.poll_interval_ms = interval_ms;
        self
    }

    pub fn with_initially_open(mut self, open: bool) -> Self {
        self.initially_open = open;
        self
    }

    pub fn with_search(mut self, origin: impl Into<String>, destination: impl Into<String>) -> Self {
        self.mode = AcquisitionMode::Search {
            origin: origin.into(),
            destination: destination.into(),
        };
        self
    }

    pub fn with_initial_position(mut self, position: Point) -> Self {
        self.initial_position = position;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms < MIN_POLL_INTERVAL_MS {
            return Err(Error::Config(format!(
                "poll_interval_ms must be at least {MIN_POLL_INTERVAL_MS}, got {}",
                self.poll_interval_ms
            )));
        }
        if !self.default_center.is_valid() {
            return Err(Error::Config(format!(
                "default_center out of range: {:?}",
                self.default_center
            )));
        }
        let urls = [
            ("api_base_url", &self.api_base_url),
            ("feed_url", &self.feed_url),
            ("route_check_url", &self.route_check_url),
            ("geocode_url", &self.geocode_url),
            ("router_url", &self.router_url),
            ("tile_url", &self.tile_url),
        ];
        if let Some((name, _)) = urls.iter().find(|(_, url)| url.trim().is_empty()) {
            return Err(Error::Config(format!("{name} must not be empty")));
        }
        if let AcquisitionMode::Search {
            origin,
            destination,
        } = &self.mode
        {
            if origin.trim().is_empty() || destination.trim().is_empty() {
                return Err(Error::Config(
                    "search mode needs both origin and destination".into(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WidgetConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_millis(10_000));
        assert!(config.initially_open);
        assert_eq!(config.mode, AcquisitionMode::Polling);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config = WidgetConfig::from_json(
            r#"{"feed_url": "/track", "poll_interval_ms": 2500,
                "mode": {"kind": "search", "origin": "Karachi", "destination": "Hyderabad"}}"#,
        )
        .unwrap();
        assert_eq!(config.feed_url, "/track");
        assert_eq!(config.poll_interval_ms, 2500);
        assert_eq!(config.initial_position, Point::new(40.0, 40.0));
        assert_eq!(
            config.mode,
            AcquisitionMode::Search {
                origin: "Karachi".into(),
                destination: "Hyderabad".into()
            }
        );
    }

    #[test]
    fn test_validation_failures() {
        let zero = WidgetConfig::default().with_poll_interval_ms(0);
        assert!(matches!(zero.validate(), Err(Error::Config(_))));

        let no_feed = WidgetConfig::default().with_feed_url("  ");
        assert!(matches!(no_feed.validate(), Err(Error::Config(_))));

        let half_search = WidgetConfig::default().with_search("Karachi", "");
        assert!(half_search.validate().is_err());

        assert!(WidgetConfig::from_json("{not json").is_err());
    }
}
