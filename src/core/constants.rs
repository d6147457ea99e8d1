//! Widget-wide defaults derived from the tracking deployment and Leaflet conventions.
//! Keeping them in a single place makes it easier to tweak the overlay's magic numbers.

/// Poll interval for the live-tracking feed.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10_000;

/// Shortest poll interval the scheduler accepts
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

/// Initial map center (Karachi) before any data arrives.
pub const DEFAULT_CENTER: (f64, f64) = (24.86, 67.01);

/// Initial zoom level.
pub const DEFAULT_ZOOM: f64 = 10.0;

/// Overlay top-left corner on first mount, in CSS pixels.
pub const DEFAULT_POSITION: (f64, f64) = (40.0, 40.0);

/// Base tile layer template.
pub const DEFAULT_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Backend that serves the feed, route check and geocoding endpoints.
/// Relative endpoint URLs are resolved against it.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";

pub const DEFAULT_FEED_URL: &str = "/api/locations";
pub const DEFAULT_ROUTE_CHECK_URL: &str = "/api/directions";
pub const DEFAULT_GEOCODE_URL: &str = "/api/search";

/// OSRM-compatible routing backend.
pub const DEFAULT_ROUTER_URL: &str = "https://router.project-osrm.org";

pub const DEFAULT_USER_AGENT: &str = "floatmap/0.1 (+https://github.com/floatmap/floatmap)";

/// Header title prefix; the destination label follows it.
pub const TITLE_PREFIX: &str = "Route to";

/// Header title when no destination is known yet.
pub const TITLE_FALLBACK: &str = "Live map";
