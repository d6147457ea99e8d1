//! HTTP implementations of the feed, route check, geocoding and routing seams

use crate::{
    core::{config::WidgetConfig, constants::DEFAULT_USER_AGENT, geo::LatLng},
    data::{
        feed::FeedPayload,
        search::{RouteCheck, RouteCheckResponse},
    },
    layers::route::Route,
    traits::{FeedSource, Geocoder, RouteChecker, RouteService},
    Error, Result,
};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Shared async HTTP client with the default User-Agent; public routing and
/// geocoding servers reject anonymous requests. Building it once keeps one
/// connection pool for every collaborator.
pub(crate) static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent(DEFAULT_USER_AGENT)
        .build()
        .unwrap_or_else(|e| {
            log::warn!("falling back to a plain HTTP client: {}", e);
            Client::new()
        })
});

fn client_for(user_agent: &str) -> Result<Client> {
    if user_agent == DEFAULT_USER_AGENT {
        return Ok(HTTP_CLIENT.clone());
    }
    Ok(Client::builder().user_agent(user_agent).build()?)
}

fn resolve(base: &Url, endpoint: &str) -> Result<Url> {
    base.join(endpoint)
        .map_err(|e| Error::Config(format!("invalid endpoint {endpoint:?}: {e}")))
}

fn ensure_success(url: &Url, status: StatusCode) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(Error::Http {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
struct RouteCheckRequest<'a> {
    origin: &'a str,
    destination: &'a str,
}

#[derive(Debug, Serialize)]
struct GeocodeRequest<'a> {
    location: &'a str,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct GeocodedLocation {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    location: Option<GeocodedLocation>,
}

/// Backend endpoints of the widget: tracking feed, route check, geocoding
#[derive(Debug, Clone)]
pub struct HttpServices {
    client: Client,
    feed_url: Url,
    route_check_url: Url,
    geocode_url: Url,
}

impl HttpServices {
    pub fn from_config(config: &WidgetConfig) -> Result<Self> {
        let base = Url::parse(&config.api_base_url)
            .map_err(|e| Error::Config(format!("invalid api_base_url: {e}")))?;
        Ok(Self {
            client: client_for(&config.user_agent)?,
            feed_url: resolve(&base, &config.feed_url)?,
            route_check_url: resolve(&base, &config.route_check_url)?,
            geocode_url: resolve(&base, &config.geocode_url)?,
        })
    }

    pub fn feed_url(&self) -> &Url {
        &self.feed_url
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &Url,
        body: &B,
    ) -> Result<(StatusCode, T)> {
        let response = self.client.post(url.clone()).json(body).send().await?;
        let status = response.status();
        log::debug!("POST {} -> {}", url, status);
        Ok((status, response.json().await?))
    }
}

#[async_trait]
impl FeedSource for HttpServices {
    async fn fetch_feed(&self) -> Result<FeedPayload> {
        let response = self.client.get(self.feed_url.clone()).send().await?;
        ensure_success(&self.feed_url, response.status())?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl RouteChecker for HttpServices {
    async fn check_route(&self, origin: &str, destination: &str) -> Result<RouteCheck> {
        let response = self
            .client
            .post(self.route_check_url.clone())
            .json(&RouteCheckRequest {
                origin,
                destination,
            })
            .send()
            .await?;
        ensure_success(&self.route_check_url, response.status())?;
        let body: RouteCheckResponse = response.json().await?;
        Ok(body.into())
    }
}

#[async_trait]
impl Geocoder for HttpServices {
    async fn resolve_location(&self, name: &str) -> Result<Option<LatLng>> {
        // The search endpoint answers 404 with an error body for unknown places
        let (status, body): (StatusCode, GeocodeResponse) = self
            .post_json(&self.geocode_url, &GeocodeRequest { location: name })
            .await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        ensure_success(&self.geocode_url, status)?;
        Ok(body
            .location
            .map(|loc| LatLng::new(loc.latitude, loc.longitude)))
    }
}

#[derive(Debug, Deserialize)]
pub struct OsrmGeometry {
    /// `[lon, lat]` pairs
    pub coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
pub struct OsrmRoute {
    pub distance: f64,
    pub duration: f64,
    pub geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
pub struct OsrmResponse {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub routes: Vec<OsrmRoute>,
}

impl OsrmResponse {
    /// First route, converted to lat/lng order
    pub fn into_route(self) -> Result<Route> {
        let code = self.code.unwrap_or_default();
        let message = self.message;
        let best = self.routes.into_iter().next().ok_or_else(|| {
            Error::Routing(message.unwrap_or_else(|| format!("no route returned ({code})")))
        })?;
        let polyline = best
            .geometry
            .coordinates
            .into_iter()
            .map(|[lon, lat]| LatLng::new(lat, lon))
            .collect();
        Ok(Route::new(polyline).with_metrics(best.distance, best.duration))
    }
}

/// Routing against an OSRM-compatible server (driving profile)
#[derive(Debug, Clone)]
pub struct OsrmRouter {
    client: Client,
    base_url: String,
}

impl OsrmRouter {
    pub fn from_config(config: &WidgetConfig) -> Result<Self> {
        Ok(Self {
            client: client_for(&config.user_agent)?,
            base_url: config.router_url.trim_end_matches('/').to_string(),
        })
    }

    /// `{base}/route/v1/driving/{lon},{lat};{lon},{lat}...`
    pub fn route_url(&self, waypoints: &[LatLng]) -> String {
        let coords = waypoints
            .iter()
            .map(|p| format!("{},{}", p.lng, p.lat))
            .collect::<Vec<_>>()
            .join(";");
        format!("{}/route/v1/driving/{}", self.base_url, coords)
    }
}

#[async_trait]
impl RouteService for OsrmRouter {
    async fn compute_route(&self, waypoints: &[LatLng]) -> Result<Route> {
        if waypoints.len() < 2 {
            return Err(Error::Routing(format!(
                "need at least two waypoints, got {}",
                waypoints.len()
            )));
        }
        let url = self.route_url(waypoints);
        let response = self
            .client
            .get(&url)
            .query(&[("overview", "full"), ("geometries", "geojson")])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Routing(format!("{} answered {}", url, status)));
        }
        let body: OsrmResponse = response.json().await?;
        body.into_route()
    }
}
