//! In-memory map engine
//!
//! Keeps a layer registry per map instance without drawing anything. Useful
//! for server-side runs, the demo app, and asserting what the overlay asked
//! the engine to show.

use crate::{
    core::{
        geo::LatLngBounds,
        holder::{MapHandle, MapOptions},
    },
    layers::{
        base::{LayerId, LayerKind, TileLayerSpec},
        marker::MarkerLayer,
        route::RouteLayer,
    },
    traits::{MapEngine, RenderTarget},
    Error, Result,
};
use fxhash::FxHashMap as HashMap;
use std::cell::Cell;

#[derive(Debug, Clone)]
pub enum LayerRecord {
    Tile(TileLayerSpec),
    Marker(MarkerLayer),
    Route(RouteLayer),
}

impl LayerRecord {
    pub fn kind(&self) -> LayerKind {
        match self {
            LayerRecord::Tile(_) => LayerKind::Tile,
            LayerRecord::Marker(_) => LayerKind::Marker,
            LayerRecord::Route(_) => LayerKind::Route,
        }
    }
}

#[derive(Debug)]
struct MapState {
    target_id: String,
    options: MapOptions,
    layers: HashMap<LayerId, LayerRecord>,
    /// Insertion order, bottom to top
    order: Vec<LayerId>,
    fitted: Option<LatLngBounds>,
}

impl MapState {
    fn of_kind(&self, kind: LayerKind) -> impl Iterator<Item = &LayerRecord> {
        self.order
            .iter()
            .filter_map(|id| self.layers.get(id))
            .filter(move |record| record.kind() == kind)
    }
}

#[derive(Debug, Default)]
pub struct HeadlessEngine {
    maps: HashMap<MapHandle, MapState>,
    next_map: u64,
    next_layer: u64,
    maps_created: usize,
    reject_adds: bool,
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `add_*` call fail, to exercise error paths
    pub fn set_reject_adds(&mut self, reject: bool) {
        self.reject_adds = reject;
    }

    /// Total instances ever created
    pub fn maps_created(&self) -> usize {
        self.maps_created
    }

    /// Instances not yet destroyed
    pub fn live_maps(&self) -> usize {
        self.maps.len()
    }

    pub fn is_live(&self, handle: MapHandle) -> bool {
        self.maps.contains_key(&handle)
    }

    pub fn options(&self, handle: MapHandle) -> Option<&MapOptions> {
        self.maps.get(&handle).map(|m| &m.options)
    }

    pub fn target_of(&self, handle: MapHandle) -> Option<&str> {
        self.maps.get(&handle).map(|m| m.target_id.as_str())
    }

    pub fn markers(&self, handle: MapHandle) -> Vec<&MarkerLayer> {
        self.maps
            .get(&handle)
            .map(|m| {
                m.of_kind(LayerKind::Marker)
                    .filter_map(|r| match r {
                        LayerRecord::Marker(marker) => Some(marker),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn routes(&self, handle: MapHandle) -> Vec<&RouteLayer> {
        self.maps
            .get(&handle)
            .map(|m| {
                m.of_kind(LayerKind::Route)
                    .filter_map(|r| match r {
                        LayerRecord::Route(route) => Some(route),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn marker_count(&self, handle: MapHandle) -> usize {
        self.markers(handle).len()
    }

    pub fn route_count(&self, handle: MapHandle) -> usize {
        self.routes(handle).len()
    }

    pub fn tile_layer_count(&self, handle: MapHandle) -> usize {
        self.maps
            .get(&handle)
            .map(|m| m.of_kind(LayerKind::Tile).count())
            .unwrap_or(0)
    }

    /// Last bounds passed to `fit_view`
    pub fn fitted_view(&self, handle: MapHandle) -> Option<&LatLngBounds> {
        self.maps.get(&handle).and_then(|m| m.fitted.as_ref())
    }

    fn map_mut(&mut self, handle: MapHandle) -> Result<&mut MapState> {
        self.maps
            .get_mut(&handle)
            .ok_or_else(|| Error::Engine(format!("unknown map {:?}", handle)))
    }

    fn insert(&mut self, handle: MapHandle, record: LayerRecord) -> Result<LayerId> {
        if self.reject_adds {
            return Err(Error::Engine(format!("{} layer rejected", record.kind())));
        }
        self.next_layer += 1;
        let id = LayerId(self.next_layer);
        let map = self.map_mut(handle)?;
        map.layers.insert(id, record);
        map.order.push(id);
        Ok(id)
    }
}

impl MapEngine for HeadlessEngine {
    fn create_map(&mut self, target: &dyn RenderTarget, options: &MapOptions) -> Result<MapHandle> {
        if !target.is_attached() {
            return Err(Error::Engine(format!("target {} is not attached", target.id())));
        }
        self.next_map += 1;
        self.maps_created += 1;
        let handle = MapHandle(self.next_map);
        self.maps.insert(
            handle,
            MapState {
                target_id: target.id().to_string(),
                options: options.clone(),
                layers: HashMap::default(),
                order: Vec::new(),
                fitted: None,
            },
        );
        Ok(handle)
    }

    fn destroy_map(&mut self, handle: MapHandle) -> Result<()> {
        self.maps
            .remove(&handle)
            .map(|_| ())
            .ok_or_else(|| Error::Engine(format!("unknown map {:?}", handle)))
    }

    fn add_tile_layer(&mut self, handle: MapHandle, tiles: &TileLayerSpec) -> Result<LayerId> {
        self.insert(handle, LayerRecord::Tile(tiles.clone()))
    }

    fn add_marker(&mut self, handle: MapHandle, marker: &MarkerLayer) -> Result<LayerId> {
        self.insert(handle, LayerRecord::Marker(marker.clone()))
    }

    fn add_route(&mut self, handle: MapHandle, route: &RouteLayer) -> Result<LayerId> {
        self.insert(handle, LayerRecord::Route(route.clone()))
    }

    fn remove_layer(&mut self, handle: MapHandle, layer: LayerId) -> Result<()> {
        let map = self.map_mut(handle)?;
        map.order.retain(|id| *id != layer);
        map.layers
            .remove(&layer)
            .map(|_| ())
            .ok_or_else(|| Error::Engine(format!("{} is not on map {:?}", layer, handle)))
    }

    fn has_layer(&self, handle: MapHandle, layer: LayerId) -> bool {
        self.maps
            .get(&handle)
            .map(|m| m.layers.contains_key(&layer))
            .unwrap_or(false)
    }

    fn fit_view(&mut self, handle: MapHandle, bounds: &LatLngBounds) -> Result<()> {
        self.map_mut(handle)?.fitted = Some(bounds.clone());
        Ok(())
    }
}

/// Render target whose attachment can be toggled
#[derive(Debug)]
pub struct HeadlessTarget {
    id: String,
    attached: Cell<bool>,
}

impl HeadlessTarget {
    pub fn attached(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attached: Cell::new(true),
        }
    }

    pub fn detached(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attached: Cell::new(false),
        }
    }

    pub fn attach(&self) {
        self.attached.set(true);
    }

    pub fn detach(&self) {
        self.attached.set(false);
    }
}

impl RenderTarget for HeadlessTarget {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_attached(&self) -> bool {
        self.attached.get()
    }
}
