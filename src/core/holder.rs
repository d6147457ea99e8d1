//! Ownership cell for the overlay's single map instance

use crate::{
    core::{config::WidgetConfig, geo::LatLng},
    layers::base::TileLayerSpec,
    traits::{MapEngine, RenderTarget},
    Result,
};
use serde::{Deserialize, Serialize};

/// Opaque reference to one engine map instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapHandle(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub center: LatLng,
    pub zoom: f64,
    pub zoom_control: bool,
    pub attribution_control: bool,
}

impl MapOptions {
    /// Default view with the engine's zoom and attribution chrome turned off
    pub fn from_config(config: &WidgetConfig) -> Self {
        Self {
            center: config.default_center,
            zoom: config.default_zoom,
            zoom_control: false,
            attribution_control: false,
        }
    }
}

#[derive(Debug, Clone)]
struct HeldMap {
    handle: MapHandle,
    target_id: String,
}

/// Creates the map once per mount and hands back the same handle afterwards.
#[derive(Debug)]
pub struct MapHolder {
    options: MapOptions,
    tiles: TileLayerSpec,
    current: Option<HeldMap>,
}

impl MapHolder {
    pub fn new(config: &WidgetConfig) -> Self {
        Self {
            options: MapOptions::from_config(config),
            tiles: TileLayerSpec::new(config.tile_url.clone()),
            current: None,
        }
    }

    pub fn handle(&self) -> Option<MapHandle> {
        self.current.as_ref().map(|held| held.handle)
    }

    /// Returns the live handle, creating the map if needed.
    ///
    /// `Ok(None)` means the target is not attached yet; call again on the next
    /// render tick. A handle bound to a different (or detached) region is
    /// destroyed before a new one is made.
    pub fn init<E: MapEngine>(
        &mut self,
        engine: &mut E,
        target: &dyn RenderTarget,
    ) -> Result<Option<MapHandle>> {
        if let Some(held) = &self.current {
            if held.target_id == target.id() && target.is_attached() {
                return Ok(Some(held.handle));
            }
            log::debug!(
                "map target {} gone, releasing {:?}",
                held.target_id,
                held.handle
            );
            self.teardown(engine)?;
        }

        if !target.is_attached() {
            log::debug!("target {} not attached yet, deferring map init", target.id());
            return Ok(None);
        }

        let handle = engine.create_map(target, &self.options)?;
        if let Err(e) = engine.add_tile_layer(handle, &self.tiles) {
            // Don't keep a half-built instance around
            if let Err(cleanup) = engine.destroy_map(handle) {
                log::warn!("could not release half-built map {:?}: {}", handle, cleanup);
            }
            return Err(e);
        }

        log::info!("created map {:?} in {}", handle, target.id());
        self.current = Some(HeldMap {
            handle,
            target_id: target.id().to_string(),
        });
        Ok(Some(handle))
    }

    /// Destroys the held instance, if any.
    pub fn teardown<E: MapEngine>(&mut self, engine: &mut E) -> Result<()> {
        match self.current.take() {
            Some(held) => {
                log::info!("destroying map {:?}", held.handle);
                engine.destroy_map(held.handle)
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::headless::{HeadlessEngine, HeadlessTarget};

    #[test]
    fn test_init_is_idempotent() {
        let mut engine = HeadlessEngine::new();
        let target = HeadlessTarget::attached("map-root");
        let mut holder = MapHolder::new(&WidgetConfig::default());

        let first = holder.init(&mut engine, &target).unwrap().unwrap();
        let second = holder.init(&mut engine, &target).unwrap().unwrap();

        assert_eq!(first, second);
        assert_eq!(engine.maps_created(), 1);
        assert_eq!(engine.live_maps(), 1);
        assert_eq!(engine.target_of(first), Some("map-root"));
    }

    #[test]
    fn test_failed_tile_layer_releases_instance() {
        let mut engine = HeadlessEngine::new();
        engine.set_reject_adds(true);
        let target = HeadlessTarget::attached("map-root");
        let mut holder = MapHolder::new(&WidgetConfig::default());

        assert!(matches!(
            holder.init(&mut engine, &target),
            Err(crate::Error::Engine(_))
        ));
        assert_eq!(engine.maps_created(), 1);
        assert_eq!(engine.live_maps(), 0);
        assert!(holder.handle().is_none());
    }

    #[test]
    fn test_init_defers_until_attached() {
        let mut engine = HeadlessEngine::new();
        let target = HeadlessTarget::detached("map-root");
        let mut holder = MapHolder::new(&WidgetConfig::default());

        assert_eq!(holder.init(&mut engine, &target).unwrap(), None);
        assert_eq!(engine.maps_created(), 0);

        target.attach();
        assert!(holder.init(&mut engine, &target).unwrap().is_some());
        assert_eq!(engine.maps_created(), 1);
    }

    #[test]
    fn test_new_instance_has_base_tiles_and_no_chrome() {
        let mut engine = HeadlessEngine::new();
        let target = HeadlessTarget::attached("map-root");
        let mut holder = MapHolder::new(&WidgetConfig::default());
        let handle = holder.init(&mut engine, &target).unwrap().unwrap();

        let options = engine.options(handle).unwrap();
        assert!(!options.zoom_control);
        assert!(!options.attribution_control);
        assert_eq!(options.center, LatLng::new(24.86, 67.01));
        assert_eq!(engine.tile_layer_count(handle), 1);
    }

    #[test]
    fn test_detached_target_releases_old_instance() {
        let mut engine = HeadlessEngine::new();
        let target = HeadlessTarget::attached("map-root");
        let mut holder = MapHolder::new(&WidgetConfig::default());
        holder.init(&mut engine, &target).unwrap();

        target.detach();
        assert_eq!(holder.init(&mut engine, &target).unwrap(), None);
        assert_eq!(engine.live_maps(), 0);
        assert!(holder.handle().is_none());
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let mut engine = HeadlessEngine::new();
        let target = HeadlessTarget::attached("map-root");
        let mut holder = MapHolder::new(&WidgetConfig::default());
        holder.init(&mut engine, &target).unwrap();

        holder.teardown(&mut engine).unwrap();
        holder.teardown(&mut engine).unwrap();
        assert_eq!(engine.live_maps(), 0);
    }
}
