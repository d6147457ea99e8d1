pub mod base;
pub mod headless;
pub mod manager;
pub mod marker;
pub mod route;

pub use base::{LayerId, LayerKind, TileLayerSpec};
pub use headless::{HeadlessEngine, HeadlessTarget};
pub use manager::{LayerSynchronizer, SyncReport};
pub use marker::MarkerLayer;
pub use route::{Route, RouteLayer};
