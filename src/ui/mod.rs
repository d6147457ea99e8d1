pub mod driver;
pub mod overlay;

pub use driver::{OverlayDriver, UiEvent};
pub use overlay::{Applied, OverlayView, OverlayWidget, PendingRoute, RouteResolution};
