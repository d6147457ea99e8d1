pub mod drag;
pub mod events;

pub use drag::{DragController, DragEffect, DragSession, DragState};
pub use events::{EventHandled, HitRegion, KeyCode, PointerEvent, PointerKind};
