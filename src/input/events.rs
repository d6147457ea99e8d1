use crate::core::geo::Point;
use serde::{Deserialize, Serialize};

/// Phase of a pointer interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerKind {
    Down,
    Move,
    Up,
    Cancel,
}

/// A pointer event in page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerKind,
    /// Mouse, pen or touch contact id
    pub pointer_id: u64,
    pub position: Point,
}

impl PointerEvent {
    pub fn down(pointer_id: u64, x: f64, y: f64) -> Self {
        Self::new(PointerKind::Down, pointer_id, x, y)
    }

    pub fn moved(pointer_id: u64, x: f64, y: f64) -> Self {
        Self::new(PointerKind::Move, pointer_id, x, y)
    }

    pub fn up(pointer_id: u64, x: f64, y: f64) -> Self {
        Self::new(PointerKind::Up, pointer_id, x, y)
    }

    pub fn cancel(pointer_id: u64) -> Self {
        Self::new(PointerKind::Cancel, pointer_id, 0.0, 0.0)
    }

    fn new(kind: PointerKind, pointer_id: u64, x: f64, y: f64) -> Self {
        Self {
            kind,
            pointer_id,
            position: Point::new(x, y),
        }
    }
}

/// Keyboard key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Escape,
    Enter,
    Space,
    Tab,
    Other(u32),
}

/// Part of the overlay a pointer event landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitRegion {
    /// Title bar; the only drag handle
    Header,
    /// The map itself; panning belongs to the engine
    MapBody,
}

/// Whether an event was handled
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventHandled {
    Handled,
    NotHandled,
}

impl EventHandled {
    pub fn is_handled(self) -> bool {
        self == EventHandled::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let down = PointerEvent::down(1, 140.0, 90.0);
        assert_eq!(down.kind, PointerKind::Down);
        assert_eq!(down.position, Point::new(140.0, 90.0));
        assert_eq!(PointerEvent::cancel(3).pointer_id, 3);
    }

    #[test]
    fn test_wire_format() {
        let event: PointerEvent = serde_json::from_str(
            r#"{"kind": "Move", "pointer_id": 2, "position": {"x": 1.0, "y": 2.0}}"#,
        )
        .unwrap();
        assert_eq!(event, PointerEvent::moved(2, 1.0, 2.0));
        assert!(EventHandled::Handled.is_handled());
        assert!(!EventHandled::NotHandled.is_handled());
    }
}
