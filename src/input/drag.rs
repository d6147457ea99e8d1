//! Header drag state machine
//!
//! Transitions return the side effects the host has to perform instead of
//! touching a pointer device, so every path can be driven from tests.

use crate::{
    core::geo::{Point, WidgetPosition},
    input::events::{PointerEvent, PointerKind},
};

/// Side effect requested by a drag transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragEffect {
    /// Route all further events of this pointer to the header
    CapturePointer(u64),
    ReleasePointer(u64),
    SuppressTextSelection,
    RestoreTextSelection,
    /// New top-left corner of the overlay
    MoveTo(WidgetPosition),
}

/// An active drag, bound to one pointer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub pointer_id: u64,
    /// Pointer position minus widget top-left at pointer-down
    pub start_offset: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn pointer_down(
        &mut self,
        pointer_id: u64,
        pointer: Point,
        widget: WidgetPosition,
    ) -> Vec<DragEffect> {
        if let DragState::Dragging(session) = self.state {
            log::debug!(
                "pointer {} down ignored, pointer {} is dragging",
                pointer_id,
                session.pointer_id
            );
            return Vec::new();
        }
        let start_offset = pointer.subtract(&widget);
        self.state = DragState::Dragging(DragSession {
            pointer_id,
            start_offset,
        });
        log::debug!("drag start: pointer {} offset {:?}", pointer_id, start_offset);
        vec![
            DragEffect::CapturePointer(pointer_id),
            DragEffect::SuppressTextSelection,
        ]
    }

    pub fn pointer_move(&mut self, pointer_id: u64, pointer: Point) -> Vec<DragEffect> {
        match self.state {
            DragState::Dragging(session) if session.pointer_id == pointer_id => {
                vec![DragEffect::MoveTo(pointer.subtract(&session.start_offset))]
            }
            _ => Vec::new(),
        }
    }

    pub fn pointer_up(&mut self, pointer_id: u64) -> Vec<DragEffect> {
        match self.state {
            DragState::Dragging(session) if session.pointer_id == pointer_id => {
                self.state = DragState::Idle;
                log::debug!("drag end: pointer {}", pointer_id);
                vec![
                    DragEffect::ReleasePointer(pointer_id),
                    DragEffect::RestoreTextSelection,
                ]
            }
            _ => Vec::new(),
        }
    }

    /// The platform took the pointer away; capture is already gone
    pub fn pointer_cancel(&mut self, pointer_id: u64) -> Vec<DragEffect> {
        match self.state {
            DragState::Dragging(session) if session.pointer_id == pointer_id => {
                self.state = DragState::Idle;
                log::debug!("drag cancelled: pointer {}", pointer_id);
                vec![DragEffect::RestoreTextSelection]
            }
            _ => Vec::new(),
        }
    }

    /// Dispatches a header event to the matching transition
    pub fn handle(&mut self, event: &PointerEvent, widget: WidgetPosition) -> Vec<DragEffect> {
        match event.kind {
            PointerKind::Down => self.pointer_down(event.pointer_id, event.position, widget),
            PointerKind::Move => self.pointer_move(event.pointer_id, event.position),
            PointerKind::Up => self.pointer_up(event.pointer_id),
            PointerKind::Cancel => self.pointer_cancel(event.pointer_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_moves_by_pointer_delta() {
        let mut drag = DragController::new();
        let effects = drag.pointer_down(1, Point::new(140.0, 90.0), Point::new(40.0, 40.0));
        assert_eq!(
            effects,
            vec![
                DragEffect::CapturePointer(1),
                DragEffect::SuppressTextSelection
            ]
        );
        assert!(drag.is_dragging());

        let effects = drag.pointer_move(1, Point::new(200.0, 150.0));
        assert_eq!(effects, vec![DragEffect::MoveTo(Point::new(100.0, 100.0))]);

        let effects = drag.pointer_up(1);
        assert_eq!(
            effects,
            vec![
                DragEffect::ReleasePointer(1),
                DragEffect::RestoreTextSelection
            ]
        );
        assert_eq!(drag.state(), DragState::Idle);
    }

    #[test]
    fn test_second_pointer_is_ignored() {
        let mut drag = DragController::new();
        drag.pointer_down(1, Point::new(50.0, 50.0), Point::new(40.0, 40.0));
        assert!(drag
            .pointer_down(2, Point::new(300.0, 300.0), Point::new(40.0, 40.0))
            .is_empty());
        assert!(drag.pointer_move(2, Point::new(10.0, 10.0)).is_empty());
        assert!(drag.pointer_up(2).is_empty());

        match drag.state() {
            DragState::Dragging(session) => {
                assert_eq!(session.pointer_id, 1);
                assert_eq!(session.start_offset, Point::new(10.0, 10.0));
            }
            DragState::Idle => panic!("drag session lost"),
        }
    }

    #[test]
    fn test_every_move_yields_one_update() {
        let mut drag = DragController::new();
        drag.pointer_down(7, Point::new(0.0, 0.0), Point::new(0.0, 0.0));
        let moves: Vec<_> = (1..=5)
            .flat_map(|i| drag.pointer_move(7, Point::new(i as f64, 0.0)))
            .collect();
        assert_eq!(moves.len(), 5);
        assert_eq!(moves[4], DragEffect::MoveTo(Point::new(5.0, 0.0)));
    }

    #[test]
    fn test_cancel_returns_to_idle() {
        let mut drag = DragController::new();
        drag.pointer_down(1, Point::new(0.0, 0.0), Point::new(0.0, 0.0));
        assert_eq!(drag.pointer_cancel(1), vec![DragEffect::RestoreTextSelection]);
        assert!(!drag.is_dragging());
        assert!(drag.pointer_move(1, Point::new(5.0, 5.0)).is_empty());
    }

    #[test]
    fn test_idle_ignores_move_and_up() {
        let mut drag = DragController::new();
        assert!(drag.pointer_move(1, Point::new(5.0, 5.0)).is_empty());
        assert!(drag.pointer_up(1).is_empty());
        assert!(drag
            .handle(&PointerEvent::cancel(1), Point::default())
            .is_empty());
    }
}
