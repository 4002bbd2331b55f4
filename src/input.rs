use egui::Pos2;

/// Discrete lifecycle step of one pointer contact. Mouse and touch input
/// both collapse into this shape before reaching the engine; `Cancel`
/// (the pointer vanishing mid-gesture) carries release semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// A single pointer event in canvas coordinates, origin at the canvas
/// top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub pos: Pos2,
    pub phase: PointerPhase,
}

impl PointerEvent {
    pub fn down(pos: Pos2) -> Self {
        Self {
            pos,
            phase: PointerPhase::Down,
        }
    }

    pub fn moved(pos: Pos2) -> Self {
        Self {
            pos,
            phase: PointerPhase::Move,
        }
    }

    pub fn up(pos: Pos2) -> Self {
        Self {
            pos,
            phase: PointerPhase::Up,
        }
    }

    pub fn cancel(pos: Pos2) -> Self {
        Self {
            pos,
            phase: PointerPhase::Cancel,
        }
    }
}
