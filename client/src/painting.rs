//! Turns local pointer motion into canvas segments and outbound stroke
//! messages.
//!
//! Whether a pointer sample may draw is decided fresh on every frame from
//! the session (drawer, round running) and the mode controller (Paint or
//! Erase); nothing is cached across frames except the stroke geometry
//! itself.

use egui::{Color32, Pos2};

use scrawl_common::messages::Message;

use crate::clientstate::{Brush, Canvas};
use crate::controller::{Mode, ModeController};
use crate::session::Session;

/// Erasing is painting with the background color.
pub const ERASER_COLOR: Color32 = Color32::WHITE;

/// One frame's worth of pointer state.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerSample {
    pub pos: Pos2,
    /// Primary button held down.
    pub pressed: bool,
}

impl PointerSample {
    pub fn pressed_at(x: f32, y: f32) -> Self {
        PointerSample {
            pos: Pos2::new(x, y),
            pressed: true,
        }
    }

    pub fn released() -> Self {
        PointerSample {
            pos: Pos2::ZERO,
            pressed: false,
        }
    }
}

/// Per-stroke input state for the local drawer.
#[derive(Debug, Default)]
pub struct StrokeInput {
    last: Option<Pos2>,
    mid_stroke: bool,
}

impl StrokeInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one pointer sample; paints locally and returns the stroke
    /// messages to put on the wire.
    ///
    /// While drawing is not allowed (wrong mode, not the drawer, round
    /// over, button up) the stroke in progress ends: one `endLine` goes
    /// out, and only if this client is still the drawer.
    pub fn update(
        &mut self,
        pointer: PointerSample,
        session: &Session,
        modes: &ModeController,
        brush: &Brush,
        canvas: &mut Canvas,
    ) -> Vec<Message> {
        let mut outbound = Vec::new();
        let may_draw = session.has_started() && session.is_drawer() && modes.allows_stroke();

        if may_draw && pointer.pressed {
            let color = if modes.mode() == Mode::Erase {
                ERASER_COLOR
            } else {
                brush.color
            };
            // The first sample of a stroke paints a dot at the pointer.
            let from = self.last.unwrap_or(pointer.pos);
            canvas.segment(from, pointer.pos, brush.width, color);
            outbound.push(Message::Line {
                x: pointer.pos.x,
                y: pointer.pos.y,
                r: color.r(),
                g: color.g(),
                b: color.b(),
                a: color.a(),
                brush_size: brush.width,
            });
            self.last = Some(pointer.pos);
            self.mid_stroke = true;
        } else {
            if self.mid_stroke && session.is_drawer() {
                outbound.push(Message::EndLine);
            }
            self.mid_stroke = false;
            self.last = None;
        }
        outbound
    }
}
