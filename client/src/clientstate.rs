//! Data-only model of everything the widgets render: chat log, roster
//! display, the shared canvas and the local brush. Rendering itself lives
//! outside this crate; this model is the [`SessionUi`] collaborator the
//! session paints into.

use egui::{Color32, Pos2, Stroke};
use serde::{Deserialize, Serialize};

use crate::session::SessionUi;

/// Stroke settings for the local drawer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Brush {
    pub width: f32,
    pub color: Color32,
}

impl Default for Brush {
    fn default() -> Self {
        Brush {
            width: 4.0,
            color: Color32::BLACK,
        }
    }
}

/// One continuous polyline on the canvas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasLine {
    pub points: Vec<Pos2>,
    pub stroke: Stroke,
}

/// The shared drawing surface, as data. Local strokes and remote replay
/// both land here segment by segment.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Canvas {
    lines: Vec<CanvasLine>,
}

impl Canvas {
    /// Appends one segment, extending the current polyline when it
    /// continues seamlessly with the same stroke settings.
    pub fn segment(&mut self, from: Pos2, to: Pos2, width: f32, color: Color32) {
        let stroke = Stroke::new(width, color);
        if let Some(last) = self.lines.last_mut() {
            if last.stroke == stroke && last.points.last() == Some(&from) {
                last.points.push(to);
                return;
            }
        }
        self.lines.push(CanvasLine {
            points: vec![from, to],
            stroke,
        });
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[CanvasLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Everything the render layer reads once per frame.
#[derive(Debug, Default)]
pub struct ClientState {
    pub chat_input: String,
    pub chat_log: Vec<String>,
    /// Roster display; replaced wholesale by the session.
    pub roster: Vec<String>,
    pub canvas: Canvas,
    pub brush: Brush,
    /// A modal notification, blocking interaction until dismissed.
    pub notification: Option<String>,
    pub color_chooser_open: bool,
}

impl ClientState {
    /// True while any modal overlay has control of input.
    pub fn overlay_open(&self) -> bool {
        self.notification.is_some() || self.color_chooser_open
    }
}

impl SessionUi for ClientState {
    fn chat_line(&mut self, line: &str) {
        self.chat_log.push(line.to_string());
    }

    fn paint_segment(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: [u8; 4]) {
        self.canvas.segment(
            Pos2::new(from.0, from.1),
            Pos2::new(to.0, to.1),
            width,
            Color32::from_rgba_unmultiplied(color[0], color[1], color[2], color[3]),
        );
    }

    fn clear_canvas(&mut self) {
        self.canvas.clear();
    }

    fn notify(&mut self, text: &str) {
        self.notification = Some(text.to_string());
    }

    fn show_roster(&mut self, names: &[String]) {
        self.roster = names.to_vec();
    }
}
