//! Which pointer and keyboard actions are currently legal.
//!
//! Modal overlays (color chooser, notifications, the name-entry panel)
//! temporarily take control of input. Instead of every overlay call site
//! juggling the previous mode itself, the two operations here make every
//! open/close path symmetric: [`ModeController::save_and_suspend`] on open,
//! [`ModeController::restore`] on close.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Idle,
    Paint,
    Erase,
    TextEntry,
}

/// Current input mode plus the one slot a suspended mode parks in while an
/// overlay is open.
#[derive(Debug, Default)]
pub struct ModeController {
    mode: Mode,
    saved: Option<Mode>,
}

impl ModeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Explicit tool selection by the user.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Parks the current mode and goes idle for the duration of an
    /// overlay. Idempotent while one is already open: the mode captured
    /// first is the one that comes back.
    pub fn save_and_suspend(&mut self) {
        if self.saved.is_none() {
            self.saved = Some(self.mode);
        }
        self.mode = Mode::Idle;
    }

    /// Brings the parked mode back and empties the slot. No-op when no
    /// overlay suspended anything.
    pub fn restore(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.mode = saved;
        }
    }

    /// Whether pointer motion may currently become stroke messages. The
    /// drawer-role half of that decision lives in the session and is
    /// re-checked alongside this every frame.
    pub fn allows_stroke(&self) -> bool {
        matches!(self.mode, Mode::Paint | Mode::Erase)
    }
}
