//! The local mirror of the game session.
//!
//! [`Session`] is the only place inbound protocol messages become state:
//! the render loop drains the transport once per frame and feeds every
//! message through [`Session::apply`]. Side effects on the UI (chat lines,
//! stroke replay, notifications, roster display) go through the
//! [`SessionUi`] collaborator so the state machine stays independent of any
//! widget code.

use serde::{Deserialize, Serialize};

use scrawl_common::messages::Message;

/// Chat input that starts a round instead of being sent as a guess.
pub const START_COMMAND: &str = "/start";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    InProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    None,
    Drawer,
    Guesser,
}

/// Rendering-side collaborator surface. Implemented by the client's data
/// model; the session never talks to widgets directly.
pub trait SessionUi {
    /// Appends one line to the chat log.
    fn chat_line(&mut self, line: &str);
    /// Replays one remote stroke segment onto the shared drawing surface.
    fn paint_segment(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: [u8; 4]);
    /// Wipes the shared drawing surface for a new round.
    fn clear_canvas(&mut self);
    /// Shows a modal notification.
    fn notify(&mut self, text: &str);
    /// Replaces the roster display with a new list.
    fn show_roster(&mut self, names: &[String]);
}

/// Authoritative local session state: phase, roster, role and (for the
/// drawer) the secret word.
///
/// Mutated only by the frame loop, through [`Session::apply`] and the
/// explicit local transitions ([`Session::login`]). Every transition is
/// total over (phase, message kind): combinations the protocol does not
/// define are no-ops, never errors.
pub struct Session {
    phase: Phase,
    role: Role,
    secret_word: String,
    roster: Vec<String>,
    local_username: String,
    /// Replay anchor for the remote stroke in progress. The first `line`
    /// of a stroke only seats this; later ones paint segments from it.
    stroke_anchor: Option<(f32, f32)>,
    lost_connection: bool,
}

impl Default for Session {
    fn default() -> Self {
        Session {
            phase: Phase::Idle,
            role: Role::None,
            secret_word: String::new(),
            roster: Vec::new(),
            local_username: String::new(),
            stroke_anchor: None,
            lost_connection: false,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_drawer(&self) -> bool {
        self.role == Role::Drawer
    }

    pub fn has_started(&self) -> bool {
        self.phase == Phase::InProgress
    }

    /// The word to draw. Non-empty only while this client is the drawer.
    pub fn secret_word(&self) -> &str {
        &self.secret_word
    }

    pub fn roster(&self) -> &[String] {
        &self.roster
    }

    pub fn local_username(&self) -> &str {
        &self.local_username
    }

    /// True once the `disconnected` sentinel has been seen. Terminal: this
    /// client does not reconnect.
    pub fn is_connection_lost(&self) -> bool {
        self.lost_connection
    }

    /// Records the chosen name and builds the login message. The name is
    /// immutable for the rest of the session; a second call changes
    /// nothing and just rebuilds the message.
    pub fn login(&mut self, username: &str) -> Message {
        if self.local_username.is_empty() {
            self.local_username = username.to_string();
            self.roster.push(self.local_username.clone());
        }
        Message::Username {
            username: self.local_username.clone(),
        }
    }

    /// Turns one line of chat input into an outbound message, if the
    /// current phase and role allow one.
    ///
    /// The start command works only between rounds; anything else is a
    /// guess, and only guessers in a running round may guess.
    pub fn submit_chat(&self, text: &str) -> Option<Message> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if text == START_COMMAND {
            return (self.phase == Phase::Idle).then(|| Message::StartGame);
        }
        if self.phase == Phase::InProgress && self.role != Role::Drawer {
            return Some(Message::Guess {
                username: self.local_username.clone(),
                word: text.to_string(),
            });
        }
        None
    }

    /// Applies one inbound message.
    pub fn apply(&mut self, message: Message, ui: &mut dyn SessionUi) {
        match message {
            Message::UsernameList { usernames } => {
                self.replace_roster(usernames, ui);
            }
            Message::GameStarted { drawer, word } => {
                if self.phase == Phase::InProgress {
                    return;
                }
                self.phase = Phase::InProgress;
                if drawer == self.local_username {
                    self.role = Role::Drawer;
                    self.secret_word = word;
                    ui.notify(&format!("The word is: {}", self.secret_word));
                } else {
                    self.role = Role::Guesser;
                    self.secret_word.clear();
                }
                ui.chat_line(&format!("{drawer} is drawing."));
            }
            Message::Line {
                x,
                y,
                r,
                g,
                b,
                a,
                brush_size,
            } => {
                if self.phase != Phase::InProgress {
                    return;
                }
                match self.stroke_anchor {
                    None => self.stroke_anchor = Some((x, y)),
                    Some(from) => {
                        // The drawer already painted this segment locally.
                        if self.role != Role::Drawer {
                            ui.paint_segment(from, (x, y), brush_size, [r, g, b, a]);
                        }
                        self.stroke_anchor = Some((x, y));
                    }
                }
            }
            Message::EndLine => {
                if self.phase == Phase::InProgress {
                    self.stroke_anchor = None;
                }
            }
            Message::CorrectGuess { username, word } => {
                if self.phase != Phase::InProgress {
                    return;
                }
                ui.chat_line(&format!("{username}: {word}"));
                ui.chat_line(&format!("{username} guessed correctly!"));
                self.reset_round(ui);
            }
            Message::IncorrectGuess { username, word } => {
                if self.phase != Phase::InProgress {
                    return;
                }
                ui.chat_line(&format!("{username}: {word}"));
            }
            Message::GameAborted { usernames } => {
                ui.chat_line("Game aborted!");
                self.replace_roster(usernames, ui);
                self.reset_round(ui);
            }
            Message::Disconnected => {
                self.lost_connection = true;
                ui.chat_line("Connection to the server was lost.");
                self.reset_round(ui);
            }
            // Forward compatibility: kinds this client does not know.
            Message::Unknown => {}
            // Kinds only this client emits; a server echoing them is noise.
            Message::Username { .. } | Message::StartGame | Message::Guess { .. } => {}
        }
    }

    /// Replaces the roster, keeping join order and rejecting duplicates,
    /// and mirrors the new list into chat and the roster display.
    fn replace_roster(&mut self, usernames: Vec<String>, ui: &mut dyn SessionUi) {
        self.roster.clear();
        for name in usernames {
            if !self.roster.contains(&name) {
                self.roster.push(name);
            }
        }
        ui.chat_line("Players:");
        for name in &self.roster {
            ui.chat_line(&format!("  {name}"));
        }
        ui.show_roster(&self.roster);
    }

    /// Back to between-rounds state. Idempotent.
    fn reset_round(&mut self, ui: &mut dyn SessionUi) {
        self.phase = Phase::Idle;
        self.role = Role::None;
        self.secret_word.clear();
        self.stroke_anchor = None;
        ui.clear_canvas();
    }
}
