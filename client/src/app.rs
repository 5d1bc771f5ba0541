//! Ties transport, session, mode controller and UI model into one context
//! object owned by the render loop. Nothing here is global: the loop holds
//! the [`GameApp`] and passes it wherever state is needed.

use tracing::warn;

use scrawl_common::error::NetError;
use scrawl_common::messages::Message;

use egui::Color32;

use crate::clientstate::ClientState;
use crate::controller::{Mode, ModeController};
use crate::network::Transport;
use crate::painting::{PointerSample, StrokeInput};
use crate::session::Session;

pub struct GameApp {
    pub transport: Transport,
    pub session: Session,
    pub modes: ModeController,
    pub state: ClientState,
    stroke_input: StrokeInput,
    alive: bool,
}

impl Default for GameApp {
    fn default() -> Self {
        let mut modes = ModeController::new();
        // The name-entry panel is the first modal overlay; it is open from
        // process start until login.
        modes.save_and_suspend();
        GameApp {
            transport: Transport::new(),
            session: Session::new(),
            modes,
            state: ClientState::default(),
            stroke_input: StrokeInput::new(),
            alive: false,
        }
    }
}

impl GameApp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects, logs in under `username` and closes the name-entry
    /// overlay, leaving the paint tool selected.
    pub fn connect(&mut self, addr: &str, username: &str) -> Result<(), NetError> {
        self.transport.connect(addr)?;
        let login = self.session.login(username);
        self.transport.send(login)?;
        self.alive = true;
        self.modes.restore();
        self.modes.set_mode(Mode::Paint);
        Ok(())
    }

    /// False once the connection died. Terminal; there is no reconnect.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Drains the inbound queue, once per frame. Messages that open a
    /// modal overlay also suspend the input mode.
    pub fn pump(&mut self) {
        while let Some(message) = self.transport.poll() {
            if message == Message::Disconnected {
                self.alive = false;
            }
            let overlay_before = self.state.overlay_open();
            self.session.apply(message, &mut self.state);
            if !overlay_before && self.state.overlay_open() {
                self.modes.save_and_suspend();
            }
        }
    }

    /// Feeds one frame of pointer state through the stroke translator and
    /// queues whatever it produced.
    pub fn pointer_frame(&mut self, pointer: PointerSample) {
        let messages = self.stroke_input.update(
            pointer,
            &self.session,
            &self.modes,
            &self.state.brush,
            &mut self.state.canvas,
        );
        for message in messages {
            self.send_or_drop(message);
        }
    }

    /// Submits one line of chat input; whether it becomes a start command
    /// or a guess (or nothing) is the session's call.
    pub fn submit_chat(&mut self, text: &str) {
        if let Some(message) = self.session.submit_chat(text) {
            self.send_or_drop(message);
        }
    }

    pub fn select_tool(&mut self, mode: Mode) {
        self.modes.set_mode(mode);
    }

    pub fn open_color_chooser(&mut self) {
        if self.state.overlay_open() {
            return;
        }
        self.modes.save_and_suspend();
        self.state.color_chooser_open = true;
    }

    /// Closes the chooser, keeping `color` when one was picked.
    pub fn close_color_chooser(&mut self, color: Option<Color32>) {
        if !self.state.color_chooser_open {
            return;
        }
        if let Some(color) = color {
            self.state.brush.color = color;
        }
        self.state.color_chooser_open = false;
        if !self.state.overlay_open() {
            self.modes.restore();
        }
    }

    pub fn dismiss_notification(&mut self) {
        if self.state.notification.take().is_some() && !self.state.overlay_open() {
            self.modes.restore();
        }
    }

    /// Queue admission is the single flow-control point: a saturated
    /// outbound queue drops the message here rather than blocking the
    /// frame.
    fn send_or_drop(&mut self, message: Message) {
        match self.transport.send(message) {
            Ok(()) => {}
            Err(NetError::QueueSaturated) => {
                warn!("outbound queue saturated, dropping message");
            }
            Err(err) => warn!(error = %err, "failed to queue message"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;
    use std::time::{Duration, Instant};

    use scrawl_common::codec::{self, StreamDecoder};

    /// Reads from `peer` until `want` messages arrived.
    fn read_messages(peer: &mut TcpStream, want: usize) -> Vec<Message> {
        let mut decoder = StreamDecoder::new();
        let mut chunk = [0u8; 1024];
        let mut got = Vec::new();
        while got.len() < want {
            let read = peer.read(&mut chunk).unwrap();
            assert_ne!(read, 0, "client hung up early");
            got.extend(decoder.feed(&chunk[..read]).unwrap());
        }
        got
    }

    fn write_message(peer: &mut TcpStream, message: &Message) {
        peer.write_all(&codec::encode(message).unwrap()).unwrap();
    }

    /// Keeps the socket open until the client hangs up.
    fn wait_for_hangup(peer: &mut TcpStream) {
        let mut buf = [0u8; 64];
        while peer.read(&mut buf).map(|read| read > 0).unwrap_or(false) {}
    }

    fn pump_until(app: &mut GameApp, mut done: impl FnMut(&GameApp) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !done(app) {
            assert!(Instant::now() < deadline, "condition never became true");
            app.pump();
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn name_entry_suspends_until_login() {
        let mut app = GameApp::new();
        assert_eq!(app.modes.mode(), Mode::Idle);
        assert!(!app.is_alive());
    }

    #[test]
    fn a_full_drawer_round_against_a_scripted_server() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let server = thread::spawn(move || {
            let (mut peer, _) = listener.accept().unwrap();

            let login = read_messages(&mut peer, 1);
            assert_eq!(
                login,
                vec![Message::Username {
                    username: "alice".to_string()
                }]
            );
            write_message(
                &mut peer,
                &Message::UsernameList {
                    usernames: vec!["alice".to_string(), "bob".to_string()],
                },
            );

            // The client asks for a round; alice draws.
            let start = read_messages(&mut peer, 1);
            assert_eq!(start, vec![Message::StartGame]);
            write_message(
                &mut peer,
                &Message::GameStarted {
                    drawer: "alice".to_string(),
                    word: "cat".to_string(),
                },
            );

            // Two stroke samples and the release marker.
            let stroke = read_messages(&mut peer, 3);
            assert!(matches!(stroke[0], Message::Line { .. }));
            assert!(matches!(stroke[1], Message::Line { .. }));
            assert_eq!(stroke[2], Message::EndLine);

            write_message(
                &mut peer,
                &Message::CorrectGuess {
                    username: "bob".to_string(),
                    word: "cat".to_string(),
                },
            );
            wait_for_hangup(&mut peer);
        });

        let mut app = GameApp::new();
        app.connect(&addr, "alice").unwrap();
        assert_eq!(app.modes.mode(), Mode::Paint);

        pump_until(&mut app, |app| !app.state.roster.is_empty());
        assert_eq!(app.state.roster, ["alice".to_string(), "bob".to_string()]);

        app.submit_chat("/start");
        pump_until(&mut app, |app| app.session.has_started());

        // The drawer sees the word in a notification and input suspends.
        assert_eq!(
            app.state.notification.as_deref(),
            Some("The word is: cat")
        );
        assert_eq!(app.modes.mode(), Mode::Idle);
        app.dismiss_notification();
        assert_eq!(app.modes.mode(), Mode::Paint);

        app.pointer_frame(PointerSample::pressed_at(10.0, 10.0));
        app.pointer_frame(PointerSample::pressed_at(20.0, 20.0));
        app.pointer_frame(PointerSample::released());
        assert!(!app.state.canvas.is_empty());

        pump_until(&mut app, |app| !app.session.has_started());
        assert_eq!(app.session.secret_word(), "");
        assert!(app.state.canvas.is_empty());

        drop(app);
        server.join().unwrap();
    }

    #[test]
    fn a_guesser_chats_instead_of_drawing() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let server = thread::spawn(move || {
            let (mut peer, _) = listener.accept().unwrap();
            read_messages(&mut peer, 1);
            write_message(
                &mut peer,
                &Message::GameStarted {
                    drawer: "alice".to_string(),
                    word: "cat".to_string(),
                },
            );

            let guess = read_messages(&mut peer, 1);
            assert_eq!(
                guess,
                vec![Message::Guess {
                    username: "bob".to_string(),
                    word: "dog".to_string(),
                }]
            );
            write_message(
                &mut peer,
                &Message::IncorrectGuess {
                    username: "bob".to_string(),
                    word: "dog".to_string(),
                },
            );
            wait_for_hangup(&mut peer);
        });

        let mut app = GameApp::new();
        app.connect(&addr, "bob").unwrap();
        pump_until(&mut app, |app| app.session.has_started());

        // No notification for guessers, so input stays live.
        assert!(app.state.notification.is_none());
        assert_eq!(app.modes.mode(), Mode::Paint);

        // Pointer motion from a guesser goes nowhere.
        app.pointer_frame(PointerSample::pressed_at(10.0, 10.0));
        app.pointer_frame(PointerSample::released());
        assert!(app.state.canvas.is_empty());

        app.submit_chat("dog");
        pump_until(&mut app, |app| {
            app.state.chat_log.contains(&"bob: dog".to_string())
        });

        drop(app);
        server.join().unwrap();
    }

    #[test]
    fn a_dead_server_ends_the_app() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        thread::spawn(move || {
            let (mut peer, _) = listener.accept().unwrap();
            read_messages(&mut peer, 1);
            // Dropping the socket disconnects the client.
        });

        let mut app = GameApp::new();
        app.connect(&addr, "alice").unwrap();
        pump_until(&mut app, |app| !app.is_alive());
        assert!(app.session.is_connection_lost());
        assert!(app
            .state
            .chat_log
            .contains(&"Connection to the server was lost.".to_string()));
    }

    #[test]
    fn color_chooser_suspends_and_restores_the_tool() {
        let mut app = GameApp::new();
        app.modes.restore();
        app.select_tool(Mode::Erase);

        app.open_color_chooser();
        assert_eq!(app.modes.mode(), Mode::Idle);
        assert!(app.state.overlay_open());

        // Opening again while already open must not clobber the slot.
        app.open_color_chooser();

        app.close_color_chooser(Some(Color32::RED));
        assert_eq!(app.modes.mode(), Mode::Erase);
        assert_eq!(app.state.brush.color, Color32::RED);
        assert!(!app.state.overlay_open());

        // Closing a chooser that is not open changes nothing.
        app.close_color_chooser(Some(Color32::GREEN));
        assert_eq!(app.state.brush.color, Color32::RED);
    }
}
