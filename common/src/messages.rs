use serde::{Deserialize, Serialize};

/// One wire message, discriminated by its `type` field.
///
/// The server is the authority for everything it announces; the client only
/// ever checks shapes, never plausibility. Kinds the client sends and kinds
/// the server sends share one enum because they share one wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Message {
    /// Sent once at login with the chosen name.
    Username { username: String },
    /// Full roster replacement, in join order.
    UsernameList { usernames: Vec<String> },
    /// Asks the server to begin a round.
    StartGame,
    /// A round began; `word` is meaningful only to the named drawer.
    GameStarted { drawer: String, word: String },
    /// One stroke segment endpoint with its brush settings.
    Line {
        x: f32,
        y: f32,
        r: u8,
        g: u8,
        b: u8,
        a: u8,
        #[serde(rename = "brushSize")]
        brush_size: f32,
    },
    /// The current stroke ended.
    EndLine,
    /// A free-text guess from this client.
    Guess { username: String, word: String },
    /// Somebody guessed the word; the round is over.
    CorrectGuess { username: String, word: String },
    /// A wrong guess, echoed to everyone as chat.
    IncorrectGuess { username: String, word: String },
    /// The round was cancelled; carries the refreshed roster.
    GameAborted { usernames: Vec<String> },
    /// Local sentinel pushed by the receive worker when the connection
    /// dies. Never on the wire.
    Disconnected,
    /// Forward compatibility: a kind this client does not know. Ignored.
    #[serde(other)]
    Unknown,
}

impl Message {
    /// The wire value of the `type` field, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Username { .. } => "username",
            Message::UsernameList { .. } => "usernameList",
            Message::StartGame => "startGame",
            Message::GameStarted { .. } => "gameStarted",
            Message::Line { .. } => "line",
            Message::EndLine => "endLine",
            Message::Guess { .. } => "guess",
            Message::CorrectGuess { .. } => "correctGuess",
            Message::IncorrectGuess { .. } => "incorrectGuess",
            Message::GameAborted { .. } => "gameAborted",
            Message::Disconnected => "disconnected",
            Message::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_tags_match_the_wire() {
        let json = serde_json::to_value(Message::GameStarted {
            drawer: "alice".to_string(),
            word: "cat".to_string(),
        })
        .unwrap();
        assert_eq!(json["type"], "gameStarted");
        assert_eq!(json["drawer"], "alice");
        assert_eq!(json["word"], "cat");
    }

    #[test]
    fn line_payload_is_flat_with_camel_case_brush_size() {
        let json = serde_json::to_value(Message::Line {
            x: 10.0,
            y: 20.0,
            r: 255,
            g: 0,
            b: 0,
            a: 255,
            brush_size: 4.0,
        })
        .unwrap();
        assert_eq!(json["type"], "line");
        assert_eq!(json["x"], 10.0);
        assert_eq!(json["brushSize"], 4.0);
        assert!(json.get("brush_size").is_none());
    }

    #[test]
    fn unit_kinds_serialize_to_bare_records() {
        let json = serde_json::to_value(Message::EndLine).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "endLine" }));
        let json = serde_json::to_value(Message::StartGame).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "startGame" }));
    }

    #[test]
    fn unknown_kind_deserializes_to_the_fallback() {
        let msg: Message =
            serde_json::from_str(r#"{"type":"serverOfTheFuture","data":1}"#).unwrap();
        assert_eq!(msg, Message::Unknown);
    }
}
