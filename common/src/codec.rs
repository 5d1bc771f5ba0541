//! Newline framing for wire messages.
//!
//! One message per line: the serialized record never contains a raw newline
//! (serde_json escapes control characters inside strings), so a single `\n`
//! terminates every frame. Reads from the socket arrive chunked at arbitrary
//! boundaries; [`StreamDecoder`] carries the trailing partial frame between
//! reads.

use serde_json::Value;
use tracing::warn;

use crate::error::NetError;
use crate::messages::Message;

/// Frame terminator. Guaranteed absent from a serialized message.
pub const DELIMITER: u8 = b'\n';

/// Serializes one message into a delimited frame.
pub fn encode(message: &Message) -> Result<Vec<u8>, NetError> {
    let mut frame = serde_json::to_vec(message).map_err(NetError::Protocol)?;
    frame.push(DELIMITER);
    Ok(frame)
}

/// Parses one complete frame span (without its delimiter).
///
/// A span that is not JSON at all is a [`NetError::Protocol`] — the stream
/// is beyond recovery because the frame boundary itself cannot be trusted.
/// Valid JSON with the wrong shape for its declared kind is a
/// [`NetError::Malformed`], which the caller drops without killing the
/// connection. Unknown kinds come back as [`Message::Unknown`].
pub fn parse_frame(span: &[u8]) -> Result<Message, NetError> {
    let value: Value = serde_json::from_slice(span).map_err(NetError::Protocol)?;
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    serde_json::from_value(value).map_err(|source| NetError::Malformed { kind, source })
}

/// Splits `buffer` into complete messages plus leftover bytes.
///
/// Every `[start, delimiter)` span is parsed as one message; the trailing
/// partial span is returned for the caller to prefix onto the next read.
/// Whitespace-only spans (e.g. a `\r\n` peer) are ignored. Malformed frames
/// of a recognized kind are logged and skipped; only an unparseable span
/// fails the whole stream.
pub fn decode_stream(buffer: &[u8]) -> Result<(Vec<Message>, Vec<u8>), NetError> {
    let mut messages = Vec::new();
    let mut rest = buffer;
    while let Some(pos) = rest.iter().position(|b| *b == DELIMITER) {
        let span = &rest[..pos];
        rest = &rest[pos + 1..];
        if span.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        match parse_frame(span) {
            Ok(message) => messages.push(message),
            Err(err @ NetError::Malformed { .. }) => {
                warn!(error = %err, "dropping malformed message");
            }
            Err(err) => return Err(err),
        }
    }
    Ok((messages, rest.to_vec()))
}

/// Incremental wrapper around [`decode_stream`] owning the carry-over
/// buffer. One per connection, fed only by the receive worker.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    carry: Vec<u8>,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends freshly read bytes and returns every message completed by
    /// them, in wire order.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<Message>, NetError> {
        self.carry.extend_from_slice(bytes);
        let (messages, leftover) = decode_stream(&self.carry)?;
        self.carry = leftover;
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_messages() -> Vec<Message> {
        vec![
            Message::Username {
                username: "alice".to_string(),
            },
            Message::UsernameList {
                usernames: vec!["alice".to_string(), "bob".to_string()],
            },
            Message::StartGame,
            Message::GameStarted {
                drawer: "alice".to_string(),
                word: "cat".to_string(),
            },
            Message::Line {
                x: 1.5,
                y: 2.5,
                r: 10,
                g: 20,
                b: 30,
                a: 255,
                brush_size: 6.0,
            },
            Message::EndLine,
            Message::Guess {
                username: "bob".to_string(),
                word: "dog".to_string(),
            },
            Message::CorrectGuess {
                username: "bob".to_string(),
                word: "cat".to_string(),
            },
            Message::IncorrectGuess {
                username: "bob".to_string(),
                word: "dog".to_string(),
            },
            Message::GameAborted {
                usernames: vec!["alice".to_string()],
            },
        ]
    }

    #[test]
    fn round_trip_yields_exactly_the_input() {
        for message in sample_messages() {
            let frame = encode(&message).unwrap();
            let (decoded, leftover) = decode_stream(&frame).unwrap();
            assert_eq!(decoded, vec![message]);
            assert!(leftover.is_empty());
        }
    }

    #[test]
    fn decoding_is_invariant_under_rechunking() {
        let mut stream = Vec::new();
        for message in sample_messages() {
            stream.extend_from_slice(&encode(&message).unwrap());
        }

        let (whole, _) = decode_stream(&stream).unwrap();

        for chunk_size in [1, 2, 3, 7, 16, stream.len()] {
            let mut decoder = StreamDecoder::new();
            let mut rechunked = Vec::new();
            for chunk in stream.chunks(chunk_size) {
                rechunked.extend(decoder.feed(chunk).unwrap());
            }
            assert_eq!(rechunked, whole, "chunk size {chunk_size}");
        }
    }

    #[test]
    fn partial_frame_is_kept_as_leftover() {
        let frame = encode(&Message::EndLine).unwrap();
        let (head, tail) = frame.split_at(frame.len() - 5);

        let (messages, leftover) = decode_stream(head).unwrap();
        assert!(messages.is_empty());
        assert_eq!(leftover, head);

        let mut decoder = StreamDecoder::new();
        assert!(decoder.feed(head).unwrap().is_empty());
        assert_eq!(decoder.feed(tail).unwrap(), vec![Message::EndLine]);
    }

    #[test]
    fn blank_spans_between_delimiters_are_ignored() {
        let mut stream = b"\n \r\n".to_vec();
        stream.extend_from_slice(&encode(&Message::StartGame).unwrap());
        stream.extend_from_slice(b"\n");

        let (messages, leftover) = decode_stream(&stream).unwrap();
        assert_eq!(messages, vec![Message::StartGame]);
        assert!(leftover.is_empty());
    }

    #[test]
    fn unknown_kind_is_delivered_as_the_fallback() {
        let stream = b"{\"type\":\"leaderboard\",\"scores\":[3,1]}\n";
        let (messages, _) = decode_stream(stream).unwrap();
        assert_eq!(messages, vec![Message::Unknown]);
    }

    #[test]
    fn malformed_known_kind_is_dropped_not_fatal() {
        let mut stream = b"{\"type\":\"gameStarted\",\"drawer\":\"alice\"}\n".to_vec();
        stream.extend_from_slice(&encode(&Message::EndLine).unwrap());

        let (messages, _) = decode_stream(&stream).unwrap();
        assert_eq!(messages, vec![Message::EndLine]);

        let err = parse_frame(b"{\"type\":\"gameStarted\",\"drawer\":\"alice\"}").unwrap_err();
        assert!(matches!(err, NetError::Malformed { ref kind, .. } if kind == "gameStarted"));
        assert!(!err.is_fatal());
    }

    #[test]
    fn unframeable_span_is_fatal() {
        let err = decode_stream(b"this is not json\n").unwrap_err();
        assert!(matches!(err, NetError::Protocol(_)));
        assert!(err.is_fatal());
    }
}
