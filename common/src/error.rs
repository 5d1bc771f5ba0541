use thiserror::Error;

/// Everything that can go wrong between the client and the server.
///
/// `Connection` and `Protocol` are fatal to the session; `Malformed` and
/// `QueueSaturated` are recoverable and stay local to one message.
#[derive(Debug, Error)]
pub enum NetError {
    /// The channel could not be established. Not retried automatically.
    #[error("failed to connect to {addr}: {source}")]
    Connection {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The byte stream cannot be framed. The connection is torn down and a
    /// `disconnected` sentinel is delivered to the consumer.
    #[error("protocol violation on the wire: {0}")]
    Protocol(#[source] serde_json::Error),

    /// A frame of a recognized kind has the wrong shape. Dropped with a
    /// diagnostic; processing continues.
    #[error("malformed {kind:?} message: {source}")]
    Malformed {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    /// The outbound queue had no space for the message. The caller may drop
    /// the message or retry next frame.
    #[error("outbound queue is saturated")]
    QueueSaturated,

    /// `send` was called before the channel was established.
    #[error("not connected to a server")]
    NotConnected,

    /// The transport's workers are already running.
    #[error("already connected to a server")]
    AlreadyConnected,
}

impl NetError {
    /// True for errors that end the session (as opposed to dropping a
    /// single message).
    pub fn is_fatal(&self) -> bool {
        matches!(self, NetError::Connection { .. } | NetError::Protocol(_))
    }
}
