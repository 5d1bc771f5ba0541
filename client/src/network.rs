//! Message transport between the render loop and the server.
//!
//! A [`DuplexChannel`] owns one connected socket and two background workers.
//! The receive worker blocks on socket reads, reassembles frames and pushes
//! decoded messages onto the inbound queue; the send worker pops the
//! outbound queue and writes frames to the socket. Each queue has exactly
//! one producer and one consumer, so hand-off needs no locks. The render
//! loop only ever touches the non-blocking ends: [`Transport::poll`] and
//! [`Transport::send`].

use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tracing::{error, info, warn};

use scrawl_common::codec::{self, StreamDecoder};
use scrawl_common::error::NetError;
use scrawl_common::messages::Message;

use crate::config::{QUEUE_CAPACITY, READ_CHUNK_SIZE};

/// One connection to the server plus its two worker threads.
///
/// The workers are detached; closing the channel flips the shutdown flag
/// and shuts the socket down, which each worker observes at its next
/// blocking-call boundary.
#[derive(Debug)]
pub struct DuplexChannel {
    outbound: Sender<Message>,
    inbound: Receiver<Message>,
    shutdown: Arc<AtomicBool>,
    stream: TcpStream,
}

impl DuplexChannel {
    /// Connects to `addr` and starts the receive and send workers.
    ///
    /// # Arguments
    /// * `addr` - The server endpoint, e.g. `"127.0.0.1:9004"`.
    ///
    /// # Returns
    /// * `Ok(channel)` - The channel is live and its workers are running.
    /// * `Err(NetError::Connection)` - Resolution or connection failed; the
    ///   channel is unusable and nothing was started.
    pub fn connect(addr: &str) -> Result<Self, NetError> {
        let stream = TcpStream::connect(addr).map_err(|source| NetError::Connection {
            addr: addr.to_string(),
            source,
        })?;
        info!(%addr, "connected to server");

        let (outbound_tx, outbound_rx) = bounded(QUEUE_CAPACITY);
        let (inbound_tx, inbound_rx) = bounded(QUEUE_CAPACITY);
        let shutdown = Arc::new(AtomicBool::new(false));

        let recv_stream = stream.try_clone().map_err(|source| NetError::Connection {
            addr: addr.to_string(),
            source,
        })?;
        let recv_shutdown = Arc::clone(&shutdown);
        thread::spawn(move || receive_worker(recv_stream, inbound_tx, recv_shutdown));

        let send_stream = stream.try_clone().map_err(|source| NetError::Connection {
            addr: addr.to_string(),
            source,
        })?;
        let send_shutdown = Arc::clone(&shutdown);
        thread::spawn(move || send_worker(send_stream, outbound_rx, send_shutdown));

        Ok(DuplexChannel {
            outbound: outbound_tx,
            inbound: inbound_rx,
            shutdown,
            stream,
        })
    }

    /// Queues a message for the send worker. Never blocks the caller.
    ///
    /// # Returns
    /// * `Err(NetError::QueueSaturated)` - No space; the caller may drop
    ///   the message or retry next frame.
    /// * `Err(NetError::NotConnected)` - The send worker is gone.
    pub fn enqueue_outbound(&self, message: Message) -> Result<(), NetError> {
        self.outbound.try_send(message).map_err(|err| match err {
            TrySendError::Full(_) => NetError::QueueSaturated,
            TrySendError::Disconnected(_) => NetError::NotConnected,
        })
    }

    /// Pops the next inbound message, or `None` when the queue is empty.
    /// Never blocks.
    pub fn try_dequeue_inbound(&self) -> Option<Message> {
        self.inbound.try_recv().ok()
    }

    /// Stops both workers at their next blocking-call boundary.
    pub fn close(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}

impl Drop for DuplexChannel {
    fn drop(&mut self) {
        self.close();
    }
}

/// Blocks on socket reads until the connection closes or errors, feeding
/// every decoded message to the inbound queue in wire order. A full queue
/// blocks this worker, not the render loop; backpressure reaches the peer
/// only through TCP flow control. Ends by pushing the `Disconnected`
/// sentinel so the consumer can react.
fn receive_worker(mut stream: TcpStream, inbound: Sender<Message>, shutdown: Arc<AtomicBool>) {
    let mut decoder = StreamDecoder::new();
    let mut chunk = [0u8; READ_CHUNK_SIZE];
    loop {
        let read = match stream.read(&mut chunk) {
            Ok(0) => {
                info!("server closed the connection");
                break;
            }
            Ok(read) => read,
            Err(err) => {
                if !shutdown.load(Ordering::Relaxed) {
                    error!(error = %err, "receive worker stopped");
                }
                break;
            }
        };
        match decoder.feed(&chunk[..read]) {
            Ok(messages) => {
                for message in messages {
                    if inbound.send(message).is_err() {
                        // Consumer is gone; nothing left to deliver to.
                        return;
                    }
                }
            }
            Err(err) => {
                error!(error = %err, "unframeable byte stream, tearing down connection");
                let _ = stream.shutdown(Shutdown::Both);
                break;
            }
        }
    }
    let _ = inbound.send(Message::Disconnected);
}

/// Pops the outbound queue and writes one frame per message, retrying
/// partial writes until each record is fully sent. The first write error
/// marks the channel dead; nothing further is sent.
fn send_worker(mut stream: TcpStream, outbound: Receiver<Message>, shutdown: Arc<AtomicBool>) {
    while let Ok(message) = outbound.recv() {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }
        let frame = match codec::encode(&message) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(error = %err, kind = message.kind(), "dropping unencodable message");
                continue;
            }
        };
        if let Err(err) = stream.write_all(&frame) {
            if !shutdown.load(Ordering::Relaxed) {
                error!(error = %err, "send worker stopped");
            }
            break;
        }
    }
}

/// The send/poll surface used by the rest of the client.
///
/// Starts the background workers exactly once per process lifetime;
/// `send` before [`Transport::connect`] is an error, `poll` before it is
/// simply empty.
#[derive(Default)]
pub struct Transport {
    channel: Option<DuplexChannel>,
}

impl Transport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Establishes the channel. Fails with `AlreadyConnected` if the
    /// workers are already running.
    pub fn connect(&mut self, addr: &str) -> Result<(), NetError> {
        if self.channel.is_some() {
            return Err(NetError::AlreadyConnected);
        }
        self.channel = Some(DuplexChannel::connect(addr)?);
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.channel.is_some()
    }

    /// Queues `message` for delivery in caller order. Fire and forget:
    /// returns as soon as the message is on the outbound queue.
    pub fn send(&self, message: Message) -> Result<(), NetError> {
        self.channel
            .as_ref()
            .ok_or(NetError::NotConnected)?
            .enqueue_outbound(message)
    }

    /// The next inbound message in wire order, or `None`. Never blocks.
    pub fn poll(&self) -> Option<Message> {
        self.channel.as_ref()?.try_dequeue_inbound()
    }

    /// Tears the channel down. Safe to call when not connected.
    pub fn disconnect(&mut self) {
        self.channel = None;
    }
}
