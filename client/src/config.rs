//! Compile-time defaults. The binary can override the server endpoint on
//! the command line.

use std::time::Duration;

pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_SERVER_PORT: u16 = 9004;

/// Capacity of each direction's message queue. Generous enough that normal
/// game traffic never saturates it.
pub const QUEUE_CAPACITY: usize = 1024;

/// Upper bound for a single socket read in the receive worker.
pub const READ_CHUNK_SIZE: usize = 4096;

/// Pacing of the terminal shell's frame loop.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(33);
