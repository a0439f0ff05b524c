//! localscreen-host
//!
//! Native-messaging side of the screener: framed stdio channel, JSON
//! protocol, command dispatch and document scanning.

pub mod channel;
pub mod dispatcher;
pub mod protocol;
pub mod scan;
pub mod service;

pub use channel::{read_frame, write_frame, FrameError, FramedChannel};
pub use dispatcher::Dispatcher;
pub use protocol::{ErrorCode, Mode, Outcome, Reply, Request};
pub use scan::Scanner;
pub use service::{serve, ServeStats};
