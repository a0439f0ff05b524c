use std::io::{Read, Write};
use tracing::{error, info};

use localscreen_core::Result;

use crate::channel::FramedChannel;
use crate::dispatcher::Dispatcher;
use crate::protocol::{ErrorCode, Reply};

/// Counters reported when the loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeStats {
    pub requests: usize,
    pub failures: usize,
}

/// Answer frames until the peer closes the stream.
///
/// Returns `Ok` on a clean end of stream and `Err` on framing corruption or
/// a broken output pipe.
pub fn serve<R: Read, W: Write>(channel: &mut FramedChannel<R, W>, dispatcher: &Dispatcher) -> Result<ServeStats> {
    let mut stats = ServeStats::default();
    loop {
        let payload = match channel.read_message() {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                info!(requests = stats.requests, failures = stats.failures, "input closed");
                return Ok(stats);
            }
            Err(e) => {
                error!(error = %e, requests = stats.requests, "framing error");
                return Err(e.into());
            }
        };
        let reply = dispatcher.handle_payload(&payload);
        stats.requests += 1;
        if !reply.ok {
            stats.failures += 1;
        }
        let bytes = encode_reply(&reply);
        if let Err(e) = channel.write_message(&bytes) {
            error!(error = %e, "failed to write reply");
            return Err(e.into());
        }
    }
}

fn encode_reply(reply: &Reply) -> Vec<u8> {
    reply.to_bytes().unwrap_or_else(|e| {
        error!(error = %e, "reply serialization failed");
        Reply::failure(ErrorCode::ClassifierError).to_bytes().unwrap_or_default()
    })
}
