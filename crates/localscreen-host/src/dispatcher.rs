use std::time::Instant;
use tracing::{debug, warn};

use localscreen_core::config::Settings;
use localscreen_core::oracle::Oracle;
use localscreen_core::types::ClassificationResult;
use localscreen_core::Result;
use localscreen_text::Normalizer;

use crate::protocol::{ErrorCode, Outcome, Reply, Request};
use crate::scan::Scanner;

/// Routes decoded requests to the normalizer, oracle and scanner.
///
/// Every request yields exactly one [`Reply`]; failures become
/// `{"ok": false, "error": <code>}`.
pub struct Dispatcher {
    normalizer: Normalizer,
    oracle: Oracle,
    scanner: Scanner,
}

impl Dispatcher {
    pub fn new(normalizer: Normalizer, oracle: Oracle, scanner: Scanner) -> Self { Self { normalizer, oracle, scanner } }

    pub fn from_settings(settings: &Settings, normalizer: Normalizer, oracle: Oracle) -> Self {
        Self::new(normalizer, oracle, Scanner::from_settings(&settings.scan))
    }

    pub fn oracle(&self) -> &Oracle { &self.oracle }

    /// Decode and answer one frame payload.
    pub fn handle_payload(&self, payload: &[u8]) -> Reply {
        match Request::decode(payload) {
            Ok(request) => self.dispatch(request),
            Err(code) => {
                debug!(error = ?code, bytes = payload.len(), "rejected request");
                Reply::failure(code)
            }
        }
    }

    pub fn dispatch(&self, request: Request) -> Reply {
        let start = Instant::now();
        let mode = request.mode();
        let outcome = match request {
            Request::Classify { text } => self.classify_texts(&[text]).and_then(|mut results| {
                results.pop().map(Outcome::Single).ok_or_else(|| {
                    localscreen_core::Error::Classifier("no result for a single input".into())
                })
            }),
            Request::Batch { texts } => {
                debug!(items = texts.len(), "batch");
                self.classify_texts(&texts).map(Outcome::Batch)
            }
            Request::Scan { text } => self.scanner.scan(&text, &self.normalizer, &self.oracle).map(Outcome::Scan),
        };
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match outcome {
            Ok(outcome) => {
                debug!(mode = mode.as_str(), elapsed_ms, "handled");
                Reply::success(mode, outcome)
            }
            Err(e) => {
                warn!(mode = mode.as_str(), elapsed_ms, error = %e, "request failed");
                Reply::failure(ErrorCode::ClassifierError)
            }
        }
    }

    /// Normalize `texts` and classify them in one oracle call.
    pub fn classify_texts(&self, texts: &[String]) -> Result<Vec<ClassificationResult>> {
        let normalized = self.normalizer.normalize_batch(texts);
        self.oracle.classify(&normalized)
    }
}
