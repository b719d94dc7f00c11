//! The analysis driver: one prompt, up to three model calls, findings out.

use std::path::PathBuf;
use std::time::Duration;

use deckcheck_core::{Inconsistency, SlideContent};
use rand::Rng;

use crate::client::{ModelClient, ModelError};
use crate::parse;
use crate::prompt;

/// Fixed side-channel file for the raw model reply, overwritten each run.
pub const RAW_REPLY_FILE: &str = "model_response.txt";

const MAX_ATTEMPTS: u32 = 3;
const BASE_DELAY_SECS: f64 = 10.0;
const MAX_JITTER_SECS: f64 = 5.0;

/// Drives the model call with bounded retry and parses the reply.
///
/// Every failure degrades to an empty findings list: rate limiting retries
/// up to the attempt cap, any other call error gives up immediately, and a
/// reply we cannot parse is treated as no findings. The sleep function is
/// injectable so tests can count retries and check computed delays without
/// wall-clock waits.
pub struct Analyzer<'a> {
    client: &'a dyn ModelClient,
    raw_reply_path: PathBuf,
    sleep: Box<dyn FnMut(Duration) + 'a>,
}

impl<'a> Analyzer<'a> {
    pub fn new(client: &'a dyn ModelClient) -> Self {
        Self {
            client,
            raw_reply_path: PathBuf::from(RAW_REPLY_FILE),
            sleep: Box::new(|delay| std::thread::sleep(delay)),
        }
    }

    /// Redirect the raw-reply side channel (used by tests).
    pub fn with_raw_reply_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.raw_reply_path = path.into();
        self
    }

    /// Replace the delay function used between rate-limited attempts.
    pub fn with_sleep(mut self, sleep: impl FnMut(Duration) + 'a) -> Self {
        self.sleep = Box::new(sleep);
        self
    }

    /// Analyze the deck, returning the parsed findings.
    pub fn analyze(&mut self, deck: &SlideContent) -> Vec<Inconsistency> {
        let body = prompt::assemble_deck_body(deck);
        log::info!(
            "Sending content to model ({} estimated tokens)",
            prompt::estimate_tokens(&body)
        );

        for attempt in 0..MAX_ATTEMPTS {
            log::info!("API attempt {}/{}", attempt + 1, MAX_ATTEMPTS);
            match self.client.generate(prompt::ANALYSIS_INSTRUCTIONS, &body) {
                Ok(reply) => {
                    log::info!("Received response from model service");
                    self.persist_raw_reply(&reply);
                    return parse::parse_findings(&reply);
                }
                Err(ModelError::RateLimited(detail)) => {
                    let delay = backoff_delay(attempt);
                    log::warn!(
                        "API quota exceeded ({}). Retrying in {:.1}s...",
                        detail,
                        delay.as_secs_f64()
                    );
                    (self.sleep)(delay);
                }
                Err(err) => {
                    log::error!("API error: {}", err);
                    return Vec::new();
                }
            }
        }

        log::error!("API call failed after {} attempts", MAX_ATTEMPTS);
        Vec::new()
    }

    /// Keep the raw reply around for offline debugging. Never fatal.
    fn persist_raw_reply(&self, reply: &str) {
        match std::fs::write(&self.raw_reply_path, reply) {
            Ok(()) => log::info!(
                "Saved raw model reply to {}",
                self.raw_reply_path.display()
            ),
            Err(e) => log::warn!(
                "Could not save raw model reply to {}: {}",
                self.raw_reply_path.display(),
                e
            ),
        }
    }
}

/// Exponential backoff with jitter: `base * 2^attempt` seconds plus a
/// uniform jitter in `[0, 5)` seconds to desynchronize concurrent callers.
fn backoff_delay(attempt: u32) -> Duration {
    let jitter = rand::rng().random_range(0.0..MAX_JITTER_SECS);
    Duration::from_secs_f64(BASE_DELAY_SECS * f64::from(1u32 << attempt) + jitter)
}
