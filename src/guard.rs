//! Single-flight processing guard and AI-mode flow control.

use crate::config::AiFlowConfig;
use std::sync::{Arc, Mutex};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

#[derive(Debug, Default)]
struct ProcessingState {
    in_flight: bool,
    last_processed: String,
}

/// Try-lock enforcing at most one in-flight command for rule-based modes.
///
/// While held, new transcripts are dropped at the router boundary. The
/// last accepted transcript is retained so an identical re-delivery from
/// the recognizer is suppressed until the command completes.
#[derive(Debug, Default)]
pub struct ProcessingGuard {
    state: Mutex<ProcessingState>,
}

impl ProcessingGuard {
    /// Create an idle guard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claim the in-flight slot for `text`.
    ///
    /// Returns false when a command is already being processed; the caller
    /// drops the transcript.
    pub fn try_begin(&self, text: &str) -> bool {
        let Ok(mut state) = self.state.lock() else {
            return false;
        };
        if state.in_flight {
            return false;
        }
        state.in_flight = true;
        state.last_processed = text.to_owned();
        true
    }

    /// Release the slot and forget the last transcript, so the same phrase
    /// can be reissued immediately after the command finishes.
    pub fn complete(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.in_flight = false;
            state.last_processed.clear();
        }
    }

    /// True while a command is being processed.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.state.lock().map(|state| state.in_flight).unwrap_or(false)
    }

    /// True when `text` equals the last accepted transcript.
    #[must_use]
    pub fn is_duplicate(&self, text: &str) -> bool {
        self.state
            .lock()
            .map(|state| !state.last_processed.is_empty() && state.last_processed == text)
            .unwrap_or(false)
    }

    /// Record `text` as processed without claiming the slot. Used by AI
    /// mode, which has its own flow control but still wants duplicate
    /// re-delivery suppressed.
    pub fn note_processed(&self, text: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.last_processed = text.to_owned();
        }
    }

    /// Clear both the slot and the duplicate tracker.
    pub fn reset(&self) {
        self.complete();
    }
}

/// Bounded concurrency for the AI conversational mode.
///
/// AI mode owns its own downstream queue, so it does not share the
/// single-flight guard; instead up to `max_in_flight` dispatches may run
/// concurrently. Utterances arriving beyond that depth are dropped, not
/// queued.
#[derive(Debug, Clone)]
pub struct AiFlowControl {
    semaphore: Arc<Semaphore>,
}

impl AiFlowControl {
    /// Create flow control with the configured depth.
    #[must_use]
    pub fn new(config: &AiFlowConfig) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(config.max_in_flight)),
        }
    }

    /// Claim a dispatch slot. The permit releases on drop, when the
    /// dispatch future completes.
    pub fn try_acquire(&self) -> Option<OwnedSemaphorePermit> {
        Arc::clone(&self.semaphore).try_acquire_owned().ok()
    }

    /// Number of currently free dispatch slots.
    #[must_use]
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn second_begin_fails_until_complete() {
        let guard = ProcessingGuard::new();
        assert!(guard.try_begin("sesi aç"));
        assert!(!guard.try_begin("sesi kapat"));
        assert!(guard.is_in_flight());

        guard.complete();
        assert!(!guard.is_in_flight());
        assert!(guard.try_begin("sesi kapat"));
    }

    #[test]
    fn duplicate_tracking_cleared_on_complete() {
        let guard = ProcessingGuard::new();
        assert!(guard.try_begin("geri"));
        assert!(guard.is_duplicate("geri"));
        assert!(!guard.is_duplicate("ileri"));

        guard.complete();
        // Same phrase may be reissued after completion.
        assert!(!guard.is_duplicate("geri"));
    }

    #[test]
    fn note_processed_does_not_claim_slot() {
        let guard = ProcessingGuard::new();
        guard.note_processed("bana bir şiir yaz");
        assert!(!guard.is_in_flight());
        assert!(guard.is_duplicate("bana bir şiir yaz"));
    }

    #[test]
    fn ai_flow_depth_is_bounded() {
        let flow = AiFlowControl::new(&AiFlowConfig { max_in_flight: 2 });
        let first = flow.try_acquire().unwrap();
        let _second = flow.try_acquire().unwrap();
        assert!(flow.try_acquire().is_none());

        drop(first);
        assert_eq!(flow.available(), 1);
        assert!(flow.try_acquire().is_some());
    }
}
