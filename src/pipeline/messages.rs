//! Message and event types exchanged with the host application.

use crate::lexicon::CommandCategory;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// A raw transcript delivered by the speech-recognition bridge.
///
/// Ephemeral: produced per recognizer callback, never retained beyond
/// processing.
#[derive(Debug, Clone)]
pub struct TranscriptEvent {
    /// The recognized text, partial or final.
    pub text: String,
    /// Timestamp when the transcript entered the router.
    pub received_at: Instant,
}

impl TranscriptEvent {
    /// Wrap `text` with the current timestamp.
    #[must_use]
    pub fn now(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            received_at: Instant::now(),
        }
    }
}

/// Lifecycle notifications from the host's speech synthesis component.
///
/// These feed the echo filter's notion of "what the assistant is saying",
/// independently of the transcript flow.
#[derive(Debug, Clone)]
pub enum TtsEvent {
    /// Synthesis of `text` started (or was generated and queued).
    Started {
        /// The full text being spoken.
        text: String,
    },
    /// The assistant finished speaking.
    Completed,
    /// Speech was cut off before completion.
    Cancelled,
}

/// The active interaction mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Dictated text is forwarded verbatim to the focused window.
    Writing,
    /// Transcripts are filtered, debounced, and classified into commands.
    #[default]
    Command,
    /// Every surviving utterance is conversational input for the AI backend.
    Ai,
}

/// A transcript accepted by the router, ready for execution.
#[derive(Debug, Clone)]
pub struct RoutedCommand {
    /// The accepted text, trimmed.
    pub text: String,
    /// Mode the text was routed under.
    pub mode: Mode,
    /// Category assigned by the classifier, when one matched.
    pub category: Option<CommandCategory>,
}

/// Router state for UI feedback. Pure observer data; no semantics live here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Whether transcript intake is running.
    pub active: bool,
    /// Whether a rule-mode command is currently in flight.
    pub processing: bool,
    /// Whether the router is restarting intake.
    pub restarting: bool,
    /// The active interaction mode.
    pub mode: Mode,
}

/// Why a transcript was discarded. Drops are logged, never surfaced as
/// errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Matched the assistant's own speech.
    Echo,
    /// Debounce elapsed without the text classifying as a command.
    Unclassified,
    /// Identical to the last accepted transcript, or contains the last
    /// spoken block phrase.
    Duplicate,
    /// A command is already in flight.
    Busy,
    /// Empty or whitespace-only input.
    Empty,
    /// Mode-switch phrase repeated within the dedup window.
    RepeatedModeSwitch,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Echo => "echo",
            Self::Unclassified => "unclassified",
            Self::Duplicate => "duplicate",
            Self::Busy => "busy",
            Self::Empty => "empty",
            Self::RepeatedModeSwitch => "repeated mode switch",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn mode_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Mode::Writing).unwrap(), "\"writing\"");
        assert_eq!(serde_json::to_string(&Mode::Ai).unwrap(), "\"ai\"");
    }

    #[test]
    fn snapshot_roundtrips_json() {
        let snapshot = StateSnapshot {
            active: true,
            processing: false,
            restarting: false,
            mode: Mode::Command,
        };
        let raw = serde_json::to_string(&snapshot).unwrap();
        let back: StateSnapshot = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, snapshot);
    }
}
