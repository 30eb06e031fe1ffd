//! Quadro voice: transcript-routing core for a voice-controlled desktop
//! assistant.
//!
//! Turns the noisy, continuous stream of speech-to-text transcripts into
//! discrete, intent-classified commands while suppressing the acoustic
//! feedback loop of the assistant's own synthesized speech:
//!
//! Recognizer → ModeRouter → EchoFilter → \[debounce\] → IntentClassifier →
//! ProcessingGuard → executor
//!
//! # Architecture
//!
//! The router runs as a single task fed by async channels:
//! - **Echo filter**: matches transcripts against currently/recently spoken
//!   assistant utterances (exact, partial, Levenshtein, word overlap)
//! - **Debounce**: coalesces rapid partial transcripts into one
//!   classification attempt after a quiet period
//! - **Classifier**: ordered lexical/regex stages over a Turkish command
//!   vocabulary
//! - **Guards**: single-flight for rule-based modes, bounded dispatch depth
//!   for the AI conversational mode
//!
//! TTS lifecycle events arrive on an injected channel and feed the echo
//! filter independently of the transcript flow.

pub mod classifier;
pub mod config;
pub mod echo;
pub mod error;
pub mod guard;
pub mod lexicon;
pub mod pipeline;

pub use config::RouterConfig;
pub use error::{Result, RouterError};
pub use lexicon::CommandCategory;
pub use pipeline::messages::{Mode, RoutedCommand, StateSnapshot, TranscriptEvent, TtsEvent};
pub use pipeline::router::{CommandSink, DictationRouter, ModeHandle, RouterHandle};
