//! Transcript-routing pipeline: messages and the mode-aware router.

pub mod messages;
pub mod router;
