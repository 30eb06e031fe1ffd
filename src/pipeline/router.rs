//! Mode-aware transcript router: the pipeline's top-level entry point.
//!
//! The router runs as a single task that owns all transient routing state
//! (debounce slot, echo filter, mode-switch dedup) and reacts to three kinds
//! of input over `tokio::select!`: transcripts submitted by the recognizer
//! bridge, TTS lifecycle events from the host's synthesis component, and its
//! own scheduled deadlines (debounce quiet period, post-speech echo clear).
//! Command execution happens on spawned tasks so a slow executor can never
//! stall transcript intake.
//!
//! Routing per mode:
//! - **Writing** — only the "komut moduna geç" phrase is intercepted;
//!   everything else is forwarded verbatim for typing.
//! - **Command** — echo filter → duplicate/busy checks → wake word /
//!   mode-switch / classified short-circuit, else debounce → classifier →
//!   single-flight guard → dispatch.
//! - **AI** — echo filter still applies (the assistant's speech can echo in
//!   any mode), but surviving text is dispatched unconditionally under the
//!   AI flow-control depth.

use crate::classifier;
use crate::config::RouterConfig;
use crate::echo::EchoFilter;
use crate::guard::{AiFlowControl, ProcessingGuard};
use crate::lexicon;
use crate::pipeline::messages::{
    DropReason, Mode, RoutedCommand, StateSnapshot, TranscriptEvent, TtsEvent,
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Broadcast buffer for state snapshots; slow observers just miss frames.
const STATE_CHANNEL_SIZE: usize = 16;

/// Executor seam: the router's only call into the host application.
///
/// Completion of the returned future drives the single-flight guard (rule
/// modes) or releases an AI flow-control permit (AI mode), so implementations
/// should resolve when the command has actually finished executing.
#[async_trait]
pub trait CommandSink: Send + Sync {
    /// Execute a routed command. Returns whether it was handled.
    async fn dispatch(&self, command: RoutedCommand) -> bool;
}

/// Shared read/write access to the active interaction mode.
///
/// The mode is owned by the host; the router reads it per transcript and
/// writes it back only on the built-in mode-switch phrase in Writing mode.
#[derive(Debug, Clone, Default)]
pub struct ModeHandle {
    inner: Arc<Mutex<Mode>>,
}

impl ModeHandle {
    /// Create a handle starting in `mode`.
    #[must_use]
    pub fn new(mode: Mode) -> Self {
        Self {
            inner: Arc::new(Mutex::new(mode)),
        }
    }

    /// The active mode.
    #[must_use]
    pub fn get(&self) -> Mode {
        self.inner.lock().map(|mode| *mode).unwrap_or_default()
    }

    /// Replace the active mode.
    pub fn set(&self, mode: Mode) {
        if let Ok(mut current) = self.inner.lock() {
            *current = mode;
        }
    }
}

/// Control messages accepted by the router task.
enum RouterMsg {
    Transcript(TranscriptEvent),
    DispatchDone,
    ResetForModeChange,
    Restart,
}

/// Handle for feeding the router from recognizer callbacks and the host.
///
/// Cheap to clone; all methods are non-blocking.
#[derive(Clone)]
pub struct RouterHandle {
    msg_tx: mpsc::UnboundedSender<RouterMsg>,
    mode: ModeHandle,
    state_tx: broadcast::Sender<StateSnapshot>,
    cancel: CancellationToken,
}

impl RouterHandle {
    /// Submit a partial or final recognizer result.
    pub fn submit(&self, text: impl Into<String>) {
        let _ = self.msg_tx.send(RouterMsg::Transcript(TranscriptEvent::now(text)));
    }

    /// The active interaction mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode.get()
    }

    /// Replace the active interaction mode.
    pub fn set_mode(&self, mode: Mode) {
        self.mode.set(mode);
    }

    /// Clear all pending and in-flight routing state (host-triggered, e.g.
    /// on a manual mode toggle).
    pub fn reset_for_mode_change(&self) {
        let _ = self.msg_tx.send(RouterMsg::ResetForModeChange);
    }

    /// Restart transcript intake: clears the echo filter and pulses the
    /// `restarting` state flag.
    pub fn restart(&self) {
        let _ = self.msg_tx.send(RouterMsg::Restart);
    }

    /// Subscribe to state snapshots for UI feedback.
    #[must_use]
    pub fn subscribe_state(&self) -> broadcast::Receiver<StateSnapshot> {
        self.state_tx.subscribe()
    }

    /// Stop the router task.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

/// Spawns the router task and hands out its control handle.
pub struct DictationRouter;

impl DictationRouter {
    /// Start routing with the given configuration.
    ///
    /// `tts_events` is the subscription to the host's speech synthesis
    /// lifecycle; it feeds the echo filter independently of the transcript
    /// flow. The router stops when the handle is shut down, when every
    /// handle clone is dropped, or when the surrounding runtime shuts down.
    #[must_use]
    pub fn spawn(
        config: RouterConfig,
        mode: ModeHandle,
        sink: Arc<dyn CommandSink>,
        tts_events: mpsc::UnboundedReceiver<TtsEvent>,
    ) -> RouterHandle {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let (state_tx, _) = broadcast::channel(STATE_CHANNEL_SIZE);
        let cancel = CancellationToken::new();

        let task = RouterTask {
            echo: EchoFilter::new(&config.echo),
            ai_flow: AiFlowControl::new(&config.ai),
            guard: Arc::new(ProcessingGuard::new()),
            config,
            sink,
            mode: mode.clone(),
            msg_tx: msg_tx.clone(),
            state_tx: state_tx.clone(),
            cancel: cancel.clone(),
            assistant_speaking: false,
            block_phrase: String::new(),
            pending: None,
            debounce_deadline: None,
            echo_clear_deadline: None,
            mode_change: ModeChangeGuard::default(),
            active: true,
            restarting: false,
        };
        tokio::spawn(task.run(msg_rx, tts_events));

        RouterHandle {
            msg_tx,
            mode,
            state_tx,
            cancel,
        }
    }
}

/// Suppresses an immediate repeat of the same mode-switch phrase, so the
/// confirmation speech being picked up cannot re-trigger the switch.
#[derive(Debug, Default)]
struct ModeChangeGuard {
    last_command: String,
    at: Option<Instant>,
}

impl ModeChangeGuard {
    fn record(&mut self, text: &str) {
        self.last_command = text.to_lowercase();
        self.at = Some(Instant::now());
    }

    fn is_repeat(&self, text: &str, window: Duration) -> bool {
        !self.last_command.is_empty()
            && self.last_command == text.to_lowercase()
            && self.at.is_some_and(|at| at.elapsed() < window)
    }

    fn clear(&mut self) {
        self.last_command.clear();
        self.at = None;
    }
}

struct RouterTask {
    config: RouterConfig,
    sink: Arc<dyn CommandSink>,
    mode: ModeHandle,
    guard: Arc<ProcessingGuard>,
    ai_flow: AiFlowControl,
    echo: EchoFilter,
    msg_tx: mpsc::UnboundedSender<RouterMsg>,
    state_tx: broadcast::Sender<StateSnapshot>,
    cancel: CancellationToken,
    assistant_speaking: bool,
    block_phrase: String,
    pending: Option<String>,
    debounce_deadline: Option<Instant>,
    echo_clear_deadline: Option<Instant>,
    mode_change: ModeChangeGuard,
    active: bool,
    restarting: bool,
}

impl RouterTask {
    async fn run(
        mut self,
        mut msg_rx: mpsc::UnboundedReceiver<RouterMsg>,
        tts_rx: mpsc::UnboundedReceiver<TtsEvent>,
    ) {
        let cancel = self.cancel.clone();
        let mut tts_rx = Some(tts_rx);

        info!("dictation router started in {:?} mode", self.mode.get());
        self.publish_state();

        loop {
            // Deadlines are plain state; the select arms below turn them
            // into sleeps. Arming a new deadline on the next iteration
            // implicitly cancels the previous sleep.
            let debounce_at = self.debounce_deadline;
            let echo_clear_at = self.echo_clear_deadline;

            // TTS receiver may be gone (host dropped the sender); keep the
            // arm pending forever in that case instead of spinning on None.
            let tts_fut = async {
                match &mut tts_rx {
                    Some(rx) => rx.recv().await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                () = cancel.cancelled() => break,
                event = tts_fut => match event {
                    Some(event) => self.on_tts_event(event),
                    None => tts_rx = None,
                },
                msg = msg_rx.recv() => match msg {
                    Some(RouterMsg::Transcript(event)) => self.on_transcript(event),
                    Some(RouterMsg::DispatchDone) => self.on_dispatch_done(),
                    Some(RouterMsg::ResetForModeChange) => self.on_reset_for_mode_change(),
                    Some(RouterMsg::Restart) => self.on_restart(),
                    None => break,
                },
                () = deadline(debounce_at), if debounce_at.is_some() => {
                    self.on_debounce_elapsed();
                }
                () = deadline(echo_clear_at), if echo_clear_at.is_some() => {
                    self.echo_clear_deadline = None;
                    self.echo.clear();
                    debug!("echo filter cleared after speech completed");
                }
            }
        }

        info!("dictation router stopped");
    }

    // ── TTS lifecycle ───────────────────────────────────────────────

    fn on_tts_event(&mut self, event: TtsEvent) {
        match event {
            TtsEvent::Started { text } => {
                self.assistant_speaking = true;
                // A new utterance supersedes any pending post-speech clear.
                self.echo_clear_deadline = None;
                self.echo.speech_started(&text);
                self.block_phrase = block_phrase_of(&text).unwrap_or_default();
                debug!("assistant speech started: {:?}", truncate(&text, 50));
            }
            TtsEvent::Completed => {
                self.assistant_speaking = false;
                self.echo_clear_deadline =
                    Some(Instant::now() + self.config.echo.clear_grace());
                debug!("assistant speech completed, echo clear scheduled");
            }
            TtsEvent::Cancelled => {
                self.assistant_speaking = false;
                self.echo_clear_deadline = None;
                self.echo.clear();
                debug!("assistant speech cancelled, echo filter cleared");
            }
        }
    }

    // ── transcript routing ──────────────────────────────────────────

    fn on_transcript(&mut self, event: TranscriptEvent) {
        let text = event.text.trim();
        if text.is_empty() {
            self.drop_transcript(text, DropReason::Empty);
            return;
        }
        let text = text.to_owned();
        debug!("transcript received: {text:?}");

        match self.mode.get() {
            Mode::Writing => self.route_writing(text),
            mode => self.route_filtered(text, mode),
        }
    }

    fn route_writing(&mut self, text: String) {
        let lower = text.to_lowercase();
        if lower.contains(lexicon::WRITING_TO_COMMAND_PHRASE) {
            info!("voice switch to command mode: {text:?}");
            self.mode_change.record(&text);
            self.mode.set(Mode::Command);
            self.clear_transient_state();
            self.publish_state();
            return;
        }

        if self
            .mode_change
            .is_repeat(&text, self.config.modes.switch_dedup())
        {
            self.drop_transcript(&text, DropReason::RepeatedModeSwitch);
            return;
        }

        // Everything else is typed into the focused window verbatim, with
        // no echo filtering: Writing mode never speaks, so there is no
        // feedback loop to suppress.
        let command = RoutedCommand {
            text,
            mode: Mode::Writing,
            category: None,
        };
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            let handled = sink.dispatch(command).await;
            debug!(handled, "writing-mode text forwarded");
        });
    }

    fn route_filtered(&mut self, text: String, mode: Mode) {
        if self.assistant_speaking {
            let is_echo = self.echo.is_echo(&text);
            if is_echo {
                if !lexicon::is_interrupt(&text) {
                    self.drop_transcript(&text, DropReason::Echo);
                    return;
                }
                info!("interrupt phrase overrides echo suppression: {text:?}");
            }
        }

        if self.guard.is_in_flight() {
            self.drop_transcript(&text, DropReason::Busy);
            return;
        }
        if self.guard.is_duplicate(&text) {
            self.drop_transcript(&text, DropReason::Duplicate);
            return;
        }
        if !self.block_phrase.is_empty() && text.to_lowercase().contains(&self.block_phrase) {
            self.drop_transcript(&text, DropReason::Duplicate);
            return;
        }

        // Wake word and mode-switch phrases dispatch immediately, bypassing
        // the debounce even while the assistant is speaking.
        if lexicon::is_wake_word(&text) {
            info!("wake word detected: {text:?}");
            self.start_processing(text, mode);
            return;
        }
        if lexicon::is_mode_command(&text) {
            if self
                .mode_change
                .is_repeat(&text, self.config.modes.switch_dedup())
            {
                self.drop_transcript(&text, DropReason::RepeatedModeSwitch);
                return;
            }
            self.mode_change.record(&text);
            self.start_processing(text, mode);
            return;
        }

        // AI mode treats every surviving utterance as conversational input.
        if mode == Mode::Ai {
            self.start_processing(text, mode);
            return;
        }

        if let Some(category) = classifier::classify(&text) {
            debug!(?category, "transcript classified, dispatching immediately");
            self.start_processing(text, mode);
            return;
        }

        // Buffer and restart the quiet period; newer text replaces older.
        self.pending = Some(text);
        self.debounce_deadline = Some(Instant::now() + self.config.debounce.quiet_period());
    }

    fn on_debounce_elapsed(&mut self) {
        self.debounce_deadline = None;
        if self.guard.is_in_flight() {
            return;
        }
        let Some(text) = self.pending.take() else {
            return;
        };

        if classifier::classify(&text).is_some() {
            self.start_processing(text, self.mode.get());
        } else {
            self.drop_transcript(&text, DropReason::Unclassified);
        }
    }

    // ── dispatch ────────────────────────────────────────────────────

    fn start_processing(&mut self, text: String, mode: Mode) {
        if mode == Mode::Ai {
            let Some(permit) = self.ai_flow.try_acquire() else {
                warn!("AI dispatch depth exhausted, dropping: {text:?}");
                return;
            };
            self.guard.note_processed(&text);
            let command = RoutedCommand {
                category: classifier::classify(&text),
                text,
                mode,
            };
            let sink = Arc::clone(&self.sink);
            tokio::spawn(async move {
                let handled = sink.dispatch(command).await;
                debug!(handled, "AI dispatch finished");
                drop(permit);
            });
            return;
        }

        if !self.guard.try_begin(&text) {
            warn!("command already in flight, dropping: {text:?}");
            return;
        }
        self.publish_state();

        let command = RoutedCommand {
            category: classifier::classify(&text),
            text,
            mode,
        };
        info!(category = ?command.category, "dispatching command: {:?}", command.text);

        let sink = Arc::clone(&self.sink);
        let msg_tx = self.msg_tx.clone();
        let guard = Arc::clone(&self.guard);
        tokio::spawn(async move {
            let handled = sink.dispatch(command).await;
            debug!(handled, "command dispatch finished");
            // Completion flows back through the router so state updates stay
            // in one place; release directly if the router is already gone.
            if msg_tx.send(RouterMsg::DispatchDone).is_err() {
                guard.complete();
            }
        });
    }

    fn on_dispatch_done(&mut self) {
        self.guard.complete();
        self.publish_state();
    }

    // ── reset / restart ─────────────────────────────────────────────

    fn clear_transient_state(&mut self) {
        self.guard.reset();
        self.pending = None;
        self.debounce_deadline = None;
    }

    fn on_reset_for_mode_change(&mut self) {
        self.clear_transient_state();
        self.mode_change.clear();
        info!("router state cleared for mode change");
        self.publish_state();
    }

    fn on_restart(&mut self) {
        self.restarting = true;
        self.publish_state();

        self.echo.clear();
        self.echo_clear_deadline = None;
        self.block_phrase.clear();

        self.restarting = false;
        self.active = true;
        info!("transcript intake restarted, echo filter cleared");
        self.publish_state();
    }

    // ── observers ───────────────────────────────────────────────────

    fn publish_state(&self) {
        let _ = self.state_tx.send(StateSnapshot {
            active: self.active,
            processing: self.guard.is_in_flight(),
            restarting: self.restarting,
            mode: self.mode.get(),
        });
    }

    fn drop_transcript(&self, text: &str, reason: DropReason) {
        match reason {
            DropReason::Busy => warn!("transcript dropped ({reason}): {text:?}"),
            _ => debug!("transcript dropped ({reason}): {text:?}"),
        }
    }
}

/// Sleep until `at`; pending forever when unset (the select arm is guarded).
async fn deadline(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// First five words of an assistant response longer than three words, used
/// to block the feedback loop of the response being re-recognized.
fn block_phrase_of(text: &str) -> Option<String> {
    let lower = text.trim().to_lowercase();
    let words: Vec<&str> = lower.split_whitespace().collect();
    (words.len() > 3).then(|| words[..5.min(words.len())].join(" "))
}

/// Shorten long utterances for log lines.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn block_phrase_takes_first_five_words() {
        let phrase = block_phrase_of("Bugün takviminizde üç toplantı var efendim ve hava güneşli");
        assert_eq!(
            phrase.as_deref(),
            Some("bugün takviminizde üç toplantı var")
        );
    }

    #[test]
    fn block_phrase_skips_short_responses() {
        assert_eq!(block_phrase_of("tamam"), None);
        assert_eq!(block_phrase_of("ses seviyesi yükseltildi"), None);
    }

    #[test]
    fn block_phrase_keeps_four_word_responses_whole() {
        assert_eq!(
            block_phrase_of("ses seviyesi şimdi yükseltildi").as_deref(),
            Some("ses seviyesi şimdi yükseltildi")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn mode_change_guard_expires() {
        let mut guard = ModeChangeGuard::default();
        guard.record("komut modu");
        assert!(guard.is_repeat("Komut Modu", Duration::from_secs(3)));

        tokio::time::advance(Duration::from_secs(4)).await;
        assert!(!guard.is_repeat("komut modu", Duration::from_secs(3)));
    }

    #[test]
    fn truncate_only_long_text() {
        assert_eq!(truncate("kısa", 10), "kısa");
        assert_eq!(truncate("abcdefghij", 5), "abcde...");
    }
}
