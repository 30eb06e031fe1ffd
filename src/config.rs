//! Configuration types for the transcript-routing pipeline.

use crate::error::{Result, RouterError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration for the dictation router.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Partial-transcript debounce settings.
    pub debounce: DebounceConfig,
    /// Echo filter settings.
    pub echo: EchoConfig,
    /// Mode-switch behavior.
    pub modes: ModeConfig,
    /// AI conversational mode flow control.
    pub ai: AiFlowConfig,
}

impl RouterConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw)
            .map_err(|e| RouterError::Config(format!("cannot parse {}: {e}", path.display())))
    }
}

/// Debounce behavior for low-confidence partial transcripts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    /// Quiet period in ms before a buffered transcript is classified.
    ///
    /// Each new transcript restarts the period. There is only ever one
    /// buffered transcript; newer text overwrites older text.
    pub quiet_period_ms: u64,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            quiet_period_ms: 500,
        }
    }
}

impl DebounceConfig {
    /// Quiet period as a [`Duration`].
    #[must_use]
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }
}

/// Echo filter tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EchoConfig {
    /// Normalized Levenshtein similarity (percent) at or above which a
    /// transcript is considered an echo of assistant speech.
    pub similarity_threshold: u32,
    /// Window in ms after speech start during which the current utterance
    /// is matched. History entries are matched without a window.
    pub window_ms: u64,
    /// Number of past utterances retained for matching.
    pub history_size: usize,
    /// Grace delay in ms between "speech completed" and clearing the filter,
    /// so trailing echo of the final words is still caught.
    pub clear_grace_ms: u64,
}

impl Default for EchoConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 70,
            window_ms: 5_000,
            history_size: 5,
            clear_grace_ms: 1_000,
        }
    }
}

impl EchoConfig {
    /// Current-utterance match window as a [`Duration`].
    #[must_use]
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// Post-completion clear grace as a [`Duration`].
    #[must_use]
    pub fn clear_grace(&self) -> Duration {
        Duration::from_millis(self.clear_grace_ms)
    }
}

/// Mode-switch behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeConfig {
    /// Window in seconds during which an identical mode-switch phrase is
    /// dropped as a repeat (guards against the confirmation speech being
    /// picked up and re-triggering the switch).
    pub switch_dedup_s: u64,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self { switch_dedup_s: 3 }
    }
}

impl ModeConfig {
    /// Mode-switch dedup window as a [`Duration`].
    #[must_use]
    pub fn switch_dedup(&self) -> Duration {
        Duration::from_secs(self.switch_dedup_s)
    }
}

/// Flow control for the AI conversational mode.
///
/// AI mode owns its own downstream queue, so it does not share the rule-mode
/// single-flight guard; instead a bounded number of dispatches may be in
/// flight at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiFlowConfig {
    /// Maximum concurrent AI dispatches. Utterances arriving beyond this
    /// depth are dropped, not queued.
    pub max_in_flight: usize,
}

impl Default for AiFlowConfig {
    fn default() -> Self {
        Self { max_in_flight: 2 }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = RouterConfig::default();
        assert_eq!(config.debounce.quiet_period_ms, 500);
        assert_eq!(config.echo.similarity_threshold, 70);
        assert_eq!(config.echo.window_ms, 5_000);
        assert_eq!(config.echo.history_size, 5);
        assert_eq!(config.echo.clear_grace_ms, 1_000);
        assert_eq!(config.modes.switch_dedup_s, 3);
        assert_eq!(config.ai.max_in_flight, 2);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: RouterConfig = toml::from_str(
            r#"
            [debounce]
            quiet_period_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(config.debounce.quiet_period_ms, 250);
        assert_eq!(config.echo.history_size, 5);
    }

    #[test]
    fn roundtrips_through_toml() {
        let config = RouterConfig::default();
        let raw = toml::to_string(&config).unwrap();
        let back: RouterConfig = toml::from_str(&raw).unwrap();
        assert_eq!(back.debounce.quiet_period_ms, config.debounce.quiet_period_ms);
        assert_eq!(back.ai.max_in_flight, config.ai.max_in_flight);
    }
}
