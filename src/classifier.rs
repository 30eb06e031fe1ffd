//! Multi-stage lexical intent classification.
//!
//! Decides whether a transcript is an actionable command and, if so, which
//! category it belongs to. Stages short-circuit on the first match:
//!
//! 1. Navigation literals (exact, normalized).
//! 2. Category patterns in the lexicon's priority order.
//! 3. Single-word whitelist.
//! 4. Length gate: ≤2-word transcripts need a verb, a special short command,
//!    or a news variant — this filters out filler like isolated nouns.
//! 5. ≥2-word transcripts need a verb-list or folder-list token.
//!
//! Anything surviving all stages is accepted as [`CommandCategory::General`].

use crate::lexicon::{
    self, CommandCategory, COMMAND_VERBS, NAVIGATION_LITERALS, NEWS_SHORT_VARIANTS,
    SINGLE_WORD_COMMANDS, SPECIAL_SHORT_COMMANDS, SYSTEM_FOLDERS, VERB_PATTERN,
};

/// Classify a transcript. Returns `None` for text that should not be treated
/// as a command.
///
/// Empty and whitespace-only input is rejected before any stage runs.
#[must_use]
pub fn classify(text: &str) -> Option<CommandCategory> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let normalized = lexicon::normalize_phrase(trimmed);
    if NAVIGATION_LITERALS.contains(&normalized.as_str()) {
        return Some(CommandCategory::Navigation);
    }

    for (category, pattern) in lexicon::categories() {
        if pattern.is_match(trimmed) {
            return Some(*category);
        }
    }

    let lower = trimmed.to_lowercase();
    if SINGLE_WORD_COMMANDS.contains(&lower.as_str()) {
        return Some(CommandCategory::ShortCommand);
    }

    let word_count = trimmed.split_whitespace().count();

    if word_count <= 2 {
        let has_verb = VERB_PATTERN.is_match(trimmed);
        let special = is_special_short_command(&lower);
        let news_variant = NEWS_SHORT_VARIANTS.iter().any(|v| lower.contains(v));
        if !has_verb && !special && !news_variant {
            return None;
        }
    }

    if word_count >= 2 && !has_command_token(&lower) {
        return None;
    }

    Some(CommandCategory::General)
}

/// Exact or containment match against the special short-command list.
fn is_special_short_command(lower: &str) -> bool {
    SPECIAL_SHORT_COMMANDS.contains(&lower) || SPECIAL_SHORT_COMMANDS.iter().any(|cmd| lower.contains(cmd))
}

/// Substring match against the verb and system-folder lists.
fn has_command_token(lower: &str) -> bool {
    COMMAND_VERBS.iter().any(|verb| lower.contains(verb))
        || SYSTEM_FOLDERS.iter().any(|folder| lower.contains(folder))
}
