//! Echo suppression for the assistant's own synthesized speech.
//!
//! The microphone picks up the assistant's speech and the recognizer
//! re-submits it as if the user had said it. This filter matches incoming
//! transcripts against the utterance currently being spoken and a short
//! history of recent utterances, using progressively more expensive checks:
//! exact match, prefix/substring match, normalized Levenshtein similarity,
//! and finally word overlap. Cheap checks run first so the O(n·m) edit
//! distance only runs against the current utterance and at most
//! `history_size` past strings.

use crate::config::EchoConfig;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Transcript prefixes shorter than this never count as a partial match.
const MIN_PREFIX_LEN: usize = 4;
/// Substring matches require at least this many characters on the contained
/// side, so tiny fragments ("ve", "bir") don't suppress real input.
const MIN_SUBSTRING_LEN: usize = 5;
/// Word-overlap matching only applies to transcripts of at least this many
/// words.
const MIN_OVERLAP_WORDS: usize = 3;
/// Fraction of shared words at or above which a transcript is an echo.
const WORD_OVERLAP_RATIO: f32 = 0.6;

/// Fixed-capacity FIFO of recent utterances. Pushing beyond capacity evicts
/// the oldest entry; the bound is an invariant of the type.
#[derive(Debug)]
pub struct BoundedHistory {
    entries: VecDeque<String>,
    capacity: usize,
}

impl BoundedHistory {
    /// Create a history retaining at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, evicting the oldest if the history is full.
    pub fn push(&mut self, entry: String) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Iterate entries oldest-first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Classifies incoming transcripts as assistant echo vs genuine user speech.
#[derive(Debug)]
pub struct EchoFilter {
    similarity_threshold: u32,
    window: Duration,
    current: String,
    started_at: Option<Instant>,
    history: BoundedHistory,
}

impl EchoFilter {
    /// Create a filter with the given tuning.
    #[must_use]
    pub fn new(config: &EchoConfig) -> Self {
        Self {
            similarity_threshold: config.similarity_threshold,
            window: config.window(),
            current: String::new(),
            started_at: None,
            history: BoundedHistory::new(config.history_size),
        }
    }

    /// Record that the assistant started speaking `text`.
    ///
    /// The utterance becomes the current match target and also enters the
    /// history, so fragments the synthesis engine delivers late are still
    /// caught after the next utterance starts.
    pub fn speech_started(&mut self, text: &str) {
        let normalized = text.trim().to_lowercase();
        if normalized.is_empty() {
            return;
        }
        self.current = normalized.clone();
        self.started_at = Some(Instant::now());
        self.history.push(normalized);
    }

    /// Forget everything the assistant has spoken.
    pub fn clear(&mut self) {
        self.current.clear();
        self.started_at = None;
        self.history.clear();
    }

    /// True when the filter has no utterance to match against.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current.is_empty() && self.history.is_empty()
    }

    /// Decide whether `transcript` is an echo of assistant speech.
    #[must_use]
    pub fn is_echo(&self, transcript: &str) -> bool {
        let input = transcript.trim().to_lowercase();
        if input.is_empty() {
            return false;
        }
        if self.is_empty() {
            return false;
        }

        // Only the current utterance is subject to the time window; history
        // entries are matched unconditionally because the synthesis engine
        // may split or delay its output.
        let in_window = self
            .started_at
            .is_some_and(|started| started.elapsed() <= self.window);

        if in_window
            && !self.current.is_empty()
            && matches_utterance(&input, &self.current, self.similarity_threshold)
        {
            debug!("transcript matches current utterance: {input:?}");
            return true;
        }

        for past in self.history.iter() {
            if matches_utterance(&input, past, self.similarity_threshold) {
                debug!("transcript matches spoken history: {input:?}");
                return true;
            }
        }

        if word_overlap_match(&input, &self.current)
            || self.history.iter().any(|past| word_overlap_match(&input, past))
        {
            debug!("transcript word-overlaps assistant speech: {input:?}");
            return true;
        }

        false
    }
}

/// Exact, partial, or similarity match between a transcript and one spoken
/// utterance. Both sides are lowercased and trimmed by the caller.
fn matches_utterance(input: &str, utterance: &str, similarity_threshold: u32) -> bool {
    if utterance.is_empty() {
        return false;
    }
    if input == utterance {
        return true;
    }
    if is_partial_match(input, utterance) {
        return true;
    }
    similarity_percent(input, utterance) >= similarity_threshold
}

/// Prefix/substring containment in either direction.
fn is_partial_match(input: &str, utterance: &str) -> bool {
    if utterance.starts_with(input) && input.chars().count() >= MIN_PREFIX_LEN {
        return true;
    }
    if input.chars().count() >= MIN_SUBSTRING_LEN && utterance.contains(input) {
        return true;
    }
    if utterance.chars().count() >= MIN_SUBSTRING_LEN && input.contains(utterance) {
        return true;
    }
    false
}

/// Fraction of transcript words present in the utterance, over the shorter
/// word count. Only meaningful for transcripts of ≥3 words.
fn word_overlap_match(input: &str, utterance: &str) -> bool {
    if input.is_empty() || utterance.is_empty() {
        return false;
    }

    let input_words: Vec<&str> = input.split_whitespace().collect();
    if input_words.len() < MIN_OVERLAP_WORDS {
        return false;
    }
    let utterance_words: Vec<&str> = utterance.split_whitespace().collect();

    let common = input_words
        .iter()
        .filter(|word| utterance_words.contains(word))
        .count();

    let shorter = input_words.len().min(utterance_words.len());
    common as f32 / shorter as f32 >= WORD_OVERLAP_RATIO
}

/// Normalized Levenshtein similarity in percent:
/// `(1 - distance / max(len_a, len_b)) * 100`.
fn similarity_percent(a: &str, b: &str) -> u32 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let max_len = a_chars.len().max(b_chars.len());
    let distance = levenshtein(&a_chars, &b_chars);
    ((1.0 - distance as f64 / max_len as f64) * 100.0) as u32
}

/// Edit distance with the classic two-row dynamic program.
fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    fn filter() -> EchoFilter {
        EchoFilter::new(&EchoConfig::default())
    }

    // ── levenshtein / similarity ────────────────────────────────────

    #[test]
    fn levenshtein_known_distances() {
        let d = |a: &str, b: &str| {
            levenshtein(
                &a.chars().collect::<Vec<_>>(),
                &b.chars().collect::<Vec<_>>(),
            )
        };
        assert_eq!(d("", "abc"), 3);
        assert_eq!(d("kitten", "sitting"), 3);
        assert_eq!(d("merhaba", "merhaba"), 0);
        assert_eq!(d("ses", "sesi"), 1);
    }

    #[test]
    fn similarity_is_symmetric_percentage() {
        assert_eq!(similarity_percent("abcd", "abcd"), 100);
        assert_eq!(similarity_percent("abcd", "abce"), 75);
        assert_eq!(similarity_percent("", "abc"), 0);
    }

    // ── matching rules ──────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn exact_match_is_echo() {
        let mut f = filter();
        f.speech_started("Komut moduna geçildi");
        assert!(f.is_echo("komut moduna geçildi"));
        assert!(f.is_echo("  Komut moduna geçildi  "));
    }

    #[tokio::test(start_paused = true)]
    async fn prefix_match_requires_min_length() {
        let mut f = filter();
        f.speech_started("merhaba size nasıl yardımcı olabilirim");
        assert!(f.is_echo("merhaba size"));
        // A three-char prefix is too short to count.
        assert!(!f.is_echo("mer"));
    }

    #[tokio::test(start_paused = true)]
    async fn substring_match_both_directions() {
        let mut f = filter();
        f.speech_started("ses seviyesi yükseltildi");
        // Transcript contained in the utterance.
        assert!(f.is_echo("seviyesi"));
        // Utterance contained in the transcript.
        let mut g = filter();
        g.speech_started("tamam");
        assert!(g.is_echo("tamam efendim buradayım"));
    }

    #[tokio::test(start_paused = true)]
    async fn similar_transcript_is_echo() {
        let mut f = filter();
        f.speech_started("hava durumu bugün güneşli");
        // One letter garbled mid-string, so neither prefix nor substring
        // applies; well above 70 % similarity.
        assert!(f.is_echo("hava durumu dugün güneşli"));
    }

    #[tokio::test(start_paused = true)]
    async fn word_overlap_requires_three_words() {
        let mut f = filter();
        f.speech_started("ses seviyesi şimdi kapatılıyor efendim");
        // 3 words, all present in the utterance.
        assert!(f.is_echo("ses şimdi kapatılıyor"));
        // Two words overlap fully but stay under the word-count gate, and
        // they are too short/different for the other rules.
        assert!(!f.is_echo("ses var"));
    }

    #[tokio::test(start_paused = true)]
    async fn unrelated_speech_passes() {
        let mut f = filter();
        f.speech_started("bugün takviminizde üç toplantı var");
        assert!(!f.is_echo("müzik klasörünü aç"));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_filter_passes_everything() {
        let f = filter();
        assert!(!f.is_echo("herhangi bir şey"));
        assert!(!f.is_echo(""));
    }

    // ── time window ─────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn window_only_gates_similarity_of_current() {
        let mut f = filter();
        f.speech_started("size haberleri okuyorum şu anda");
        tokio::time::advance(Duration::from_secs(6)).await;
        // Past the 5 s window the utterance still matches via history,
        // which is checked unconditionally.
        assert!(f.is_echo("size haberleri okuyorum şu anda"));
    }

    #[tokio::test(start_paused = true)]
    async fn cleared_filter_forgets_window_and_history() {
        let mut f = filter();
        f.speech_started("size haberleri okuyorum şu anda");
        f.clear();
        assert!(!f.is_echo("size haberleri okuyorum şu anda"));
        assert!(f.is_empty());
    }

    // ── history retention ───────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn history_retains_last_five() {
        let mut f = filter();
        f.speech_started("birinci uzun cevap cümlesi");
        for i in 2..=6 {
            f.speech_started(&format!("cevap cümlesi numara {i}"));
        }
        // The first utterance was evicted by the sixth.
        assert!(!f.is_echo("birinci uzun cevap cümlesi"));
        // The second is still retained.
        assert!(f.is_echo("cevap cümlesi numara 2"));
    }

    #[test]
    fn bounded_history_evicts_oldest() {
        let mut h = BoundedHistory::new(2);
        h.push("a".into());
        h.push("b".into());
        h.push("c".into());
        assert_eq!(h.len(), 2);
        let entries: Vec<&str> = h.iter().collect();
        assert_eq!(entries, ["b", "c"]);
    }

    #[test]
    fn zero_capacity_history_stays_empty() {
        let mut h = BoundedHistory::new(0);
        h.push("a".into());
        assert!(h.is_empty());
    }
}
