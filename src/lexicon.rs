//! Static classification data for intent detection.
//!
//! The assistant's command vocabulary is Turkish. Every pattern here is
//! compiled once into a [`LazyLock`] static; the per-category patterns live
//! in an explicit priority-ordered table because several phrases satisfy
//! more than one category (e.g. "e posta" appears in both the mail and the
//! calendar vocabularies) and the first match must win deterministically.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Intent category assigned by the classifier.
///
/// The variant order mirrors the classification priority order used by
/// [`categories`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandCategory {
    /// Fixed page-navigation phrases ("sayfa başına git").
    Navigation,
    /// System volume control.
    Volume,
    /// Generic mail vocabulary.
    Mail,
    /// Full mail/meeting store commands ("okunmamış e postalarımı göster").
    Mapi,
    /// Short practical mail/store commands ("son e posta").
    PracticalMapi,
    /// Calendar and meetings.
    Calendar,
    /// Notes.
    Note,
    /// Tasks.
    Task,
    /// Wikipedia-style question words ("nedir", "kimdir").
    Wikipedia,
    /// News and headlines.
    News,
    /// Social media trends.
    SocialTrend,
    /// Weather.
    Weather,
    /// Synthesis voice control ("edge seslendirme").
    TtsVoice,
    /// Audio output test.
    AudioTest,
    /// Single-word whitelist commands ("kopyala", "geri").
    ShortCommand,
    /// Survived every rejection stage without a category match.
    General,
}

/// Wake phrases, including the recognizer's common misspellings.
pub const WAKE_WORDS: [&str; 3] = ["hey quadro", "hey cuadro", "hey kuadro"];

/// Mode-switch vocabulary, matched by containment.
pub const MODE_COMMANDS: [&str; 3] = ["komut modu", "yazı modu", "okuma modu"];

/// The one phrase Writing mode reacts to itself.
pub const WRITING_TO_COMMAND_PHRASE: &str = "komut moduna geç";

/// Exact-match page navigation phrases.
pub const NAVIGATION_LITERALS: [&str; 2] = ["sayfa başına git", "sayfa sonuna git"];

/// Single-word commands accepted without a verb.
pub const SINGLE_WORD_COMMANDS: [&str; 17] = [
    "kopyala", "yapıştır", "kes", "enter", "sağ", "sol", "yukarı", "aşağı", "escape", "esc",
    "tab", "sonraki", "önceki", "yenile", "geri", "ileri", "kaydet",
];

/// Short confirmation/navigation commands accepted for ≤2-word transcripts,
/// matched exactly or by containment.
pub const SPECIAL_SHORT_COMMANDS: [&str; 25] = [
    "tamam",
    "kabul",
    "onayla",
    "enter",
    "enter tuşu",
    "vazgeç",
    "iptal",
    "iptal et",
    "esc",
    "escape",
    "tab",
    "boşluk",
    "onay",
    "onaylıyorum",
    "evet",
    "hayır",
    "kabul et",
    "devam et",
    "test wikipedia",
    "test haberler",
    "test twitter",
    "test cache",
    "test google trends",
    "test ekşi sözlük",
    "test reddit",
];

/// Verbs and command nouns accepted as evidence of an actionable command.
/// Matched as case-insensitive substrings, not whole words.
pub const COMMAND_VERBS: [&str; 62] = [
    "aç", "kapat", "başlat", "durdur", "bul", "ara", "göster", "gizle", "yükle", "kaldır",
    "oluştur", "sil", "kopyala", "taşı", "düzenle", "kaydet", "açık", "kapalı", "aktif", "pasif",
    "büyük", "küçük", "tam", "yarım", "hızlı", "yavaş", "yüksek", "alçak", "sağ", "sol", "üst",
    "alt", "orta", "ilk", "son", "yeni", "eski", "boş", "dolu", "varolan", "mevcut", "geçmiş",
    "gelecek", "bugünkü", "dünkü", "yarınkı", "test", "et", "kontrol", "doğrula", "hesap",
    "profil", "oku", "listele", "özet", "e posta", "mesaj", "randevu", "toplantı", "kişi",
    "takvim", "okunmamış",
];

/// Well-known folder names accepted as command targets.
pub const SYSTEM_FOLDERS: [&str; 8] = [
    "klasör", "belgeler", "resimler", "müzik", "videolar", "indirilenler", "masaüstü",
    "dosya gezgini",
];

/// Short control phrases the user may bark over the assistant's speech.
/// These pass through the echo filter even when the transcript would
/// otherwise be suppressed.
pub const INTERRUPT_PHRASES: [&str; 23] = [
    "dur",
    "stop",
    "sus",
    "kes",
    "tamam",
    "yeter",
    "teşekkür",
    "teşekkürler",
    "sağol",
    "sağ ol",
    "komut modu",
    "yazı modu",
    "eposta",
    "e-posta",
    "mail",
    "haber",
    "wikipedia",
    "twitter",
    "ses yükselt",
    "ses azalt",
    "ses kapat",
    "mikrofon aç",
    "mikrofon kapat",
];

/// Containment variants accepted as news requests for short transcripts.
pub const NEWS_SHORT_VARIANTS: [&str; 3] = ["haberleri", "haberlerde", "haberlerini"];

/// Conjugated verbs that promote a ≤2-word transcript to a command.
pub static VERB_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(aç|kapat|başlat|sonlandır|kilitle|göster|al|hizala|git|seç|oluştur|yenile|kaydır|arttır|azalt|kopyala|yapıştır|kes|oku|listele|özetle|gönder)\b",
    )
    .expect("verb pattern")
});

static VOLUME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(ses|volume|sesli|sessiz|yükselt|alçalt|kıs|artır|azalt|arttır)\b")
        .expect("volume pattern")
});

static MAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(e posta|e-posta|eposta|posta|mail)\b").expect("mail pattern")
});

// Full-phrase store commands; no \b so the numbered form "detaylı oku 3"
// matches anywhere in the transcript.
static MAPI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(okunmamış e postalarımı göster|e postalarımı göster|gönderilmiş e postaları göster|detaylı oku \d+|bugünkü toplantılarım neler|bu haftaki toplantılarım neler)",
    )
    .expect("mapi pattern")
});

static PRACTICAL_MAPI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(son e posta|son mesaj|bugünkü randevu|bugün randevu|okunmamış e posta|yeni e posta|kişi ara|e posta özet)\b",
    )
    .expect("practical mapi pattern")
});

static CALENDAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(takvim|toplantı|randevu|bugün toplantı|yarın toplantı|bu hafta toplantı|toplantı oluştur|takvim listele)\b",
    )
    .expect("calendar pattern")
});

static NOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(not oluştur|not yaz|not ekle|notlar listele|not)\b").expect("note pattern")
});

static TASK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(görev oluştur|görev ekle|görev listele|görevler|görev)\b")
        .expect("task pattern")
});

static WIKIPEDIA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(nedir|kimdir|ne demek|kim|nasıl|neden|ne zaman|hangi)\b")
        .expect("wikipedia pattern")
});

static NEWS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(haber|haberler|son dakika|gündem|güncel|son gelişme|duyuru|finans|ekonomi|business|bloomberg|reuters|bbc|cnn|spor haberleri|ekonomi haberleri|teknoloji haberleri|sağlık haberleri|dünya haberleri|magazin haberleri|siyaset haberleri|haberlerde|haberlerini|haberlerinde)\b",
    )
    .expect("news pattern")
});

static SOCIAL_TREND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(twitter|tweet|trend|gündem|popüler|sosyal medya)\b")
        .expect("social trend pattern")
});

static WEATHER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(hava|hava durumu|sıcaklık|yağmur|kar|güneş|bulut|rüzgar|nem)\b")
        .expect("weather pattern")
});

static TTS_VOICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(edge tts|edge seslendirme|edge ses|edge konuş)\b")
        .expect("tts voice pattern")
});

static AUDIO_TEST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(test ses|ses test|ses testi|sesi test et|test audio|audio test)\b")
        .expect("audio test pattern")
});

/// Category patterns in classification priority order. First match wins.
///
/// Volume before mail, mail before calendar: "sesli e posta oku" must be a
/// volume command, and a crafted transcript satisfying both the mail and
/// calendar vocabularies must classify as mail.
#[must_use]
pub fn categories() -> &'static [(CommandCategory, &'static Regex)] {
    static TABLE: LazyLock<Vec<(CommandCategory, &'static Regex)>> = LazyLock::new(|| {
        vec![
            (CommandCategory::Volume, &*VOLUME),
            (CommandCategory::Mail, &*MAIL),
            (CommandCategory::Mapi, &*MAPI),
            (CommandCategory::PracticalMapi, &*PRACTICAL_MAPI),
            (CommandCategory::Calendar, &*CALENDAR),
            (CommandCategory::Note, &*NOTE),
            (CommandCategory::Task, &*TASK),
            (CommandCategory::Wikipedia, &*WIKIPEDIA),
            (CommandCategory::News, &*NEWS),
            (CommandCategory::SocialTrend, &*SOCIAL_TREND),
            (CommandCategory::Weather, &*WEATHER),
            (CommandCategory::TtsVoice, &*TTS_VOICE),
            (CommandCategory::AudioTest, &*AUDIO_TEST),
        ]
    });
    TABLE.as_slice()
}

/// Lowercase, trim, and strip trailing sentence punctuation (`. , ! ?`).
///
/// Used before wake-word and navigation-literal comparisons so recognizer
/// formatting ("Hey Quadro.") doesn't break exact matches.
#[must_use]
pub fn normalize_phrase(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .trim_end_matches(['.', ',', '!', '?'])
        .trim_end()
        .to_owned()
}

/// Returns true if the normalized transcript is exactly a wake phrase.
#[must_use]
pub fn is_wake_word(text: &str) -> bool {
    let normalized = normalize_phrase(text);
    WAKE_WORDS.contains(&normalized.as_str())
}

/// Returns true if the transcript contains a mode-switch phrase.
#[must_use]
pub fn is_mode_command(text: &str) -> bool {
    let lower = text.to_lowercase();
    MODE_COMMANDS.iter().any(|cmd| lower.contains(cmd))
}

/// Returns true if the transcript contains an interrupt phrase.
///
/// Interrupts let the user barge in over assistant speech with short control
/// words even when the transcript would otherwise be suppressed as echo.
#[must_use]
pub fn is_interrupt(text: &str) -> bool {
    if text.trim().is_empty() {
        return false;
    }
    let lower = text.to_lowercase();
    INTERRUPT_PHRASES.iter().any(|cmd| lower.contains(cmd))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn wake_word_spellings() {
        assert!(is_wake_word("hey quadro"));
        assert!(is_wake_word("Hey Cuadro"));
        assert!(is_wake_word("hey kuadro."));
        assert!(is_wake_word("  hey quadro!  "));
        assert!(!is_wake_word("hey quadro aç"));
    }

    #[test]
    fn normalize_strips_trailing_punctuation_only() {
        assert_eq!(normalize_phrase("Sayfa Başına Git."), "sayfa başına git");
        assert_eq!(normalize_phrase("e-posta oku"), "e-posta oku");
    }

    #[test]
    fn mode_commands_match_by_containment() {
        assert!(is_mode_command("komut moduna geç"));
        assert!(is_mode_command("şimdi yazı modu lütfen"));
        assert!(!is_mode_command("modu bilmiyorum"));
    }

    #[test]
    fn interrupts_match_by_containment() {
        assert!(is_interrupt("dur"));
        assert!(is_interrupt("tamam yeter"));
        assert!(is_interrupt("ses yükselt biraz"));
        assert!(!is_interrupt("bugün hava güzel"));
        assert!(!is_interrupt("   "));
    }

    #[test]
    fn category_table_orders_mail_before_calendar() {
        let order: Vec<CommandCategory> = categories().iter().map(|(c, _)| *c).collect();
        let mail = order.iter().position(|c| *c == CommandCategory::Mail).unwrap();
        let calendar = order
            .iter()
            .position(|c| *c == CommandCategory::Calendar)
            .unwrap();
        let volume = order
            .iter()
            .position(|c| *c == CommandCategory::Volume)
            .unwrap();
        assert!(volume < mail);
        assert!(mail < calendar);
    }

    #[test]
    fn patterns_compile_and_match_samples() {
        let samples = [
            (CommandCategory::Volume, "sesi yükselt"),
            (CommandCategory::Mail, "e posta oku"),
            (CommandCategory::Mapi, "okunmamış e postalarımı göster"),
            (CommandCategory::PracticalMapi, "son mesaj"),
            (CommandCategory::Calendar, "takvim listele"),
            (CommandCategory::Note, "not oluştur"),
            (CommandCategory::Task, "görev ekle"),
            (CommandCategory::Wikipedia, "atatürk kimdir"),
            (CommandCategory::News, "son dakika haberleri"),
            (CommandCategory::SocialTrend, "twitter trend"),
            (CommandCategory::Weather, "hava durumu"),
            (CommandCategory::TtsVoice, "edge seslendirme"),
            (CommandCategory::AudioTest, "audio test"),
        ];
        for (expected, sample) in samples {
            let hit = categories()
                .iter()
                .find(|(_, re)| re.is_match(sample))
                .map(|(c, _)| *c);
            assert_eq!(hit, Some(expected), "sample: {sample}");
        }
    }

    #[test]
    fn mapi_numbered_read_matches() {
        assert!(MAPI.is_match("detaylı oku 12"));
        assert!(!MAPI.is_match("detaylı oku"));
    }
}
