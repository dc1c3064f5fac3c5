//! Language routing for comments.
//!
//! [`route`] decides between English, Sinhala, Tamil and everything else.
//! Script ranges and romanized keyword lists take priority; a statistical
//! detector and the English-word overlap ratio decide the rest.

use std::sync::LazyLock;

use brandpulse_core::Language;
use regex::Regex;

use crate::lexicon::LexiconStore;

/// Share of Latin words that must be dictionary English for a comment to
/// route to `en` regardless of the detector.
const ENGLISH_OVERLAP_THRESHOLD: f64 = 0.8;

const SINHALA_BLOCK: std::ops::RangeInclusive<char> = '\u{0D80}'..='\u{0DFF}';
const TAMIL_BLOCK: std::ops::RangeInclusive<char> = '\u{0B80}'..='\u{0BFF}';

/// Romanized Sinhala markers.
const SINGLISH_KEYWORDS: &[&str] = &[
    "meke", "eka", "pennuwa", "aiya", "thama", "nathuwa", "hariyata", "ehemai", "ehemay",
    "puluwn", "ganna", "denna", "karanna", "puluwanda", "balanna", "illanawa", "thiyenawa",
    "pennanna", "keyanna", "bala", "giyama", "mage", "oyaa", "mama", "thopi", "adurana", "rata",
    "ayye", "modayo", "hadaganna", "nisa", "payanna", "paththar", "apita", "eka hari", "veida",
    "hithagena", "inney", "enawa", "ennako", "yawanna", "awlak", "thiyenawada", "bari", "pitin",
    "uththara", "thawa", "pamanak", "bawitha", "uththarayi", "inneyda", "samanya", "pahadili",
    "widihata", "wela", "yanne", "barida", "hamba", "puluwan", "dila", "gnn", "tikak", "paara",
    "kaata", "dunnoth", "tiyana", "apahu", "uththare", "karapu", "thiyanawanam", "meken",
    "rathnapure", "thiyanawanamda", "witarayi", "monawada", "mata", "lebenawada", "kianne",
    "salli", "krla", "thynna", "baid", "mokadda", "danna", "account eka", "mge", "widihk",
    "awhsya", "smnya", "apit", "igen", "okma", "owa", "okkoma", "puluvn", "wlt", "brid",
    "kiyanne", "mageth", "banku", "bankuwa", "isthuthi", "krnn", "karana", "karanne", "thiynwa",
    "me normal account dha",
];

/// Romanized Tamil markers.
const TANGLISH_KEYWORDS: &[&str] = &[
    "illa", "enna", "mudiyala", "pannalama", "irundha", "vanthuten", "kasu", "beta", "banao",
    "phele", "dekh", "honeka", "sollunga", "eppdi", "aalu", "anna", "enakku", "vendum",
    "nerppurathu", "irikida", "pannurathu", "pannuravangata", "eppedi", "kodukanum", "yaruku",
    "yenga", "panalama", "panniradhunu", "irukka", "eppidi", "akkalukku", "podunka", "patri",
    "pannuvathu", "poadunga", "vankuran", "enapananum", "pandraanga", "eppadi", "edukkurathu",
    "ithila", "ethu", "iruku", "puriyamatengudhu", "edhunu", "eranthutaru", "edukala", "podunga",
    "paththi", "ondu", "irku", "cennect", "mudima", "bhai", "bhaiya", "jaaega", "pannure",
    "mazagati", "falige", "naber", "yichala",
];

static LATIN_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-z]{2,}\b").expect("valid regex"));

/// A statistical language identifier.
///
/// Returns an ISO 639-1 code where one exists, or `None` when the text is
/// too short or ambiguous to call.
pub trait LanguageDetector: Send + Sync {
    fn detect(&self, text: &str) -> Option<String>;
}

/// [`LanguageDetector`] backed by the `whatlang` trigram model.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhatlangDetector;

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Option<String> {
        let info = whatlang::detect(text)?;
        let code = match info.lang() {
            whatlang::Lang::Eng => "en",
            whatlang::Lang::Sin => "si",
            whatlang::Lang::Tam => "ta",
            other => other.code(),
        };
        Some(code.to_string())
    }
}

/// Decide the dominant language of `text`. First match wins:
///
/// 1. Sinhala script or a Singlish keyword: `si`.
/// 2. Tamil script or a Tanglish keyword: `ta`.
/// 3. Detector says `en`, or at least 80% of Latin words are English: `en`.
/// 4. Detector's code if it is `en`/`si`/`ta`, otherwise `other`.
///
/// A detector that cannot decide routes the comment to `other`.
#[must_use]
pub fn route(text: &str, lexicon: &LexiconStore, detector: &dyn LanguageDetector) -> Language {
    let lower = text.to_lowercase();
    let tokens = tokenize(&lower);

    if contains_script(text, &SINHALA_BLOCK) || mentions_any(&tokens, SINGLISH_KEYWORDS) {
        return Language::Si;
    }
    if contains_script(text, &TAMIL_BLOCK) || mentions_any(&tokens, TANGLISH_KEYWORDS) {
        return Language::Ta;
    }

    let Some(code) = detector.detect(text) else {
        return Language::Other;
    };
    if code == "en" || is_mostly_english(&lower, lexicon) {
        return Language::En;
    }
    Language::from_code(&code)
}

fn contains_script(text: &str, block: &std::ops::RangeInclusive<char>) -> bool {
    text.chars().any(|c| block.contains(&c))
}

fn tokenize(lower: &str) -> Vec<&str> {
    lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Single-word keywords match whole tokens; multi-word keywords match a run
/// of consecutive tokens.
fn mentions_any(tokens: &[&str], keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| {
        let parts: Vec<&str> = kw.split_whitespace().collect();
        match parts.as_slice() {
            [] => false,
            [word] => tokens.contains(word),
            phrase => tokens.windows(phrase.len()).any(|w| w == phrase),
        }
    })
}

fn is_mostly_english(lower: &str, lexicon: &LexiconStore) -> bool {
    if !lexicon.has_english_words() {
        return false;
    }
    let words: Vec<&str> = LATIN_WORD_RE.find_iter(lower).map(|m| m.as_str()).collect();
    if words.is_empty() {
        return false;
    }
    let english = words.iter().filter(|w| lexicon.is_english_word(w)).count();
    #[allow(clippy::cast_precision_loss)]
    let ratio = english as f64 / words.len() as f64;
    ratio >= ENGLISH_OVERLAP_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedDetector(Option<&'static str>);

    impl LanguageDetector for FixedDetector {
        fn detect(&self, _text: &str) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    fn english_lexicon() -> LexiconStore {
        LexiconStore::from_parts(
            Vec::new(),
            Vec::new(),
            ["the", "app", "is", "very", "good", "bank"]
                .into_iter()
                .map(str::to_string),
        )
    }

    #[test]
    fn sinhala_script_wins_over_detector() {
        let lexicon = LexiconStore::empty();
        let lang = route("ඇප් එක හොඳයි", &lexicon, &FixedDetector(Some("en")));
        assert_eq!(lang, Language::Si);
    }

    #[test]
    fn singlish_keyword_routes_to_sinhala() {
        let lexicon = LexiconStore::empty();
        let lang = route("Meke loan ganna puluwanda", &lexicon, &FixedDetector(Some("en")));
        assert_eq!(lang, Language::Si);
    }

    #[test]
    fn singlish_keyword_must_be_a_whole_token() {
        let lexicon = LexiconStore::empty();
        let lang = route("check my balance", &lexicon, &FixedDetector(Some("en")));
        assert_eq!(lang, Language::En);
    }

    #[test]
    fn singlish_phrase_matches_consecutive_tokens() {
        let lexicon = LexiconStore::empty();
        let detector = FixedDetector(Some("en"));
        assert_eq!(
            route("is me normal account dha?", &lexicon, &detector),
            Language::Si
        );
    }

    #[test]
    fn tamil_script_and_tanglish_route_to_tamil() {
        let lexicon = LexiconStore::empty();
        let detector = FixedDetector(Some("en"));
        assert_eq!(route("நன்றி", &lexicon, &detector), Language::Ta);
        assert_eq!(route("eppadi open pannuvathu", &lexicon, &detector), Language::Ta);
    }

    #[test]
    fn english_overlap_overrides_detector() {
        let lang = route(
            "the app is very good",
            &english_lexicon(),
            &FixedDetector(Some("fr")),
        );
        assert_eq!(lang, Language::En);
    }

    #[test]
    fn detector_failure_routes_to_other() {
        let lang = route("the app is very good", &english_lexicon(), &FixedDetector(None));
        assert_eq!(lang, Language::Other);
    }

    #[test]
    fn unsupported_detector_code_routes_to_other() {
        let lexicon = LexiconStore::empty();
        let lang = route("bonjour tout le monde", &lexicon, &FixedDetector(Some("fr")));
        assert_eq!(lang, Language::Other);
    }

    #[test]
    fn empty_text_routes_to_other() {
        let lexicon = LexiconStore::empty();
        assert_eq!(route("", &lexicon, &WhatlangDetector), Language::Other);
    }

    #[test]
    fn route_is_deterministic() {
        let lexicon = english_lexicon();
        let text = "the bank app is very good";
        let first = route(text, &lexicon, &WhatlangDetector);
        for _ in 0..5 {
            assert_eq!(route(text, &lexicon, &WhatlangDetector), first);
        }
    }
}
