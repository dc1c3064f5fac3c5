//! Comment text normalization.

use std::sync::LazyLock;

use regex::Regex;

/// Emoticons, pictographs, transport symbols, regional-indicator flags,
/// dingbats, and the enclosed-alphanumeric through CJK-symbol block.
/// Sinhala (U+0D80..) and Tamil (U+0B80..) sit below every range.
static EMOJI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"[\x{1F600}-\x{1F64F}",
        r"\x{1F300}-\x{1F5FF}",
        r"\x{1F680}-\x{1F6FF}",
        r"\x{1F1E0}-\x{1F1FF}",
        r"\x{2700}-\x{27BF}",
        r"\x{24C2}-\x{1F251}]",
    ))
    .expect("valid regex")
});

/// Remove emoji and pictographic symbols, leaving everything else intact.
#[must_use]
pub fn strip_emojis(text: &str) -> String {
    EMOJI_RE.replace_all(text, "").into_owned()
}

/// The normalized form used as the dedup key and classifier input:
/// emoji-stripped, trimmed, lowercased.
#[must_use]
pub fn clean_comment(text: &str) -> String {
    strip_emojis(text).trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_common_emoji() {
        assert_eq!(strip_emojis("great app 😀🚀"), "great app ");
    }

    #[test]
    fn keeps_sinhala_and_tamil_script() {
        assert_eq!(strip_emojis("හොඳයි 👍"), "හොඳයි ");
        assert_eq!(strip_emojis("நன்றி"), "நன்றி");
    }

    #[test]
    fn clean_comment_trims_and_lowercases() {
        assert_eq!(clean_comment("  Best App EVER 🎉 "), "best app ever");
    }

    #[test]
    fn clean_comment_of_only_emoji_is_empty() {
        assert_eq!(clean_comment("😀😀"), "");
    }
}
