//! Compiled regular expressions shared by the archive pipeline.
//!
//! Each pattern is compiled once on first use.

use std::sync::OnceLock;

use regex::Regex;

/// Trailing `-N` counter Messages appends to duplicate archive names.
pub fn duplicate_suffix() -> &'static Regex {
    static DUPLICATE_SUFFIX_RE: OnceLock<Regex> = OnceLock::new();
    DUPLICATE_SUFFIX_RE
        .get_or_init(|| Regex::new(r"-[0-9]+$").expect("valid duplicate suffix regex"))
}

/// Other participant in a converted archive name, optionally wrapped in
/// U+202A / U+202C directional marks.
///
/// `2014-03-01_Mark on 2014-03-01 at 10.00.00.ichat` captures `Mark`.
pub fn other_name() -> &'static Regex {
    static OTHER_NAME_RE: OnceLock<Regex> = OnceLock::new();
    OTHER_NAME_RE.get_or_init(|| {
        Regex::new(concat!(
            r"[0-9]{4}-[0-9]{2}-[0-9]{2}_\x{202A}?([^\x{202C}]+)\x{202C}?",
            r" on [0-9]{4}-[0-9]{2}-[0-9]{2} at ",
        ))
        .expect("valid other name regex")
    })
}

/// Conversation date inside an archive name.
pub fn conversation_date() -> &'static Regex {
    static CONVERSATION_DATE_RE: OnceLock<Regex> = OnceLock::new();
    CONVERSATION_DATE_RE.get_or_init(|| {
        Regex::new(r" on ([0-9]{4}-[0-9]{2}-[0-9]{2}) at ").expect("valid conversation date regex")
    })
}

/// Leading tab padding before a tag.
pub fn tab_padding() -> &'static Regex {
    static TAB_PADDING_RE: OnceLock<Regex> = OnceLock::new();
    TAB_PADDING_RE.get_or_init(|| Regex::new(r"^\t+<").expect("valid tab padding regex"))
}

/// A `<string>` line holding an attachment / object UUID.
pub fn uuid_line() -> &'static Regex {
    static UUID_LINE_RE: OnceLock<Regex> = OnceLock::new();
    UUID_LINE_RE.get_or_init(|| {
        Regex::new(
            r"^<string>[A-Z0-9]{8}-[A-Z0-9]{4}-[A-Z0-9]{4}-[A-Z0-9]{4}-[A-Z0-9]{12}</string>",
        )
        .expect("valid uuid line regex")
    })
}

/// A string value that is exactly an attachment UUID.
pub fn uuid_text() -> &'static Regex {
    static UUID_TEXT_RE: OnceLock<Regex> = OnceLock::new();
    UUID_TEXT_RE.get_or_init(|| {
        Regex::new(r"^[A-Z0-9]{8}-[A-Z0-9]{4}-[A-Z0-9]{4}-[A-Z0-9]{4}-[A-Z0-9]{12}$")
            .expect("valid uuid text regex")
    })
}

/// A non-breaking space joining two word characters.
pub fn nbsp_between_words() -> &'static Regex {
    static NBSP_RE: OnceLock<Regex> = OnceLock::new();
    NBSP_RE.get_or_init(|| Regex::new(r"(\w)\x{A0}(\w)").expect("valid nbsp regex"))
}

/// Short codes and 12-digit service numbers.
pub fn automated_sender() -> &'static Regex {
    static AUTOMATED_SENDER_RE: OnceLock<Regex> = OnceLock::new();
    AUTOMATED_SENDER_RE
        .get_or_init(|| Regex::new(r"^\d{5,6}$|^\d{12}$").expect("valid automated sender regex"))
}

/// A `<string>` line holding an 11-digit phone number, captured.
pub fn phone_line() -> &'static Regex {
    static PHONE_LINE_RE: OnceLock<Regex> = OnceLock::new();
    PHONE_LINE_RE.get_or_init(|| {
        Regex::new(r"^<string>(\+?[0-9]{11})</string>").expect("valid phone line regex")
    })
}

/// String value that is an 11-digit phone number.
pub fn phone_text() -> &'static Regex {
    static PHONE_TEXT_RE: OnceLock<Regex> = OnceLock::new();
    PHONE_TEXT_RE.get_or_init(|| Regex::new(r"^\+?[0-9]{11}$").expect("valid phone text regex"))
}

/// String value that is a 10-digit number without country code.
pub fn bare_phone_text() -> &'static Regex {
    static BARE_PHONE_TEXT_RE: OnceLock<Regex> = OnceLock::new();
    BARE_PHONE_TEXT_RE
        .get_or_init(|| Regex::new(r"^[0-9]{10}$").expect("valid bare phone text regex"))
}

/// Email-shaped identifier.
pub fn email() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| Regex::new(r"^[^ @]+@[^ @.]+\.[^ @]+$").expect("valid email regex"))
}

/// Opening tag at the start of a line.
pub fn leading_tag() -> &'static Regex {
    static LEADING_TAG_RE: OnceLock<Regex> = OnceLock::new();
    LEADING_TAG_RE.get_or_init(|| Regex::new(r"^<(\w+)>").expect("valid leading tag regex"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_name_with_directional_marks() {
        let name = "2016-05-02_\u{202A}+1 (555) 000-1111\u{202C} on 2016-05-02 at 09.10.11.ichat";
        let caps = other_name().captures(name).unwrap();
        assert_eq!(&caps[1], "+1 (555) 000-1111");
    }

    #[test]
    fn test_other_name_plain() {
        let name = "2014-03-01_Mark on 2014-03-01 at 10.00.00.ichat";
        assert_eq!(&other_name().captures(name).unwrap()[1], "Mark");
    }

    #[test]
    fn test_duplicate_suffix() {
        assert!(duplicate_suffix().is_match("Mark on 2014-03-01 at 10.00.00-2"));
        assert!(!duplicate_suffix().is_match("Mark on 2014-03-01 at 10.00.00"));
    }

    #[test]
    fn test_uuid_patterns() {
        let line = "<string>5F3C2A10-1B2C-4D5E-8F90-A1B2C3D4E5F6</string>";
        assert!(uuid_line().is_match(line));
        assert!(uuid_text().is_match("5F3C2A10-1B2C-4D5E-8F90-A1B2C3D4E5F6"));
        assert!(!uuid_text().is_match("5f3c2a10-1b2c-4d5e-8f90-a1b2c3d4e5f6"));
    }

    #[test]
    fn test_phone_patterns() {
        let caps = phone_line().captures("<string>+15550001111</string>").unwrap();
        assert_eq!(&caps[1], "+15550001111");
        assert!(phone_text().is_match("15550001111"));
        assert!(!phone_text().is_match("5550001111"));
        assert!(bare_phone_text().is_match("5550001111"));
    }

    #[test]
    fn test_automated_sender() {
        assert!(automated_sender().is_match("12345"));
        assert!(automated_sender().is_match("123456"));
        assert!(automated_sender().is_match("123456789012"));
        assert!(!automated_sender().is_match("1234567"));
    }

    #[test]
    fn test_email() {
        assert!(email().is_match("mark@example.com"));
        assert!(!email().is_match("mark at example.com"));
        assert!(!email().is_match("mark@localhost"));
    }
}
