//! Text escapes in converted archives.
//!
//! The converter emits standard XML entities. Two private markers are added
//! by the normalizer to shield message text that looks like contact info:
//! `&at;` stands in for `@` and `&tel;` prefixes a phone number.

use super::patterns;

/// Stand-in for `@` in a message that is exactly an email address.
pub const AT_MARKER: &str = "&at;";

/// Prefix on a message that is exactly a phone number.
pub const TEL_MARKER: &str = "&tel;";

const NBSP: char = '\u{A0}';

/// Replacement order matters: `&amp;` goes last so `&amp;lt;` stays `&lt;`.
const ESCAPES: [(&str, &str); 7] = [
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&apos;", "'"),
    (AT_MARKER, "@"),
    (TEL_MARKER, ""),
    ("&amp;", "&"),
];

/// Turns archive text back into the message as typed.
///
/// A non-breaking space between two word characters becomes a regular
/// space; any other non-breaking space is dropped.
///
/// ```rust
/// use ichatpack::parsing::unescape_xml_chars;
///
/// assert_eq!(unescape_xml_chars("a &lt;b&gt; &amp; c"), "a <b> & c");
/// assert_eq!(unescape_xml_chars("me&at;example.com"), "me@example.com");
/// assert_eq!(unescape_xml_chars("hi\u{a0}there"), "hi there");
/// ```
pub fn unescape_xml_chars(text: &str) -> String {
    let mut out = patterns::nbsp_between_words()
        .replace_all(text, "${1} ${2}")
        .into_owned();
    for (escaped, plain) in ESCAPES {
        if out.contains(escaped) {
            out = out.replace(escaped, plain);
        }
    }
    out.retain(|c| c != NBSP);
    out
}

/// Escapes text the way the converter writes `<string>` values.
pub fn escape_xml_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape_all_entities() {
        assert_eq!(
            unescape_xml_chars("&lt;&gt;&quot;&apos;&amp;"),
            "<>\"'&"
        );
    }

    #[test]
    fn test_unescape_amp_last() {
        assert_eq!(unescape_xml_chars("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_unescape_tel_marker() {
        assert_eq!(unescape_xml_chars("&tel;+15550001111"), "+15550001111");
    }

    #[test]
    fn test_nbsp_runs() {
        // matches don't overlap, so the second space of a run is dropped
        assert_eq!(unescape_xml_chars("a\u{a0}b\u{a0}c"), "a bc");
        assert_eq!(unescape_xml_chars("ok\u{a0}!"), "ok!");
    }

    #[test]
    fn test_escape_round_trip() {
        let text = r#"if a < b && c > "d" then 'e'"#;
        assert_eq!(unescape_xml_chars(&escape_xml_chars(text)), text);
    }
}
