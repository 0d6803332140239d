//! Line-level helpers for converted property-list text.

use super::patterns;

pub const STRING_OPEN: &str = "<string>";
pub const STRING_CLOSE: &str = "</string>";
pub const REAL_OPEN: &str = "<real>";
pub const INTEGER_OPEN: &str = "<integer>";
pub const KEY_OPEN: &str = "<key>";

/// Removes the line's leading tag and every matching closing tag.
///
/// Returns `None` when the line doesn't start with a tag.
///
/// ```rust
/// use ichatpack::parsing::strip_tags;
///
/// assert_eq!(strip_tags("<string>hello</string>").as_deref(), Some("hello"));
/// assert_eq!(strip_tags("<integer>3</integer>").as_deref(), Some("3"));
/// assert_eq!(strip_tags("plain"), None);
/// ```
pub fn strip_tags(line: &str) -> Option<String> {
    let tag = patterns::leading_tag().captures(line)?.get(1)?.as_str();
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    Some(line.replace(&open, "").replace(&close, ""))
}

pub fn is_string_line(line: &str) -> bool {
    line.starts_with(STRING_OPEN)
}

pub fn is_real_line(line: &str) -> bool {
    line.starts_with(REAL_OPEN)
}

pub fn is_integer_line(line: &str) -> bool {
    line.starts_with(INTEGER_OPEN)
}

pub fn is_key_line(line: &str) -> bool {
    line.starts_with(KEY_OPEN)
}

/// Undecoded base64 attachment payload row.
pub fn is_data_line(line: &str) -> bool {
    line.starts_with("\t\t\t") && line.chars().count() == 55 && !line.contains([' ', '<'])
}

/// Replaces leading tab padding before a tag.
pub fn strip_padding(line: &str) -> String {
    patterns::tab_padding().replace(line, "<").into_owned()
}

/// Returns the first line at or after `from` that contains `needle`.
pub fn first_containing<'a, S: AsRef<str>>(
    lines: &'a [S],
    from: usize,
    needle: &str,
) -> Option<&'a str> {
    lines
        .get(from..)?
        .iter()
        .map(AsRef::as_ref)
        .find(|line| line.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_tags_multiline() {
        assert_eq!(
            strip_tags("<string>one\ntwo</string>").as_deref(),
            Some("one\ntwo")
        );
    }

    #[test]
    fn test_strip_tags_empty_value() {
        assert_eq!(strip_tags("<string></string>").as_deref(), Some(""));
    }

    #[test]
    fn test_is_data_line() {
        let payload = format!("\t\t\t{}", "A".repeat(52));
        assert!(is_data_line(&payload));
        assert!(!is_data_line(&format!("\t\t\t{}", "A".repeat(51))));
        assert!(!is_data_line(&format!("\t\t\t{} {}", "A".repeat(25), "A".repeat(26))));
        assert!(!is_data_line(&format!("\t\t{}", "A".repeat(53))));
    }

    #[test]
    fn test_strip_padding() {
        assert_eq!(strip_padding("\t\t<key>Sender</key>"), "<key>Sender</key>");
        assert_eq!(strip_padding("\tsecond line"), "\tsecond line");
        assert_eq!(strip_padding("<real>1</real>"), "<real>1</real>");
    }

    #[test]
    fn test_first_containing() {
        let lines = ["<string>a</string>", "<key>x</key>", "<string>b</string>"];
        assert_eq!(
            first_containing(&lines, 1, "<string>"),
            Some("<string>b</string>")
        );
        assert_eq!(first_containing(&lines, 3, "<string>"), None);
        assert_eq!(first_containing(&lines, 9, "<string>"), None);
    }
}
