use html_escape::decode_html_entities;
use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Normalizes a single line of extracted text
///
/// # Normalization Steps
///
/// 1. Drop every character outside 7-bit ASCII (Unicode whitespace such as
///    no-break spaces is kept as whitespace)
/// 2. Collapse each whitespace run into a single space
/// 3. Trim leading and trailing spaces
/// 4. Return `None` if nothing is left
///
/// # Examples
///
/// ```
/// use patent_harvester::normalize::normalize_line;
///
/// assert_eq!(normalize_line("a  \n\t b"), Some("a b".to_string()));
/// assert_eq!(normalize_line("café"), Some("caf".to_string()));
/// assert_eq!(normalize_line("   "), None);
/// ```
pub fn normalize_line(text: &str) -> Option<String> {
    let folded: String = text
        .chars()
        .filter(|c| c.is_ascii() || c.is_whitespace())
        .collect();

    let collapsed = WHITESPACE_RE.replace_all(&folded, " ");
    let trimmed = collapsed.trim();

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Normalizes a list of raw markup fragments into one string
///
/// Fragments are joined with single spaces, HTML entities are decoded and the
/// result is normalized like [`normalize_line`]. Entities are decoded before the
/// ASCII fold so a decoded `&eacute;` or `&nbsp;` cannot leak non-ASCII
/// characters or whitespace runs into the output.
///
/// Unlike [`normalize_line`] this never returns `None`: an empty fragment list
/// (or fragments that normalize to nothing) yields an empty string.
pub fn normalize_fragment_list<S: AsRef<str>>(fragments: &[S]) -> String {
    let joined = fragments
        .iter()
        .map(|f| f.as_ref())
        .collect::<Vec<_>>()
        .join(" ");

    normalize_line(&decode_html_entities(&joined)).unwrap_or_default()
}

/// Removes label punctuation (`:`) from a value
///
/// Detail pages render metadata as `Patent number: 10123456`; the colon
/// sometimes lands inside the value element.
pub fn strip_label_punctuation(text: &str) -> String {
    text.replace(':', "")
}
