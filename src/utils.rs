//! Small helpers shared by the dispatcher, adapters and logging.

use chrono::{FixedOffset, NaiveDate, Utc};

/// Full-width (ideographic) space as typed by Japanese IMEs.
pub const FULL_WIDTH_SPACE: char = '\u{3000}';

/// Safely truncates a string to a maximum character length (not bytes).
///
/// This is UTF-8 safe and will not panic on multi-byte characters.
///
/// # Examples
///
/// ```
/// use line_command_bot::utils::truncate_str;
/// let s = "検索結果がありません";
/// assert_eq!(truncate_str(s, 4), "検索結果");
/// ```
pub fn truncate_str(s: impl AsRef<str>, max_chars: usize) -> String {
    let s = s.as_ref();
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    s.char_indices()
        .nth(max_chars)
        .map_or_else(|| s.to_string(), |(pos, _)| s[..pos].to_string())
}

/// Splits a command line into whitespace-separated tokens.
///
/// Full-width spaces are treated as ordinary spaces.
///
/// # Examples
///
/// ```
/// use line_command_bot::utils::tokenize;
/// assert_eq!(tokenize("lunch\u{3000}渋谷 ラーメン"), vec!["lunch", "渋谷", "ラーメン"]);
/// ```
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.replace(FULL_WIDTH_SPACE, " ")
        .split_whitespace()
        .map(ToString::to_string)
        .collect()
}

/// Current calendar date in the given timezone.
#[must_use]
pub fn today_in(offset: FixedOffset) -> NaiveDate {
    Utc::now().with_timezone(&offset).date_naive()
}
