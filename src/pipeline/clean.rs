//! Text normalisation applied before vectorizing, at training and prediction time.

use std::fmt::Display;

/// Lowercase `text` and strip every ASCII punctuation character.
///
/// Accepts anything displayable so numeric or other non-string cells are
/// stringified first; never fails.
///
/// ```
/// use sentiment_forest::clean_text;
///
/// assert_eq!(clean_text("Great day!!!"), "great day");
/// assert_eq!(clean_text(42), "42");
/// ```
pub fn clean_text(text: impl Display) -> String {
    text.to_string()
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect()
}
