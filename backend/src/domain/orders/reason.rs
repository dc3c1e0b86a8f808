//! Free-text reasons attached to declines and payment rejections.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Normalised, non-empty reason text.
///
/// Clients frequently send the reason JSON-encoded twice, so surrounding
/// double quotes are stripped along with whitespace.
///
/// # Examples
/// ```
/// use labelflow::domain::orders::Reason;
///
/// let reason = Reason::parse(Some("  \"late\"  ")).expect("non-empty");
/// assert_eq!(reason.as_str(), "late");
/// assert!(Reason::parse(Some("  \"\" ")).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct Reason(String);

impl Reason {
    /// Normalise raw input, returning `None` when nothing meaningful remains.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let cleaned = raw?.trim().trim_matches('"').trim();
        if cleaned.is_empty() {
            None
        } else {
            Some(Self(cleaned.to_owned()))
        }
    }

    /// Rebuild a reason read back from storage.
    pub(crate) fn from_stored(value: String) -> Option<Self> {
        Self::parse(Some(value.as_str()))
    }

    /// Borrow the reason text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("   "))]
    #[case(Some("\"\""))]
    #[case(Some(" \" \" "))]
    fn blank_input_yields_none(#[case] raw: Option<&str>) {
        assert!(Reason::parse(raw).is_none());
    }

    #[rstest]
    #[case("late", "late")]
    #[case("  \"late\"  ", "late")]
    #[case("\"out of stock\"", "out of stock")]
    #[case("  artwork \"v2\" missing ", "artwork \"v2\" missing")]
    fn input_is_trimmed_and_unquoted(#[case] raw: &str, #[case] expected: &str) {
        let reason = Reason::parse(Some(raw)).expect("non-empty reason");
        assert_eq!(reason.as_str(), expected);
    }
}
