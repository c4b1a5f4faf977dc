//! Extraction of the article count from free-text status messages.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Count phrase, e.g. "5 articles extracted"
    static ref EXTRACTED_COUNT_PATTERN: Regex =
        Regex::new(r"(\d+)\s+articles extracted").unwrap();
}

/// Pull the article count out of a human-readable status message.
///
/// The analysis service currently reports its count only inside prose
/// such as "File processed. 5 articles extracted.". The digits taken are
/// the ones immediately before the "articles extracted" phrase; the rest
/// of the message is ignored. A message without the phrase, or with a
/// number too large for `u32`, yields 0. Prefer the structured field via
/// [`crate::UploadResponse::extracted_count`] wherever an envelope is at
/// hand; this scan is the legacy fallback.
pub fn extracted_count(message: &str) -> u32 {
    EXTRACTED_COUNT_PATTERN
        .captures(message)
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse::<u32>().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_before_phrase() {
        assert_eq!(extracted_count("17 articles extracted from document"), 17);
        assert_eq!(extracted_count("File processed. 5 articles extracted."), 5);
    }

    #[test]
    fn test_no_phrase_yields_zero() {
        assert_eq!(extracted_count("no matches"), 0);
        assert_eq!(extracted_count(""), 0);
        assert_eq!(extracted_count("articles extracted"), 0);
    }

    #[test]
    fn test_unrelated_numbers_are_ignored() {
        assert_eq!(extracted_count("batch 9 done, 4 articles extracted"), 4);
        assert_eq!(extracted_count("3 pages scanned, nothing found"), 0);
    }

    #[test]
    fn test_overflowing_count_yields_zero() {
        assert_eq!(extracted_count("99999999999999999999 articles extracted"), 0);
    }

    #[test]
    fn test_first_occurrence_wins() {
        assert_eq!(
            extracted_count("2 articles extracted, then 7 articles extracted"),
            2
        );
    }
}

// Property tests using proptest
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: extracted_count never panics on arbitrary input
        #[test]
        fn never_panics(message in ".*") {
            let _ = extracted_count(&message);
        }

        /// Property: any count placed before the phrase is recovered intact
        #[test]
        fn embedded_count_is_recovered(count in 0u32..=u32::MAX, prefix in "[a-zA-Z ,.]{0,40}", suffix in "[a-zA-Z ,.]{0,40}") {
            let message = format!("{}{} articles extracted{}", prefix, count, suffix);
            prop_assert_eq!(extracted_count(&message), count);
        }

        /// Property: messages without the phrase always yield zero
        #[test]
        fn phrase_free_messages_yield_zero(message in "[a-zA-Z0-9 ]{0,80}") {
            prop_assume!(!message.contains("articles extracted"));
            prop_assert_eq!(extracted_count(&message), 0);
        }
    }
}
