use std::sync::LazyLock;

use regex::Regex;

use crate::shared::constants::{MIN_NUMERIC_ID_LEN, NATIONAL_ID_PATTERN, SENSITIVE_KEYWORDS};

static NATIONAL_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(NATIONAL_ID_PATTERN).expect("national ID pattern is valid"));

// Same Unicode `\d` class as the national ID pattern, so full-width digits
// count towards both rules.
static DIGIT_RUN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\d{{{MIN_NUMERIC_ID_LEN},}}$")).expect("digit run pattern is valid")
});

/// Why an OCR fragment was flagged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SensitivityRule {
    /// 12-digit national ID, or any all-digit string of 10+ characters.
    NumericId,
    /// Contains an ID-card label such as "DOB" or "Signature".
    Keyword,
}

/// Returns every rule the text satisfies, numeric rule first.
///
/// Each rule is evaluated independently; a fragment matching both yields
/// both, and the caller emits one region per entry.
pub fn matched_rules(text: &str) -> Vec<SensitivityRule> {
    let mut rules = Vec::with_capacity(2);
    if is_numeric_id(text) {
        rules.push(SensitivityRule::NumericId);
    }
    if contains_keyword(text) {
        rules.push(SensitivityRule::Keyword);
    }
    rules
}

/// Broad catch for ID-length numbers; accepts false positives on unrelated
/// long numbers such as phone or serial numbers.
pub fn is_numeric_id(text: &str) -> bool {
    if NATIONAL_ID_REGEX.is_match(text) {
        return true;
    }
    let stripped: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    DIGIT_RUN_REGEX.is_match(&stripped)
}

/// Case-insensitive substring match, not whole-word: "Membership Card"
/// matches on "card".
pub fn contains_keyword(text: &str) -> bool {
    let folded = text.to_lowercase();
    SENSITIVE_KEYWORDS.iter().any(|kw| folded.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::grouped_national_id("1234 5678 9012")]
    #[case::single_run_national_id("123456789012")]
    #[case::embedded_national_id("ID: 1234 5678 9012 (verified)")]
    #[case::eleven_digits_fallback("12345678901")]
    #[case::ten_digits_with_spaces("98 7654 3210")]
    #[case::thirteen_digits("1234567890123")]
    #[case::full_width_fallback("１２３４５６７８９０１")]
    #[case::full_width_national_id("１２３４５６７８９０１２")]
    #[case::full_width_ten_with_spaces("９８ ７６５４ ３２１０")]
    fn test_numeric_id_positive(#[case] text: &str) {
        assert!(is_numeric_id(text));
    }

    #[rstest]
    #[case::nine_digits("123456789")]
    #[case::short_with_letters("Room 42")]
    #[case::digits_and_letters("12345abcde67890")]
    #[case::dashed_phone("98-7654-3210")]
    #[case::empty("")]
    #[case::superscripts("¹²³⁴⁵⁶⁷⁸⁹⁰¹")]
    fn test_numeric_id_negative(#[case] text: &str) {
        assert!(!is_numeric_id(text));
    }

    #[test]
    fn test_eleven_digits_only_hits_fallback() {
        assert!(!NATIONAL_ID_REGEX.is_match("12345678901"));
        assert!(is_numeric_id("12345678901"));
    }

    #[rstest]
    #[case::signature_label("Signature:")]
    #[case::upper_case("AADHAAR")]
    #[case::substring("Membership Card")]
    #[case::date_of_birth("Date of Birth")]
    #[case::dob("DOB 01/02/1990")]
    #[case::number("Phone Number")]
    fn test_keyword_positive(#[case] text: &str) {
        assert!(contains_keyword(text));
    }

    #[rstest]
    #[case::greeting("Hello World")]
    #[case::brand("Samsonite")]
    #[case::empty("")]
    fn test_keyword_negative(#[case] text: &str) {
        assert!(!contains_keyword(text));
    }

    #[test]
    fn test_matched_rules_both() {
        assert_eq!(
            matched_rules("Card 123456789012"),
            vec![SensitivityRule::NumericId, SensitivityRule::Keyword]
        );
    }

    #[test]
    fn test_matched_rules_none() {
        assert!(matched_rules("Hello World").is_empty());
    }

    #[test]
    fn test_matched_rules_single() {
        assert_eq!(matched_rules("Signature:"), vec![SensitivityRule::Keyword]);
        assert_eq!(matched_rules("1234 5678 9012"), vec![SensitivityRule::NumericId]);
    }
}
