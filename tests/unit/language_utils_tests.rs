/*!
 * Tests for language utility functions
 */

use doclingo::language_utils::{
    LanguageCodeType, get_language_name, is_auto_detect, language_codes_match, normalize_to_part1_or_part2t,
    normalize_to_part2t, to_service_code, validate_language_code,
};

/// Test validation of language codes
#[test]
fn test_validate_language_code_withValidCodes_shouldReturnCorrectType() {
    assert!(matches!(validate_language_code("en").unwrap(), LanguageCodeType::Part1));
    assert!(matches!(validate_language_code("fra").unwrap(), LanguageCodeType::Part2T));
    assert!(matches!(validate_language_code("ger").unwrap(), LanguageCodeType::Part2B));
    assert!(matches!(validate_language_code(" EN ").unwrap(), LanguageCodeType::Part1));
    assert!(matches!(validate_language_code("Auto").unwrap(), LanguageCodeType::Auto));

    assert!(validate_language_code("123").is_err());
    assert!(validate_language_code("e").is_err());
    assert!(validate_language_code("english").is_err());
}

#[test]
fn test_normalize_withValidCodes_shouldNormalizeCorrectly() {
    assert_eq!(normalize_to_part2t("en").unwrap(), "eng");
    assert_eq!(normalize_to_part2t("fre").unwrap(), "fra");
    assert_eq!(normalize_to_part2t(" DE ").unwrap(), "deu");

    assert_eq!(normalize_to_part1_or_part2t("eng").unwrap(), "en");
    assert_eq!(normalize_to_part1_or_part2t("ger").unwrap(), "de");
    assert!(normalize_to_part2t("auto").is_err());
}

#[test]
fn test_to_service_code_shouldPreferTwoLetterCodes() {
    assert_eq!(to_service_code("fra").unwrap(), "fr");
    assert_eq!(to_service_code("AUTO").unwrap(), "auto");
    assert!(to_service_code("??").is_err());
}

/// Test matching of different language code formats
#[test]
fn test_language_codes_match_withMatchingCodes_shouldReturnTrue() {
    assert!(language_codes_match("en", "eng"));
    assert!(language_codes_match("fr", "fre"));
    assert!(language_codes_match("fra", "fre"));
    assert!(!language_codes_match("en", "fra"));
    assert!(!language_codes_match("auto", "auto"));
}

#[test]
fn test_get_language_name_shouldResolveNames() {
    assert_eq!(get_language_name("en").unwrap(), "English");
    assert_eq!(get_language_name("deu").unwrap(), "German");
    assert_eq!(get_language_name("auto").unwrap(), "Auto-detect");
    assert!(get_language_name("").is_err());
    assert!(is_auto_detect(" auto "));
    assert!(!is_auto_detect("en"));
}
