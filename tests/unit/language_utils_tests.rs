/*!
 * Tests for ISO language code utilities
 */

use vttai::language_utils::{
    get_language_name, language_codes_match, normalize_to_part2t, validate_language_code, LanguageCodeType,
};

#[test]
fn test_validate_language_code_withEachCodeType_shouldDetectType() {
    assert_eq!(validate_language_code("fr").unwrap(), LanguageCodeType::Part1);
    assert_eq!(validate_language_code("fra").unwrap(), LanguageCodeType::Part2T);
    assert_eq!(validate_language_code("fre").unwrap(), LanguageCodeType::Part2B);
    assert_eq!(validate_language_code(" EN ").unwrap(), LanguageCodeType::Part1);
    assert!(validate_language_code("xx").is_err());
    assert!(validate_language_code("english").is_err());
}

#[test]
fn test_normalize_to_part2t_withVariousCodes_shouldReturnTerminologicCode() {
    assert_eq!(normalize_to_part2t("en").unwrap(), "eng");
    assert_eq!(normalize_to_part2t("ger").unwrap(), "deu");
    assert_eq!(normalize_to_part2t("spa").unwrap(), "spa");
    assert!(normalize_to_part2t("").is_err());
}

#[test]
fn test_language_codes_match_withEquivalentCodes_shouldMatch() {
    assert!(language_codes_match("de", "ger"));
    assert!(language_codes_match("fr", "fra"));
    assert!(!language_codes_match("fr", "de"));
    assert!(!language_codes_match("fr", "zz"));
}

#[test]
fn test_get_language_name_withCodes_shouldReturnEnglishName() {
    assert_eq!(get_language_name("fr").unwrap(), "French");
    assert_eq!(get_language_name("deu").unwrap(), "German");
    assert!(get_language_name("123").is_err());
}
