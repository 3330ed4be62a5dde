/*!
 * Tests for language utility functions
 */

use anyhow::Result;
use subcanon::language_utils::{
    LanguageCodeType, get_language_name, is_known_language, primary_subtag, to_bcp47,
    validate_language_code,
};

/// Test validation of language codes
#[test]
fn test_validate_language_code_withValidCodes_shouldReturnCorrectType() -> Result<()> {
    assert_eq!(validate_language_code("en")?, LanguageCodeType::Part1);
    assert_eq!(validate_language_code(" FR ")?, LanguageCodeType::Part1);
    assert_eq!(validate_language_code("pt-BR")?, LanguageCodeType::Part1);
    assert_eq!(validate_language_code("eng")?, LanguageCodeType::Part3);
    assert_eq!(validate_language_code("zh_Hant-TW")?, LanguageCodeType::Part1);
    Ok(())
}

#[test]
fn test_validate_language_code_withInvalidCodes_shouldFail() {
    assert!(validate_language_code("zz").is_err());
    assert!(validate_language_code("123").is_err());
    assert!(validate_language_code("e").is_err());
    assert!(validate_language_code("").is_err());
    assert!(!is_known_language("q"));
    assert!(is_known_language("de"));
}

#[test]
fn test_primary_subtag_withDialects_shouldReturnFirstPart() {
    assert_eq!(primary_subtag("en-US"), "en");
    assert_eq!(primary_subtag("ug_Arab-CN"), "ug");
    assert_eq!(primary_subtag(" fr "), "fr");
}

#[test]
fn test_to_bcp47_withDialects_shouldUppercaseDialect() -> Result<()> {
    assert_eq!(to_bcp47("en")?, "en");
    assert_eq!(to_bcp47("en-us")?, "en-US");
    assert_eq!(to_bcp47("ug_Arab-cn")?, "ug_Arab-CN");
    assert!(to_bcp47("").is_err());
    assert!(to_bcp47("not a code").is_err());
    Ok(())
}

#[test]
fn test_get_language_name_withKnownCodes_shouldReturnEnglishName() {
    assert_eq!(get_language_name("en").as_deref(), Some("English"));
    assert_eq!(get_language_name("fra").as_deref(), Some("French"));
    assert_eq!(get_language_name("de-AT").as_deref(), Some("German"));
    assert!(get_language_name("zz").is_none());
}
