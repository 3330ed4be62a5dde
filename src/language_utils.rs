use anyhow::{Result, anyhow};
use isolang::Language;
use once_cell::sync::Lazy;
use regex::Regex;

/// Language utilities for subtitle language codes
///
/// Tracks carry whatever code the caller gives them. These helpers validate
/// the primary subtag against ISO 639 and normalize codes to the BCP-47
/// casing written into `xml:lang` attributes.
// @const: Primary subtag, optional dialect subtag, optional remainder
static LANG_DIALECT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9_]{2,13})(-[A-Za-z0-9_]{2,8})?(-[A-Za-z0-9_]*)?$")
        .expect("Invalid language code regex")
});

/// Language code type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-3 (3-letter) code
    Part3,
}

/// Validate the primary subtag of a language code against ISO 639-1 or 639-3
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType> {
    let primary = primary_subtag(code).to_lowercase();

    match primary.len() {
        2 if Language::from_639_1(&primary).is_some() => Ok(LanguageCodeType::Part1),
        3 if Language::from_639_3(&primary).is_some() => Ok(LanguageCodeType::Part3),
        _ => Err(anyhow!("Invalid language code: {}", code)),
    }
}

/// Whether the primary subtag is a known ISO 639 language
pub fn is_known_language(code: &str) -> bool {
    validate_language_code(code).is_ok()
}

/// Primary subtag of a code such as `pt-br` or `zh_Hant-TW`
pub fn primary_subtag(code: &str) -> &str {
    let code = code.trim();
    code.split(['-', '_']).next().unwrap_or(code)
}

/// Uppercase the dialect subtag: `en-us` -> `en-US`, `ug_Arab-cn` -> `ug_Arab-CN`
pub fn to_bcp47(code: &str) -> Result<String> {
    let code = code.trim();
    if code.is_empty() {
        return Err(anyhow!("No language code was given"));
    }
    let caps = LANG_DIALECT_REGEX
        .captures(code)
        .ok_or_else(|| anyhow!("{} does not look like a language code", code))?;

    Ok(format!(
        "{}{}{}",
        &caps[1],
        caps.get(2).map_or(String::new(), |m| m.as_str().to_uppercase()),
        caps.get(3).map_or("", |m| m.as_str())
    ))
}

/// English name of the language, when the primary subtag is known
pub fn get_language_name(code: &str) -> Option<String> {
    let primary = primary_subtag(code).to_lowercase();
    let language = match primary.len() {
        2 => Language::from_639_1(&primary),
        3 => Language::from_639_3(&primary),
        _ => None,
    }?;
    Some(language.to_name().to_string())
}
