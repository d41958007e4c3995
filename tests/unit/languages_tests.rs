/*!
 * Tests for the supported language table
 */

use doctrans::languages::{LANGUAGES, get_language_name, is_supported, language_codes};

#[test]
fn test_getLanguageName_withKnownCodes_shouldReturnNativeNames() {
    assert_eq!(get_language_name("zh").unwrap(), "中文 (简体)");
    assert_eq!(get_language_name("en").unwrap(), "English");
    assert_eq!(get_language_name("ja").unwrap(), "日本語");
}

#[test]
fn test_getLanguageName_withUnknownCode_shouldFail() {
    assert!(get_language_name("xx").is_err());
    assert!(get_language_name("").is_err());
}

#[test]
fn test_getLanguageName_withMixedCaseAndWhitespace_shouldNormalize() {
    assert_eq!(get_language_name(" EN ").unwrap(), "English");
    assert_eq!(get_language_name("ZH-TW").unwrap(), "中文 (繁体)");
}

#[test]
fn test_isSupported_withTableCodes_shouldAcceptAll() {
    for (code, _) in LANGUAGES {
        assert!(is_supported(code), "{} should be supported", code);
    }
    assert!(!is_supported("eo"));
}

#[test]
fn test_languageCodes_shouldMatchTableOrder() {
    let codes = language_codes();
    assert_eq!(codes.len(), LANGUAGES.len());
    assert_eq!(codes[0], "zh");
    assert!(codes.contains(&"vi"));
}
