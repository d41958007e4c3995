use anyhow::{Result, anyhow};

/// Language utilities for the supported translation languages
///
/// The product works with a closed set of languages rather than the full
/// ISO table; unknown codes are rejected during configuration validation.
/// Supported languages, code to native display name, in menu order
pub const LANGUAGES: &[(&str, &str)] = &[
    ("zh", "中文 (简体)"),
    ("zh-tw", "中文 (繁体)"),
    ("en", "English"),
    ("ja", "日本語"),
    ("ko", "한국어"),
    ("fr", "Français"),
    ("de", "Deutsch"),
    ("es", "Español"),
    ("it", "Italiano"),
    ("pt", "Português"),
    ("ru", "Русский"),
    ("ar", "العربية"),
    ("hi", "हिन्दी"),
    ("th", "ไทย"),
    ("vi", "Tiếng Việt"),
];

/// Normalize a language code for lookup
pub fn normalize_code(code: &str) -> String {
    code.trim().to_lowercase()
}

/// Whether a language code is in the supported set
pub fn is_supported(code: &str) -> bool {
    let normalized = normalize_code(code);
    LANGUAGES.iter().any(|(c, _)| *c == normalized)
}

/// Native display name for a supported language code
pub fn get_language_name(code: &str) -> Result<&'static str> {
    let normalized = normalize_code(code);
    LANGUAGES
        .iter()
        .find(|(c, _)| *c == normalized)
        .map(|(_, name)| *name)
        .ok_or_else(|| anyhow!("Unsupported language code: {}", code))
}

/// All supported language codes in menu order
pub fn language_codes() -> Vec<&'static str> {
    LANGUAGES.iter().map(|(code, _)| *code).collect()
}
