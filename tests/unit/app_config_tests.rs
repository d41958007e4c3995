/*!
 * Tests for application configuration functionality
 */

use doctrans::app_config::{Config, LogLevel};
use doctrans::providers::ProviderId;

use crate::common::create_temp_dir;

/// Test default configuration values
#[test]
fn test_defaultConfig_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.default_provider, ProviderId::OpenAi);
    assert_eq!(config.source_language, "zh");
    assert_eq!(config.target_language, "en");
    assert_eq!(config.max_workers, 4);
    assert_eq!(config.max_chunk_size, 1000);
    assert_eq!(config.output_directory, "");
    assert!(!config.keep_intermediate);
    assert_eq!(config.request_timeout_secs, 120);
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test configuration validation
#[test]
fn test_configValidation_withVariousConfigs_shouldValidateCorrectly() {
    // Start with a valid config
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    // Unknown source language
    config.source_language = "xyz".to_string();
    assert!(config.validate().is_err());
    config.source_language = "zh".to_string();

    // Empty target language
    config.target_language = String::new();
    assert!(config.validate().is_err());
    config.target_language = "en".to_string();

    // Identical languages
    config.target_language = "zh".to_string();
    assert!(config.validate().is_err());
    config.target_language = "en".to_string();

    // Zero worker count
    config.max_workers = 0;
    assert!(config.validate().is_err());
    config.max_workers = 4;

    // Zero chunk size
    config.max_chunk_size = 0;
    assert!(config.validate().is_err());
    config.max_chunk_size = 1000;

    // Zero timeout
    config.request_timeout_secs = 0;
    assert!(config.validate().is_err());
    config.request_timeout_secs = 120;

    assert!(config.validate().is_ok());
}

#[test]
fn test_configSaveLoad_withRoundTrip_shouldPreserveValues() {
    let temp_dir = create_temp_dir().unwrap();
    let path = temp_dir.path().join("config.json");

    let mut config = Config::default();
    config.default_provider = ProviderId::Gemini;
    config.target_language = "ja".to_string();
    config.keep_intermediate = true;
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.default_provider, ProviderId::Gemini);
    assert_eq!(loaded.target_language, "ja");
    assert!(loaded.keep_intermediate);
}

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaultConfig() {
    let temp_dir = create_temp_dir().unwrap();
    let path = temp_dir.path().join("nested").join("config.json");
    assert!(!path.exists());

    let config = Config::load_or_create(&path).unwrap();
    assert!(path.exists());
    assert_eq!(config.source_language, "zh");

    // A second call loads the file instead of rewriting it
    let again = Config::load_or_create(&path).unwrap();
    assert_eq!(again.target_language, config.target_language);
}

#[test]
fn test_configSerde_withPartialDocument_shouldFillDefaults() {
    let config: Config = serde_json::from_str(r#"{"target_language": "fr"}"#).unwrap();

    assert_eq!(config.target_language, "fr");
    assert_eq!(config.source_language, "zh");
    assert_eq!(config.max_workers, 4);
    assert_eq!(config.log_level, LogLevel::Info);
}

#[test]
fn test_logLevel_serde_shouldUseLowercaseNames() {
    let level: LogLevel = serde_json::from_str(r#""debug""#).unwrap();
    assert_eq!(level, LogLevel::Debug);
    assert_eq!(serde_json::to_string(&LogLevel::Warn).unwrap(), r#""warn""#);
}

#[test]
fn test_logLevel_intoLevelFilter_shouldMapAllVariants() {
    assert_eq!(log::LevelFilter::from(LogLevel::Error), log::LevelFilter::Error);
    assert_eq!(log::LevelFilter::from(LogLevel::Trace), log::LevelFilter::Trace);
}
