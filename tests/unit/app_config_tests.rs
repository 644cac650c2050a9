/*!
 * Tests for configuration loading, defaults, and validation
 */

use chapterize::app_config::{Config, LogLevel};
use chapterize::language_profiles::ModelSize;

#[test]
fn test_default_config_shouldUseExpectedValues() {
    let config = Config::default();

    assert_eq!(config.default_language, "en-us");
    assert_eq!(config.default_model_size, ModelSize::Small);
    assert_eq!(config.ffmpeg_path, "ffmpeg");
    assert_eq!(config.ffprobe_path, "ffprobe");
    assert!(!config.generate_cue_file);
    assert_eq!(config.cue_path, None);
    assert_eq!(config.log_level, LogLevel::Info);
}

#[test]
fn test_default_config_shouldValidate() {
    assert!(Config::default().validate().is_ok());
}

#[test]
fn test_config_jsonRoundTrip_shouldPreserveValues() {
    let mut config = Config::default();
    config.default_language = "de".to_string();
    config.default_model_size = ModelSize::Large;
    config.generate_cue_file = true;
    config.log_level = LogLevel::Debug;

    let json = serde_json::to_string_pretty(&config).unwrap();
    let reread: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(reread.default_language, "de");
    assert_eq!(reread.default_model_size, ModelSize::Large);
    assert!(reread.generate_cue_file);
    assert_eq!(reread.log_level, LogLevel::Debug);
}

/// Missing fields fall back to defaults rather than failing to parse
#[test]
fn test_config_fromPartialJson_shouldApplyDefaults() {
    let config: Config = serde_json::from_str(r#"{ "default_language": "German" }"#).unwrap();

    assert_eq!(config.default_language, "German");
    assert_eq!(config.default_model_size, ModelSize::Small);
    assert_eq!(config.ffmpeg_path, "ffmpeg");
}

#[test]
fn test_validate_withUnknownLanguage_shouldFail() {
    let mut config = Config::default();
    config.default_language = "klingon".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withFriendlyLanguageName_shouldPass() {
    let mut config = Config::default();
    config.default_language = "German".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withEmptyFfmpegPath_shouldFail() {
    let mut config = Config::default();
    config.ffmpeg_path = String::new();
    assert!(config.validate().is_err());
}

/// An explicit transcoder path must exist; bare names defer to PATH
#[test]
fn test_validate_withMissingExplicitFfmpegPath_shouldFail() {
    let mut config = Config::default();
    config.ffmpeg_path = "/nonexistent/path/to/ffmpeg".to_string();
    assert!(config.validate().is_err());
}
