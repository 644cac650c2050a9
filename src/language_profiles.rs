use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

// @module: Per-language marker profiles and recognizer model catalog

/// Marker phrases and suppression lists for one language.
///
/// Detection is case-sensitive substring containment over whole transcript
/// lines, so every phrase here is stored lowercase to match the lowercased
/// recognizer output. Profiles are immutable and registered once at startup;
/// a language without a profile cannot be chapterized.
#[derive(Debug, Clone)]
pub struct LanguageProfile {
    /// Language code the profile is registered under
    pub code: &'static str,

    /// Marker that labels the opening section
    pub prologue_marker: &'static str,

    /// Marker that labels numbered chapters
    pub chapter_marker: &'static str,

    /// Marker that labels the closing section
    pub epilogue_marker: &'static str,

    /// Phrases that look like markers but must not open a chapter
    pub excluded_phrases: &'static [&'static str],

    /// Soft section headers matched in the current cue when experimental
    /// detection is enabled ("preface", "foreword", ...)
    pub experimental_markers: &'static [&'static str],
}

impl LanguageProfile {
    /// The ordered chapter-marker set used for boundary detection
    pub fn chapter_markers(&self) -> [&'static str; 3] {
        [self.prologue_marker, self.chapter_marker, self.epilogue_marker]
    }
}

// False positives collected from real transcripts; grows over time
const EXCLUDED_PHRASES_ENGLISH: &[&str] = &[
    "chapter and verse",
    "chapters",
    "this chapter",
    "that chapter",
    "chapter of",
    "in chapter",
    "and chapter",
    "chapter heading",
    "chapter head",
    "chapter house",
    "chapter book",
    "a chapter",
    "chapter out",
    "chapter in",
    "particular chapter",
    "spicy chapter",
    "before chapter",
    "main chapter",
    "final chapter",
    "concluding chapter",
    "glorious chapter",
    "next chapter",
    "chapter asking",
    "matthew chapter",
    "forgotten chapter",
    "last chapter",
    "chapter room",
    "the chapter",
    "prologue to",
    "from prologue",
    "epilogue to",
    "from epilogue",
];

const EXCLUDED_PHRASES_GERMAN: &[&str] = &[
    "der kapitelsaal",
    "das schlusskapitel",
    "das hauptkapitel",
    "dieses kapitel",
    "die kapitelüberschrift",
    "ein kapitel",
];

const EXPERIMENTAL_MARKERS_ENGLISH: &[&str] =
    &["preface", "foreword", "introduction", "interlude", "afterword"];

const EXPERIMENTAL_MARKERS_GERMAN: &[&str] = &["vorwort", "einleitung", "zwischenspiel", "nachwort"];

static PROFILES: Lazy<HashMap<&'static str, LanguageProfile>> = Lazy::new(|| {
    let mut profiles = HashMap::new();
    profiles.insert(
        "en-us",
        LanguageProfile {
            code: "en-us",
            prologue_marker: "prologue",
            chapter_marker: "chapter",
            epilogue_marker: "epilogue",
            excluded_phrases: EXCLUDED_PHRASES_ENGLISH,
            experimental_markers: EXPERIMENTAL_MARKERS_ENGLISH,
        },
    );
    profiles.insert(
        "de",
        LanguageProfile {
            code: "de",
            prologue_marker: "prolog",
            chapter_marker: "kapitel",
            epilogue_marker: "epilog",
            excluded_phrases: EXCLUDED_PHRASES_GERMAN,
            experimental_markers: EXPERIMENTAL_MARKERS_GERMAN,
        },
    );
    profiles
});

/// Friendly language name to code mapping, accepted anywhere a code is
const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("English", "en-us"),
    ("English (US)", "en-us"),
    ("English US", "en-us"),
    ("German", "de"),
];

/// Look up the profile registered for a language code
pub fn profile_for(code: &str) -> Option<&'static LanguageProfile> {
    PROFILES.get(code)
}

/// Resolve user input (code or friendly name, any case) to a supported
/// language code. Unknown input is an error, never a silent fallback.
pub fn resolve_language(input: &str) -> Result<&'static str, ModelError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ModelError::UnsupportedLanguage(input.to_string()));
    }

    let lowered = trimmed.to_lowercase();
    if let Some(profile) = PROFILES.get(lowered.as_str()) {
        return Ok(profile.code);
    }

    LANGUAGE_NAMES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(trimmed))
        .map(|(_, code)| *code)
        .ok_or_else(|| ModelError::UnsupportedLanguage(input.to_string()))
}

/// Supported (name, code) pairs for the --list-languages display
pub fn supported_languages() -> &'static [(&'static str, &'static str)] {
    LANGUAGE_NAMES
}

/// Recognizer model size class
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelSize {
    #[default]
    Small,
    Large,
}

impl fmt::Display for ModelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSize::Small => write!(f, "small"),
            ModelSize::Large => write!(f, "large"),
        }
    }
}

impl FromStr for ModelSize {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "small" => Ok(ModelSize::Small),
            "large" => Ok(ModelSize::Large),
            _ => Err(anyhow!("Invalid model size: {} (expected small or large)", s)),
        }
    }
}

const MODEL_BASE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

/// One downloadable recognizer model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSpec {
    /// GGML model file name
    pub file_name: &'static str,

    /// Size class the file belongs to
    pub size: ModelSize,

    /// Language tag passed to the recognizer
    pub recognizer_language: &'static str,
}

impl ModelSpec {
    /// Full download URL for the model file
    pub fn download_url(&self) -> String {
        format!("{}/{}", MODEL_BASE_URL, self.file_name)
    }
}

/// Resolve the catalog model for a language/size pair.
///
/// English gets the dedicated `.en` models; other supported languages use the
/// multilingual files with an explicit recognizer language tag.
pub fn model_for(code: &str, size: ModelSize) -> Result<ModelSpec, ModelError> {
    let profile =
        profile_for(code).ok_or_else(|| ModelError::UnsupportedLanguage(code.to_string()))?;

    let spec = match (profile.code, size) {
        ("en-us", ModelSize::Small) => ModelSpec {
            file_name: "ggml-base.en.bin",
            size,
            recognizer_language: "en",
        },
        ("en-us", ModelSize::Large) => ModelSpec {
            file_name: "ggml-medium.en.bin",
            size,
            recognizer_language: "en",
        },
        ("de", ModelSize::Small) => ModelSpec {
            file_name: "ggml-base.bin",
            size,
            recognizer_language: "de",
        },
        ("de", ModelSize::Large) => ModelSpec {
            file_name: "ggml-medium.bin",
            size,
            recognizer_language: "de",
        },
        _ => {
            return Err(ModelError::UnsupportedSize {
                language: code.to_string(),
                size: size.to_string(),
            })
        }
    };

    Ok(spec)
}
