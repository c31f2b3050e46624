//! Multilingual heading pattern registry.
//!
//! Maps a language code to an ordered list of regular expressions that mark
//! heading-like lines independent of font. The registry is built once per
//! run and shared read-only between workers.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::HeadingLevel;

/// Language used when a requested code is not registered.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Built-in `languages.json`.
const BUILTIN_LANGUAGES: &str = include_str!("../../assets/languages.json");

/// Leading section number such as `2`, `2.1` or `３．２`.
fn numbering_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\p{Nd}+(?:[.．]\p{Nd}+)*").expect("valid numbering regex"))
}

/// Depth of the first section number in `text` (`2` is 1, `2.1` is 2).
pub fn numbering_depth(text: &str) -> Option<usize> {
    numbering_regex()
        .find(text)
        .map(|m| m.as_str().split(['.', '．']).count())
}

#[derive(Debug, Deserialize)]
struct LanguageEntry {
    #[serde(default)]
    heading_patterns: Vec<PatternEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PatternEntry {
    Plain(String),
    Leveled {
        pattern: String,
        #[serde(default)]
        level: Option<String>,
    },
}

/// A compiled heading pattern.
#[derive(Debug, Clone)]
pub struct HeadingPattern {
    regex: Regex,
    level: Option<HeadingLevel>,
}

impl HeadingPattern {
    /// Compile a pattern with an optional explicit level.
    pub fn new(language: &str, pattern: &str, level: Option<HeadingLevel>) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|source| Error::InvalidPattern {
            language: language.to_string(),
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { regex, level })
    }

    /// The pattern source.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Level implied by this pattern for `text`, or `None` if it does not match.
    ///
    /// The match must start at the beginning of the text. Without an explicit
    /// level, the depth of the matched section number decides; a match with
    /// no number is top level.
    pub fn level_for(&self, text: &str) -> Option<HeadingLevel> {
        let m = self.regex.find(text)?;
        if m.start() != 0 {
            return None;
        }
        Some(self.level.unwrap_or_else(|| {
            HeadingLevel::from_depth(numbering_depth(m.as_str()).unwrap_or(1))
        }))
    }
}

/// Immutable mapping from language code to heading patterns.
#[derive(Debug, Clone, Default)]
pub struct PatternRegistry {
    languages: BTreeMap<String, Vec<HeadingPattern>>,
}

impl PatternRegistry {
    /// Registry compiled from the bundled `languages.json`.
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_LANGUAGES)
    }

    /// Parse a `languages.json` document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: BTreeMap<String, LanguageEntry> = serde_json::from_str(json)?;
        let mut languages = BTreeMap::new();

        for (code, entry) in entries {
            let code = code.trim().to_lowercase();
            let mut patterns = Vec::with_capacity(entry.heading_patterns.len());
            for item in entry.heading_patterns {
                let (pattern, level) = match item {
                    PatternEntry::Plain(pattern) => (pattern, None),
                    PatternEntry::Leveled { pattern, level } => {
                        let level = match level {
                            Some(name) => Some(HeadingLevel::parse(&name).ok_or_else(|| {
                                Error::Config(format!(
                                    "language '{}': invalid heading level '{}'",
                                    code, name
                                ))
                            })?),
                            None => None,
                        };
                        (pattern, level)
                    }
                };
                patterns.push(HeadingPattern::new(&code, &pattern, level)?);
            }
            languages.insert(code, patterns);
        }

        Ok(Self { languages })
    }

    /// Load a `languages.json` file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Add or replace languages from `other`.
    pub fn extend(mut self, other: PatternRegistry) -> Self {
        self.languages.extend(other.languages);
        self
    }

    /// Registered language codes, sorted.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    /// Whether `code` (or its primary subtag) is registered.
    pub fn contains(&self, code: &str) -> bool {
        self.lookup(code).is_some()
    }

    /// Language code actually used for `code` after fallback.
    pub fn resolve<'a>(&'a self, code: &'a str) -> &'a str {
        match self.lookup(code) {
            Some((resolved, _)) => resolved,
            None => DEFAULT_LANGUAGE,
        }
    }

    /// Patterns for `code`, falling back to the default language.
    pub fn patterns(&self, code: &str) -> &[HeadingPattern] {
        self.lookup(code)
            .or_else(|| self.lookup(DEFAULT_LANGUAGE))
            .map(|(_, patterns)| patterns.as_slice())
            .unwrap_or(&[])
    }

    /// Level of the first pattern matching `text`.
    pub fn match_level(&self, code: &str, text: &str) -> Option<HeadingLevel> {
        first_match(self.patterns(code), text)
    }

    fn lookup(&self, code: &str) -> Option<(&str, &Vec<HeadingPattern>)> {
        let code = code.trim().to_lowercase();
        let primary = code.split(['-', '_']).next().unwrap_or_default().to_string();
        self.languages
            .get_key_value(&code)
            .or_else(|| self.languages.get_key_value(&primary))
            .map(|(k, v)| (k.as_str(), v))
    }
}

/// Level of the first pattern in list order that matches `text`.
pub fn first_match(patterns: &[HeadingPattern], text: &str) -> Option<HeadingLevel> {
    let text = text.trim();
    patterns.iter().find_map(|p| p.level_for(text))
}
