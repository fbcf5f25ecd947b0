//! Static vocabulary for title inference.
//!
//! Every field has a built-in default; an override file only needs the
//! fields it changes.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Error, Result};

/// One detectable language: a short code and the pattern recognising it as a
/// whole token (full names, abbreviations, `-subs` variants).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageSpec {
    pub code: String,
    pub pattern: String,
}

impl LanguageSpec {
    fn new(code: &str, pattern: &str) -> Self {
        Self {
            code: code.to_string(),
            pattern: pattern.to_string(),
        }
    }
}

/// Pattern fragments describing release/source tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceTags {
    /// Disc and resolution markers.
    pub pre: String,
    /// Movie sources (screeners, cams, disc rips).
    pub movies: String,
    /// Broadcast captures.
    pub tv: String,
    /// Codec and format names.
    pub format: String,
    /// Release descriptors, only meaningful next to a movie or tv source.
    pub extra: String,
}

impl Default for SourceTags {
    fn default() -> Self {
        Self {
            pre: r"\d*[\W_]*(cd|dvd)[\W_]*\d*|pal|ntsc|(480|576|720|1080)[pi]".into(),
            movies: r"blu[\W_]*ray|md|screener|ts|teaser|cam|r5|(bd|br|dvd|web|vod|dtt)rip|dvd[\W_]*(r|rip|scr)?|dvd\w*|(bd|br)[\W_]*scr".into(),
            tv: r"[hp]dtv|stv|tv[\W_]?rip|dvdrip".into(),
            format: r"ac3|xvid|divx|hd|[xh]264|rmvb".into(),
            extra: r"ws|limited|final|proper|multi|repack([\W_]*\dcd)?|ld|hd".into(),
        }
    }
}

/// Title inference configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleConfig {
    /// Detection order is list order.
    pub languages: Vec<LanguageSpec>,
    /// Reported when no language is detected; dropped once another one is.
    pub default_language: String,
    /// Stop words ignored when matching titles.
    pub junk_words: Vec<String>,
    pub sources: SourceTags,
    /// Lowest number accepted as a release year.
    pub min_year: i32,
    /// Query length (non-junk characters) from which the automatic search
    /// mode switches to all-words matching.
    pub auto_mode_min_chars: usize,
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self {
            languages: vec![
                LanguageSpec::new("en", r"eng?(lish)?([\W_]*subs?(titles)?)?"),
                LanguageSpec::new(
                    "fr",
                    r"(true|subs?[\W]?)?fr(e|ench)?([\W_]*subs?(titles)?)?|vostf?r?|vf",
                ),
                LanguageSpec::new("sp", r"(sub)?esp|spa(nish)?([\W_]*subs?(titles)?)?"),
                LanguageSpec::new("ge", r"ger(man)?([\W_]*subs?(titles)?)?"),
                LanguageSpec::new("it", r"ita(liano?)?([\W_]*subs?(titles)?)?"),
                LanguageSpec::new("du", r"dutch([\W_]*subs?(titles)?)?"),
                LanguageSpec::new("nl", r"nl([\W_]*subs?(titles)?)?"),
                LanguageSpec::new("sw", r"swe([\W_]*subs?(titles)?)?"),
                LanguageSpec::new("ar", r"(subs?)?arab(ic)?([\W_]*subs?(titles)?)?"),
            ],
            default_language: "en".into(),
            junk_words: ["the", "a", "and", "s", "le", "la", "un", "une", "us"]
                .into_iter()
                .map(String::from)
                .collect(),
            sources: SourceTags::default(),
            min_year: 1950,
            auto_mode_min_chars: 8,
        }
    }
}

impl TitleConfig {
    /// Load a JSON override file. Missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.languages.is_empty() {
            return Err(Error::Config("at least one language is required".into()));
        }
        if self.default_language.is_empty() {
            return Err(Error::Config("default_language must not be empty".into()));
        }
        if !self
            .languages
            .iter()
            .any(|l| l.code == self.default_language)
        {
            return Err(Error::Config(format!(
                "default_language `{}` is not among the configured languages",
                self.default_language
            )));
        }
        if let Some(l) = self.languages.iter().find(|l| l.pattern.is_empty()) {
            return Err(Error::Config(format!("language `{}` has an empty pattern", l.code)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = TitleConfig::default();
        config.validate().unwrap();
        assert_eq!(config.languages[0].code, "en");
        assert_eq!(config.junk_words.len(), 9);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "junk_words": ["the"], "min_year": 1900 }}"#).unwrap();

        let config = TitleConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.junk_words, vec!["the".to_string()]);
        assert_eq!(config.min_year, 1900);
        assert_eq!(config.default_language, "en");
        assert_eq!(config.sources, SourceTags::default());
    }

    #[test]
    fn unknown_default_language_rejected() {
        let config = TitleConfig {
            default_language: "jp".into(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.code(), "invalid_config");
    }

    #[test]
    fn empty_language_list_rejected() {
        let config = TitleConfig {
            languages: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
