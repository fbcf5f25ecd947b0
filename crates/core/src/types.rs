use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::Error;

/// Coarse media kind of a file, as reported by a classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Audio,
    Video,
    Image,
    Archive,
    Other,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Image => "image",
            Self::Archive => "archive",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How much extraneous text a synthesized search pattern tolerates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchMode {
    /// Only junk words and bracketed groups around and between the title words.
    #[default]
    Exact,
    /// Title words in sequence, anything before and after.
    AllWords,
    /// Title words in order, anything anywhere.
    Lazy,
}

impl SearchMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::AllWords => "all-words",
            Self::Lazy => "lazy",
        }
    }
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "all-words" | "all" => Ok(Self::AllWords),
            "lazy" => Ok(Self::Lazy),
            other => Err(Error::Config(format!("unknown search mode: {other}"))),
        }
    }
}

/// Category hint passed to the search synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Tv,
    Movies,
    Anime,
    Music,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tv => "tv",
            Self::Movies => "movies",
            Self::Anime => "anime",
            Self::Music => "music",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tv" => Ok(Self::Tv),
            "movies" | "movie" => Ok(Self::Movies),
            "anime" => Ok(Self::Anime),
            "music" => Ok(Self::Music),
            other => Err(Error::Config(format!("unknown category: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_mode_round_trips_through_str() {
        for mode in [SearchMode::Exact, SearchMode::AllWords, SearchMode::Lazy] {
            assert_eq!(mode.as_str().parse::<SearchMode>().unwrap(), mode);
        }
        assert_eq!("ALL".parse::<SearchMode>().unwrap(), SearchMode::AllWords);
        assert!("fuzzy".parse::<SearchMode>().is_err());
    }

    #[test]
    fn category_parses_aliases() {
        assert_eq!("TV".parse::<Category>().unwrap(), Category::Tv);
        assert_eq!("movie".parse::<Category>().unwrap(), Category::Movies);
        assert!("podcast".parse::<Category>().is_err());
    }

    #[test]
    fn media_kind_serializes_snake_case() {
        let json = serde_json::to_string(&MediaKind::Archive).unwrap();
        assert_eq!(json, "\"archive\"");
    }
}
