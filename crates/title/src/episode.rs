use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::normalize::{level, normalize};
use crate::vocab::Vocabulary;

/// Season/episode facts read from a title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpisodeMatch {
    /// Text before the marker, normalized to words.
    pub name: String,
    /// Leading zeros stripped; empty when the marker carries no season.
    pub season: String,
    /// Zero-padding kept as matched.
    pub episode: String,
    /// The whole marker when it is a bare number (absolute numbering).
    pub episode_alt: String,
    /// Raw text after the marker.
    pub trailing: String,
}

/// A marker shape. Group 1 always captures the whole marker token.
struct EpisodePattern {
    re: Regex,
    season_group: Option<usize>,
    episode_group: usize,
}

impl EpisodePattern {
    fn new(pattern: &str, season_group: Option<usize>, episode_group: usize) -> Self {
        Self {
            re: Regex::new(pattern).unwrap(),
            season_group,
            episode_group,
        }
    }
}

// Priority order: the first shape matching anywhere wins.
static EPISODE_PATTERNS: LazyLock<[EpisodePattern; 4]> = LazyLock::new(|| {
    [
        // s03e02, 3x02
        EpisodePattern::new(r"(?i)\b(s?([0-9]{1,2})[ex]([0-9]{2}))\b", Some(2), 3),
        // 302
        EpisodePattern::new(r"(?i)\b(([0-9]{1,2})([0-9]{2}))\b", Some(2), 3),
        // part 2
        EpisodePattern::new(r"(?i)\b(part[\W_]*([0-9]+))\b", None, 2),
        // trailing 02
        EpisodePattern::new(r"(?i)[^0-9]([0-9]{1,2})\b", None, 1),
    ]
});

/// Read season/episode facts from `text`.
///
/// Titles tagged with a movie source (and no tv source) are never episodes,
/// and a marker that reads as a year rejects the whole title.
pub fn extract_episode(vocab: &Vocabulary, text: &str) -> Option<EpisodeMatch> {
    if vocab.is_movie_source(text) && !vocab.is_tv_source(text) {
        return None;
    }

    // `\b` does not break on underscores
    let text = text.replace('_', " ");

    let (pattern, caps) = EPISODE_PATTERNS
        .iter()
        .find_map(|p| p.re.captures(&text).map(|c| (p, c)))?;

    let marker = caps.get(1)?.as_str();
    if vocab.is_year(marker) {
        debug!(text = %text, marker, "episode marker is a year");
        return None;
    }

    let (name, trailing) = text.split_once(marker)?;
    let season = pattern
        .season_group
        .and_then(|i| caps.get(i))
        .map_or("", |m| m.as_str().trim_start_matches('0'));
    let episode = caps.get(pattern.episode_group).map_or("", |m| m.as_str());
    let episode_alt = if marker.bytes().all(|b| b.is_ascii_digit()) {
        marker
    } else {
        ""
    };

    let res = EpisodeMatch {
        name: normalize(vocab, name, level::WORDS),
        season: season.to_string(),
        episode: episode.to_string(),
        episode_alt: episode_alt.to_string(),
        trailing: trailing.to_string(),
    };
    debug!(
        name = %res.name,
        season = %res.season,
        episode = %res.episode,
        episode_alt = %res.episode_alt,
        "matched episode marker"
    );
    Some(res)
}
