//! Structured record inferred from a release filename.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

use crate::episode::extract_episode;
use crate::lang::{drop_default, extract_languages};
use crate::normalize::{level, normalize, year_of};
use crate::rip::extract_rip;
use crate::vocab::Vocabulary;

// "artist - title" or "NN - artist - title"
static RE_AUDIO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^((.*?)[\W_]*-[\W_]*(.*)|(\d{2,3})[\W_]*-[\W_]*(.*?)[\W_]*-[\W_]*(.*))$",
    )
    .unwrap()
});

/// Everything inferred from one raw title. Immutable once built; a different
/// reading means building a new record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleRecord {
    pub raw: String,
    pub full_name: String,
    pub name: String,
    pub display_name: String,
    pub rip: String,
    pub date: Option<i32>,
    pub languages: Vec<String>,
    pub season: String,
    pub episode: String,
    pub episode_alt: String,
    pub artist: String,
    pub album: String,
    pub track_number: String,
    pub track_title: String,
}

impl TitleRecord {
    /// Infer a record with the built-in vocabulary.
    pub fn parse(raw: &str) -> Self {
        Self::parse_with(Vocabulary::global(), raw, &[])
    }

    /// Infer a record from `raw`, consulting `alternates` (other names of the
    /// same item) for stronger evidence.
    pub fn parse_with(vocab: &Vocabulary, raw: &str, alternates: &[&str]) -> Self {
        let mut record = Self::infer(vocab, raw);
        for alt in alternates {
            let alt = Self::infer(vocab, alt).finish(vocab);
            match record.merge_alternate(alt) {
                Merged::Adopted(r) => {
                    record = r;
                    break;
                }
                Merged::Kept(r) => record = r,
            }
        }
        record.finish(vocab)
    }

    fn infer(vocab: &Vocabulary, raw: &str) -> Self {
        let mut record = Self {
            raw: raw.to_string(),
            full_name: normalize(vocab, raw, level::YEARS),
            rip: extract_rip(vocab, raw),
            date: year_of(vocab, raw),
            ..Default::default()
        };

        match extract_episode(vocab, raw) {
            Some(ep) => {
                record.name = ep.name;
                record.season = ep.season;
                record.episode = ep.episode;
                record.episode_alt = ep.episode_alt;
                if ep.trailing.len() > record.rip.len() {
                    record.rip = ep.trailing;
                }
            }
            None => record.name = record.full_name.clone(),
        }

        // No strong episode signal: also drop a trailing disambiguating year
        if record.season.is_empty() && record.episode.len() < 2 {
            record.full_name = normalize(vocab, raw, level::LAST_YEAR);
        }

        if let Some(caps) = RE_AUDIO.captures(&normalize(vocab, raw, level::CHARS)) {
            let group = |i: usize| caps.get(i).map_or("", |m| m.as_str());
            record.artist = normalize(vocab, group(2), level::YEARS);
            record.album = normalize(vocab, group(3), level::YEARS);
            record.track_number = group(4).to_string();
            record.track_title = normalize(vocab, group(6), level::YEARS);
            if record.artist.is_empty() {
                record.artist = normalize(vocab, group(5), level::YEARS);
            }
        }

        let lang_source = if record.rip.is_empty() {
            raw
        } else {
            record.rip.as_str()
        };
        record.languages = extract_languages(vocab, lang_source);
        record
    }

    /// Compare against an alternate reading of the same item. A strictly
    /// longer rip is stronger evidence and replaces the structural fields;
    /// otherwise only the alternate's languages are merged in.
    fn merge_alternate(self, alt: Self) -> Merged {
        if alt.rip.len() > self.rip.len() {
            debug!(raw = %self.raw, alternate = %alt.raw, "adopting alternate title");
            return Merged::Adopted(Self {
                full_name: alt.full_name,
                name: alt.name,
                season: alt.season,
                episode: alt.episode,
                episode_alt: alt.episode_alt,
                date: alt.date,
                rip: alt.rip,
                ..self
            });
        }

        let mut languages = self.languages;
        for lang in alt.languages {
            if !languages.contains(&lang) {
                languages.push(lang);
            }
        }
        Merged::Kept(Self { languages, ..self })
    }

    /// Apply the language, absolute-numbering and display rules.
    fn finish(mut self, vocab: &Vocabulary) -> Self {
        drop_default(vocab, &mut self.languages);

        // Absolute (anime-style) numbering unless this is a tv capture
        if !self.episode_alt.is_empty() && !vocab.is_tv_source(&self.rip) {
            self.season.clear();
            self.episode = self.episode_alt.clone();
        }

        self.display_name = if self.episode.is_empty() {
            self.full_name.clone()
        } else {
            let season = if self.season.is_empty() {
                String::new()
            } else {
                format!("{}x", self.season)
            };
            format!("{} {}{}", self.name, season, self.episode)
        };

        debug!(
            raw = %self.raw,
            display_name = %self.display_name,
            rip = %self.rip,
            languages = ?self.languages,
            "inferred title"
        );
        self
    }

    /// The title words used for search: `name` qualified with season and
    /// episode when an episode is known, else the raw input.
    pub fn search_title(&self) -> String {
        if self.episode.is_empty() {
            return self.raw.clone();
        }
        let season = if self.season.is_empty() {
            String::new()
        } else {
            format!("{} ", self.season)
        };
        format!("{} {}{}", self.name, season, self.episode)
    }

    pub fn is_episode(&self) -> bool {
        !self.episode.is_empty()
    }
}

enum Merged {
    Adopted(TitleRecord),
    Kept(TitleRecord),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tv_episode() {
        let t = TitleRecord::parse("show name s03e02 HDTV XviD TEAM");
        assert_eq!(t.name, "show name");
        assert_eq!(t.season, "3");
        assert_eq!(t.episode, "02");
        assert_eq!(t.rip, " HDTV XviD TEAM");
        assert_eq!(t.display_name, "show name 3x02");
        assert_eq!(t.languages, vec!["en"]);
    }

    #[test]
    fn absolute_numbering_without_tv_source() {
        let t = TitleRecord::parse("show name 302");
        assert_eq!(t.season, "");
        assert_eq!(t.episode, "302");
        assert_eq!(t.episode_alt, "302");
        assert_eq!(t.display_name, "show name 302");
    }

    #[test]
    fn three_digit_marker_with_tv_source_keeps_season() {
        let t = TitleRecord::parse("show name 302 HDTV XviD TEAM");
        assert_eq!(t.season, "3");
        assert_eq!(t.episode, "02");
        assert_eq!(t.episode_alt, "302");
        assert_eq!(t.rip, " HDTV XviD TEAM");
        assert_eq!(t.display_name, "show name 3x02");
    }

    #[test]
    fn movie_with_year() {
        let t = TitleRecord::parse("movie name 2012 DVDrip XviD TEAM");
        assert_eq!(t.full_name, "movie name");
        assert_eq!(t.name, "movie name");
        assert_eq!(t.date, Some(2012));
        assert!(t.episode.is_empty());
        assert_eq!(t.display_name, "movie name");
    }

    #[test]
    fn audio_artist_title() {
        let t = TitleRecord::parse("Artist_Name - Album_Name");
        assert_eq!(t.artist, "artist name");
        assert_eq!(t.album, "album name");
        assert_eq!(t.track_number, "");
    }

    #[test]
    fn no_dash_no_audio() {
        let t = TitleRecord::parse("show name s01e01");
        assert_eq!(t.artist, "");
        assert_eq!(t.album, "");
    }

    #[test]
    fn empty_input_is_total() {
        let t = TitleRecord::parse("");
        assert_eq!(t.full_name, "");
        assert_eq!(t.display_name, "");
        assert_eq!(t.languages, vec!["en"]);
        assert_eq!(t.date, None);
    }

    #[test]
    fn alternate_with_longer_rip_is_adopted() {
        let vocab = Vocabulary::global();
        let t = TitleRecord::parse_with(
            vocab,
            "show name",
            &["Show.Name.S02E05.HDTV.XviD-TEAM", "show name s09e09 720p HDTV x264 FRENCH TEAM"],
        );
        assert_eq!(t.raw, "show name");
        assert_eq!(t.season, "2");
        assert_eq!(t.episode, "05");
        assert_eq!(t.rip, ".HDTV.XviD-TEAM");
        assert_eq!(t.display_name, "show name 2x05");
    }

    #[test]
    fn alternate_with_shorter_rip_only_adds_languages() {
        let vocab = Vocabulary::global();
        let t = TitleRecord::parse_with(
            vocab,
            "movie name DVDrip XviD TEAM",
            &["movie name FRENCH"],
        );
        assert_eq!(t.rip, " DVDrip XviD TEAM");
        assert_eq!(t.name, "movie name");
        assert_eq!(t.languages, vec!["fr"]);
    }

    #[test]
    fn search_title_is_episode_qualified() {
        assert_eq!(TitleRecord::parse("show name 1x23").search_title(), "show name 1 23");
        assert_eq!(TitleRecord::parse("anime name 123").search_title(), "anime name 123");
        assert_eq!(TitleRecord::parse("My Movie").search_title(), "My Movie");
    }

    #[test]
    fn serializes_to_json() {
        let t = TitleRecord::parse("show name s03e02");
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["season"], "3");
        assert_eq!(json["episode"], "02");
        assert_eq!(json["date"], serde_json::Value::Null);
    }
}
