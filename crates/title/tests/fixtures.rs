//! Release-name tables covering inference and search end to end.

use reltitle_core::SearchMode;
use reltitle_title::{
    TitleMatcher, TitleRecord, Vocabulary, extract_episode, parse_size_mb, previous_episode,
};

const MOVIES: &[&str] = &[
    "movie name DVDrip XviD TEAM",
    "movie name BRRip XviD TEAM",
    "movie name 2012 DVDrip XviD TEAM",
    "movie name (2012) DVDrip",
    "movie name 2012 LIMITED BDRip XviD TEAM",
    "movie name LIMITED BDRip XviD TEAM",
    "4.44.Last.Day.On.Earth.2011.VODRiP.XViD.AC3-MAJESTiC",
    "movie name 312 LIMITED BDRip XviD TEAM",
    "11 flowers",
];

#[test]
fn movies_are_not_episodes() {
    let vocab = Vocabulary::global();
    for title in MOVIES {
        assert_eq!(extract_episode(vocab, title), None, "{title}");
    }
}

#[test]
fn movie_names() {
    let expected = [
        "movie name",
        "movie name",
        "movie name",
        "movie name",
        "movie name",
        "movie name",
        "4 44 last day on earth",
        "movie name 312",
        "11 flowers",
    ];
    for (title, name) in MOVIES.iter().zip(expected) {
        let t = TitleRecord::parse(title);
        assert_eq!(t.name, name, "{title}");
        assert_eq!(t.season, "", "{title}");
        assert_eq!(t.episode, "", "{title}");
    }
}

// (title, name, season, episode, episode_alt, trailing, record season, record episode)
const TV: &[(&str, &str, &str, &str, &str, &str, &str, &str)] = &[
    ("show name s03e02 HDTV XviD TEAM", "show name", "3", "02", "", " HDTV XviD TEAM", "3", "02"),
    ("Show Name S03E02 HDTV XviD TEAM", "show name", "3", "02", "", " HDTV XviD TEAM", "3", "02"),
    ("show name s03e02-03 HDTV XviD TEAM", "show name", "3", "02", "", "-03 HDTV XviD TEAM", "3", "02"),
    ("show name s03e02", "show name", "3", "02", "", "", "3", "02"),
    ("show name 3x02", "show name", "3", "02", "", "", "3", "02"),
    ("show name 11 3x02", "show name 11", "3", "02", "", "", "3", "02"),
    ("show name 11 3X02", "show name 11", "3", "02", "", "", "3", "02"),
    ("show name 111 3x02", "show name 111", "3", "02", "", "", "3", "02"),
    ("show name 102 1998 3x02", "show name 102 1998", "3", "02", "", "", "3", "02"),
    ("show name 1998-2008 3x02", "show name 1998 2008", "3", "02", "", "", "3", "02"),
    ("show name 302", "show name", "3", "02", "302", "", "", "302"),
    ("show name 11 302", "show name 11", "3", "02", "302", "", "", "302"),
    ("show name part 2 HDTV XviD TEAM", "show name", "", "2", "", " HDTV XviD TEAM", "", "2"),
    ("show name part2 HDTV XviD TEAM", "show name", "", "2", "", " HDTV XviD TEAM", "", "2"),
    ("show name 2013 s01e03 HDTV XviD TEAM", "show name 2013", "1", "03", "", " HDTV XviD TEAM", "1", "03"),
    ("anime name 002", "anime name", "", "02", "002", "", "", "002"),
    ("anime name 02", "anime name", "", "02", "02", "", "", "02"),
    ("anime name 302", "anime name", "3", "02", "302", "", "", "302"),
    ("Naruto_Shippuuden_-_261_[480p]", "naruto shippuuden", "2", "61", "261", " [480p]", "", "261"),
];

#[test]
fn tv_episode_markers() {
    let vocab = Vocabulary::global();
    for &(title, name, season, episode, episode_alt, trailing, _, _) in TV {
        let m = extract_episode(vocab, title).unwrap_or_else(|| panic!("no episode in {title}"));
        assert_eq!(
            (
                m.name.as_str(),
                m.season.as_str(),
                m.episode.as_str(),
                m.episode_alt.as_str(),
                m.trailing.as_str(),
            ),
            (name, season, episode, episode_alt, trailing),
            "{title}"
        );
    }
}

#[test]
fn tv_records() {
    for &(title, name, _, _, _, _, season, episode) in TV {
        let t = TitleRecord::parse(title);
        assert_eq!(t.name, name, "{title}");
        assert_eq!(t.season, season, "{title}");
        assert_eq!(t.episode, episode, "{title}");
    }
}

#[test]
fn previous_episodes() {
    for (query, season, episode) in [
        ("show name 1x23", "1", "22"),
        ("show name s01e03", "1", "02"),
        ("show name 1x01", "1", "00"),
        ("show name s02e01", "2", "00"),
        ("show name 123", "", "122"),
        ("show name 100", "", "099"),
    ] {
        let t = TitleRecord::parse(query);
        let (s, e) = previous_episode(&t.season, &t.episode);
        assert_eq!((s.as_str(), e.as_str()), (season, episode), "{query}");
    }
}

fn matcher(query: &str, mode: SearchMode) -> TitleMatcher {
    TitleMatcher::for_query(query, mode, None).unwrap()
}

#[test]
fn search_tv() {
    for (query, candidate) in [
        ("show name", ".show.name."),
        ("show name", "the.show.name."),
        ("show name", "the show's name"),
        ("show name", "the the show's and the names"),
        ("show name", "SHOW NAME"),
        ("show name", "show's name's"),
        ("show name", "show [us] name"),
        ("show name", "show.(us).name"),
        ("show name 2011", "show name 2011"),
        ("show name 20x11", "show name s20e11"),
        ("show name 1x23", "show name s01e23"),
        ("show name 01x23", "show name s01e23"),
        ("show name 1x23", "show name s01e23 episode title"),
        ("show name 1x23", "show name s01e22-23 episode title"),
        ("show name 1x23", "show name s01e23-24 episode title"),
        ("show name 78 1x23", "show name 78 s01e23 episode title"),
        ("show name 23 1x23", "show name 23 s01e23 episode title"),
        ("show name 1x23", "show name 2013 s01e23 episode title"),
        ("anime name 123", "[TEAM]_Anime_Name-123_[COMMENT]"),
        ("anime name 123", "[TEAM]_Anime_Name-0123_[COMMENT]"),
        ("anime name 123", "[TEAM]_Anime_Name-ep123_[COMMENT]"),
    ] {
        let m = matcher(query, SearchMode::Exact);
        assert!(
            m.is_match(candidate),
            "{query:?} ({}) should match {candidate:?}",
            m.as_str()
        );
    }
}

#[test]
fn search_tv_rejects() {
    for (query, candidate) in [
        ("show name", ".show.name2."),
        ("show name", "that.show.name."),
        ("show name", "SHOWS NAMEZ"),
        ("show name 2011", "show name 2012"),
        ("show name 20x11", "show name s20e12"),
        ("show name 1x23", "show name s1e24"),
        ("show name 01x23", "show name s01e24"),
        ("show name 1x23", "show name s02e23 episode title"),
        ("anime name 123", "[TEAM]_Anime_Name-124_[COMMENT]"),
        ("anime name 123", "[TEAM]_Anime_Name-1123_[COMMENT]"),
        ("anime name 123", "[TEAM]_Anime_Name-23_[COMMENT]"),
    ] {
        let m = matcher(query, SearchMode::Exact);
        assert!(
            !m.is_match(candidate),
            "{query:?} ({}) should not match {candidate:?}",
            m.as_str()
        );
    }
}

#[test]
fn search_movies_all_words() {
    for (query, candidate) in [
        ("my movie name", "my.movie.name.2012.DVDRip.XviD-TEAM"),
        ("movie name", "the.movie.name.2012.DVDRip.XviD-TEAM"),
        ("my movie name", "My.Movie.Name.2012.DVDRip.XviD-TEAM"),
        ("my movie name", "My.Movie's.Name.2012.DVDRip.XviD-TEAM"),
    ] {
        let m = matcher(query, SearchMode::AllWords);
        assert!(m.is_match(candidate), "{query:?} should match {candidate:?}");
    }

    let m = matcher("my movie name", SearchMode::AllWords);
    assert!(!m.is_match("My.Other.Movie.Name.2012.DVDRip.XviD-TEAM"));
}

#[test]
fn sizes() {
    for (text, expected) in [
        ("123", 123.0 / 1024.0 / 1024.0),
        ("123 B", 123.0 / 1024.0 / 1024.0),
        ("-123 B", 123.0 / 1024.0 / 1024.0),
        ("123 KiB", 123.0 / 1024.0),
        ("123 KB", 123.0 / 1024.0),
        ("123 K", 123.0 / 1024.0),
        ("123 MiB", 123.0),
        ("123 MB", 123.0),
        ("123 M", 123.0),
        ("123 GiB", 123.0 * 1024.0),
        ("123 GB", 123.0 * 1024.0),
        ("123 G", 123.0 * 1024.0),
    ] {
        assert_eq!(parse_size_mb(text), Some(expected), "{text}");
    }
}
