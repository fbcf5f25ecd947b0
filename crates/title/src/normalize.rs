//! Layered text normalization.
//!
//! Levels are cumulative: each one applies every pass of the levels below it.
//!
//! | level | pass |
//! |---|---|
//! | 0 | drop control characters, strip markup, decode entities, transliterate to ASCII |
//! | 1 | lower-case, re-tokenize on non-word runs |
//! | 3 | remove interior bracketed groups |
//! | 4 | cut from a trailing bracketed group to the end |
//! | 5 | remove the rip substring and any unclosed trailing group |
//! | 6 | drop year tokens |
//! | 7 | drop everything from the last year token onward |
//! | 9 | reduce to the canonical (episode-qualified) title |

use regex::Regex;
use scraper::Html;
use std::sync::LazyLock;

use crate::record::TitleRecord;
use crate::rip::extract_rip;
use crate::vocab::Vocabulary;

pub mod level {
    pub const CHARS: u8 = 0;
    pub const WORDS: u8 = 1;
    pub const INNER_GROUPS: u8 = 3;
    pub const TRAILING_GROUPS: u8 = 4;
    pub const RIP: u8 = 5;
    pub const YEARS: u8 = 6;
    pub const LAST_YEAR: u8 = 7;
    pub const CANONICAL: u8 = 9;
}

static RE_CONTROL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\n\r\t]+").unwrap());

static RE_NBSP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(&(nbsp|#160|#xA0);)+").unwrap());

// Bracketed group preceded by text, and everything after it
static RE_TRAILING_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.+?)([\(\[\{].*?[\)\]\}].*$)").unwrap());

static RE_GROUP_AFTER_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.+)[\(\[\{].*?[\)\]\}]").unwrap());

static RE_GROUP_BEFORE_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\(\[\{].*?[\)\]\}](.+)").unwrap());

static RE_OPEN_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\(\[\{<][^\)\]\}>]*$").unwrap());

static RE_SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\W_]+").unwrap());

/// Normalize `text` at the given strictness `level`.
pub fn normalize(vocab: &Vocabulary, text: &str, level: u8) -> String {
    if text.is_empty() {
        return String::new();
    }
    let mut val = clean_special(text);
    if level < level::WORDS {
        return val;
    }

    val = val.to_lowercase();

    if level >= level::TRAILING_GROUPS {
        val = RE_TRAILING_GROUP.replace_all(&val, "${1}").into_owned();
    }
    if level >= level::INNER_GROUPS {
        val = RE_GROUP_AFTER_TEXT.replace_all(&val, "${1} ").into_owned();
        val = RE_GROUP_BEFORE_TEXT.replace_all(&val, " ${1}").into_owned();
    }
    if level >= level::RIP {
        // The rip is taken from `val` itself, so a plain replace is enough.
        let rip = extract_rip(vocab, &val);
        if !rip.is_empty() {
            val = val.replace(&rip, "");
        }
        val = RE_OPEN_GROUP.replace(&val, "").into_owned();
    }

    val = val.replace('\'', "");
    let mut words = tokens(&val);

    if level >= level::LAST_YEAR
        && let Some(last) = words.iter().rposition(|w| vocab.is_year(w))
    {
        words.truncate(last);
    }
    if level >= level::YEARS {
        words.retain(|w| !vocab.is_year(w));
    }
    let val = words.join(" ");

    if level >= level::CANONICAL {
        return canonical(vocab, &val);
    }
    val
}

fn canonical(vocab: &Vocabulary, val: &str) -> String {
    let record = TitleRecord::parse_with(vocab, val, &[]);
    if record.episode.is_empty() {
        return record.name;
    }
    [
        record.name.as_str(),
        record.season.as_str(),
        record.episode.as_str(),
    ]
    .into_iter()
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join(" ")
}

/// Character-level cleanup shared by every level.
pub fn clean_special(text: &str) -> String {
    let val = RE_CONTROL.replace_all(text, "");
    let val = RE_NBSP.replace_all(&val, " ");
    let val = strip_markup(&val);
    deunicode::deunicode(&val).trim().to_string()
}

/// Text content of `text` parsed as an HTML fragment, entities decoded.
fn strip_markup(text: &str) -> String {
    if !text.contains(['<', '&']) {
        return text.to_string();
    }
    Html::parse_fragment(text).root_element().text().collect()
}

/// Non-empty tokens of `text` split on non-word runs.
pub fn tokens(text: &str) -> Vec<&str> {
    RE_SEPARATORS.split(text).filter(|w| !w.is_empty()).collect()
}

/// Tokens of `text` split on non-word runs, keeping the empty tokens a
/// leading or trailing separator produces.
pub(crate) fn raw_tokens(text: &str) -> Vec<&str> {
    RE_SEPARATORS.split(text).collect()
}

/// First year-shaped token of `text`.
pub fn year_of(vocab: &Vocabulary, text: &str) -> Option<i32> {
    raw_tokens(text)
        .into_iter()
        .find(|w| vocab.is_year(w))
        .and_then(|w| w.parse().ok())
}
