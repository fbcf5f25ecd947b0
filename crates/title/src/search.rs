//! Search pattern synthesis.
//!
//! From a [`TitleRecord`], build a regular expression recognising other
//! differently formatted names of the same content.

use regex::{Captures, Regex, RegexBuilder};
use reltitle_core::{Category, Error, Result, SearchMode};
use tracing::warn;

use crate::normalize::raw_tokens;
use crate::record::TitleRecord;
use crate::vocab::Vocabulary;

// A bracketed annotation such as "(us)" or "[720p]"
const SEP_EXTRA: &str = r"([\(\[][^\)\]]*[\)\]])";

const SIZE_LIMIT: usize = 1 << 25;

/// Begin, inside (between words) and end fragments of a search pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Boundaries {
    begin: String,
    inside: String,
    end: String,
}

impl Boundaries {
    fn new(
        vocab: &Vocabulary,
        record: &TitleRecord,
        mode: SearchMode,
        category: Option<Category>,
    ) -> Self {
        let junk = vocab.junk_group();
        let inside = format!(r"[\W_s]*{SEP_EXTRA}*[\W_]*({junk}[\W_]+)*");
        let open_end = r"([\W_].*$|$)".to_string();

        match mode {
            SearchMode::Lazy => Self {
                begin: "^.*".into(),
                inside: ".*".into(),
                end: ".*$".into(),
            },
            SearchMode::AllWords => Self {
                begin: r"(^|^.*[\W_])".into(),
                inside,
                end: open_end,
            },
            SearchMode::Exact => {
                let end = if record.is_episode() || category == Some(Category::Tv) {
                    open_end
                } else {
                    format!(r"[\W_s]*{SEP_EXTRA}*[\W_]*([\W_]{junk})*[\W_]*$")
                };
                Self {
                    begin: format!(r"^[\W_]*{SEP_EXTRA}*[\W_]*({junk}[\W_]+)*"),
                    inside,
                    end,
                }
            }
        }
    }
}

/// Lower-cased tokens of `text` without junk words. Empty tokens left by a
/// leading or trailing separator are kept.
pub fn words(vocab: &Vocabulary, text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    raw_tokens(&lower)
        .into_iter()
        .filter(|w| !vocab.is_junk(w))
        .map(String::from)
        .collect()
}

/// Pick all-words matching for long enough queries, exact otherwise.
pub fn auto_search_mode(vocab: &Vocabulary, record: &TitleRecord) -> SearchMode {
    let chars: usize = words(vocab, &record.raw).iter().map(|w| w.len()).sum();
    if chars >= vocab.config().auto_mode_min_chars {
        SearchMode::AllWords
    } else {
        SearchMode::Exact
    }
}

/// Regular expression source matching names equivalent to `record`.
pub fn build_search_pattern(
    vocab: &Vocabulary,
    record: &TitleRecord,
    mode: SearchMode,
    category: Option<Category>,
) -> String {
    let b = Boundaries::new(vocab, record, mode, category);

    let mut pattern = words(vocab, &record.search_title())
        .iter()
        .map(|w| optional_possessive(&regex::escape(w)))
        .collect::<Vec<_>>()
        .join(&b.inside);

    if record.is_episode() {
        pattern = tolerate_previous_episode(record, &pattern, &b.inside);
    }

    format!("{}{}{}", b.begin, pattern, b.end)
}

// "names" also matches "name's" and "name"
fn optional_possessive(word: &str) -> String {
    match word.strip_suffix('s') {
        Some(stem) => format!("{stem}'?s?"),
        None => word.to_string(),
    }
}

/// Also accept the previous episode (and season) next to the episode, for
/// double-episode releases, and an optional year before it.
fn tolerate_previous_episode(record: &TitleRecord, pattern: &str, inside: &str) -> String {
    let (prev_season, prev_episode) = previous_episode(&record.season, &record.episode);
    let prev_season = regex::escape(&prev_season);
    let prev_episode = regex::escape(&prev_episode);
    let year = format!(r"(\d{{4}})?{inside}");
    let inside_re = regex::escape(inside);
    let episode_re = regex::escape(&record.episode);

    if record.season.is_empty() {
        let re = format!("({inside_re})({episode_re})");
        rewrite(pattern, &re, |caps| {
            let (sep, ep) = (&caps[1], &caps[2]);
            format!(r"{year}{sep}([^1-9]{{0,3}}{prev_episode}[^1-9]{{0,3}}{ep}|[^1-9]{{0,3}}{ep})")
        })
    } else {
        let re = format!(
            "(0?{}){inside_re}({episode_re})",
            regex::escape(&record.season)
        );
        rewrite(pattern, &re, |caps| {
            let (season, ep) = (&caps[1], &caps[2]);
            format!(
                r"{year}([^1-9]{{0,3}}{prev_season}\D*{prev_episode}\D[^1-9]*{season}?\D*{ep}|[^1-9]{{0,3}}{season}\D*{ep})"
            )
        })
    }
}

fn rewrite<F>(pattern: &str, re: &str, rep: F) -> String
where
    F: FnMut(&Captures) -> String,
{
    match Regex::new(re) {
        Ok(re) => re.replace_all(pattern, rep).into_owned(),
        Err(e) => {
            warn!(error = %e, "cannot rewrite episode in search pattern");
            pattern.to_string()
        }
    }
}

/// Season and episode one below the given ones, keeping the input widths.
/// Episode zero wraps to 99 and decrements the season (floor 0).
/// Non-numeric input is returned unchanged. Numbers are decremented as digit
/// strings, so markers of any length work.
pub fn previous_episode(season: &str, episode: &str) -> (String, String) {
    if !is_number(episode) {
        return (season.to_string(), episode.to_string());
    }
    if let Some(prev) = decrement(episode) {
        return (season.to_string(), prev);
    }

    let prev_season = decrement(season).unwrap_or_else(|| season.to_string());
    (prev_season, format!("{:0>width$}", "99", width = episode.len()))
}

fn is_number(val: &str) -> bool {
    !val.is_empty() && val.bytes().all(|b| b.is_ascii_digit())
}

/// `val - 1` at the same width, or `None` for zero and non-numbers.
fn decrement(val: &str) -> Option<String> {
    if !is_number(val) {
        return None;
    }
    let mut digits = val.as_bytes().to_vec();
    let last = digits.iter().rposition(|&b| b != b'0')?;
    digits[last] -= 1;
    for d in &mut digits[last + 1..] {
        *d = b'9';
    }
    String::from_utf8(digits).ok()
}

/// A compiled, case-insensitive search pattern.
#[derive(Debug, Clone)]
pub struct TitleMatcher {
    regex: Regex,
}

impl TitleMatcher {
    pub fn new(
        vocab: &Vocabulary,
        record: &TitleRecord,
        mode: SearchMode,
        category: Option<Category>,
    ) -> Result<Self> {
        let pattern = build_search_pattern(vocab, record, mode, category);
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .size_limit(SIZE_LIMIT)
            .build()
            .map_err(|e| Error::pattern("search", e))?;
        Ok(Self { regex })
    }

    /// Matcher for `query` with the built-in vocabulary.
    pub fn for_query(query: &str, mode: SearchMode, category: Option<Category>) -> Result<Self> {
        Self::new(
            Vocabulary::global(),
            &TitleRecord::parse(query),
            mode,
            category,
        )
    }

    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}
