//! Compiled form of [`TitleConfig`].
//!
//! Built once and shared read-only by every extractor. [`Vocabulary::global`]
//! holds the built-in table.

use chrono::Datelike;
use regex::{Regex, RegexBuilder};
use reltitle_core::{Error, Result, TitleConfig};
use std::sync::LazyLock;

const SIZE_LIMIT: usize = 1 << 25;

static GLOBAL: LazyLock<Vocabulary> = LazyLock::new(|| {
    Vocabulary::new(&TitleConfig::default()).expect("built-in vocabulary must compile")
});

/// A configured language and its whole-token matcher.
#[derive(Debug, Clone)]
pub struct Language {
    pub code: String,
    matcher: Regex,
}

impl Language {
    pub fn is_match(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }
}

#[derive(Debug, Clone)]
pub struct Vocabulary {
    config: TitleConfig,
    languages: Vec<Language>,
    rip_candidates: Vec<Regex>,
    movie_source: Regex,
    tv_source: Regex,
    junk_group: String,
}

impl Vocabulary {
    pub fn new(config: &TitleConfig) -> Result<Self> {
        config.validate()?;

        let languages = config
            .languages
            .iter()
            .map(|l| {
                let matcher = compile(
                    &format!("language:{}", l.code),
                    &format!(r"(^|[\W_])({})([\W_]|$)", l.pattern),
                )?;
                Ok(Language {
                    code: l.code.clone(),
                    matcher,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let rip_candidates = rip_combinations(config)
            .iter()
            .enumerate()
            .map(|(i, p)| compile(&format!("rip:{i}"), &format!(r"[\W_]{p}([\W_].*$|$)")))
            .collect::<Result<Vec<_>>>()?;

        let junk_group = format!(
            "({})",
            config
                .junk_words
                .iter()
                .map(String::as_str)
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join("|")
        );

        Ok(Self {
            languages,
            rip_candidates,
            movie_source: compile("sources.movies", &config.sources.movies)?,
            tv_source: compile("sources.tv", &config.sources.tv)?,
            junk_group,
            config: config.clone(),
        })
    }

    /// The built-in vocabulary.
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    pub fn config(&self) -> &TitleConfig {
        &self.config
    }

    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    pub fn default_language(&self) -> &str {
        &self.config.default_language
    }

    pub fn is_junk(&self, word: &str) -> bool {
        self.config.junk_words.iter().any(|j| j == word)
    }

    /// Alternation group of the junk words, e.g. `(the|a|and)`.
    pub fn junk_group(&self) -> &str {
        &self.junk_group
    }

    /// Candidate rip patterns, in tie-break order.
    pub(crate) fn rip_candidates(&self) -> &[Regex] {
        &self.rip_candidates
    }

    pub fn is_movie_source(&self, text: &str) -> bool {
        self.movie_source.is_match(text)
    }

    pub fn is_tv_source(&self, text: &str) -> bool {
        self.tv_source.is_match(text)
    }

    /// A purely numeric token between `min_year` and next year.
    pub fn is_year(&self, token: &str) -> bool {
        if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        let max = chrono::Utc::now().year() + 1;
        token
            .parse::<i32>()
            .is_ok_and(|n| (self.config.min_year..=max).contains(&n))
    }
}

/// Five increasingly broad source-tag combinations: extra+extra,
/// extra+source, language+disc, language+source, language+format.
fn rip_combinations(config: &TitleConfig) -> [String; 5] {
    let langs = config
        .languages
        .iter()
        .map(|l| l.pattern.as_str())
        .collect::<Vec<_>>()
        .join("|");
    let s = &config.sources;

    let disc = format!(r"(({langs})[\W_]+)*([\W_]*{}[\W_]*)", s.pre);
    let source = format!(r"(({langs})[\W_]+)*([\W_]*{}|{}[\W_]*)", s.movies, s.tv);
    let format = format!(r"(({langs})[\W_]+)*([\W_]*{}[\W_]*)", s.format);
    let extra = format!(r"(({langs})[\W_]+)*([\W_]*{}[\W_]*)", s.extra);

    [
        format!(r"{extra}[\W_]*{extra}"),
        format!(r"{extra}[\W_]*{source}"),
        disc,
        source,
        format,
    ]
}

fn compile(name: &str, pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .size_limit(SIZE_LIMIT)
        .build()
        .map_err(|e| Error::pattern(name, e))
}
