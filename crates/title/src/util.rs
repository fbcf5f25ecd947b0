use regex::Regex;
use std::sync::LazyLock;
use tracing::error;

static RE_SIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([\d.]+)\W*([tgmk])?i?b?\s*$").unwrap());

static RE_NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\W_]+").unwrap());

static RE_NON_DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\D+").unwrap());

/// Parse a human readable size ("700 MB", "1.4GiB", "123") into megabytes.
///
/// Bare numbers are bytes. Any sign is ignored.
pub fn parse_size_mb(text: &str) -> Option<f64> {
    let Some(caps) = RE_SIZE.captures(text) else {
        error!(text, "failed to get size");
        return None;
    };

    let size: f64 = match caps[1].parse() {
        Ok(v) => v,
        Err(e) => {
            error!(text, error = %e, "failed to get size");
            return None;
        }
    };

    let unit = caps.get(2).map(|m| m.as_str().to_ascii_lowercase());
    let mb = match unit.as_deref() {
        None => size / 1024.0 / 1024.0,
        Some("k") => size / 1024.0,
        Some("g") => size * 1024.0,
        Some("t") => size * 1024.0 * 1024.0,
        _ => size,
    };
    Some(mb)
}

fn split_words<'a>(text: &'a str, sep: &Regex) -> Vec<&'a str> {
    sep.split(text).filter(|w| !w.is_empty()).collect()
}

/// Share of the words of `a` found in `b`, summed over a word split and a
/// digit-run split of `a`. Ranges from 0.0 to 2.0.
pub fn word_similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let b_words = split_words(&b, &RE_NON_WORD);

    [&*RE_NON_WORD, &*RE_NON_DIGIT]
        .into_iter()
        .map(|sep| {
            let a_words = split_words(&a, sep);
            if a_words.is_empty() {
                return 0.0;
            }
            let common = a_words.iter().filter(|w| b_words.contains(w)).count();
            common as f64 / a_words.len() as f64
        })
        .sum()
}

/// `n` within the optional inclusive bounds.
pub fn in_range<T: PartialOrd>(n: T, min: Option<T>, max: Option<T>) -> bool {
    if min.is_some_and(|min| n < min) {
        return false;
    }
    !max.is_some_and(|max| n > max)
}

/// True when `text` parses as an absolute URL.
pub fn is_url(text: &str) -> bool {
    url::Url::parse(text).is_ok_and(|u| !u.scheme().is_empty())
}
