use crate::vocab::Vocabulary;

/// Language codes whose pattern matches a whole token of `text`, in
/// configuration order. Never empty: falls back to the default code.
pub fn extract_languages(vocab: &Vocabulary, text: &str) -> Vec<String> {
    let langs: Vec<String> = vocab
        .languages()
        .iter()
        .filter(|l| l.is_match(text))
        .map(|l| l.code.clone())
        .collect();
    if langs.is_empty() {
        return vec![vocab.default_language().to_string()];
    }
    langs
}

/// Drop the default code once any other code is present.
pub(crate) fn drop_default(vocab: &Vocabulary, langs: &mut Vec<String>) {
    if langs.len() > 1 {
        langs.retain(|l| l != vocab.default_language());
    }
}
