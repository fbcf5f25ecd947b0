use crate::vocab::Vocabulary;

/// Longest source/encoding/scene tag substring of `text`, or empty.
///
/// Each candidate pattern contributes its leftmost match; the longest wins
/// and ties go to the earlier candidate.
pub fn extract_rip(vocab: &Vocabulary, text: &str) -> String {
    let mut best = "";
    for re in vocab.rip_candidates() {
        if let Some(m) = re.find(text)
            && m.as_str().len() > best.len()
        {
            best = m.as_str();
        }
    }
    best.to_string()
}
