pub mod episode;
pub mod lang;
pub mod normalize;
pub mod record;
pub mod rip;
pub mod search;
pub mod util;
pub mod vocab;

pub use episode::{EpisodeMatch, extract_episode};
pub use lang::extract_languages;
pub use normalize::{clean_special, level, normalize, tokens, year_of};
pub use record::TitleRecord;
pub use rip::extract_rip;
pub use search::{
    TitleMatcher, auto_search_mode, build_search_pattern, previous_episode, words,
};
pub use util::{in_range, is_url, parse_size_mb, word_similarity};
pub use vocab::Vocabulary;
