pub mod config;
pub mod error;
pub mod types;

pub use config::{LanguageSpec, SourceTags, TitleConfig};
pub use error::{Error, Result};
pub use types::{Category, MediaKind, SearchMode};
