use thiserror::Error;

/// Errors raised while loading configuration or compiling its patterns.
///
/// Inference itself never fails; these only surface at startup.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid config: {0}")]
    Config(String),

    #[error("invalid pattern `{name}`: {message}")]
    InvalidPattern { name: String, message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "invalid_config",
            Self::InvalidPattern { .. } => "invalid_pattern",
            Self::Io(_) => "io_error",
            Self::Json(_) => "json_error",
        }
    }

    pub fn pattern(name: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::InvalidPattern {
            name: name.into(),
            message: err.to_string(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
