use clap::{Parser, Subcommand, ValueEnum};
use reltitle_core::{Category, SearchMode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reltitle")]
#[command(author, version, about = "Release name inference and matching")]
pub struct Cli {
    /// Title inference config (JSON)
    #[arg(long, global = true, env = "RELTITLE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Download housekeeping config (JSON)
    #[arg(long, global = true, env = "RELTITLE_DOWNLOAD_CONFIG")]
    pub download_config: Option<PathBuf>,

    #[arg(long, global = true, env = "RELTITLE_FFPROBE", default_value = "ffprobe")]
    pub ffprobe: PathBuf,

    #[arg(long = "seven-zip", global = true, env = "RELTITLE_7Z", default_value = "7z")]
    pub seven_zip: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Infer the structured record of a release name
    Parse {
        raw: String,

        /// Other names of the same item
        #[arg(long = "alt")]
        alternates: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the search pattern synthesized from a query
    Pattern {
        query: String,

        #[command(flatten)]
        search: SearchArgs,
    },

    /// Print the candidates matching a query; fails when none match
    Match {
        query: String,

        #[arg(required = true)]
        candidates: Vec<String>,

        #[command(flatten)]
        search: SearchArgs,
    },

    /// Convert a size such as "700 MB" to megabytes
    Size { text: String },

    /// Validate a download file or directory
    Check {
        path: PathBuf,

        /// The download is complete: missing metadata is an error (single file)
        #[arg(long)]
        finished: bool,
    },

    /// Unpack, tidy and clean the finished downloads below a directory
    Process { root: PathBuf },
}

#[derive(clap::Args)]
pub struct SearchArgs {
    #[arg(long, value_enum, default_value_t = Mode::Exact)]
    pub mode: Mode,

    /// tv, movies, anime or music
    #[arg(long)]
    pub category: Option<Category>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Exact,
    AllWords,
    Lazy,
    /// All-words for long queries, exact otherwise
    Auto,
}

impl Mode {
    /// `None` for automatic selection.
    pub fn search_mode(self) -> Option<SearchMode> {
        match self {
            Self::Exact => Some(SearchMode::Exact),
            Self::AllWords => Some(SearchMode::AllWords),
            Self::Lazy => Some(SearchMode::Lazy),
            Self::Auto => None,
        }
    }
}
