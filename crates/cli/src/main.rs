mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use reltitle_core::TitleConfig;
use reltitle_download::{DownloadConfig, Downloads, FfprobeProbe, LocalStore, SevenZip};
use reltitle_title::{TitleMatcher, TitleRecord, Vocabulary, auto_search_mode, parse_size_mb};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, SearchArgs};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let owned;
    let vocab = match &cli.config {
        Some(path) => {
            let config = TitleConfig::from_json_file(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            owned = Vocabulary::new(&config).context("invalid title config")?;
            &owned
        }
        None => Vocabulary::global(),
    };

    match cli.command {
        Commands::Parse {
            ref raw,
            ref alternates,
            json,
        } => {
            let alternates: Vec<&str> = alternates.iter().map(String::as_str).collect();
            let record = TitleRecord::parse_with(vocab, raw, &alternates);
            print_record(&record, json)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Pattern {
            ref query,
            ref search,
        } => {
            let matcher = matcher(vocab, query, search)?;
            println!("{}", matcher.as_str());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Match {
            ref query,
            ref candidates,
            ref search,
        } => {
            let matcher = matcher(vocab, query, search)?;
            let mut found = false;
            for candidate in candidates.iter().filter(|c| matcher.is_match(c)) {
                println!("{candidate}");
                found = true;
            }
            Ok(if found { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Commands::Size { ref text } => match parse_size_mb(text) {
            Some(mb) => {
                println!("{mb}");
                Ok(ExitCode::SUCCESS)
            }
            None => Ok(ExitCode::FAILURE),
        },
        Commands::Check { ref path, finished } => {
            let downloads = downloads(&cli)?;
            let valid = if path.is_dir() {
                downloads.check(path).await
            } else {
                downloads.check_file(path, None, finished).await
            };
            println!("{}", if valid { "valid" } else { "invalid" });
            Ok(if valid { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Commands::Process { ref root } => {
            let downloads = downloads(&cli)?;
            let paths = downloads.process(root).await;
            info!(count = paths.len(), "processed downloads");
            for path in paths {
                println!("{}", path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn matcher(vocab: &Vocabulary, query: &str, search: &SearchArgs) -> Result<TitleMatcher> {
    let record = TitleRecord::parse_with(vocab, query, &[]);
    let mode = search
        .mode
        .search_mode()
        .unwrap_or_else(|| auto_search_mode(vocab, &record));
    TitleMatcher::new(vocab, &record, mode, search.category)
        .with_context(|| format!("cannot build a search pattern for {query:?}"))
}

fn print_record(record: &TitleRecord, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }

    println!("name:         {}", record.name);
    println!("display name: {}", record.display_name);
    println!("full name:    {}", record.full_name);
    if record.is_episode() {
        println!("season:       {}", record.season);
        println!("episode:      {}", record.episode);
    }
    if let Some(date) = record.date {
        println!("date:         {date}");
    }
    println!("rip:          {}", record.rip);
    println!("languages:    {}", record.languages.join(", "));
    if !record.artist.is_empty() {
        println!("artist:       {}", record.artist);
        println!("album:        {}", record.album);
    }
    Ok(())
}

fn downloads(cli: &Cli) -> Result<Downloads> {
    let config = match &cli.download_config {
        Some(path) => DownloadConfig::from_json_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => DownloadConfig::default(),
    };
    Downloads::new(
        Box::new(LocalStore),
        Box::new(FfprobeProbe::new(&cli.ffprobe)),
        Box::new(SevenZip::new(&cli.seven_zip)),
        config,
    )
    .context("invalid download config")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn match_requires_candidates() {
        assert!(Cli::try_parse_from(["reltitle", "match", "show name"]).is_err());
        let cli = Cli::try_parse_from(["reltitle", "match", "show name", "a", "b"]).unwrap();
        assert!(matches!(cli.command, Commands::Match { ref candidates, .. } if candidates.len() == 2));
    }

    #[test]
    fn auto_mode_picks_by_length() {
        let cli = Cli::try_parse_from([
            "reltitle",
            "pattern",
            "my movie name",
            "--mode",
            "auto",
            "--category",
            "movies",
        ])
        .unwrap();
        let Commands::Pattern { query, search } = cli.command else {
            panic!("expected pattern");
        };
        let m = matcher(Vocabulary::global(), &query, &search).unwrap();
        assert!(m.is_match("My.Movie.Name.2012.DVDRip.XviD-TEAM"));
    }

    #[test]
    fn size_subcommand_parses() {
        let cli = Cli::try_parse_from(["reltitle", "size", "700 MB"]).unwrap();
        assert!(matches!(cli.command, Commands::Size { ref text } if text == "700 MB"));
    }
}
