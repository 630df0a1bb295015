//! Bookmind CLI - categorize and search browser bookmarks from the terminal
//!
//! Usage: bookmind [OPTIONS] <COMMAND>
//!
//! Supports JSON output for scripting.

use clap::{Parser, Subcommand};
use bookmind_lib::import::{parse_bookmark_file, parse_bookmarks_html, parse_categorized_file};
use bookmind_lib::settings::default_settings_path;
use bookmind_lib::{AnalysisResult, BookmarkAnalyzer, BookmindError, CategorizedBookmark, Settings};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "bookmind")]
#[command(version, about = "LLM-assisted bookmark categorization", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Settings file (default: <data dir>/bookmind/settings.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output as JSON for scripting
    #[arg(long, global = true)]
    json: bool,

    /// Detailed logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a browser bookmark export (HTML) and print the bookmarks
    Import {
        /// Netscape-format bookmark file
        file: PathBuf,
    },
    /// Categorize bookmarks from an HTML export or a JSON list
    Analyze {
        file: PathBuf,
    },
    /// Find bookmarks relevant to a query
    Ask {
        query: String,
        /// Saved analysis result or JSON list of categorized bookmarks
        #[arg(long, short)]
        input: PathBuf,
    },
    /// Edit the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Store the generator API key (NVIDIA_NIM_API_KEY still takes precedence)
    SetKey {
        key: String,
    },
}

fn read_file(path: &Path) -> Result<String, BookmindError> {
    std::fs::read_to_string(path)
        .map_err(|e| BookmindError::Validation(format!("Failed to read {}: {}", path.display(), e)))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), BookmindError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| BookmindError::Validation(format!("Failed to encode output: {}", e)))?;
    println!("{}", text);
    Ok(())
}

/// Write `key` into the settings file at `path`, keeping its other values
fn set_api_key(path: &Path, key: &str) -> Result<Settings, BookmindError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(BookmindError::Validation("API key must not be empty".to_string()));
    }

    // Environment overrides must not leak into the stored file
    let mut settings = Settings::load(path)?;
    settings.api_key = Some(key.to_string());
    settings.save(path)?;
    Ok(settings)
}

fn print_analysis(result: &AnalysisResult) {
    for category in &result.categories {
        let members: Vec<&CategorizedBookmark> = result
            .bookmarks
            .iter()
            .filter(|b| &b.category == category)
            .collect();
        if members.is_empty() {
            continue;
        }
        println!("{} ({})", category, members.len());
        for b in members {
            println!("  {}  {}", b.title, b.url);
        }
    }

    // Labels the generator used without declaring them
    let undeclared: Vec<&CategorizedBookmark> = result
        .bookmarks
        .iter()
        .filter(|b| !result.categories.contains(&b.category))
        .collect();
    for b in undeclared {
        println!("[{}]  {}  {}", b.category, b.title, b.url);
    }
}

async fn run(cli: Cli) -> Result<(), BookmindError> {
    match cli.command {
        Commands::Import { file } => {
            let imported = parse_bookmarks_html(&read_file(&file)?);
            if cli.json {
                print_json(&imported.bookmarks)?;
            } else {
                for b in &imported.bookmarks {
                    println!("{}  {}", b.title, b.url);
                }
            }
            log::info!("Imported {} bookmarks ({} skipped)", imported.bookmarks.len(), imported.skipped);
        }
        Commands::Analyze { file } => {
            let settings = Settings::resolve(cli.config.as_deref())?;
            let analyzer = BookmarkAnalyzer::from_settings(&settings)?;
            let bookmarks = parse_bookmark_file(&read_file(&file)?)?;

            let result = analyzer.analyze(&bookmarks).await?;
            if cli.json {
                print_json(&result)?;
            } else {
                print_analysis(&result);
            }
        }
        Commands::Ask { query, input } => {
            let settings = Settings::resolve(cli.config.as_deref())?;
            let analyzer = BookmarkAnalyzer::from_settings(&settings)?;
            let bookmarks = parse_categorized_file(&read_file(&input)?)?;

            let relevant = analyzer.ask(&query, &bookmarks).await?;
            if cli.json {
                print_json(&relevant)?;
            } else if relevant.is_empty() {
                println!("No matching bookmarks");
            } else {
                for (rank, b) in relevant.iter().enumerate() {
                    println!("{:>3}. [{}] {}  {}", rank + 1, b.category, b.title, b.url);
                }
            }
        }
        Commands::Config { action: ConfigAction::SetKey { key } } => {
            let path = cli.config.unwrap_or_else(default_settings_path);
            let settings = set_api_key(&path, &key)?;
            println!(
                "Saved API key {} to {}",
                settings.masked_api_key().unwrap_or_default(),
                path.display()
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            match e {
                BookmindError::Validation(_) => ExitCode::from(2),
                BookmindError::Configuration(_) => ExitCode::from(3),
                BookmindError::Upstream(_) | BookmindError::ResponseFormat(_) => ExitCode::from(4),
            }
        }
    }
}
