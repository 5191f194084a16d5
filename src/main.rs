mod error;
mod extract;
mod pdf;
mod settings;
mod writer;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use settings::{Settings, TimestampMode};

#[derive(Parser)]
#[command(name = "article_extractor", about = "Split a legal PDF into per-article JSON files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract articles and write one JSON file per article
    Extract {
        /// PDF to read (default: $ARTICLES_INPUT or ./data/raw/GDPR_Art_1_21.pdf)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Directory for article_<N>.json files (default: $ARTICLES_OUTPUT_DIR or ./data/extracted_articles)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// One timestamp for the whole run, or one per file
        #[arg(short, long, value_enum)]
        timestamp: Option<TimestampMode>,
    },
    /// Extract articles and print them as a table, writing nothing
    List {
        /// PDF to read
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load().context("Failed to load settings")?;

    let result = match cli.command {
        Commands::Extract {
            input,
            output_dir,
            timestamp,
        } => {
            let settings = settings.with_overrides(input, output_dir, timestamp);
            info!(settings = ?settings, "Starting article extraction");

            let (extraction, written) = run_extract(&settings)?;
            println!(
                "Read {} pages: {} articles ({} preamble lines dropped).",
                extraction.pages,
                extraction.articles.len(),
                extraction.preamble_lines
            );
            println!("Wrote {} files to {:?}.", written.len(), settings.output_dir);
            Ok(())
        }
        Commands::List { input, limit } => {
            let settings = settings.with_overrides(input, None, None);
            let extraction = extract::extract_articles(&settings.input)
                .with_context(|| format!("Failed to extract articles from {:?}", settings.input))?;
            if extraction.articles.is_empty() {
                println!("No articles found in {:?}.", settings.input);
                return Ok(());
            }

            let shown = &extraction.articles[..limit.min(extraction.articles.len())];
            for line in article_table(shown) {
                println!("{}", line);
            }
            println!(
                "\n{} articles across {} pages ({} preamble lines dropped)",
                extraction.articles.len(),
                extraction.pages,
                extraction.preamble_lines
            );
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_elapsed(elapsed));
    }

    result
}

/// Extract, then write every article. The output directory is created even
/// when the document holds no articles.
fn run_extract(settings: &Settings) -> anyhow::Result<(extract::Extraction, Vec<PathBuf>)> {
    let run_started = Local::now();
    let extraction = extract::extract_articles(&settings.input)
        .with_context(|| format!("Failed to extract articles from {:?}", settings.input))?;
    if extraction.articles.is_empty() {
        warn!("No articles found in {:?}", settings.input);
    }

    let written = match settings.timestamp {
        TimestampMode::Run => {
            writer::save_articles(&extraction.articles, &settings.output_dir, run_started)
        }
        TimestampMode::PerFile => {
            writer::save_articles_with(&extraction.articles, &settings.output_dir, Local::now)
        }
    }
    .with_context(|| format!("Failed to write articles to {:?}", settings.output_dir))?;

    Ok((extraction, written))
}

const MAX_TITLE_WIDTH: usize = 60;

/// Header, rule and one row per article. The title column is as wide as the
/// longest title, capped at `MAX_TITLE_WIDTH`.
fn article_table(articles: &[extract::Article]) -> Vec<String> {
    let width = articles
        .iter()
        .map(|a| a.title.chars().count())
        .max()
        .unwrap_or(0)
        .clamp("Title".len(), MAX_TITLE_WIDTH);

    let mut lines = vec![
        format!("{:>6} | {:<width$} | {:>8}", "Number", "Title", "Chars"),
        "-".repeat(6 + 3 + width + 3 + 8),
    ];
    for article in articles {
        let number = extract::heading::article_number(&article.title).unwrap_or_else(|_| "?".into());
        lines.push(format!(
            "{:>6} | {:<width$} | {:>8}",
            number,
            fit(&article.title, width),
            article.content.chars().count()
        ));
    }
    lines
}

/// Cut `s` to at most `width` chars, ending in "..." when shortened.
fn fit(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let kept: String = s.chars().take(width.saturating_sub(3)).collect();
    kept + "..."
}

fn format_elapsed(d: Duration) -> String {
    match d.as_secs() {
        0..=59 => format!("{:.1}s", d.as_secs_f64()),
        s => format!("{}m {:02}s", s / 60, s % 60),
    }
}
