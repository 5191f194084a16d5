pub mod heading;
pub mod state;

use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::error::Result;
use crate::pdf;
pub use state::{Article, ExtractState};

/// Articles of one document plus what was seen on the way.
#[derive(Debug)]
pub struct Extraction {
    pub pages: usize,
    pub preamble_lines: usize,
    pub articles: Vec<Article>,
}

/// Open a PDF, fold every line of every page through `ExtractState`.
pub fn extract_articles(path: &Path) -> Result<Extraction> {
    let mut doc = pdf::open(path)?;
    let pages = doc.page_count();
    info!("Reading {} pages from {:?}", pages, path);

    let pb = ProgressBar::new(pages as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} pages")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );

    let texts = doc
        .page_texts()
        .inspect(|_| pb.inc(1))
        .collect::<Result<Vec<String>>>();
    pb.finish_and_clear();

    let extraction = extract_from_pages(texts?);
    info!(
        "Found {} articles ({} preamble lines dropped)",
        extraction.articles.len(),
        extraction.preamble_lines
    );
    Ok(extraction)
}

/// Same segmentation over page strings already in memory.
pub fn extract_from_pages<I, S>(pages: I) -> Extraction
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut count = 0;
    let state = pages.into_iter().fold(ExtractState::new(), |state, page| {
        count += 1;
        state.push_page(page.as_ref())
    });
    finish(count, state)
}

fn finish(pages: usize, state: ExtractState) -> Extraction {
    let preamble_lines = state.preamble_lines();
    Extraction {
        pages,
        preamble_lines,
        articles: state.finish(),
    }
}
