use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use tracing::{debug, info, warn};

use crate::error::{ArticleError, Result};
use crate::extract::heading::article_number;
use crate::extract::Article;

/// On-disk shape of `article_<N>.json`. Field order is the file's key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleFile {
    pub article_number: String,
    pub title: String,
    pub content: String,
    pub extraction_timestamp: DateTime<Local>,
}

impl ArticleFile {
    pub fn new(article: &Article, extraction_timestamp: DateTime<Local>) -> Result<Self> {
        Ok(ArticleFile {
            article_number: article_number(&article.title)?,
            title: article.title.clone(),
            content: article.content.trim().to_string(),
            extraction_timestamp,
        })
    }

    pub fn file_name(&self) -> String {
        format!("article_{}.json", self.article_number)
    }
}

/// Write every article with one shared timestamp.
pub fn save_articles(
    articles: &[Article],
    output_dir: &Path,
    extraction_timestamp: DateTime<Local>,
) -> Result<Vec<PathBuf>> {
    save_articles_with(articles, output_dir, || extraction_timestamp)
}

/// Write every article, asking `clock` for each file's timestamp.
pub fn save_articles_with<F>(
    articles: &[Article],
    output_dir: &Path,
    mut clock: F,
) -> Result<Vec<PathBuf>>
where
    F: FnMut() -> DateTime<Local>,
{
    ensure_dir(output_dir)?;

    let mut seen = HashSet::new();
    let mut written = Vec::with_capacity(articles.len());
    for article in articles {
        let file = ArticleFile::new(article, clock())?;
        if !seen.insert(file.article_number.clone()) {
            warn!(
                "Article {} appears more than once; {} will be overwritten",
                file.article_number,
                file.file_name()
            );
        }
        written.push(write_article_file(&file, output_dir)?);
    }

    info!("Wrote {} article files to {:?}", written.len(), output_dir);
    Ok(written)
}

/// Write one record, replacing any file of the same name.
pub fn write_article_file(file: &ArticleFile, output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(file.file_name());
    let json = to_pretty_json(file).map_err(|source| ArticleError::Serialize {
        path: path.clone(),
        source,
    })?;
    fs::write(&path, json).map_err(|source| ArticleError::Filesystem {
        action: "write",
        path: path.clone(),
        source,
    })?;
    debug!("Wrote {:?}", path);
    Ok(path)
}

#[cfg(test)]
pub fn read_article_file(path: &Path) -> Result<ArticleFile> {
    let raw = fs::read_to_string(path).map_err(|source| ArticleError::Filesystem {
        action: "read",
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ArticleError::Serialize {
        path: path.to_path_buf(),
        source,
    })
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|source| ArticleError::Filesystem {
        action: "create directory",
        path: dir.to_path_buf(),
        source,
    })?;
    info!("Created output directory {:?}", dir);
    Ok(())
}

/// serde_json pretty output with 4-space indentation.
fn to_pretty_json<T: Serialize>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser)?;
    Ok(buf)
}
