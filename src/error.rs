use std::path::PathBuf;

use thiserror::Error;

/// Failures of the extract → write pipeline. None of them are recovered locally.
#[derive(Error, Debug)]
pub enum ArticleError {
    /// Document missing, unreadable or not a PDF
    #[error("failed to open PDF {path:?}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    /// A page exists but its text could not be decoded
    #[error("failed to extract text from page {page} of {path:?}: {source}")]
    PageText {
        path: PathBuf,
        page: u32,
        #[source]
        source: lopdf::Error,
    },

    /// Title carries no `Article <digits>` number
    #[error("no article number in title {title:?}")]
    Parse { title: String },

    #[error("failed to {action} {path:?}: {source}")]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {path:?} as JSON: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, ArticleError>;
