use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ArticleError, Result};

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^Article\s+\d+\.").unwrap());
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Article\s+(\d+)").unwrap());

/// `Article <digits>.` at the very start of the line. Leading whitespace is not skipped.
pub fn is_heading(line: &str) -> bool {
    HEADING_RE.is_match(line)
}

/// Digits of the first `Article <digits>` found anywhere in the title.
pub fn article_number(title: &str) -> Result<String> {
    NUMBER_RE
        .captures(title)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| ArticleError::Parse {
            title: title.to_string(),
        })
}
