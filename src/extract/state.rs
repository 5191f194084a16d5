use tracing::debug;

use super::heading;

/// One closed article: heading line plus the body text that followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub content: String,
}

#[derive(Debug)]
struct OpenArticle {
    title: String,
    content: String,
}

impl OpenArticle {
    fn new(title: &str) -> Self {
        OpenArticle {
            title: title.to_string(),
            content: String::new(),
        }
    }

    fn append(&mut self, text: &str) {
        if !self.content.is_empty() {
            self.content.push(' ');
        }
        self.content.push_str(text);
    }

    fn close(self) -> Article {
        Article {
            title: self.title,
            content: self.content,
        }
    }
}

/// Line-by-line segmentation state. Each `push_line` consumes the state and
/// returns the next one, so a whole document is a fold over its lines.
#[derive(Debug, Default)]
pub struct ExtractState {
    closed: Vec<Article>,
    current: Option<OpenArticle>,
    preamble_lines: usize,
}

impl ExtractState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(mut self, line: &str) -> Self {
        if heading::is_heading(line) {
            if let Some(open) = self.current.take() {
                self.closed.push(open.close());
            }
            self.current = Some(OpenArticle::new(line.trim()));
            return self;
        }

        let text = line.trim();
        if text.is_empty() {
            return self;
        }
        match self.current.as_mut() {
            Some(open) => open.append(text),
            None => {
                self.preamble_lines += 1;
                debug!(line = text, "dropping preamble line");
            }
        }
        self
    }

    /// Feed every line of one page's text.
    pub fn push_page(self, page_text: &str) -> Self {
        page_text.lines().fold(self, |state, line| state.push_line(line))
    }

    #[cfg(test)]
    pub fn closed(&self) -> &[Article] {
        &self.closed
    }

    #[cfg(test)]
    pub fn open_title(&self) -> Option<&str> {
        self.current.as_ref().map(|open| open.title.as_str())
    }

    /// Non-empty lines seen before the first heading.
    pub fn preamble_lines(&self) -> usize {
        self.preamble_lines
    }

    /// Close the open article, if any, and return everything in document order.
    pub fn finish(mut self) -> Vec<Article> {
        if let Some(open) = self.current.take() {
            self.closed.push(open.close());
        }
        self.closed
    }
}
