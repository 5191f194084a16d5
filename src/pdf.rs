use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId};
use tracing::debug;

use crate::error::{ArticleError, Result};

/// A loaded PDF. The file handle is only held while `Document::load` parses it.
pub struct PdfDocument {
    path: PathBuf,
    doc: Document,
}

pub fn open(path: &Path) -> Result<PdfDocument> {
    let doc = Document::load(path).map_err(|source| ArticleError::Input {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(PdfDocument {
        path: path.to_path_buf(),
        doc,
    })
}

impl PdfDocument {
    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Text of every page in page-number order, one visual line per `\n`.
    /// A page without text yields "".
    pub fn page_texts(&mut self) -> impl Iterator<Item = Result<String>> + '_ {
        let pages: Vec<(u32, ObjectId)> = self.doc.get_pages().into_iter().collect();
        pages
            .into_iter()
            .map(move |(page, id)| self.page_text(page, id))
    }

    fn page_text(&mut self, page: u32, id: ObjectId) -> Result<String> {
        let text = self.extract_lines(page, id).map_err(|source| ArticleError::PageText {
            path: self.path.clone(),
            page,
            source,
        })?;
        debug!(page, chars = text.len(), "extracted page text");
        Ok(text)
    }

    fn extract_lines(&mut self, page: u32, id: ObjectId) -> lopdf::Result<String> {
        let raw = self.doc.get_page_content(id)?;
        if raw.is_empty() {
            return Ok(String::new());
        }
        if let Some(content) = break_lines(Content::decode(&raw)?) {
            // in-memory only, the document is never saved
            self.doc.change_page_content(id, content.encode()?)?;
        }
        self.doc.extract_text(&[page])
    }
}

/// lopdf's `extract_text` ends a line only at `ET`, while typeset pages move
/// to the next line inside one text object. Put an `ET` before every line
/// move and turn `'` and `"` into plain `Tj` so their text is kept.
/// Returns `None` when the page needs no change.
fn break_lines(content: Content) -> Option<Content> {
    let mut changed = false;
    let mut last_tm_y = None;
    let mut operations = Vec::with_capacity(content.operations.len());

    for op in content.operations {
        let breaks = match op.operator.as_str() {
            "T*" | "'" | "\"" => true,
            "Td" | "TD" => op.operands.get(1).and_then(number).is_some_and(|ty| ty != 0.0),
            "Tm" => {
                let y = op.operands.get(5).and_then(number);
                let moved = y.is_some() && y != last_tm_y;
                last_tm_y = y;
                moved
            }
            _ => false,
        };
        if breaks {
            changed = true;
            operations.push(Operation::new("ET", vec![]));
        }

        match op.operator.as_str() {
            "'" => operations.push(Operation::new("Tj", op.operands)),
            "\"" => operations.push(Operation::new("Tj", op.operands.into_iter().skip(2).collect())),
            _ => operations.push(op),
        }
    }

    changed.then_some(Content { operations })
}

fn number(obj: &Object) -> Option<f32> {
    match *obj {
        Object::Integer(i) => Some(i as f32),
        Object::Real(r) => Some(r as f32),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    fn op(operator: &str, operands: Vec<Object>) -> Operation {
        Operation::new(operator, operands)
    }

    fn text(s: &str) -> Object {
        Object::string_literal(s)
    }

    /// One `BT … ET` block per line.
    fn block_per_line(lines: &[&str]) -> Vec<Operation> {
        let mut operations = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            let y = 750 - (i as i64) * 20;
            operations.push(op("BT", vec![]));
            operations.push(op("Tf", vec!["F1".into(), 12.into()]));
            operations.push(op("Td", vec![72.into(), y.into()]));
            operations.push(op("Tj", vec![text(line)]));
            operations.push(op("ET", vec![]));
        }
        operations
    }

    /// All lines in a single `BT … ET` block, cycling through the line-move
    /// operators a typesetter emits: `T*`, `Td`, `'`, `"` and `Tm`.
    fn single_block(lines: &[&str]) -> Vec<Operation> {
        let mut operations = vec![
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 12.into()]),
            op("TL", vec![14.into()]),
            op("Td", vec![72.into(), 750.into()]),
        ];
        for (i, line) in lines.iter().enumerate() {
            let y = 750 - (i as i64) * 14;
            match (i, i % 4) {
                (0, _) => operations.push(op("Tj", vec![text(line)])),
                (_, 1) => {
                    operations.push(op("T*", vec![]));
                    operations.push(op("Tj", vec![text(line)]));
                }
                (_, 2) => {
                    operations.push(op("Td", vec![0.into(), (-14).into()]));
                    operations.push(op("Tj", vec![text(line)]));
                }
                (_, 3) => operations.push(op("'", vec![text(line)])),
                _ => {
                    operations.push(op("Tm", vec![1.into(), 0.into(), 0.into(), 1.into(), 72.into(), y.into()]));
                    operations.push(op("\"", vec![0.into(), 0.into(), text(line)]));
                }
            }
        }
        operations.push(op("ET", vec![]));
        operations
    }

    /// Build a text PDF with one page per entry, one `BT … ET` block per line.
    pub(crate) fn write_pdf(path: &Path, pages: &[&[&str]]) {
        build_pdf(path, pages.iter().map(|lines| block_per_line(lines)).collect());
    }

    /// Build a text PDF the way typesetters lay pages out: one text object per page.
    pub(crate) fn write_typeset_pdf(path: &Path, pages: &[&[&str]]) {
        build_pdf(path, pages.iter().map(|lines| single_block(lines)).collect());
    }

    fn build_pdf(path: &Path, pages: Vec<Vec<Operation>>) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::new();
        for operations in pages {
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::from(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn reads_pages_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("two_pages.pdf");
        write_pdf(&path, &[&["first page"], &["second page"]]);

        let mut pdf = open(&path).unwrap();
        assert_eq!(pdf.page_count(), 2);
        let texts: Vec<String> = pdf.page_texts().collect::<Result<_>>().unwrap();
        assert!(texts[0].contains("first page"));
        assert!(texts[1].contains("second page"));
    }

    fn lines_of(texts: &[String]) -> Vec<Vec<&str>> {
        texts
            .iter()
            .map(|t| t.lines().map(str::trim).filter(|l| !l.is_empty()).collect())
            .collect()
    }

    #[test]
    fn lines_inside_one_text_object_are_split() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typeset.pdf");
        build_pdf(
            &path,
            vec![vec![
                op("BT", vec![]),
                op("Tf", vec!["F1".into(), 12.into()]),
                op("TL", vec![14.into()]),
                op("Td", vec![72.into(), 750.into()]),
                op("Tj", vec![text("Preamble")]),
                op("T*", vec![]),
                op("Tj", vec![text("Article 1.")]),
                op("Td", vec![0.into(), (-14).into()]),
                op("Tj", vec![text("Some text.")]),
                op("ET", vec![]),
            ]],
        );

        let mut pdf = open(&path).unwrap();
        let texts: Vec<String> = pdf.page_texts().collect::<Result<_>>().unwrap();
        assert_eq!(lines_of(&texts), vec![vec!["Preamble", "Article 1.", "Some text."]]);
    }

    #[test]
    fn every_line_move_operator_breaks_the_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("operators.pdf");
        let lines = ["zero", "star", "offset", "quote", "matrix", "star again"];
        write_typeset_pdf(&path, &[&lines]);

        let mut pdf = open(&path).unwrap();
        let texts: Vec<String> = pdf.page_texts().collect::<Result<_>>().unwrap();
        assert_eq!(lines_of(&texts), vec![lines.to_vec()]);
    }

    #[test]
    fn horizontal_moves_stay_on_one_line() {
        let content = Content {
            operations: vec![
                op("BT", vec![]),
                op("Tm", vec![1.into(), 0.into(), 0.into(), 1.into(), 72.into(), 700.into()]),
                op("Tj", vec![text("left")]),
                op("Td", vec![100.into(), 0.into()]),
                op("Tj", vec![text("right")]),
                op("Tm", vec![1.into(), 0.into(), 0.into(), 1.into(), 300.into(), 700.into()]),
                op("Tj", vec![text("far")]),
                op("ET", vec![]),
            ],
        };
        let rewritten = break_lines(content).unwrap();
        let ends: Vec<usize> = rewritten
            .operations
            .iter()
            .enumerate()
            .filter(|(_, o)| o.operator == "ET")
            .map(|(i, _)| i)
            .collect();
        // one for the first Tm, plus the original closing ET
        assert_eq!(ends, vec![1, 8]);
    }

    #[test]
    fn untouched_without_line_moves() {
        let operations = vec![
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 12.into()]),
            op("Td", vec![72.into(), 0.into()]),
            op("Tj", vec![text("one line")]),
            op("ET", vec![]),
        ];
        assert!(break_lines(Content { operations }).is_none());
    }

    #[test]
    fn quote_operators_become_tj() {
        let content = Content {
            operations: vec![
                op("'", vec![text("one")]),
                op("\"", vec![1.into(), 2.into(), text("two")]),
            ],
        };
        let ops = break_lines(content).unwrap().operations;
        let names: Vec<&str> = ops.iter().map(|o| o.operator.as_str()).collect();
        assert_eq!(names, vec!["ET", "Tj", "ET", "Tj"]);
        assert_eq!(ops[3].operands.len(), 1);
        assert_eq!(ops[3].operands[0].as_str().unwrap(), b"two");
    }

    #[test]
    fn missing_file_is_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = open(&dir.path().join("nope.pdf")).err().unwrap();
        assert!(matches!(err, ArticleError::Input { .. }));
    }

    #[test]
    fn garbage_file_is_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_a.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();
        assert!(matches!(open(&path), Err(ArticleError::Input { .. })));
    }
}
