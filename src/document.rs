//! Document text extraction
//!
//! Pure Rust text extraction from term-sheet PDFs via pdf-extract. No system
//! libraries (pdfium, Tesseract) are needed; scanned PDFs simply yield no text.

use crate::error::ExtractError;
use pdf_extract::{output_doc_page, Document, PlainTextOutput};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

/// Text of one page, or why that page could not be read
pub type PageText = Result<String, String>;

/// Source of plain text for a document
pub trait TextExtractor {
    /// Per-page text of the document at `path`
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, ExtractError>;
}

/// Text extractor for PDF files
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Trim every line and drop blank ones
    fn clean_text(text: &str) -> String {
        text.lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl TextExtractor for PdfTextExtractor {
    /// Each page runs under its own catch_unwind, so a malformed page only
    /// costs that page
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, ExtractError> {
        tracing::debug!("[PdfTextExtractor] Starting PDF extraction: {}", path.display());

        let bytes = std::fs::read(path).map_err(|source| ExtractError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!("[PdfTextExtractor] PDF file size: {} bytes", bytes.len());

        let doc = match panic::catch_unwind(AssertUnwindSafe(|| Document::load_mem(&bytes))) {
            Ok(Ok(doc)) => doc,
            Ok(Err(e)) => {
                tracing::warn!(
                    "[PdfTextExtractor] PDF load FAILED for {}: {}",
                    path.display(),
                    e
                );
                return Err(ExtractError::Pdf {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
            }
            Err(_panic) => {
                tracing::error!(
                    "[PdfTextExtractor] PDF load PANICKED for {}",
                    path.display()
                );
                return Err(ExtractError::Panicked {
                    path: path.to_path_buf(),
                });
            }
        };

        if doc.is_encrypted() {
            return Err(ExtractError::Pdf {
                path: path.to_path_buf(),
                message: "document is encrypted".to_string(),
            });
        }

        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        let mut pages = Vec::with_capacity(page_numbers.len());

        for page_num in page_numbers {
            // pdf_extract (and its cff-parser dependency) can panic on certain fonts/glyphs
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                let mut text = String::new();
                {
                    let mut output = PlainTextOutput::new(&mut text);
                    output_doc_page(&doc, &mut output, page_num)?;
                }
                Ok::<_, pdf_extract::OutputError>(text)
            }));

            let page = match result {
                Ok(Ok(text)) => Ok(Self::clean_text(&text)),
                Ok(Err(e)) => Err(e.to_string()),
                Err(payload) => Err(format!("extraction panicked: {}", panic_message(&*payload))),
            };
            if let Err(message) = &page {
                tracing::warn!(
                    "[PdfTextExtractor] Page {} of {} FAILED: {}",
                    page_num,
                    path.display(),
                    message
                );
            }
            pages.push(page);
        }

        tracing::debug!(
            "[PdfTextExtractor] {} pages from {}",
            pages.len(),
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        Ok(pages)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "likely malformed font or page tree".to_string()
    }
}

/// Canned extractor for tests, keyed by file name
#[cfg(test)]
#[derive(Default)]
pub struct StubExtractor {
    pages: std::collections::HashMap<String, Vec<PageText>>,
    failing: std::collections::HashSet<String>,
}

#[cfg(test)]
impl StubExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pages(mut self, file_name: &str, pages: Vec<PageText>) -> Self {
        self.pages.insert(file_name.to_string(), pages);
        self
    }

    /// Single page holding `text`
    pub fn with_text(self, file_name: &str, text: &str) -> Self {
        self.with_pages(file_name, vec![Ok(text.to_string())])
    }

    pub fn with_failure(mut self, file_name: &str) -> Self {
        self.failing.insert(file_name.to_string());
        self
    }
}

#[cfg(test)]
impl TextExtractor for StubExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, ExtractError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.failing.contains(&name) {
            return Err(ExtractError::Pdf {
                path: path.to_path_buf(),
                message: "stub failure".to_string(),
            });
        }
        Ok(self.pages.get(&name).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::Level;
    use crate::test_support::ScriptedConsole;
    use std::io::Write;
    use pdf_extract::{Dictionary, Object, ObjectId, Stream};
    use tempfile::NamedTempFile;

    fn name(n: &str) -> Object {
        Object::Name(n.as_bytes().to_vec())
    }

    /// One page per entry: (text, whether the page carries a MediaBox)
    fn build_pdf(pages: &[(&str, bool)]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut font = Dictionary::new();
        font.set("Type", name("Font"));
        font.set("Subtype", name("Type1"));
        font.set("BaseFont", name("Helvetica"));
        let font_id = doc.add_object(Object::Dictionary(font));

        let mut fonts = Dictionary::new();
        fonts.set("F1", Object::Reference(font_id));
        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(fonts));
        let resources_id = doc.add_object(Object::Dictionary(resources));

        let mut kids: Vec<Object> = Vec::new();
        for (text, with_media_box) in pages {
            let content = format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", text);
            let content_id = doc.add_object(Object::Stream(Stream::new(
                Dictionary::new(),
                content.into_bytes(),
            )));

            let mut page = Dictionary::new();
            page.set("Type", name("Page"));
            page.set("Parent", Object::Reference(pages_id));
            page.set("Contents", Object::Reference(content_id));
            page.set("Resources", Object::Reference(resources_id));
            if *with_media_box {
                page.set(
                    "MediaBox",
                    Object::Array(vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(595),
                        Object::Integer(842),
                    ]),
                );
            }
            let page_id: ObjectId = doc.add_object(Object::Dictionary(page));
            kids.push(Object::Reference(page_id));
        }

        let mut tree = Dictionary::new();
        tree.set("Type", name("Pages"));
        tree.set("Count", Object::Integer(kids.len() as i64));
        tree.set("Kids", Object::Array(kids));
        doc.objects.insert(pages_id, Object::Dictionary(tree));

        let mut catalog = Dictionary::new();
        catalog.set("Type", name("Catalog"));
        catalog.set("Pages", Object::Reference(pages_id));
        let catalog_id = doc.add_object(Object::Dictionary(catalog));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    fn write_pdf(pages: &[(&str, bool)]) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".pdf").unwrap();
        file.write_all(&build_pdf(pages)).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_clean_text() {
        let messy = "  Line 1  \n\n  Line 2  \n  \n  Line 3  ";
        let cleaned = PdfTextExtractor::clean_text(messy);
        assert_eq!(cleaned, "Line 1\nLine 2\nLine 3");
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = PdfTextExtractor::new().extract_pages(Path::new("/definitely/not/here.pdf"));
        assert!(matches!(result, Err(ExtractError::Read { .. })));
    }

    #[test]
    fn test_garbage_pdf_is_reported_not_panicking() {
        let mut file = NamedTempFile::with_suffix(".pdf").unwrap();
        writeln!(file, "this is not a pdf").unwrap();

        let result = PdfTextExtractor::new().extract_pages(file.path());
        assert!(matches!(
            result,
            Err(ExtractError::Pdf { .. }) | Err(ExtractError::Panicked { .. })
        ));
    }

    #[test]
    fn test_pages_are_extracted_in_order() {
        let file = write_pdf(&[("Term sheet", true), ("ISIN US0378331005", true)]);

        let pages = PdfTextExtractor::new().extract_pages(file.path()).unwrap();

        assert_eq!(pages.len(), 2);
        assert!(pages[0].as_ref().unwrap().contains("Term sheet"));
        assert!(pages[1].as_ref().unwrap().contains("US0378331005"));
    }

    #[test]
    fn test_broken_page_does_not_lose_later_pages() {
        let file = write_pdf(&[
            ("Term sheet", true),
            ("no media box here", false),
            ("ISIN US0378331005", true),
        ]);

        let pages = PdfTextExtractor::new().extract_pages(file.path()).unwrap();

        assert_eq!(pages.len(), 3);
        assert!(pages[0].is_ok());
        assert!(pages[1].is_err());
        assert!(pages[2].as_ref().unwrap().contains("US0378331005"));

        let mut console = ScriptedConsole::new(&[]);
        let found = crate::isin::from_document(file.path(), &PdfTextExtractor::new(), &mut console);
        assert_eq!(found.map(|i| i.to_string()), Some("US0378331005".to_string()));
        assert!(console.saw("could not read page 2"));
        assert_eq!(console.count_level(Level::Error), 0);
    }
}
