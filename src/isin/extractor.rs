//! Locating ISINs in file names and document text.
//!
//! The `regex` crate has no look-around, so the "not glued to another
//! alphanumeric" rule is checked by hand around every match. Every match,
//! kept or not, restarts the scan one character further on: a 13-character
//! token never produces a 12-character sub-match, and a lenient candidate
//! that fails the checksum cannot hide a valid ISIN overlapping its tail.

use super::codec::{normalize, Isin};
use crate::console::{Console, Level};
use crate::document::TextExtractor;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// Contiguous ISIN shape
static STRICT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z]{2}[A-Za-z0-9]{9}[0-9]").expect("strict ISIN pattern compiles")
});

/// ISIN shape with whitespace/hyphen runs allowed after the country prefix
static LENIENT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z]{2}(?:[\s\-]*[A-Za-z0-9]){9}[\s\-]*[0-9]")
        .expect("lenient ISIN pattern compiles")
});

/// Marker shown in place of an identifier that could not be determined
pub const UNDETERMINED: &str = "ISIN undetermined";

/// Render an optional identifier for reports
pub fn display_or_undetermined(isin: Option<&Isin>) -> String {
    isin.map(ToString::to_string)
        .unwrap_or_else(|| UNDETERMINED.to_string())
}

fn is_word_char(c: Option<char>) -> bool {
    c.is_some_and(|c| c.is_ascii_alphanumeric())
}

fn is_bounded(text: &str, start: usize, end: usize) -> bool {
    !is_word_char(text[..start].chars().next_back()) && !is_word_char(text[end..].chars().next())
}

/// Matches of `re` that are not adjacent to an alphanumeric, one per start
/// position. Both patterns match at most one span from a given start.
fn bounded_matches<'t>(re: &'t Regex, text: &'t str) -> impl Iterator<Item = &'t str> + 't {
    let mut pos = 0;
    std::iter::from_fn(move || {
        while pos <= text.len() {
            let m = re.find_at(text, pos)?;
            // matches start with an ASCII letter, so +1 stays on a char boundary
            pos = m.start() + 1;
            if is_bounded(text, m.start(), m.end()) {
                return Some(m.as_str());
            }
        }
        None
    })
}

/// First valid ISIN in `text`, trying the lenient scan before the strict one
pub fn extract(text: &str) -> Option<Isin> {
    for candidate in bounded_matches(&LENIENT_PATTERN, text) {
        let code = normalize(candidate);
        let strict_ok = bounded_matches(&STRICT_PATTERN, &code).next().is_some();
        if strict_ok {
            if let Ok(isin) = Isin::parse(&code) {
                return Some(isin);
            }
        }
    }

    bounded_matches(&STRICT_PATTERN, text)
        .next()
        .and_then(|candidate| Isin::parse(candidate).ok())
}

/// ISIN from a file name, ignoring its extension
pub fn from_file_name(name: &str) -> Option<Isin> {
    let stem = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    extract(&stem)
}

/// ISIN from the file name of `path`
pub fn from_path_name(path: &Path) -> Option<Isin> {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(from_file_name)
}

/// ISIN from the text content of the document at `path`.
///
/// Pages that fail are reported and skipped. A document that cannot be read
/// at all is reported and treated as having no identifier.
pub fn from_document(
    path: &Path,
    extractor: &dyn TextExtractor,
    console: &mut dyn Console,
) -> Option<Isin> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let pages = match extractor.extract_pages(path) {
        Ok(pages) => pages,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "document extraction failed");
            console.report(&format!("Failed to read PDF {}: {}", name, e), Level::Error);
            return None;
        }
    };

    let mut parts: Vec<String> = Vec::with_capacity(pages.len());
    for (index, page) in pages.into_iter().enumerate() {
        match page {
            Ok(text) if !text.is_empty() => parts.push(text),
            Ok(_) => {}
            Err(message) => console.report(
                &format!("Warning: could not read page {} of {}: {}", index + 1, name, message),
                Level::Warning,
            ),
        }
    }

    let text = parts.join(" ");
    if text.trim().is_empty() {
        tracing::debug!(path = %path.display(), "no extractable text");
        return None;
    }

    let found = extract(&text);
    tracing::debug!(
        path = %path.display(),
        chars = text.len(),
        isin = ?found.as_ref().map(Isin::as_str),
        "content identifier"
    );
    found
}
