//! Flat-file corpus of crawled pages.
//!
//! One block per page, in crawl order:
//!
//! ```text
//!
//! --- URL: https://www.mosdac.gov.in/ ---
//! <page text>
//! ```

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::CorpusError;

use super::PageRecord;

/// Result type for corpus operations.
pub type CorpusResult<T> = std::result::Result<T, CorpusError>;

const HEADER_PREFIX: &str = "--- URL: ";
const HEADER_SUFFIX: &str = " ---";

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> CorpusError + '_ {
    move |source| CorpusError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Render pages in the corpus block format.
pub fn render_corpus(pages: &[PageRecord]) -> String {
    let mut out = String::new();
    for page in pages {
        out.push('\n');
        out.push_str(HEADER_PREFIX);
        out.push_str(&page.url);
        out.push_str(HEADER_SUFFIX);
        out.push('\n');
        out.push_str(&page.text);
        out.push('\n');
    }
    out
}

/// Write pages to `path`, creating parent directories as needed.
pub fn write_corpus(pages: &[PageRecord], path: &Path) -> CorpusResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    let file = fs::File::create(path).map_err(io_error(path))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(render_corpus(pages).as_bytes())
        .and_then(|()| writer.flush())
        .map_err(io_error(path))?;

    info!(path = %path.display(), pages = pages.len(), "corpus saved");
    Ok(())
}

/// Parse corpus text back into page records.
///
/// A header line only counts at the start of the file or after a blank line,
/// which is how [`render_corpus`] writes it. Extracted page text never holds
/// blank lines, so a header-shaped line inside a page stays page text.
///
/// Text with no block headers at all is treated as a single untitled page
/// whose URL is `fallback_url`, so hand-written fact files work too.
pub fn parse_corpus(content: &str, fallback_url: &str) -> Vec<PageRecord> {
    let mut pages: Vec<PageRecord> = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;
    let mut preamble: Vec<&str> = Vec::new();
    let mut after_blank = true;

    for line in content.lines() {
        let header = line
            .strip_prefix(HEADER_PREFIX)
            .and_then(|rest| rest.strip_suffix(HEADER_SUFFIX))
            .filter(|_| after_blank);
        after_blank = line.trim().is_empty();
        if let Some(next_url) = header {
            if let Some((url, lines)) = current.take() {
                pages.push(PageRecord {
                    url,
                    text: lines.join("\n").trim().to_string(),
                });
            }
            current = Some((next_url.trim().to_string(), Vec::new()));
        } else if let Some((_, lines)) = current.as_mut() {
            lines.push(line);
        } else {
            preamble.push(line);
        }
    }

    if let Some((url, lines)) = current {
        pages.push(PageRecord {
            url,
            text: lines.join("\n").trim().to_string(),
        });
    }

    if pages.is_empty() {
        let text = preamble.join("\n").trim().to_string();
        if !text.is_empty() {
            pages.push(PageRecord {
                url: fallback_url.to_string(),
                text,
            });
        }
    }

    pages
}

/// Read a corpus file written by [`write_corpus`] (or a plain text file).
pub fn read_corpus(path: &Path) -> CorpusResult<Vec<PageRecord>> {
    let content = fs::read_to_string(path).map_err(io_error(path))?;
    let pages = parse_corpus(&content, &path.display().to_string());
    info!(path = %path.display(), pages = pages.len(), "corpus loaded");
    Ok(pages)
}
