use crate::domain::error::{IngestionFailure, Result};
use lopdf::Document;
use tracing::debug;

/// Extracts the text layer of a PDF held in memory.
///
/// Pages are joined with `\n`; pages whose text cannot be extracted, or that
/// carry only whitespace, contribute nothing.
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    let document = Document::load_mem(bytes)
        .map_err(|e| IngestionFailure::PdfUnreadable(e.to_string()))?;

    let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
    let page_count = page_numbers.len();
    let pages = page_numbers.into_iter().map(|page_number| {
        document.extract_text(&[page_number]).unwrap_or_else(|err| {
            debug!(page_number, error = %err, "Skipping page without extractable text");
            String::new()
        })
    });

    let text = join_pages(pages);
    debug!(page_count, chars = text.len(), "Extracted PDF text");
    Ok(text)
}

pub(crate) fn join_pages<I>(pages: I) -> String
where
    I: IntoIterator<Item = String>,
{
    pages
        .into_iter()
        .map(|page| page.trim_end_matches(['\r', '\n']).to_string())
        .filter(|page| !page.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
