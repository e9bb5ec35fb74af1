use std::path::Path;

use docqa_core::Page;

use super::IngestError;

/// Extracts per-page text from a stored document.
///
/// Implementations are blocking and run on the blocking pool.
pub trait DocumentLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Vec<Page>, IngestError>;
}

/// PDF text extraction via `pdf-extract`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfLoader;

impl DocumentLoader for PdfLoader {
    fn load(&self, path: &Path) -> Result<Vec<Page>, IngestError> {
        // pdf-extract panics on some malformed inputs
        let extracted = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            pdf_extract::extract_text_by_pages(path)
        }));

        let pages = match extracted {
            Ok(Ok(pages)) => pages,
            Ok(Err(e)) => {
                return Err(IngestError::Unreadable {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            },
            Err(_) => {
                return Err(IngestError::Unreadable {
                    path: path.to_path_buf(),
                    reason: "PDF parser crashed on this file".to_owned(),
                });
            },
        };

        Ok(pages
            .into_iter()
            .zip(1u32..)
            .map(|(text, number)| Page { number, text })
            .collect())
    }
}
