use super::reader::{ReadError, ReadResult};

/// Direct text-layer extraction, one string per page in page order.
pub trait PdfTextLayer: Send + Sync {
    fn page_texts(&self, data: &[u8]) -> ReadResult<Vec<String>>;
}

/// Text layer via the `pdf-extract` crate. Handles digital PDFs; a scanned
/// PDF comes back as blank pages.
pub struct PdfExtractLayer;

impl PdfTextLayer for PdfExtractLayer {
    fn page_texts(&self, data: &[u8]) -> ReadResult<Vec<String>> {
        pdf_extract::extract_text_from_mem_by_pages(data).map_err(|e| ReadError::Pdf(e.to_string()))
    }
}

/// Pages joined with newlines and trimmed. Empty means the PDF has no usable
/// text layer.
pub fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .filter(|p| !p.trim().is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_pdf_is_error() {
        let result = PdfExtractLayer.page_texts(b"not a pdf");
        assert!(matches!(result, Err(ReadError::Pdf(_))));
    }

    #[test]
    fn test_join_pages_skips_blank_pages() {
        let pages = vec![
            "Page one".to_string(),
            "  \n ".to_string(),
            "Page three\n".to_string(),
        ];
        assert_eq!(join_pages(&pages), "Page one\nPage three");
    }

    #[test]
    fn test_whitespace_only_layer_is_empty() {
        let pages = vec![" ".to_string(), "\n\n".to_string()];
        assert!(join_pages(&pages).is_empty());
    }
}
