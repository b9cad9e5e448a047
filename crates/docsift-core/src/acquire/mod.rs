//! Text acquisition: native structural readers first, OCR only when the fast
//! path yields nothing.
//!
//! Acquisition never fails the batch. Every outcome is an [`Acquisition`],
//! either text with the method that produced it or an explicit empty reason.

mod ocr;
mod pdf;
mod raster;
mod reader;
mod tool;

pub use ocr::{fragments_to_text, OcrEngine, OcrError, OcrFragment, OcrResult, Region, TesseractEngine};
pub use pdf::{join_pages, PdfExtractLayer, PdfTextLayer};
pub use raster::{PageRasterizer, PdftoppmRasterizer, RasterError, RasterResult, RasterizedPages};
pub use reader::{
    CompositeReader, JsonReader, OfficeReader, PlainTextReader, ReadError, ReadResult, TextReader,
};
pub use tool::{CommandOutput, ExternalTool, ToolError, ToolResult};

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{OcrConfig, DEFAULT_OCR_DPI};
use crate::document::{DocumentFormat, FormatClass};

/// Separates per-page OCR text of a scanned PDF.
pub const PAGE_BREAK: &str = "\n\u{c}\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquisitionMethod {
    NativeText,
    PdfTextLayer,
    PdfOcr,
    ImageOcr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum EmptyReason {
    /// The file could not be opened or parsed.
    Unreadable(String),
    /// Every attempt ran and produced only whitespace.
    NoText,
    /// Text needed OCR and no OCR engine is configured.
    OcrUnavailable,
    Unsupported,
}

impl std::fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreadable(e) => write!(f, "unreadable: {e}"),
            Self::NoText => f.write_str("no text found"),
            Self::OcrUnavailable => f.write_str("needs OCR, none available"),
            Self::Unsupported => f.write_str("unsupported file type"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acquisition {
    Text {
        text: String,
        method: AcquisitionMethod,
    },
    Empty {
        reason: EmptyReason,
    },
}

impl Acquisition {
    fn from_text(text: String, method: AcquisitionMethod) -> Self {
        if text.trim().is_empty() {
            Self::Empty {
                reason: EmptyReason::NoText,
            }
        } else {
            Self::Text { text, method }
        }
    }

    const fn empty(reason: EmptyReason) -> Self {
        Self::Empty { reason }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Text { text, .. } => text,
            Self::Empty { .. } => "",
        }
    }

    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }

    pub const fn method(&self) -> Option<AcquisitionMethod> {
        match self {
            Self::Text { method, .. } => Some(*method),
            Self::Empty { .. } => None,
        }
    }

    pub const fn empty_reason(&self) -> Option<&EmptyReason> {
        match self {
            Self::Text { .. } => None,
            Self::Empty { reason } => Some(reason),
        }
    }
}

#[async_trait::async_trait]
pub trait TextAcquirer: Send + Sync {
    /// Best-effort text for the file at `path`, classified by extension.
    async fn acquire(&self, path: &Path) -> Acquisition;
}

/// The production acquirer: structural readers, PDF text layer, then OCR of
/// rasterized pages.
pub struct LayeredAcquirer {
    readers: Arc<CompositeReader>,
    pdf_layer: Arc<dyn PdfTextLayer>,
    ocr: Option<Arc<dyn OcrEngine>>,
    rasterizer: Option<Arc<dyn PageRasterizer>>,
    dpi: u32,
}

impl LayeredAcquirer {
    /// Native readers and the PDF text layer, without OCR.
    #[must_use]
    pub fn new() -> Self {
        Self {
            readers: Arc::new(CompositeReader::default()),
            pdf_layer: Arc::new(PdfExtractLayer),
            ocr: None,
            rasterizer: None,
            dpi: DEFAULT_OCR_DPI,
        }
    }

    /// Locates the OCR binaries once. A missing binary disables only the
    /// stage that needs it.
    pub fn from_config(config: &OcrConfig) -> Self {
        let mut acquirer = Self::new().with_dpi(config.dpi);
        if !config.enabled {
            tracing::info!("OCR disabled");
            return acquirer;
        }

        match ExternalTool::locate("tesseract", config.tesseract.as_deref()) {
            Ok(tool) => {
                let engine = TesseractEngine::new(tool, &config.languages);
                tracing::info!(
                    engine = engine.name(),
                    languages = engine.languages(),
                    "OCR engine ready"
                );
                acquirer = acquirer.with_ocr(Arc::new(engine));
            }
            Err(e) => tracing::warn!("OCR unavailable, scanned documents will be skipped: {e}"),
        }

        match ExternalTool::locate("pdftoppm", config.pdftoppm.as_deref()) {
            Ok(tool) => {
                acquirer = acquirer.with_rasterizer(Arc::new(PdftoppmRasterizer::new(tool)));
            }
            Err(e) => tracing::warn!("PDF rasterizer unavailable, scanned PDFs will be skipped: {e}"),
        }

        acquirer
    }

    #[must_use]
    pub fn with_pdf_layer(mut self, layer: Arc<dyn PdfTextLayer>) -> Self {
        self.pdf_layer = layer;
        self
    }

    #[must_use]
    pub fn with_ocr(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.ocr = Some(engine);
        self
    }

    #[must_use]
    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn PageRasterizer>) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    #[must_use]
    pub const fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    pub const fn has_ocr(&self) -> bool {
        self.ocr.is_some()
    }

    async fn acquire_native(&self, path: &Path, format: DocumentFormat) -> Acquisition {
        let data = match tokio::fs::read(path).await {
            Ok(data) => data,
            Err(e) => return Acquisition::empty(EmptyReason::Unreadable(e.to_string())),
        };

        let readers = Arc::clone(&self.readers);
        let parsed = tokio::task::spawn_blocking(move || readers.read_bytes(&data, format)).await;

        match parsed {
            Ok(Ok(text)) => Acquisition::from_text(text, AcquisitionMethod::NativeText),
            Ok(Err(e)) => Acquisition::empty(EmptyReason::Unreadable(e.to_string())),
            Err(e) => Acquisition::empty(EmptyReason::Unreadable(format!("reader panicked: {e}"))),
        }
    }

    async fn acquire_pdf(&self, path: &Path) -> Acquisition {
        let data = match tokio::fs::read(path).await {
            Ok(data) => data,
            Err(e) => return Acquisition::empty(EmptyReason::Unreadable(e.to_string())),
        };

        let layer = Arc::clone(&self.pdf_layer);
        let parsed = tokio::task::spawn_blocking(move || layer.page_texts(&data)).await;

        let layer_error = match parsed {
            Ok(Ok(pages)) => {
                let text = join_pages(&pages);
                if !text.is_empty() {
                    return Acquisition::Text {
                        text,
                        method: AcquisitionMethod::PdfTextLayer,
                    };
                }
                None
            }
            Ok(Err(e)) => Some(e.to_string()),
            Err(e) => Some(format!("text layer panicked: {e}")),
        };

        tracing::debug!(
            file = %path.display(),
            error = layer_error.as_deref().unwrap_or("blank text layer"),
            "Falling back to OCR"
        );

        match self.ocr_pdf(path).await {
            Some(acquisition) => acquisition,
            None => Acquisition::empty(
                layer_error.map_or(EmptyReason::OcrUnavailable, EmptyReason::Unreadable),
            ),
        }
    }

    /// `None` when OCR or rasterization is not configured.
    async fn ocr_pdf(&self, path: &Path) -> Option<Acquisition> {
        let (Some(engine), Some(rasterizer)) = (&self.ocr, &self.rasterizer) else {
            return None;
        };

        let pages = match rasterizer.rasterize(path, self.dpi).await {
            Ok(pages) => pages,
            Err(e) => {
                tracing::warn!(file = %path.display(), "Rasterization failed: {e}");
                return Some(Acquisition::empty(EmptyReason::Unreadable(e.to_string())));
            }
        };

        tracing::debug!(
            file = %path.display(),
            engine = engine.name(),
            pages = pages.len(),
            dir = %pages.dir().display(),
            "Running OCR on rasterized pages"
        );

        let mut page_texts = Vec::with_capacity(pages.len());
        for (index, page) in pages.pages().iter().enumerate() {
            match engine.recognize(page).await {
                Ok(fragments) => page_texts.push(fragments_to_text(&fragments)),
                Err(e) => {
                    tracing::warn!(file = %path.display(), page = index + 1, "OCR failed: {e}");
                    page_texts.push(String::new());
                }
            }
        }
        drop(pages);

        Some(Acquisition::from_text(
            page_texts.join(PAGE_BREAK),
            AcquisitionMethod::PdfOcr,
        ))
    }

    async fn acquire_image(&self, path: &Path) -> Acquisition {
        let Some(engine) = &self.ocr else {
            return Acquisition::empty(EmptyReason::OcrUnavailable);
        };

        match engine.recognize(path).await {
            Ok(fragments) => {
                Acquisition::from_text(fragments_to_text(&fragments), AcquisitionMethod::ImageOcr)
            }
            Err(e) => Acquisition::empty(EmptyReason::Unreadable(e.to_string())),
        }
    }
}

impl Default for LayeredAcquirer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TextAcquirer for LayeredAcquirer {
    async fn acquire(&self, path: &Path) -> Acquisition {
        let Some(format) = DocumentFormat::from_path(path) else {
            return Acquisition::empty(EmptyReason::Unsupported);
        };

        let acquisition = match format.class() {
            FormatClass::NativeText => self.acquire_native(path, format).await,
            FormatClass::Pdf => self.acquire_pdf(path).await,
            FormatClass::Image => self.acquire_image(path).await,
        };

        match &acquisition {
            Acquisition::Text { text, method } => tracing::debug!(
                file = %path.display(),
                method = ?method,
                chars = text.chars().count(),
                "Acquired text"
            ),
            Acquisition::Empty { reason } => {
                tracing::warn!(file = %path.display(), "No text acquired: {reason}");
            }
        }

        acquisition
    }
}
