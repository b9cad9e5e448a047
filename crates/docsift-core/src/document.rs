use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    PlainText,
    Json,
    Docx,
    Pptx,
    Xlsx,
    Pdf,
    Png,
    Jpeg,
    Tiff,
    Bmp,
}

/// How text is obtained for a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatClass {
    /// The container's own structure holds the text runs.
    NativeText,
    /// Text layer first, OCR of rasterized pages when it is blank.
    Pdf,
    /// OCR only.
    Image,
}

impl DocumentFormat {
    pub const ALL: [Self; 10] = [
        Self::PlainText,
        Self::Json,
        Self::Docx,
        Self::Pptx,
        Self::Xlsx,
        Self::Pdf,
        Self::Png,
        Self::Jpeg,
        Self::Tiff,
        Self::Bmp,
    ];

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "txt" => Some(Self::PlainText),
            "json" => Some(Self::Json),
            "docx" => Some(Self::Docx),
            "pptx" => Some(Self::Pptx),
            "xlsx" => Some(Self::Xlsx),
            "pdf" => Some(Self::Pdf),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "tif" | "tiff" => Some(Self::Tiff),
            "bmp" => Some(Self::Bmp),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    #[must_use]
    pub const fn class(self) -> FormatClass {
        match self {
            Self::PlainText | Self::Json | Self::Docx | Self::Pptx | Self::Xlsx => {
                FormatClass::NativeText
            }
            Self::Pdf => FormatClass::Pdf,
            Self::Png | Self::Jpeg | Self::Tiff | Self::Bmp => FormatClass::Image,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PlainText => "txt",
            Self::Json => "json",
            Self::Docx => "docx",
            Self::Pptx => "pptx",
            Self::Xlsx => "xlsx",
            Self::Pdf => "pdf",
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Tiff => "tiff",
            Self::Bmp => "bmp",
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file selected for analysis. Bytes are read during acquisition and
/// dropped once text is produced.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub format: DocumentFormat,
}

impl Document {
    /// Returns `None` for files without a supported extension.
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let format = DocumentFormat::from_path(&path)?;
        Some(Self { path, format })
    }

    pub fn file_name(&self) -> String {
        self.path.file_name().map_or_else(
            || "unnamed".to_string(),
            |n| n.to_string_lossy().to_string(),
        )
    }

    pub fn stem(&self) -> String {
        self.path.file_stem().map_or_else(
            || "unnamed".to_string(),
            |n| n.to_string_lossy().to_string(),
        )
    }
}
