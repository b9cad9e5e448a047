use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::tool::{ExternalTool, ToolError};

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR tool error: {0}")]
    Tool(#[from] ToolError),
    #[error("Image path is not valid UTF-8: {0}")]
    InvalidPath(String),
}

pub type OcrResult<T> = Result<T, OcrError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// One recognized piece of text as reported by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrFragment {
    pub region: Option<Region>,
    pub text: String,
    pub confidence: f32,
}

impl OcrFragment {
    #[must_use]
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            region: None,
            text: text.into(),
            confidence,
        }
    }

    #[must_use]
    pub const fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }
}

/// Process-wide OCR service. Implementations are constructed once at startup
/// and shared read-only by every acquisition.
#[async_trait::async_trait]
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &str;

    async fn recognize(&self, image: &Path) -> OcrResult<Vec<OcrFragment>>;
}

/// Joins fragment text with single spaces in engine order. Region and
/// confidence are not used.
pub fn fragments_to_text(fragments: &[OcrFragment]) -> String {
    fragments
        .iter()
        .map(|f| f.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Tesseract driven through its command line, reading word-level TSV.
pub struct TesseractEngine {
    tool: ExternalTool,
    languages: String,
}

impl TesseractEngine {
    pub fn new(tool: ExternalTool, languages: impl Into<String>) -> Self {
        Self {
            tool,
            languages: languages.into(),
        }
    }

    pub fn languages(&self) -> &str {
        &self.languages
    }
}

#[async_trait::async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        self.tool.name()
    }

    async fn recognize(&self, image: &Path) -> OcrResult<Vec<OcrFragment>> {
        let image_arg = image
            .to_str()
            .ok_or_else(|| OcrError::InvalidPath(image.display().to_string()))?;

        let output = self
            .tool
            .run([image_arg, "stdout", "-l", self.languages.as_str(), "tsv"])
            .await?;

        let fragments = parse_tsv(&output.stdout);
        tracing::debug!(
            image = %image.display(),
            fragments = fragments.len(),
            "Tesseract recognized image"
        );
        Ok(fragments)
    }
}

/// Word rows (level 5) of tesseract TSV output:
/// `level page block par line word left top width height conf text`.
/// Confidence is 0-100 and scaled to 0.0-1.0.
fn parse_tsv(tsv: &str) -> Vec<OcrFragment> {
    tsv.lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 12 || fields[0] != "5" {
                return None;
            }

            let text = fields[11].trim();
            if text.is_empty() {
                return None;
            }

            let number = |i: usize| fields[i].trim().parse::<u32>().unwrap_or(0);
            let confidence = fields[10].trim().parse::<f32>().unwrap_or(0.0).max(0.0) / 100.0;

            Some(
                OcrFragment::new(text, confidence).with_region(Region {
                    left: number(6),
                    top: number(7),
                    width: number(8),
                    height: number(9),
                }),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TSV: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t2480\t3508\t-1\t
4\t1\t1\t1\t1\t0\t100\t120\t800\t40\t-1\t
5\t1\t1\t1\t1\t1\t100\t120\t200\t40\t96.5\tLease
5\t1\t1\t1\t1\t2\t310\t120\t300\t40\t91\tAgreement
5\t1\t1\t1\t1\t3\t620\t120\t10\t40\t12\t ";

    #[test]
    fn test_parse_tsv_keeps_words_in_order() {
        let fragments = parse_tsv(TSV);
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].text, "Lease");
        assert_eq!(fragments[1].text, "Agreement");
        assert!((fragments[0].confidence - 0.965).abs() < 1e-6);
        assert_eq!(
            fragments[1].region,
            Some(Region {
                left: 310,
                top: 120,
                width: 300,
                height: 40
            })
        );
    }

    #[test]
    fn test_fragments_joined_with_single_spaces() {
        let fragments = vec![
            OcrFragment::new("Monthly ", 0.9),
            OcrFragment::new("", 0.1),
            OcrFragment::new(" rental", 0.8),
            OcrFragment::new("R5000", 0.4),
        ];
        assert_eq!(fragments_to_text(&fragments), "Monthly rental R5000");
    }

    #[test]
    fn test_no_fragments_is_empty_text() {
        assert_eq!(fragments_to_text(&[]), "");
    }

    #[cfg(unix)]
    #[test]
    fn test_tesseract_engine_identity() {
        let Ok(tool) = ExternalTool::locate("tesseract", Some(Path::new("/bin/sh"))) else {
            return;
        };

        let engine = TesseractEngine::new(tool, "eng+afr");
        assert_eq!(engine.name(), "tesseract");
        assert_eq!(engine.languages(), "eng+afr");
    }
}
