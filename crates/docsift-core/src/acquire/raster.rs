use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use thiserror::Error;

use super::tool::{ExternalTool, ToolError};

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Rasterizer tool error: {0}")]
    Tool(#[from] ToolError),
    #[error("Temporary directory error: {0}")]
    TempDir(#[from] std::io::Error),
}

pub type RasterResult<T> = Result<T, RasterError>;

/// Page images in page order, living in a temporary directory that is
/// removed when this value is dropped.
#[derive(Debug)]
pub struct RasterizedPages {
    dir: TempDir,
    pages: Vec<PathBuf>,
}

impl RasterizedPages {
    #[must_use]
    pub const fn new(dir: TempDir, pages: Vec<PathBuf>) -> Self {
        Self { dir, pages }
    }

    pub fn pages(&self) -> &[PathBuf] {
        &self.pages
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[async_trait::async_trait]
pub trait PageRasterizer: Send + Sync {
    /// Renders every page of `pdf` to an image at `dpi`.
    async fn rasterize(&self, pdf: &Path, dpi: u32) -> RasterResult<RasterizedPages>;
}

/// Poppler's `pdftoppm`, writing one PNG per page.
pub struct PdftoppmRasterizer {
    tool: ExternalTool,
}

impl PdftoppmRasterizer {
    #[must_use]
    pub const fn new(tool: ExternalTool) -> Self {
        Self { tool }
    }
}

#[async_trait::async_trait]
impl PageRasterizer for PdftoppmRasterizer {
    async fn rasterize(&self, pdf: &Path, dpi: u32) -> RasterResult<RasterizedPages> {
        let dir = tempfile::Builder::new().prefix("docsift-pages-").tempdir()?;
        let prefix = dir.path().join("page");

        let dpi_arg = dpi.to_string();
        let args: [&OsStr; 5] = [
            OsStr::new("-r"),
            OsStr::new(&dpi_arg),
            OsStr::new("-png"),
            pdf.as_os_str(),
            prefix.as_os_str(),
        ];
        self.tool.run(args).await?;

        let pages = page_images(dir.path())?;
        tracing::debug!(
            pdf = %pdf.display(),
            pages = pages.len(),
            dpi,
            "Rasterized PDF pages"
        );

        Ok(RasterizedPages::new(dir, pages))
    }
}

/// `page-1.png`, `page-02.png`, ... sorted by page number.
fn page_images(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut numbered: Vec<(u32, PathBuf)> = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter_map(|path| {
            let stem = path.file_stem()?.to_str()?;
            let number = stem.rsplit('-').next()?.parse().ok()?;
            Some((number, path))
        })
        .collect();

    numbered.sort();
    Ok(numbered.into_iter().map(|(_, p)| p).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_images_sorted_numerically() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["page-10.png", "page-02.png", "page-1.png", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let pages = page_images(dir.path()).unwrap();
        let names: Vec<_> = pages
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, ["page-1.png", "page-02.png", "page-10.png"]);
    }

    #[test]
    fn test_rasterized_pages_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let page = dir.path().join("page-1.png");
        std::fs::write(&page, b"png").unwrap();
        let path = dir.path().to_path_buf();

        let pages = RasterizedPages::new(dir, vec![page]);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages.dir(), path);
        assert!(path.exists());

        drop(pages);
        assert!(!path.exists());
    }
}
