use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use docsift_core::config::{parse_dpi, ConfigError};
use docsift_core::OcrConfig;

#[derive(Parser)]
#[command(
    name = "docsift",
    about = "Extract lease terms or PII from a folder of documents",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze lease agreements: parties, dates, amounts, clauses and a health score
    Lease(ScanArgs),
    /// Scan documents for identity numbers, contact details and demographic terms
    Pii(ScanArgs),
}

#[derive(Args)]
pub struct ScanArgs {
    /// Folder containing the documents to analyze
    pub input: PathBuf,
    /// Folder for per-file results and the summary table (created if missing)
    pub output: PathBuf,
    /// Tesseract language codes joined with '+'
    #[arg(long = "ocr-lang", value_name = "LANGS")]
    pub ocr_lang: Option<String>,
    /// Resolution for rasterizing scanned PDF pages
    #[arg(long, value_parser = dpi_arg)]
    pub dpi: Option<u32>,
    /// Path to the tesseract binary
    #[arg(long, value_name = "PATH")]
    pub tesseract: Option<PathBuf>,
    /// Path to the pdftoppm binary
    #[arg(long, value_name = "PATH")]
    pub pdftoppm: Option<PathBuf>,
    /// Never run OCR; scanned documents get no text
    #[arg(long = "no-ocr")]
    pub no_ocr: bool,
    /// Don't print the result table
    #[arg(short, long)]
    pub quiet: bool,
}

impl ScanArgs {
    /// Flags take precedence over the environment.
    pub fn ocr_config(&self) -> Result<OcrConfig, ConfigError> {
        let mut config = OcrConfig::from_env()?;
        if let Some(langs) = &self.ocr_lang {
            config.languages.clone_from(langs);
        }
        if let Some(dpi) = self.dpi {
            config.dpi = dpi;
        }
        if let Some(path) = &self.tesseract {
            config.tesseract = Some(path.clone());
        }
        if let Some(path) = &self.pdftoppm {
            config.pdftoppm = Some(path.clone());
        }
        if self.no_ocr {
            config.enabled = false;
        }
        Ok(config)
    }
}

fn dpi_arg(value: &str) -> Result<u32, String> {
    parse_dpi(value).map_err(|e| e.to_string())
}
