use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::pipeline::PipelineVariant;

pub const DEFAULT_OCR_LANGUAGES: &str = "eng+afr";
pub const DEFAULT_OCR_DPI: u32 = 200;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Please select both input and output folders")]
    MissingPath,
    #[error("Input folder does not exist: {0}")]
    InputNotFound(PathBuf),
    #[error("Input path is not a folder: {0}")]
    InputNotDirectory(PathBuf),
    #[error("Output path exists and is not a folder: {0}")]
    OutputNotDirectory(PathBuf),
    #[error("Cannot create output folder {path}: {source}")]
    CreateOutput {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid value for {key}: {value}")]
    InvalidSetting { key: String, value: String },
}

/// OCR fallback settings. Defaults read English and Afrikaans at 200 DPI,
/// with both binaries looked up on `PATH`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrConfig {
    pub enabled: bool,
    pub languages: String,
    pub dpi: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tesseract: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdftoppm: Option<PathBuf>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            languages: DEFAULT_OCR_LANGUAGES.to_string(),
            dpi: DEFAULT_OCR_DPI,
            tesseract: None,
            pdftoppm: None,
        }
    }
}

impl OcrConfig {
    /// Defaults overridden by `DOCSIFT_OCR_LANG`, `DOCSIFT_OCR_DPI`,
    /// `DOCSIFT_TESSERACT`, `DOCSIFT_PDFTOPPM` and `DOCSIFT_NO_OCR`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(langs) = lookup("DOCSIFT_OCR_LANG").filter(|v| !v.trim().is_empty()) {
            config.languages = langs.trim().to_string();
        }
        if let Some(dpi) = lookup("DOCSIFT_OCR_DPI") {
            config.dpi = parse_dpi(&dpi)?;
        }
        config.tesseract = lookup("DOCSIFT_TESSERACT").map(PathBuf::from);
        config.pdftoppm = lookup("DOCSIFT_PDFTOPPM").map(PathBuf::from);
        if let Some(v) = lookup("DOCSIFT_NO_OCR") {
            config.enabled = !(v == "1" || v.eq_ignore_ascii_case("true"));
        }

        Ok(config)
    }
}

pub fn parse_dpi(value: &str) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(dpi) if (50..=1200).contains(&dpi) => Ok(dpi),
        _ => Err(ConfigError::InvalidSetting {
            key: "dpi".to_string(),
            value: value.to_string(),
        }),
    }
}

/// Directory-level parameters of one batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub variant: PipelineVariant,
}

impl RunConfig {
    pub fn new(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        variant: PipelineVariant,
    ) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            variant,
        }
    }

    /// Rejects unusable paths before any document is touched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if is_blank(&self.input_dir) || is_blank(&self.output_dir) {
            return Err(ConfigError::MissingPath);
        }
        if !self.input_dir.exists() {
            return Err(ConfigError::InputNotFound(self.input_dir.clone()));
        }
        if !self.input_dir.is_dir() {
            return Err(ConfigError::InputNotDirectory(self.input_dir.clone()));
        }
        if self.output_dir.exists() && !self.output_dir.is_dir() {
            return Err(ConfigError::OutputNotDirectory(self.output_dir.clone()));
        }
        Ok(())
    }

    /// Validates, then creates the output directory if needed.
    pub fn prepare(&self) -> Result<(), ConfigError> {
        self.validate()?;
        std::fs::create_dir_all(&self.output_dir).map_err(|source| ConfigError::CreateOutput {
            path: self.output_dir.clone(),
            source,
        })
    }
}

fn is_blank(path: &Path) -> bool {
    path.as_os_str().to_string_lossy().trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_ocr_defaults() {
        let config = OcrConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, OcrConfig::default());
        assert_eq!(config.languages, "eng+afr");
        assert_eq!(config.dpi, 200);
        assert!(config.enabled);
    }

    #[test]
    fn test_ocr_env_overrides() {
        let config = OcrConfig::from_lookup(lookup(&[
            ("DOCSIFT_OCR_LANG", "eng"),
            ("DOCSIFT_OCR_DPI", "300"),
            ("DOCSIFT_TESSERACT", "/opt/bin/tesseract"),
            ("DOCSIFT_NO_OCR", "true"),
        ]))
        .unwrap();
        assert_eq!(config.languages, "eng");
        assert_eq!(config.dpi, 300);
        assert_eq!(config.tesseract, Some(PathBuf::from("/opt/bin/tesseract")));
        assert!(!config.enabled);
    }

    #[test]
    fn test_invalid_dpi_rejected() {
        let result = OcrConfig::from_lookup(lookup(&[("DOCSIFT_OCR_DPI", "lots")]));
        assert!(matches!(result, Err(ConfigError::InvalidSetting { .. })));
        assert!(parse_dpi("10").is_err());
        assert_eq!(parse_dpi(" 150 ").unwrap(), 150);
    }

    #[test]
    fn test_run_config_rejects_missing_paths() {
        let config = RunConfig::new("", "/tmp/out", PipelineVariant::Lease);
        assert!(matches!(config.validate(), Err(ConfigError::MissingPath)));

        let config = RunConfig::new("/nonexistent/docsift/in", "/tmp/out", PipelineVariant::Lease);
        assert!(matches!(config.validate(), Err(ConfigError::InputNotFound(_))));
    }

    #[test]
    fn test_run_config_rejects_file_as_input() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("lease.txt");
        std::fs::write(&file, "x").unwrap();

        let config = RunConfig::new(&file, dir.path().join("out"), PipelineVariant::Pii);
        assert!(matches!(config.validate(), Err(ConfigError::InputNotDirectory(_))));

        let config = RunConfig::new(dir.path(), &file, PipelineVariant::Pii);
        assert!(matches!(config.validate(), Err(ConfigError::OutputNotDirectory(_))));
    }

    #[test]
    fn test_prepare_creates_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("results").join("nested");

        let config = RunConfig::new(dir.path(), &out, PipelineVariant::Lease);
        config.prepare().unwrap();
        assert!(out.is_dir());
    }
}
