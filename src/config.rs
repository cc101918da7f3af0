//! Settings from an optional `dashboard.toml`, overridden by CLI flags.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "dashboard.toml";
pub const DEFAULT_SERVICES_FILE: &str = "services_data.csv";
pub const DEFAULT_PRODUCTS_FILE: &str = "products_data.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "./output";
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

/// Configuration as written in the TOML file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    pub services: Option<PathBuf>,
    pub products: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    pub dir: Option<PathBuf>,
    pub preview_rows: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Values given on the command line; `None` means "not given".
#[derive(Debug, Default)]
pub struct Overrides {
    pub services: Option<PathBuf>,
    pub products: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub preview_rows: Option<usize>,
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub services_path: PathBuf,
    pub products_path: PathBuf,
    pub output_dir: PathBuf,
    pub preview_rows: usize,
}

impl Settings {
    /// Flag, then file, then built-in default.
    pub fn resolve(file: FileConfig, cli: Overrides) -> Self {
        Self {
            services_path: cli
                .services
                .or(file.data.services)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SERVICES_FILE)),
            products_path: cli
                .products
                .or(file.data.products)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PRODUCTS_FILE)),
            output_dir: cli
                .output_dir
                .or(file.output.dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            preview_rows: cli
                .preview_rows
                .or(file.output.preview_rows)
                .unwrap_or(DEFAULT_PREVIEW_ROWS),
        }
    }
}

/// Load `explicit` if given (it must exist), otherwise `dashboard.toml` when
/// present, otherwise an empty config.
pub fn load_file_config(explicit: Option<&Path>) -> Result<FileConfig> {
    match explicit {
        Some(path) => FileConfig::load(path),
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.exists() {
                FileConfig::load(default)
            } else {
                Ok(FileConfig::default())
            }
        }
    }
}
