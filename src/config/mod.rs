//! Service configuration.
//!
//! Values come from built-in defaults, an optional TOML file, and finally
//! environment variables, in that order of precedence (last wins).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub paths: PathsConfig,
    pub templates: TemplateDefaults,
    pub gotenberg: GotenbergConfig,
    pub office: OfficeConfig,
    pub cleanup: CleanupConfig,
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding `.docx` and `.html` templates.
    pub templates_dir: PathBuf,
    /// Directory generated artifacts are written to.
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateDefaults {
    /// Used when a `.docx` request leaves `template_name` empty.
    pub docx: Option<String>,
    /// Used when an HTML request leaves `template_name` empty.
    pub html: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GotenbergConfig {
    pub url: String,
    pub health_timeout_secs: u64,
    pub convert_timeout_secs: u64,
    pub page: PageSetup,
}

/// Paper size and margins, in inches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSetup {
    pub paper_width: f64,
    pub paper_height: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub print_background: bool,
    pub prefer_css_page_size: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OfficeConfig {
    /// Headless office binary used for `.docx` to PDF conversion.
    pub program: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    pub max_age_hours: u64,
    /// Minutes between background sweeps while serving; 0 disables them.
    pub sweep_interval_minutes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("templates"),
            output_dir: PathBuf::from("uploads"),
        }
    }
}

impl Default for TemplateDefaults {
    fn default() -> Self {
        Self {
            docx: None,
            html: "gym_log_template.html".to_string(),
        }
    }
}

impl Default for GotenbergConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:3000".to_string(),
            health_timeout_secs: 5,
            convert_timeout_secs: 30,
            page: PageSetup::default(),
        }
    }
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            paper_width: 8.5,
            paper_height: 11.0,
            margin_top: 0.5,
            margin_bottom: 0.5,
            margin_left: 0.5,
            margin_right: 0.5,
            print_background: true,
            prefer_css_page_size: false,
        }
    }
}

impl Default for OfficeConfig {
    fn default() -> Self {
        Self {
            program: "soffice".to_string(),
            timeout_secs: 120,
        }
    }
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            max_age_hours: 24,
            sweep_interval_minutes: 60,
        }
    }
}

impl GotenbergConfig {
    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }

    pub fn convert_timeout(&self) -> Duration {
        Duration::from_secs(self.convert_timeout_secs)
    }
}

impl OfficeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load defaults, then the TOML file if given, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::new(),
        };
        config.merge_env_vars();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn merge_env_vars(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    fn merge_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(port) = lookup("PORT").and_then(|p| p.parse::<u16>().ok()) {
            self.server.port = port;
        }

        if let Some(host) = lookup("GHOST_GYM_HOST") {
            self.server.host = host;
        }

        if let Some(dir) = lookup("GHOST_GYM_TEMPLATES_DIR") {
            self.paths.templates_dir = PathBuf::from(dir);
        }

        if let Some(dir) = lookup("GHOST_GYM_OUTPUT_DIR") {
            self.paths.output_dir = PathBuf::from(dir);
        }

        if let Some(url) = lookup("GOTENBERG_SERVICE_URL").filter(|u| !u.is_empty()) {
            self.gotenberg.url = url;
        }

        if let Some(program) = lookup("GHOST_GYM_OFFICE_BIN") {
            self.office.program = program;
        }

        if let Some(level) = lookup("GHOST_GYM_LOG_LEVEL") {
            self.log_level = Some(level);
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
