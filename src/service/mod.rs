//! Document generation service.
//!
//! Resolves templates, fills them from a [`WorkoutRecord`], writes the
//! artifact to the output directory and hands PDF work to the converters.

pub mod cleanup;
pub mod output;

pub use cleanup::{clean_artifacts_by_age, CleanupStats};
pub use output::{
    download_file_name, name_component, output_file_name, safe_component, ARTIFACT_EXTENSIONS,
    ARTIFACT_PREFIX,
};

use chrono::Local;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::convert::{Capability, GotenbergClient, OfficeConverter};
use crate::document::DocumentFormat;
use crate::error::{Error, Result};
use crate::subprocess::SubprocessManager;
use crate::template::{self, PlaceholderTable, TemplateVariables};
use crate::workout::WorkoutRecord;

/// A file written to the output directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedArtifact {
    pub path: PathBuf,
    /// Name suggested to clients downloading the artifact.
    pub download_name: String,
}

/// Conversion backends as seen right now.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub gotenberg: Capability,
    pub office: Capability,
    pub html_templates_available: bool,
}

/// Upper bound on cleanup ages, roughly a century.
const MAX_AGE_HOURS: u64 = 876_000;

/// Output names tried for one artifact before giving up.
const MAX_NAME_ATTEMPTS: usize = 100;

pub struct DocumentService {
    config: Config,
    office: OfficeConverter,
    gotenberg: GotenbergClient,
}

impl DocumentService {
    pub fn new(config: Config, subprocess: SubprocessManager) -> Result<Self> {
        std::fs::create_dir_all(&config.paths.output_dir).map_err(|e| {
            Error::Config(format!(
                "Cannot create output directory {}: {}",
                config.paths.output_dir.display(),
                e
            ))
        })?;

        let office = OfficeConverter::new(subprocess, &config.office);
        let gotenberg = GotenbergClient::new(&config.gotenberg)?;

        Ok(Self {
            config,
            office,
            gotenberg,
        })
    }

    pub fn production(config: Config) -> Result<Self> {
        Self::new(config, SubprocessManager::production())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn gotenberg_url(&self) -> &str {
        self.gotenberg.base_url()
    }

    /// Template files of one format, sorted, without `~` lock files.
    pub async fn list_templates(&self, format: DocumentFormat) -> Result<Vec<String>> {
        let dir = &self.config.paths.templates_dir;
        if !fs::try_exists(dir).await? {
            return Ok(Vec::new());
        }

        let mut templates = Vec::new();
        let mut entries = fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('~') {
                continue;
            }
            if DocumentFormat::from_path(Path::new(&name)) == Some(format)
                && entry.file_type().await?.is_file()
            {
                templates.push(name);
            }
        }

        templates.sort();
        Ok(templates)
    }

    /// Map a template identifier to a file in the templates directory.
    /// An empty identifier selects the configured default for `format`.
    pub async fn resolve_template(&self, name: &str, format: DocumentFormat) -> Result<PathBuf> {
        let name = if name.is_empty() {
            self.default_template(format)?
        } else {
            name
        };

        if !is_plain_file_name(name) {
            return Err(Error::NotFound(format!("Template '{name}' not found")));
        }
        if DocumentFormat::from_path(Path::new(name)) != Some(format) {
            return Err(Error::NotFound(format!(
                "Template '{name}' is not a .{format} template"
            )));
        }

        let path = self.config.paths.templates_dir.join(name);
        if !fs::try_exists(&path).await? {
            return Err(Error::NotFound(format!("Template '{name}' not found")));
        }
        Ok(path)
    }

    fn default_template(&self, format: DocumentFormat) -> Result<&str> {
        match format {
            DocumentFormat::Html => Ok(&self.config.templates.html),
            DocumentFormat::Docx => self
                .config
                .templates
                .docx
                .as_deref()
                .ok_or_else(|| Error::NotFound("No template specified".to_string())),
        }
    }

    /// Fill the record's template and return the document bytes.
    pub async fn render(&self, record: &WorkoutRecord, format: DocumentFormat) -> Result<Vec<u8>> {
        let template_path = self.resolve_template(&record.template_name, format).await?;
        let bytes = fs::read(&template_path).await.map_err(|e| {
            Error::Generation(format!(
                "failed to read template {}: {}",
                template_path.display(),
                e
            ))
        })?;

        let table = PlaceholderTable::from_record(record);
        debug!("Filling {}", template_path.display());
        template::fill_template(&bytes, format, &table).map_err(Error::into_generation)
    }

    /// Fill the record's template and write it to the output directory.
    pub async fn generate(
        &self,
        record: &WorkoutRecord,
        format: DocumentFormat,
    ) -> Result<GeneratedArtifact> {
        let bytes = self.render(record, format).await?;
        let artifact = self
            .write_artifact(record, format.extension(), &bytes)
            .await?;
        info!(
            "Generated {} for workout '{}'",
            artifact.path.display(),
            record.workout_name
        );
        Ok(artifact)
    }

    /// Generate the `.docx` and convert it with the local office suite.
    pub async fn generate_docx_pdf(&self, record: &WorkoutRecord) -> Result<GeneratedArtifact> {
        let docx = self.generate(record, DocumentFormat::Docx).await?;
        let pdf_path = self.office.convert_to_pdf(&docx.path).await?;

        Ok(GeneratedArtifact {
            path: pdf_path,
            download_name: download_file_name(&record.workout_name, &record.workout_date, "pdf"),
        })
    }

    /// Fill the HTML template and render it through Gotenberg.
    pub async fn generate_html_pdf(&self, record: &WorkoutRecord) -> Result<GeneratedArtifact> {
        let html = self.render(record, DocumentFormat::Html).await?;
        let html = String::from_utf8_lossy(&html).into_owned();
        let pdf = self.gotenberg.html_to_pdf(html).await?;

        let artifact = self.write_artifact(record, "pdf", &pdf).await?;
        info!(
            "Rendered {} for workout '{}'",
            artifact.path.display(),
            record.workout_name
        );
        Ok(artifact)
    }

    /// Placeholders used by a template.
    pub async fn template_variables(
        &self,
        name: &str,
        format: DocumentFormat,
    ) -> Result<TemplateVariables> {
        let path = self.resolve_template(name, format).await?;
        let bytes = fs::read(&path).await?;
        template::template_variables(&bytes, format).map_err(Error::into_generation)
    }

    /// Probe both converters, fresh on every call.
    pub async fn status(&self) -> ServiceStatus {
        let (gotenberg, office) = tokio::join!(self.gotenberg.probe(), self.office.probe());
        let html_templates_available = self
            .resolve_template("", DocumentFormat::Html)
            .await
            .is_ok();

        ServiceStatus {
            gotenberg,
            office,
            html_templates_available,
        }
    }

    /// Delete artifacts older than `max_age_hours`. Failures are logged,
    /// never returned.
    pub async fn cleanup_old_files(&self, max_age_hours: u64) -> usize {
        let max_age = chrono::Duration::hours(max_age_hours.min(MAX_AGE_HOURS) as i64);
        match clean_artifacts_by_age(&self.config.paths.output_dir, max_age).await {
            Ok(stats) => {
                for error in &stats.errors {
                    warn!("Cleanup: {}", error);
                }
                if stats.items_removed > 0 {
                    info!(
                        "Removed {} of {} generated file(s) older than {}h",
                        stats.items_removed, stats.items_scanned, max_age_hours
                    );
                }
                stats.items_removed
            }
            Err(e) => {
                warn!("Error cleaning up old files: {}", e);
                0
            }
        }
    }

    /// Write `bytes` under a fresh output name. Existing files are never
    /// overwritten: a taken name, or one whose stem another artifact already
    /// uses, moves on to the next `-N` suffix.
    async fn write_artifact(
        &self,
        record: &WorkoutRecord,
        extension: &str,
        bytes: &[u8],
    ) -> Result<GeneratedArtifact> {
        let dir = &self.config.paths.output_dir;
        let now = Local::now();

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let path = dir.join(output_file_name(&record.workout_name, now, attempt, extension));
            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(write_error(&path, e)),
            };

            // The local converter writes `<stem>.pdf` next to a `.docx`,
            // so a stem is only ours when no sibling artifact holds it.
            if stem_in_use(&path, extension).await {
                drop(file);
                let _ = fs::remove_file(&path).await;
                continue;
            }

            file.write_all(bytes)
                .await
                .map_err(|e| write_error(&path, e))?;
            file.flush().await.map_err(|e| write_error(&path, e))?;

            return Ok(GeneratedArtifact {
                path,
                download_name: download_file_name(
                    &record.workout_name,
                    &record.workout_date,
                    extension,
                ),
            });
        }

        Err(Error::Generation(format!(
            "no free output name for workout '{}' in {}",
            record.workout_name,
            dir.display()
        )))
    }
}

fn write_error(path: &Path, e: std::io::Error) -> Error {
    Error::Generation(format!("failed to write {}: {}", path.display(), e))
}

async fn stem_in_use(path: &Path, extension: &str) -> bool {
    for other in ARTIFACT_EXTENSIONS.iter().filter(|ext| **ext != extension) {
        if fs::try_exists(path.with_extension(other))
            .await
            .unwrap_or(true)
        {
            return true;
        }
    }
    false
}

fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.starts_with('~')
        && !name.contains('\\')
}
