//! `.docx` to PDF through a headless office suite.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use super::Capability;
use crate::config::OfficeConfig;
use crate::error::{Error, Result};
use crate::subprocess::error::into_conversion_error;
use crate::subprocess::{ProcessCommandBuilder, ProcessError, SubprocessManager};

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

pub struct OfficeConverter {
    subprocess: SubprocessManager,
    program: String,
    timeout: Duration,
}

impl OfficeConverter {
    pub fn new(subprocess: SubprocessManager, config: &OfficeConfig) -> Self {
        Self {
            subprocess,
            program: config.program.clone(),
            timeout: config.timeout(),
        }
    }

    /// Check whether the office binary can be run right now.
    pub async fn probe(&self) -> Capability {
        let command = ProcessCommandBuilder::new(&self.program)
            .arg("--version")
            .timeout(PROBE_TIMEOUT)
            .build();

        match self.subprocess.runner().run(command).await {
            Ok(output) if output.status.success() => Capability::Available,
            Ok(output) => Capability::Unavailable(format!(
                "'{}' --version exited with {:?}",
                self.program, output.status
            )),
            Err(ProcessError::CommandNotFound(_)) => {
                Capability::Unavailable(format!("'{}' is not installed", self.program))
            }
            Err(e) => Capability::Unknown(e.to_string()),
        }
    }

    /// Convert `input` to a sibling `.pdf` file and return its path.
    pub async fn convert_to_pdf(&self, input: &Path) -> Result<PathBuf> {
        let out_dir = input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let command = ProcessCommandBuilder::new(&self.program)
            .args(["--headless", "--convert-to", "pdf", "--outdir"])
            .arg(&out_dir.to_string_lossy())
            .arg(&input.to_string_lossy())
            .current_dir(out_dir)
            .timeout(self.timeout)
            .build();

        debug!("Converting {} to PDF with {}", input.display(), self.program);
        let output = self
            .subprocess
            .runner()
            .run(command)
            .await
            .map_err(into_conversion_error)?;

        let stderr = output.stderr.trim().to_string();
        output
            .status
            .into_result()
            .map_err(|e| Error::Conversion(format!("{e}: {stderr}")))?;

        let pdf_path = input.with_extension("pdf");
        if !tokio::fs::try_exists(&pdf_path).await? {
            return Err(Error::Conversion(format!(
                "'{}' finished without producing {}",
                self.program,
                pdf_path.display()
            )));
        }

        info!("Converted {} to {}", input.display(), pdf_path.display());
        Ok(pdf_path)
    }
}
