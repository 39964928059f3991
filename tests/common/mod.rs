//! Common test utilities and helpers

#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use gymlog::config::Config;
use gymlog::subprocess::{MockProcessRunner, SubprocessManager};
use gymlog::service::DocumentService;
use gymlog::workout::WorkoutRecord;

pub const MASTER_BODY: &str = concat!(
    r#"<w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr><w:r><w:t>{{ workout_name }}</w:t></w:r></w:p>"#,
    r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>today's date:</w:t></w:r></w:p>"#,
    r#"<w:tbl><w:tr>"#,
    r#"<w:tc><w:p><w:r><w:t>{{ exercise_1a }}</w:t></w:r></w:p></w:tc>"#,
    r#"<w:tc><w:p><w:r><w:t>{{ sets_1a }}</w:t></w:r><w:r><w:t xml:space="preserve"> x </w:t></w:r><w:r><w:t>{{ reps_1a }}</w:t></w:r></w:p></w:tc>"#,
    r#"<w:tc><w:p><w:r><w:t>{{ exercise_9z }}</w:t></w:r></w:p></w:tc>"#,
    r#"</w:tr></w:tbl>"#,
    r#"<w:p><w:r><w:rPr><w:i/></w:rPr><w:t>Stay hydrated</w:t></w:r></w:p>"#,
);

pub const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html><head><title>Gym Log</title><style>table { border: 1px solid; }</style></head>
<body>
<h1>{{ workout_name }}</h1>
<p>today's date:</p>
<table><tr><td>{{ exercise_1a }}</td><td>{{ sets_1a }}</td><td>{{ exercise_9z }}</td></tr></table>
</body></html>"#;

/// A minimal Word container holding `body_xml` as its document body.
pub fn docx_bytes(body_xml: &str) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options: zip::write::FileOptions<'_, ()> = zip::write::FileOptions::default();

    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)
        .unwrap();
    zip.start_file("word/document.xml", options).unwrap();
    write!(
        zip,
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body_xml}<w:sectPr/></w:body></w:document>"#
    )
    .unwrap();

    zip.finish().unwrap().into_inner()
}

/// Read `word/document.xml` back out of a generated file.
pub fn document_xml(path: &Path) -> String {
    let bytes = fs::read(path).unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut part = archive.by_name("word/document.xml").unwrap();
    let mut xml = String::new();
    std::io::Read::read_to_string(&mut part, &mut xml).unwrap();
    xml
}

pub fn push_day() -> WorkoutRecord {
    serde_json::from_str(
        r#"{
            "workout_name": "Push Day",
            "workout_date": "2025-01-07",
            "template_name": "master.docx",
            "exercises": {"exercise_1a": "Bench Press"},
            "sets": {"sets_1a": "3"},
            "reps": {"reps_1a": "8-10"}
        }"#,
    )
    .unwrap()
}

/// Scratch templates and output directories plus a matching config.
pub struct TestContext {
    pub temp_dir: TempDir,
    pub config: Config,
}

impl TestContext {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let templates_dir = temp_dir.path().join("templates");
        fs::create_dir_all(&templates_dir)?;
        fs::write(templates_dir.join("master.docx"), docx_bytes(MASTER_BODY))?;
        fs::write(templates_dir.join("gym_log_template.html"), HTML_TEMPLATE)?;

        let mut config = Config::new();
        config.paths.templates_dir = templates_dir;
        config.paths.output_dir = temp_dir.path().join("output");
        config.templates.docx = Some("master.docx".to_string());
        // Nothing listens on the discard port.
        config.gotenberg.url = "http://127.0.0.1:9".to_string();
        config.gotenberg.health_timeout_secs = 1;
        config.cleanup.sweep_interval_minutes = 0;

        Ok(Self { temp_dir, config })
    }

    pub fn with_gotenberg(mut self, url: &str) -> Self {
        self.config.gotenberg.url = url.to_string();
        self
    }

    pub fn templates_dir(&self) -> &Path {
        &self.config.paths.templates_dir
    }

    pub fn output_dir(&self) -> PathBuf {
        self.config.paths.output_dir.clone()
    }

    pub fn service(&self) -> Result<(DocumentService, MockProcessRunner)> {
        let (subprocess, mock) = SubprocessManager::mock();
        Ok((DocumentService::new(self.config.clone(), subprocess)?, mock))
    }
}
