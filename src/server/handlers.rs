use axum::extract::{Path, State};
use axum::response::{Json, Response};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use super::extract::JsonBody;
use super::response::{artifact_response, bytes_response, Disposition};
use crate::document::DocumentFormat;
use crate::error::Result;
use crate::service::{download_file_name, DocumentService};
use crate::template::TemplateVariables;
use crate::workout::WorkoutRecord;

pub type AppState = Arc<DocumentService>;

#[derive(Debug, Serialize)]
pub struct TemplateList {
    pub templates: Vec<String>,
    pub count: usize,
}

impl From<Vec<String>> for TemplateList {
    fn from(templates: Vec<String>) -> Self {
        Self {
            count: templates.len(),
            templates,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Features {
    pub html_templates: bool,
    pub instant_preview: bool,
    pub pdf_generation: bool,
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub status: &'static str,
    pub version: &'static str,
    pub html_templates_available: bool,
    pub instant_preview: bool,
    pub gotenberg_available: bool,
    pub gotenberg_url: String,
    /// `available`, `unavailable` or `unknown`.
    pub local_pdf: &'static str,
    pub features: Features,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "message": "Gym Log API is running" }))
}

pub async fn list_docx_templates(State(service): State<AppState>) -> Result<Json<TemplateList>> {
    let templates = service.list_templates(DocumentFormat::Docx).await?;
    Ok(Json(templates.into()))
}

pub async fn docx_template_variables(
    State(service): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<TemplateVariables>> {
    let report = service
        .template_variables(&name, DocumentFormat::Docx)
        .await?;
    Ok(Json(report))
}

pub async fn generate_docx(
    State(service): State<AppState>,
    JsonBody(record): JsonBody<WorkoutRecord>,
) -> Result<Response> {
    let artifact = service.generate(&record, DocumentFormat::Docx).await?;
    artifact_response(&artifact, Disposition::Attachment).await
}

pub async fn preview_docx_pdf(
    State(service): State<AppState>,
    JsonBody(record): JsonBody<WorkoutRecord>,
) -> Result<Response> {
    let artifact = service.generate_docx_pdf(&record).await?;
    artifact_response(&artifact, Disposition::Inline).await
}

pub async fn status(State(service): State<AppState>) -> Json<StatusReport> {
    let status = service.status().await;
    debug!(
        "Status: gotenberg {}, local converter {}",
        status.gotenberg.label(),
        status.office.label()
    );

    let gotenberg_available = status.gotenberg.is_available();
    Json(StatusReport {
        status: "operational",
        version: env!("CARGO_PKG_VERSION"),
        html_templates_available: status.html_templates_available,
        instant_preview: status.html_templates_available,
        gotenberg_available,
        gotenberg_url: service.gotenberg_url().to_string(),
        local_pdf: status.office.label(),
        features: Features {
            html_templates: status.html_templates_available,
            instant_preview: status.html_templates_available,
            pdf_generation: gotenberg_available,
        },
    })
}

pub async fn list_html_templates(State(service): State<AppState>) -> Result<Json<TemplateList>> {
    let templates = service.list_templates(DocumentFormat::Html).await?;
    Ok(Json(templates.into()))
}

pub async fn html_template_info(
    State(service): State<AppState>,
) -> Result<Json<TemplateVariables>> {
    let report = service.template_variables("", DocumentFormat::Html).await?;
    Ok(Json(report))
}

/// Filled HTML straight from memory; nothing is written to disk.
pub async fn preview_html(
    State(service): State<AppState>,
    JsonBody(record): JsonBody<WorkoutRecord>,
) -> Result<Response> {
    let html = service.render(&record, DocumentFormat::Html).await?;
    let name = download_file_name(&record.workout_name, &record.workout_date, "html");
    Ok(bytes_response(html, &name, Disposition::Inline))
}

pub async fn generate_html(
    State(service): State<AppState>,
    JsonBody(record): JsonBody<WorkoutRecord>,
) -> Result<Response> {
    let artifact = service.generate(&record, DocumentFormat::Html).await?;
    artifact_response(&artifact, Disposition::Attachment).await
}

pub async fn preview_pdf(
    State(service): State<AppState>,
    JsonBody(record): JsonBody<WorkoutRecord>,
) -> Result<Response> {
    let artifact = service.generate_html_pdf(&record).await?;
    artifact_response(&artifact, Disposition::Inline).await
}

pub async fn generate_pdf(
    State(service): State<AppState>,
    JsonBody(record): JsonBody<WorkoutRecord>,
) -> Result<Response> {
    let artifact = service.generate_html_pdf(&record).await?;
    artifact_response(&artifact, Disposition::Attachment).await
}
