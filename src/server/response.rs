//! Error and file responses.

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::json;
use std::path::Path;
use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::service::GeneratedArtifact;

/// Bytes escaped in a `filename*` value: all but letters, digits and `-._~`.
const FILENAME_STAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::ConversionUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Conversion(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to clients as `detail`.
    fn detail(&self) -> String {
        match self {
            Error::NotFound(msg) | Error::Validation(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            debug!("Request rejected: {}", self);
        }
        (status, Json(json!({ "detail": self.detail() }))).into_response()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Inline,
    Attachment,
}

/// Serve a generated file, shown in the browser or offered as a download.
pub async fn artifact_response(
    artifact: &GeneratedArtifact,
    disposition: Disposition,
) -> Result<Response> {
    let bytes = tokio::fs::read(&artifact.path)
        .await
        .map_err(|e| Error::Generation(format!("failed to read {}: {}", artifact.path.display(), e)))?;
    Ok(bytes_response(bytes, &artifact.download_name, disposition))
}

pub fn bytes_response(bytes: Vec<u8>, file_name: &str, disposition: Disposition) -> Response {
    let mime = mime_guess::from_path(Path::new(file_name)).first_or_octet_stream();
    let mut response = Response::new(Body::from(bytes));

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    if let Ok(value) = HeaderValue::from_str(&content_disposition(file_name, disposition)) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    response
}

/// `Content-Disposition` value with an ASCII fallback name and, when the
/// name is not plain ASCII, an RFC 5987 `filename*` parameter.
fn content_disposition(file_name: &str, disposition: Disposition) -> String {
    let kind = match disposition {
        Disposition::Inline => "inline",
        Disposition::Attachment => "attachment",
    };

    let fallback: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() && c != '"' && c != '\\' || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if fallback == file_name {
        format!("{kind}; filename=\"{fallback}\"")
    } else {
        format!(
            "{kind}; filename=\"{fallback}\"; filename*=UTF-8''{}",
            utf8_percent_encode(file_name, FILENAME_STAR)
        )
    }
}
