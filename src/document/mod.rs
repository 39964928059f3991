//! Document models the filler can walk.
//!
//! Both formats expose their content as an ordered list of text blocks; a
//! block is rewritten only when the substitution callback asks for it.

pub mod docx;
pub mod html;

pub use docx::DocxDocument;
pub use html::HtmlDocument;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Docx,
    Html,
}

impl DocumentFormat {
    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Docx => "docx",
            DocumentFormat::Html => "html",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "docx" => Some(DocumentFormat::Docx),
            "html" | "htm" => Some(DocumentFormat::Html),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

pub trait TemplateDocument {
    fn format(&self) -> DocumentFormat;

    /// Text of every block in document order.
    fn blocks(&self) -> Vec<String>;

    /// Offer every block to `rewrite`; blocks for which it returns `Some`
    /// are replaced by a single unformatted run of the new text. Returns the
    /// number of rewritten blocks.
    fn rewrite_blocks(&mut self, rewrite: &mut dyn FnMut(&str) -> Option<String>) -> usize;

    fn to_bytes(&self) -> Result<Vec<u8>>;
}

/// Parse template bytes in the given format.
pub fn load(format: DocumentFormat, bytes: &[u8]) -> Result<Box<dyn TemplateDocument>> {
    Ok(match format {
        DocumentFormat::Docx => Box::new(DocxDocument::from_bytes(bytes)?),
        DocumentFormat::Html => Box::new(HtmlDocument::parse(bytes)?),
    })
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("templates/master.DOCX")),
            Some(DocumentFormat::Docx)
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("gym_log_template.html")),
            Some(DocumentFormat::Html)
        );
        assert_eq!(DocumentFormat::from_path(Path::new("notes.txt")), None);
        assert_eq!(DocumentFormat::from_path(Path::new("README")), None);
    }

    #[test]
    fn test_load_dispatches_on_format() {
        let doc = load(DocumentFormat::Html, b"<p>hi</p>").unwrap();
        assert_eq!(doc.format(), DocumentFormat::Html);

        let doc = load(DocumentFormat::Docx, &fixtures::docx("")).unwrap();
        assert_eq!(doc.format(), DocumentFormat::Docx);
    }
}
