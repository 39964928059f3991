//! Word (`.docx`) documents.
//!
//! A `.docx` file is a zip container; all text the filler cares about lives
//! in `word/document.xml`. Paragraphs (`<w:p>`) are located in that part,
//! which covers free paragraphs and paragraphs inside table cells alike. All
//! other container entries are carried through byte-for-byte.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::io::{Cursor, Read, Write};

use super::{DocumentFormat, TemplateDocument};
use crate::error::{Error, Result};

const MAIN_PART: &str = "word/document.xml";

static PARAGRAPH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)(<w:p(?:\s[^>]*[^/])?>)(.*?)</w:p>").expect("Invalid regex pattern")
});
static PARAGRAPH_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<w:p(?:\s[^>]*[^/])?>").expect("Invalid regex pattern"));
static PARAGRAPH_PROPS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<w:pPr(?:\s[^>]*[^/])?>.*?</w:pPr>|<w:pPr\s*/>").expect("Invalid regex pattern")
});
static RUN_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<w:t(?:\s[^>]*[^/])?>(.*?)</w:t>|<w:tab\s*/>|<w:br(?:\s[^>]*)?/>|<w:cr\s*/>")
        .expect("Invalid regex pattern")
});
static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(lt|gt|amp|quot|apos|#[0-9]+|#x[0-9a-fA-F]+);").expect("Invalid regex pattern")
});

struct ArchiveEntry {
    name: String,
    is_dir: bool,
    data: Vec<u8>,
}

pub struct DocxDocument {
    entries: Vec<ArchiveEntry>,
    body: String,
}

impl DocxDocument {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = Vec::with_capacity(archive.len());
        let mut body = None;

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();
            let is_dir = file.is_dir();

            let mut data = Vec::new();
            if !is_dir {
                file.read_to_end(&mut data)?;
            }

            if name == MAIN_PART {
                let xml = String::from_utf8(data).map_err(|e| {
                    Error::Generation(format!("{MAIN_PART} is not valid UTF-8: {e}"))
                })?;
                body = Some(xml);
                data = Vec::new();
            }

            entries.push(ArchiveEntry { name, is_dir, data });
        }

        let body = body.ok_or_else(|| {
            Error::Generation(format!("not a Word document: missing {MAIN_PART}"))
        })?;

        Ok(Self { entries, body })
    }

    /// The raw main document part, as currently modified.
    #[cfg(test)]
    pub(crate) fn body_xml(&self) -> &str {
        &self.body
    }
}

impl TemplateDocument for DocxDocument {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }

    fn blocks(&self) -> Vec<String> {
        PARAGRAPH
            .captures_iter(&self.body)
            .filter(|caps| !is_compound(&caps[2]))
            .map(|caps| paragraph_text(&caps[2]))
            .collect()
    }

    fn rewrite_blocks(&mut self, rewrite: &mut dyn FnMut(&str) -> Option<String>) -> usize {
        let mut rewritten = 0;
        let body = PARAGRAPH.replace_all(&self.body, |caps: &Captures| {
            let inner = &caps[2];
            // Paragraphs hosting nested paragraphs (text boxes) are left alone.
            if is_compound(inner) {
                return caps[0].to_string();
            }
            match rewrite(&paragraph_text(inner)) {
                Some(text) => {
                    rewritten += 1;
                    single_run_paragraph(&caps[1], inner, &text)
                }
                None => caps[0].to_string(),
            }
        });

        if rewritten > 0 {
            self.body = body.into_owned();
        }
        rewritten
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options: zip::write::FileOptions<'_, ()> =
            zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        for entry in &self.entries {
            if entry.is_dir {
                zip.add_directory(entry.name.as_str(), options)?;
                continue;
            }
            zip.start_file(entry.name.as_str(), options)?;
            if entry.name == MAIN_PART {
                zip.write_all(self.body.as_bytes())?;
            } else {
                zip.write_all(&entry.data)?;
            }
        }

        Ok(zip.finish()?.into_inner())
    }
}

fn is_compound(inner: &str) -> bool {
    PARAGRAPH_OPEN.is_match(inner)
}

/// Visible text of a paragraph: its runs' text, tabs and breaks.
fn paragraph_text(inner: &str) -> String {
    let runs = PARAGRAPH_PROPS.replace_all(inner, "");
    let mut text = String::new();

    for caps in RUN_TEXT.captures_iter(&runs) {
        match caps.get(1) {
            Some(t) => text.push_str(&unescape_xml(t.as_str())),
            None if caps[0].starts_with("<w:tab") => text.push('\t'),
            None => text.push('\n'),
        }
    }
    text
}

/// Clear the paragraph's runs, keep its properties, add one plain run.
fn single_run_paragraph(open_tag: &str, inner: &str, text: &str) -> String {
    let props = PARAGRAPH_PROPS
        .find(inner)
        .map(|m| m.as_str())
        .unwrap_or_default();

    if text.is_empty() {
        return format!("{open_tag}{props}</w:p>");
    }
    format!(
        r#"{open_tag}{props}<w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        escape_xml(text)
    )
}

fn unescape_xml(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .unwrap_or_else(|| entity[1..].parse::<u32>())
                    .ok()
                    .and_then(char::from_u32),
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}
