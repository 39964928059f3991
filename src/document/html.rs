//! HTML templates.
//!
//! Every text node outside `<style>` and `<script>` is a block. Values are
//! written back as text nodes, so the serializer escapes them.

use html5ever::parse_document;
use html5ever::serialize::{serialize, SerializeOpts};
use html5ever::tendril::{StrTendril, TendrilSink};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};

use super::{DocumentFormat, TemplateDocument};
use crate::error::{Error, Result};

const RAW_TEXT_TAGS: &[&str] = &["style", "script", "template"];

pub struct HtmlDocument {
    dom: RcDom,
}

impl HtmlDocument {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut &bytes[..])
            .map_err(|e| Error::Generation(format!("failed to parse HTML template: {e}")))?;
        Ok(Self { dom })
    }

    fn text_nodes(&self) -> Vec<Handle> {
        let mut nodes = Vec::new();
        collect_text_nodes(&self.dom.document, &mut nodes);
        nodes
    }
}

fn collect_text_nodes(handle: &Handle, out: &mut Vec<Handle>) {
    match &handle.data {
        NodeData::Element { name, .. } => {
            let tag: &str = &name.local;
            if RAW_TEXT_TAGS.contains(&tag) {
                return;
            }
        }
        NodeData::Text { .. } => {
            out.push(handle.clone());
            return;
        }
        _ => {}
    }

    for child in handle.children.borrow().iter() {
        collect_text_nodes(child, out);
    }
}

fn node_text(handle: &Handle) -> Option<String> {
    match &handle.data {
        NodeData::Text { contents } => Some(contents.borrow().to_string()),
        _ => None,
    }
}

impl TemplateDocument for HtmlDocument {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Html
    }

    fn blocks(&self) -> Vec<String> {
        self.text_nodes()
            .iter()
            .filter_map(node_text)
            .filter(|text| !text.trim().is_empty())
            .collect()
    }

    fn rewrite_blocks(&mut self, rewrite: &mut dyn FnMut(&str) -> Option<String>) -> usize {
        let mut rewritten = 0;
        for node in self.text_nodes() {
            if let NodeData::Text { contents } = &node.data {
                let replacement = rewrite(&contents.borrow());
                if let Some(text) = replacement {
                    *contents.borrow_mut() = StrTendril::from_slice(&text);
                    rewritten += 1;
                }
            }
        }
        rewritten
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let document: SerializableHandle = self.dom.document.clone().into();
        serialize(&mut out, &document, SerializeOpts::default())
            .map_err(|e| Error::Generation(format!("failed to serialize HTML: {e}")))?;
        Ok(out)
    }
}
