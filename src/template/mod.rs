//! Template filling: placeholder tables, block substitution and the
//! document walker that ties them to a concrete document format.

pub mod discovery;
pub mod placeholder;
pub mod substitute;

pub use discovery::{discover, TemplateVariables};
pub use placeholder::{token_for, PlaceholderTable, DATE_LABEL};
pub use substitute::substitute;

use tracing::debug;

use crate::document::{self, DocumentFormat, TemplateDocument};
use crate::error::Result;

/// Apply `table` to every text block of `doc`, in document order.
/// Returns the number of blocks that were rewritten.
pub fn fill_document(doc: &mut dyn TemplateDocument, table: &PlaceholderTable) -> usize {
    doc.rewrite_blocks(&mut |text| substitute(text, table))
}

/// Load a template, fill it and serialize the result.
///
/// The parsed document lives only for the duration of this call.
pub fn fill_template(
    bytes: &[u8],
    format: DocumentFormat,
    table: &PlaceholderTable,
) -> Result<Vec<u8>> {
    let mut doc = document::load(format, bytes)?;
    let rewritten = fill_document(doc.as_mut(), table);
    debug!(
        "Filled {} template: {} block(s) rewritten from {} placeholder(s)",
        doc.format(),
        rewritten,
        table.len()
    );
    doc.to_bytes()
}

/// Report the placeholders a template uses.
pub fn template_variables(bytes: &[u8], format: DocumentFormat) -> Result<TemplateVariables> {
    let doc = document::load(format, bytes)?;
    Ok(discover(&doc.blocks()))
}
