//! Source document loading.
//!
//! `.docx` files are opened as Word documents and their paragraphs joined
//! with newlines. Anything else is read as plain text: UTF-8 first, then
//! ISO-8859-1, which maps every byte to a code point and cannot fail.

use std::path::Path;

use docx_rs::{DocumentChild, InsertChild, ParagraphChild, Run, RunChild};
use tracing::{debug, error, instrument, warn};

use qaforge_shared::{QaForgeError, Result};

/// Kind of source file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Docx,
    PlainText,
}

impl SourceKind {
    /// Case-insensitive match on the file extension.
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("docx") => Self::Docx,
            _ => Self::PlainText,
        }
    }
}

/// Load a document and return its full text.
///
/// Failures are logged before being returned; the caller decides whether
/// the run can continue. An empty string is a successful load.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_document(path: &Path) -> Result<String> {
    let kind = SourceKind::detect(path);
    debug!(?kind, "loading document");

    let result = match kind {
        SourceKind::Docx => load_docx(path),
        SourceKind::PlainText => load_text(path),
    };

    match &result {
        Ok(text) => debug!(chars = text.chars().count(), "document loaded"),
        Err(e) => error!(error = %e, "failed to read document"),
    }

    result
}

fn load_docx(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| QaForgeError::load(path, e.to_string()))?;
    let docx = docx_rs::read_docx(&bytes)
        .map_err(|e| QaForgeError::load(path, format!("invalid .docx: {e}")))?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(p) => Some(paragraph_text(p)),
            _ => None,
        })
        .collect();

    Ok(paragraphs.join("\n"))
}

/// Concatenate the visible text of a paragraph, including hyperlinks and
/// tracked insertions. Tabs become `\t`; breaks become `\n`.
fn paragraph_text(paragraph: &docx_rs::Paragraph) -> String {
    let mut text = String::new();
    push_children(&paragraph.children, &mut text);
    text
}

fn push_children(children: &[ParagraphChild], text: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => push_run(run, text),
            ParagraphChild::Hyperlink(link) => push_children(&link.children, text),
            ParagraphChild::Insert(insert) => {
                for ic in &insert.children {
                    if let InsertChild::Run(run) = ic {
                        push_run(run, text);
                    }
                }
            }
            _ => {}
        }
    }
}

fn push_run(run: &Run, text: &mut String) {
    for rc in &run.children {
        match rc {
            RunChild::Text(t) => text.push_str(&t.text),
            RunChild::Tab(_) => text.push('\t'),
            RunChild::Break(_) | RunChild::CarriageReturn(_) => text.push('\n'),
            _ => {}
        }
    }
}

fn load_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| QaForgeError::load(path, e.to_string()))?;
    Ok(decode_text(bytes))
}

/// Decode bytes as UTF-8, falling back to ISO-8859-1.
pub fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!(
                valid_up_to = e.utf8_error().valid_up_to(),
                "not valid UTF-8, decoding as ISO-8859-1"
            );
            e.into_bytes().into_iter().map(char::from).collect()
        }
    }
}
