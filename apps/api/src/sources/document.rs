//! Resume / LinkedIn export file to plain text.

use std::io::Read;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;
use tracing::{debug, warn};

use super::Source;

/// File extensions the reader knows how to turn into text. Legacy binary
/// `.doc` files are not among them.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "docx", "txt", "md"];

const DOCX_BODY: &str = "word/document.xml";

#[derive(Debug, Error)]
pub enum DocxError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a valid docx archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("malformed document XML: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Text of a `.docx` file: one line per paragraph, tabs and breaks kept.
pub fn docx_text(path: &Path) -> Result<String, DocxError> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    let mut xml = String::new();
    archive.by_name(DOCX_BODY)?.read_to_string(&mut xml)?;
    Ok(document_xml_text(&xml)?)
}

fn document_xml_text(xml: &str) -> Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_run_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_run_text = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" => text.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_run_text => text.push_str(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}

/// Reads uploaded documents from disk. PDF and DOCX extraction run on the
/// blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentReader;

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

impl DocumentReader {
    async fn read(&self, path: PathBuf) -> Option<String> {
        let text = match extension_of(&path).as_deref() {
            Some("pdf") => {
                let joined = tokio::task::spawn_blocking(move || pdf_extract::extract_text(&path))
                    .await;
                match joined {
                    Ok(Ok(text)) => text,
                    Ok(Err(e)) => {
                        warn!("PDF text extraction failed: {e}");
                        return None;
                    }
                    Err(e) => {
                        warn!("PDF extraction task did not complete: {e}");
                        return None;
                    }
                }
            }
            Some("docx") => {
                let joined = tokio::task::spawn_blocking(move || docx_text(&path)).await;
                match joined {
                    Ok(Ok(text)) => text,
                    Ok(Err(e)) => {
                        warn!("DOCX text extraction failed: {e}");
                        return None;
                    }
                    Err(e) => {
                        warn!("DOCX extraction task did not complete: {e}");
                        return None;
                    }
                }
            }
            Some("txt") | Some("md") => match tokio::fs::read_to_string(&path).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("Could not read {}: {e}", path.display());
                    return None;
                }
            },
            other => {
                warn!("Unsupported document type: {:?}", other);
                return None;
            }
        };

        let text = text.trim();
        if text.is_empty() {
            debug!("Document produced no text");
            return None;
        }
        Some(text.to_string())
    }
}

#[async_trait]
impl Source<String> for DocumentReader {
    async fn fetch(&self, locator: &str) -> Option<String> {
        self.read(PathBuf::from(locator)).await
    }
}
