use crate::config::Routing;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::debug;

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tiff", "bmp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    Pdf,
    Image,
    WordDocument,
    Html,
    Unknown,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Image => "image",
            Self::WordDocument => "word",
            Self::Html => "html",
            Self::Unknown => "unknown",
        }
    }
}

/// Maps a document to the ordered engine names that should attempt it.
#[derive(Debug, Clone)]
pub struct Router {
    table: Routing,
}

impl Router {
    pub fn new(table: Routing) -> Self {
        Self { table }
    }

    pub fn engines_for(&self, kind: DocumentKind) -> &[String] {
        match kind {
            DocumentKind::Pdf => &self.table.pdf,
            DocumentKind::Image => &self.table.image,
            DocumentKind::WordDocument => &self.table.word,
            DocumentKind::Html => &self.table.html,
            DocumentKind::Unknown => &[],
        }
    }

    pub fn route(&self, path: &Path) -> Vec<String> {
        let kind = self.detect(path);
        let engines = self.engines_for(kind).to_vec();
        debug!("route {} kind={} engines={:?}", path.display(), kind.as_str(), engines);
        engines
    }

    /// Extension first, then the MIME type guessed from the path. A path with
    /// no extension at all is sniffed by magic bytes when enabled.
    pub fn detect(&self, path: &Path) -> DocumentKind {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase());

        if let Some(kind) = ext.as_deref().and_then(kind_from_extension) {
            return kind;
        }

        if let Some(kind) = mime_guess::from_path(path).first_raw().and_then(kind_from_mime) {
            return kind;
        }

        if ext.is_none() && self.table.sniff_content {
            if let Some(kind) = sniff(path) {
                return kind;
            }
        }

        DocumentKind::Unknown
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(Routing::default())
    }
}

fn kind_from_extension(ext: &str) -> Option<DocumentKind> {
    match ext {
        "pdf" => Some(DocumentKind::Pdf),
        e if IMAGE_EXTENSIONS.contains(&e) => Some(DocumentKind::Image),
        "docx" => Some(DocumentKind::WordDocument),
        "html" | "htm" => Some(DocumentKind::Html),
        _ => None,
    }
}

pub fn kind_from_mime(mime: &str) -> Option<DocumentKind> {
    match mime {
        "application/pdf" => Some(DocumentKind::Pdf),
        m if m.starts_with("image/") => Some(DocumentKind::Image),
        DOCX_MIME => Some(DocumentKind::WordDocument),
        "text/html" => Some(DocumentKind::Html),
        _ => None,
    }
}

fn sniff(path: &Path) -> Option<DocumentKind> {
    let mut header = [0u8; 8];
    let n = std::fs::File::open(path).ok()?.read(&mut header).ok()?;
    let mime = match &header[..n] {
        [0x25, 0x50, 0x44, 0x46, ..] => "application/pdf",
        [0x89, 0x50, 0x4E, 0x47, ..] => "image/png",
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => "image/tiff",
        [0x42, 0x4D, ..] => "image/bmp",
        _ => return None,
    };
    debug!("sniffed {} as {mime}", path.display());
    kind_from_mime(mime)
}
