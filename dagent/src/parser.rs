//! Document-parser contract used to turn uploaded context files into text.
//!
//! Plain-text formats are decoded locally. Anything else yields a placeholder
//! so a run can still proceed without a parsing service.
//!
//! ```rust
//! use dagent::{BasicDocumentParser, DocumentParser, UploadedFile};
//!
//! let runtime = tokio::runtime::Builder::new_current_thread()
//!     .build()
//!     .expect("runtime should build");
//! let file = UploadedFile::new("notes.md", b"# Tides".to_vec());
//! let text = runtime
//!     .block_on(BasicDocumentParser.parse(&file))
//!     .expect("markdown should parse");
//! assert_eq!(text, "# Tides");
//! ```

use std::path::Path;

use dcommon::BoxFuture;

use crate::AgentError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    fn extension(&self) -> Option<String> {
        Path::new(&self.filename)
            .extension()
            .and_then(|extension| extension.to_str())
            .map(str::to_ascii_lowercase)
    }
}

pub trait DocumentParser: Send + Sync {
    fn parse<'a>(&'a self, file: &'a UploadedFile) -> BoxFuture<'a, Result<String, AgentError>>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BasicDocumentParser;

impl BasicDocumentParser {
    fn is_plain_text(file: &UploadedFile) -> bool {
        let by_extension = matches!(
            file.extension().as_deref(),
            Some("txt" | "md" | "markdown")
        );
        let by_content_type = file
            .content_type
            .as_deref()
            .is_some_and(|content_type| content_type.contains("text/"));
        by_extension || by_content_type
    }
}

impl DocumentParser for BasicDocumentParser {
    fn parse<'a>(&'a self, file: &'a UploadedFile) -> BoxFuture<'a, Result<String, AgentError>> {
        Box::pin(async move {
            if !Self::is_plain_text(file) {
                return Ok(format!(
                    "[Content from {} - requires a document parsing service for full extraction]",
                    file.filename
                ));
            }

            match std::str::from_utf8(&file.bytes) {
                Ok(text) => Ok(text.to_string()),
                // Latin-1 maps every byte to the code point of the same value.
                Err(_) => Ok(file.bytes.iter().map(|&byte| byte as char).collect()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{BasicDocumentParser, DocumentParser, UploadedFile};

    #[tokio::test]
    async fn text_content_type_overrides_unknown_extension() {
        let file = UploadedFile::new("export.csv", b"a,b\n1,2".to_vec())
            .with_content_type("text/csv");
        let text = BasicDocumentParser
            .parse(&file)
            .await
            .expect("text file should parse");
        assert_eq!(text, "a,b\n1,2");
    }

    #[tokio::test]
    async fn invalid_utf8_falls_back_to_latin1() {
        let file = UploadedFile::new("LEGACY.TXT", vec![b'c', b'a', b'f', 0xE9]);
        let text = BasicDocumentParser
            .parse(&file)
            .await
            .expect("latin-1 file should parse");
        assert_eq!(text, "café");
    }

    #[tokio::test]
    async fn binary_documents_get_a_placeholder() {
        let file = UploadedFile::new("deck.pdf", vec![0x25, 0x50, 0x44, 0x46])
            .with_content_type("application/pdf");
        let text = BasicDocumentParser
            .parse(&file)
            .await
            .expect("placeholder should be returned");
        assert_eq!(
            text,
            "[Content from deck.pdf - requires a document parsing service for full extraction]"
        );
    }
}
