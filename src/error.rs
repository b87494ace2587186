use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CertError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("certificate template not found: {}", .0.display())]
    MissingTemplate(PathBuf),
    #[error("template is not a usable pdf: {0}")]
    TemplateLoad(String),
    #[error("template pdf has no pages")]
    EmptyTemplate,
    #[error("font `{font}` cannot be embedded: {reason}")]
    FontEmbed { font: String, reason: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse split a request boundary needs to choose between a client error
/// and a server error response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    BadInput,
    ResourceFault,
}

impl CertError {
    pub fn class(&self) -> ErrorClass {
        match self {
            CertError::InvalidInput(_) => ErrorClass::BadInput,
            _ => ErrorClass::ResourceFault,
        }
    }

    pub(crate) fn font_embed(font: impl Into<String>, reason: impl Into<String>) -> Self {
        CertError::FontEmbed {
            font: font.into(),
            reason: reason.into(),
        }
    }
}
