//! Error types for template-guided presentation generation.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating a presentation.
///
/// Only [`Error::TemplateUnreadable`] and output-side failures abort a
/// request; [`Error::LayoutUnusable`] is recovered per slide by the
/// assembler.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read an input file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The template package could not be parsed at all.
    #[error("Template is unreadable: {0}")]
    TemplateUnreadable(String),

    /// A layout cannot hold the requested slide content.
    #[error("Layout {layout} is unusable: {reason}")]
    LayoutUnusable { layout: usize, reason: String },

    /// ZIP archive error while writing the output package.
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML error while writing the output package.
    #[error("XML error: {0}")]
    XmlError(String),

    /// The slide plan could not be decoded.
    #[error("Invalid slide plan: {0}")]
    PlanError(String),

    /// The document sink rejected a slide.
    #[error("Serialization error: {0}")]
    SerializeError(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::PlanError(err.to_string())
    }
}
