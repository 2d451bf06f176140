use std::ffi::NulError;
use thiserror::Error;

/// Failures reported by the LibreOfficeKit boundary.
///
/// The `String` payloads carry the engine's own message verbatim; the variant
/// only records which phase failed.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to initialise LibreOfficeKit: {0}")]
    Initialization(String),

    #[error("LibreOfficeKit failed to load document ({0})")]
    Import(String),

    #[error("LibreOfficeKit failed to export ({0})")]
    Export(String),

    #[error("{what} contains an interior NUL byte")]
    InvalidString {
        what: &'static str,
        #[source]
        source: NulError,
    },
}

impl EngineError {
    /// The native message (or our own for initialization problems).
    pub fn message(&self) -> String {
        match self {
            Self::Initialization(m) | Self::Import(m) | Self::Export(m) => m.clone(),
            Self::InvalidString { .. } => self.to_string(),
        }
    }
}
