pub mod ffi;
pub mod lok;
pub mod types;

use crate::error::EngineError;

pub use lok::{find_library, Document, Office, DEFAULT_CANDIDATE_LIBRARIES};
pub use types::ConversionRequest;

/// A loaded document engine. Implementations are driven by exactly one
/// conversion at a time.
pub trait Engine {
    type Document<'a>: LoadedDocument
    where
        Self: 'a;

    fn load_document(&self, url: &str, options: Option<&str>) -> Result<Self::Document<'_>, EngineError>;

    /// Most recent engine error. Only meaningful directly after a failed call.
    fn last_error(&self) -> String;
}

pub trait LoadedDocument {
    fn save_as(&self, url: &str, format: Option<&str>, options: Option<&str>) -> Result<(), EngineError>;
}
