//! Document conversion through LibreOfficeKit.
//!
//! The engine library is located inside a LibreOffice `program` directory,
//! loaded at runtime, and driven through its C function tables: load a
//! document from a URL, then save it under a new URL with an optional export
//! filter and filter options.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod install;
pub mod meta;
pub mod pipeline;
pub mod report;
pub mod url;
pub mod util;

pub use error::EngineError;
