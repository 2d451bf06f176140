use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Export filter short name (`pdf`, `docx`, ...). `None` lets the engine
    /// pick from the output extension.
    #[serde(default)]
    pub format: Option<String>,
    /// Filter options, e.g. `SkipImages`.
    #[serde(default)]
    pub options: Option<String>,
    /// `input` is already a URL and is passed through untouched.
    #[serde(default)]
    pub input_is_url: bool,
}

impl ConversionRequest {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: Option<String>) -> Self {
        self.format = format;
        self
    }

    pub fn with_options(mut self, options: Option<String>) -> Self {
        self.options = options;
        self
    }
}
