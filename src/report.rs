use serde::{Deserialize, Serialize};

/// Progress of one conversion. Failures stop at the last stage reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    EngineReady,
    DocumentLoaded,
    Saved,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    pub input: String,
    pub output: String,
    pub input_url: String,
    pub output_url: String,
    pub format: Option<String>,
    pub options: Option<String>,
    pub stage: Stage,
    #[serde(default)]
    pub input_sha256: Option<String>,
    pub started: String,
    pub finished: String,
    pub elapsed_ms: u64,
}
