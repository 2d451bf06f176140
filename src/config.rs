use crate::engine::DEFAULT_CANDIDATE_LIBRARIES;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: Engine,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Engine {
    /// Explicit `program` directory. Takes precedence over `LO_PATH`.
    pub install_dir: String,
    /// Package layouts checked for a `versionrc` file when nothing is set.
    pub search_dirs: Vec<String>,
    /// Parent of `libreoffice<version>/program` vendor installs.
    pub vendor_root: String,
    pub fallback_install_dir: String,
    pub candidate_libraries: Vec<String>,
}
impl Default for Engine {
    fn default() -> Self {
        Self {
            install_dir: "".into(),
            search_dirs: vec!["/usr/lib/libreoffice/program".into()],
            vendor_root: "/opt".into(),
            fallback_install_dir: "/opt/libreoffice/program".into(),
            candidate_libraries: DEFAULT_CANDIDATE_LIBRARIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    pub print_summary: bool,
    pub hash_input: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            json: false,
            write_to_file: false,
            file_path: "lloconv.log".into(),
        }
    }
}
