//! Locating a LibreOffice `program` directory.

use crate::config::Config;
use anyhow::{Context, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const LO_PATH_ENV: &str = "LO_PATH";

/// Where the install directory came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallSource {
    Config,
    Environment,
    Detected,
    Fallback,
}

/// Resolves the install directory from config, `LO_PATH` and the usual
/// package layouts, in that order.
pub fn resolve_install_dir(cfg: &Config) -> Result<(PathBuf, InstallSource)> {
    let env = std::env::var_os(LO_PATH_ENV).map(PathBuf::from);
    resolve_with_env(cfg, env)
}

pub fn resolve_with_env(cfg: &Config, env: Option<PathBuf>) -> Result<(PathBuf, InstallSource)> {
    let (dir, source) = pick(cfg, env)?;
    debug!("install dir {} ({source:?})", dir.display());
    Ok((dir, source))
}

fn pick(cfg: &Config, env: Option<PathBuf>) -> Result<(PathBuf, InstallSource)> {
    if !cfg.engine.install_dir.is_empty() {
        return Ok((PathBuf::from(&cfg.engine.install_dir), InstallSource::Config));
    }
    if let Some(dir) = env.filter(|d| !d.as_os_str().is_empty()) {
        return Ok((dir, InstallSource::Environment));
    }
    for dir in &cfg.engine.search_dirs {
        let dir = PathBuf::from(dir);
        if is_install(&dir) {
            return Ok((dir, InstallSource::Detected));
        }
    }
    if !cfg.engine.vendor_root.is_empty() {
        for dir in vendor_installs(Path::new(&cfg.engine.vendor_root))? {
            if is_install(&dir) {
                return Ok((dir, InstallSource::Detected));
            }
        }
    }
    Ok((
        PathBuf::from(&cfg.engine.fallback_install_dir),
        InstallSource::Fallback,
    ))
}

/// A `program` directory is recognised by its `versionrc` file.
pub fn is_install(dir: &Path) -> bool {
    let ok = dir.join("versionrc").is_file();
    debug!("checking {} -> {ok}", dir.display());
    ok
}

/// `<root>/libreoffice<version>/program` directories, newest version first.
/// An unversioned `libreoffice` directory sorts last.
pub fn vendor_installs(root: &Path) -> Result<Vec<PathBuf>> {
    let re = Regex::new(r"^libreoffice(\d+(?:\.\d+)*)?$").with_context(|| "compiling vendor dir pattern")?;
    let Ok(entries) = std::fs::read_dir(root) else {
        return Ok(Vec::new());
    };

    let mut found: Vec<(Vec<u32>, PathBuf)> = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let name = e.file_name().into_string().ok()?;
            let caps = re.captures(&name)?;
            let version = caps
                .get(1)
                .map(|m| m.as_str().split('.').filter_map(|p| p.parse().ok()).collect())
                .unwrap_or_default();
            Some((version, e.path().join("program")))
        })
        .collect();

    found.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(found.into_iter().map(|(_, p)| p).collect())
}
