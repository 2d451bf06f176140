use crate::{
    config::Config,
    engine::{ConversionRequest, Engine, LoadedDocument, Office},
    install, meta,
    report::{ConversionReport, Stage},
    url,
    util::{hash_file, now_rfc3339},
};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Resolves the install directory and brings up the engine.
pub fn open_office(cfg: &Config) -> Result<Office> {
    let (dir, source) = install::resolve_install_dir(cfg)?;
    let office = Office::initialize(&dir, &cfg.engine.candidate_libraries)
        .with_context(|| format!("LibreOffice install: {}", dir.display()))?;
    info!("LibreOfficeKit ready from {} ({source:?})", office.install_dir().display());
    Ok(office)
}

/// Drives load → save on an initialised engine. Conversions on one
/// `Converter` run strictly one after another.
pub struct Converter<E: Engine> {
    cfg: Config,
    engine: E,
}

impl<E: Engine> Converter<E> {
    pub fn new(cfg: &Config, engine: E) -> Self {
        Self {
            cfg: cfg.clone(),
            engine,
        }
    }

    pub fn convert(&self, req: &ConversionRequest) -> Result<ConversionReport> {
        let started_at = now_rfc3339();
        let started = Instant::now();
        let mut stage = Stage::EngineReady;

        let input = req.input.display().to_string();
        let output = req.output.display().to_string();
        let input_url = if req.input_is_url {
            input.clone()
        } else {
            if url::looks_like_url(&input) {
                warn!("input looks like a URL but --url was not given: {input}");
            }
            url::encode_path(&req.input)
        };
        let output_url = url::encode_path(&req.output);

        info!(?stage, "load {input_url}");
        let doc = self
            .engine
            .load_document(&input_url, req.options.as_deref())
            .with_context(|| format!("converting {input}"))?;
        stage = Stage::DocumentLoaded;

        info!(
            ?stage,
            "save {output_url} format={:?} options={:?}", req.format, req.options
        );
        doc.save_as(&output_url, req.format.as_deref(), req.options.as_deref())
            .with_context(|| format!("converting {input} to {output}"))?;
        drop(doc);
        stage = Stage::Saved;

        let input_sha256 = if self.cfg.output.hash_input && !req.input_is_url {
            match hash_file(&req.input) {
                Ok(h) => Some(h),
                Err(err) => {
                    warn!("could not hash input: {err:#}");
                    None
                }
            }
        } else {
            None
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        debug!(?stage, elapsed_ms, "conversion finished");

        Ok(ConversionReport {
            input,
            output,
            input_url,
            output_url,
            format: req.format.clone(),
            options: req.options.clone(),
            stage,
            input_sha256,
            started: started_at,
            finished: now_rfc3339(),
            elapsed_ms,
        })
    }

    /// Converts `input` to ODT in a temporary directory, sets `fields` in its
    /// `meta.xml`, then converts that file to `output`. The temporary
    /// directory is gone when this returns.
    pub fn inject_meta(
        &self,
        input: &Path,
        output: &Path,
        fields: &BTreeMap<String, String>,
    ) -> Result<ConversionReport> {
        let tmpdir = tempfile::Builder::new()
            .prefix("inject-meta-")
            .tempdir()
            .with_context(|| "creating temporary directory")?;
        let odt = tmpdir.path().join("tmp.odt");

        self.convert(&ConversionRequest::new(input, &odt))?;
        meta::rewrite_odt_meta(&odt, fields)?;
        let report = self.convert(&ConversionRequest::new(&odt, output))?;

        tmpdir
            .close()
            .with_context(|| "removing temporary directory")?;
        Ok(report)
    }
}
