use crate::{
    config::Config,
    engine::ConversionRequest,
    meta,
    pipeline::{open_office, Converter},
    util::ensure_dir,
};
use anyhow::{anyhow, Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_CONFIG: &str = "lloconv.toml";

/// sysexits.h: the command was used incorrectly.
pub const EX_USAGE: i32 = 64;

#[derive(Parser, Debug)]
#[command(name = "lloconv")]
#[command(about = "Convert a document using LibreOfficeKit")]
#[command(after_help = "Known values for FORMAT include:\n  \
    For text documents: doc docx fodt html odt ott pdf txt xhtml\n\n\
    Known OPTIONS include: SkipImages\n\n\
    LO_PATH selects the LibreOffice 'program' directory, e.g. LO_PATH=/opt/libreoffice/program")]
pub struct Args {
    pub input_file: PathBuf,
    pub output_file: PathBuf,

    /// Output format (export filter short name).
    #[arg(short = 'f', long = "format")]
    pub format: Option<String>,

    /// Filter options.
    #[arg(short = 'o', long = "options")]
    pub options: Option<String>,

    /// INPUT_FILE is a URL.
    #[arg(short = 'u', long = "url")]
    pub url: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Parser, Debug)]
#[command(name = "inject-meta")]
#[command(about = "Inject meta-data into a document using LibreOfficeKit")]
pub struct InjectMetaArgs {
    /// Meta field to set, as NAME=VALUE (e.g. dc:title=Report). Repeatable.
    #[arg(short = 'm', value_name = "NAME=VALUE", required = true, value_parser = meta::parse_field)]
    pub meta: Vec<(String, String)>,

    pub input_file: PathBuf,
    pub output_file: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(clap::Args, Debug, Clone)]
pub struct CommonArgs {
    /// Path to config TOML. If omitted, uses ./lloconv.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Exit code for a failed `try_parse`. Help and version requests are not
/// failures.
pub fn usage_exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => EX_USAGE,
    }
}

pub fn run(args: Args) -> i32 {
    let common = args.common.clone();
    run_logged(&common, "lloconv", |cfg| dispatch(args, cfg))
}

pub fn run_inject_meta(args: InjectMetaArgs) -> i32 {
    let common = args.common.clone();
    run_logged(&common, "inject-meta", |cfg| dispatch_inject_meta(args, cfg))
}

/// Ends the process without running atexit handlers or static destructors.
/// LibreOffice can crash in its own teardown after a successful conversion.
pub fn terminate(code: i32) -> ! {
    let _ = std::io::stdout().flush();
    let _ = std::io::stderr().flush();
    unsafe { libc::_exit(code) }
}

/// Loads config, sets up logging and runs `f`. A failure is logged once here;
/// the logging guard is dropped before the code is returned.
fn run_logged(common: &CommonArgs, program: &str, f: impl FnOnce(&Config) -> Result<()>) -> i32 {
    let cfg = match load_config(common.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("{program}: {err:#}");
            return 1;
        }
    };
    let guard = match init_logging(common, &cfg) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("{program}: {err:#}");
            return 1;
        }
    };

    let code = match f(&cfg) {
        Ok(()) => 0,
        Err(err) => {
            error!("{err:#}");
            1
        }
    };
    drop(guard);
    code
}

fn dispatch(args: Args, cfg: &Config) -> Result<()> {
    let req = ConversionRequest {
        input: args.input_file,
        output: args.output_file,
        format: args.format,
        options: args.options,
        input_is_url: args.url,
    };

    let office = open_office(cfg)?;
    let converter = Converter::new(cfg, office);
    let report = converter.convert(&req)?;
    info!("converted {} -> {}", report.input, report.output);

    if cfg.output.print_summary {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

fn dispatch_inject_meta(args: InjectMetaArgs, cfg: &Config) -> Result<()> {
    let fields: BTreeMap<String, String> = args.meta.into_iter().collect();

    let office = open_office(cfg)?;
    let converter = Converter::new(cfg, office);
    let report = converter.inject_meta(&args.input_file, &args.output_file, &fields)?;
    info!("injected {} field(s) into {}", fields.len(), report.output);

    if cfg.output.print_summary {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

pub fn load_config(user: Option<&Path>) -> Result<Config> {
    if let Some(p) = user {
        return Config::load(p);
    }
    let default = Path::new(DEFAULT_CONFIG);
    if default.exists() {
        Config::load(default)
    } else {
        Ok(Config::default())
    }
}

fn init_logging(args: &CommonArgs, cfg: &Config) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries the optional summary only.
    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if cfg.logging.write_to_file && !cfg.logging.file_path.is_empty() {
        let path = Path::new(&cfg.logging.file_path);
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}
