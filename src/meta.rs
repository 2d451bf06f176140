//! Injecting `<office:meta>` fields into an ODF package.

use anyhow::{anyhow, bail, Context, Result};
use regex::{NoExpand, Regex};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const META_OPEN: &str = "<office:meta>";
const META_CLOSE: &str = "</office:meta>";
const META_EMPTY: &str = "<office:meta/>";

/// Parses a `NAME=VALUE` argument such as `dc:title=Annual report`.
pub fn parse_field(arg: &str) -> Result<(String, String)> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("meta field '{arg}' missing '='"))?;
    let re = Regex::new(r"^[A-Za-z_][\w.\-]*(?::[A-Za-z_][\w.\-]*)?$")
        .with_context(|| "compiling element name pattern")?;
    if !re.is_match(name) {
        bail!("meta field name '{name}' is not an XML element name");
    }
    Ok((name.to_string(), value.to_string()))
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn element(name: &str, value: &str) -> String {
    format!("<{name}>{}</{name}>", escape(value))
}

/// Sets `fields` inside the document's `<office:meta>` block.
///
/// Existing `<NAME>…</NAME>` elements are replaced in place; names that are not
/// present yet are appended at the end of the block. XML outside the block is
/// left as is. Without a meta block the input is returned unchanged.
pub fn inject_meta(xml: &str, fields: &BTreeMap<String, String>) -> Result<String> {
    if fields.is_empty() {
        return Ok(xml.to_string());
    }

    if let Some(pos) = xml.find(META_EMPTY) {
        let body: String = fields.iter().map(|(k, v)| element(k, v)).collect();
        let mut out = String::with_capacity(xml.len() + body.len() + META_OPEN.len() + META_CLOSE.len());
        out.push_str(&xml[..pos]);
        out.push_str(META_OPEN);
        out.push_str(&body);
        out.push_str(META_CLOSE);
        out.push_str(&xml[pos + META_EMPTY.len()..]);
        return Ok(out);
    }

    let Some(open) = xml.find(META_OPEN) else {
        debug!("no office:meta block; leaving document untouched");
        return Ok(xml.to_string());
    };
    let body_start = open + META_OPEN.len();
    let body_end = xml[body_start..]
        .find(META_CLOSE)
        .map(|i| body_start + i)
        .ok_or_else(|| anyhow!("unterminated {META_OPEN} block"))?;

    let mut body = xml[body_start..body_end].to_string();
    let mut missing = Vec::new();
    for (name, value) in fields {
        let n = regex::escape(name);
        let re = Regex::new(&format!(r"(?s)<{n}>.*?</{n}>|<{n}/>"))
            .with_context(|| format!("pattern for {name}"))?;
        if re.is_match(&body) {
            body = re.replacen(&body, 1, NoExpand(&element(name, value))).into_owned();
        } else {
            missing.push(element(name, value));
        }
    }
    body.extend(missing);

    let mut out = String::with_capacity(xml.len() + body.len());
    out.push_str(&xml[..body_start]);
    out.push_str(&body);
    out.push_str(&xml[body_end..]);
    Ok(out)
}

/// Rewrites `meta.xml` inside the ODF package at `path`. Every other entry is
/// copied raw, in order, so `mimetype` stays first and stored.
pub fn rewrite_odt_meta(path: &Path, fields: &BTreeMap<String, String>) -> Result<()> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut archive = ZipArchive::new(file).with_context(|| format!("reading zip {}", path.display()))?;

    let xml = {
        let mut entry = archive
            .by_name("meta.xml")
            .with_context(|| format!("no meta.xml in {}", path.display()))?;
        let mut s = String::new();
        entry.read_to_string(&mut s).with_context(|| "reading meta.xml")?;
        s
    };
    let rewritten = inject_meta(&xml, fields)?;

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("temp file in {}", dir.display()))?;
    {
        let mut writer = ZipWriter::new(tmp.as_file_mut());
        for i in 0..archive.len() {
            let entry = archive.by_index_raw(i)?;
            if entry.name() == "meta.xml" {
                drop(entry);
                let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
                writer.start_file("meta.xml", options)?;
                writer.write_all(rewritten.as_bytes())?;
            } else {
                writer.raw_copy_file(entry)?;
            }
        }
        writer.finish()?;
    }
    drop(archive);
    tmp.persist(path)
        .with_context(|| format!("replacing {}", path.display()))?;
    debug!("rewrote meta.xml in {}", path.display());
    Ok(())
}
