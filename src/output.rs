//! Writes ranked tables as named sheets of a workbook directory.
//!
//! Each sheet is one file (`<sheet>.csv` or `<sheet>.json`) inside the
//! destination directory. A sheet is staged in a hidden temporary file and
//! renamed into place, so other sheets are never touched and writing the
//! same sheet twice simply replaces it.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};
use log::{debug, info};
use regex::Regex;
use serde_json::{Map, Value as JsonValue};

use crate::{io_utils, rank::RankedTable};

const MAX_SHEET_NAME_LEN: usize = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SheetFormat {
    #[default]
    Csv,
    Json,
}

impl SheetFormat {
    pub fn extension(self) -> &'static str {
        match self {
            SheetFormat::Csv => "csv",
            SheetFormat::Json => "json",
        }
    }

    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "csv" => Some(SheetFormat::Csv),
            "json" => Some(SheetFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub format: SheetFormat,
    pub delimiter: u8,
    pub encoding: &'static Encoding,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format: SheetFormat::Csv,
            delimiter: io_utils::DEFAULT_CSV_DELIMITER,
            encoding: UTF_8,
        }
    }
}

fn forbidden_sheet_chars() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[\[\]:*?/\\]").expect("static sheet name pattern"))
}

/// Applies spreadsheet sheet-name rules: no `[]:*?/\`, at most 31 characters.
pub fn sanitize_sheet_name(name: &str) -> Result<String> {
    let replaced = forbidden_sheet_chars().replace_all(name.trim(), "_");
    let sanitized: String = replaced.chars().take(MAX_SHEET_NAME_LEN).collect();
    let sanitized = sanitized.trim().trim_start_matches('.').to_string();
    if sanitized.is_empty() {
        bail!("Sheet name '{name}' is empty after sanitizing");
    }
    Ok(sanitized)
}

pub fn sheet_path(workbook: &Path, sheet_name: &str, format: SheetFormat) -> Result<PathBuf> {
    let sheet = sanitize_sheet_name(sheet_name)?;
    Ok(workbook.join(format!("{sheet}.{}", format.extension())))
}

pub fn write_sheet(
    workbook: &Path,
    sheet_name: &str,
    table: &RankedTable,
    options: &OutputOptions,
) -> Result<PathBuf> {
    fs::create_dir_all(workbook)
        .with_context(|| format!("Creating workbook directory {workbook:?}"))?;
    let target = sheet_path(workbook, sheet_name, options.format)?;

    let bytes = match options.format {
        SheetFormat::Csv => render_csv(table, options.delimiter, options.encoding)?,
        SheetFormat::Json => render_json(table)?,
    };

    let file_name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let staging = workbook.join(format!(".{file_name}.tmp"));
    replace_via_staging(&staging, &target, &bytes)?;
    debug!("Wrote {} byte(s) to {:?}", bytes.len(), target);
    info!(
        "Wrote {} ranked row(s) to sheet {:?}",
        table.len(),
        target
    );
    Ok(target)
}

/// Writes `bytes` to `staging` and renames it over `target`. The staging file
/// never outlives a failed attempt.
fn replace_via_staging(staging: &Path, target: &Path, bytes: &[u8]) -> Result<()> {
    let result = fs::write(staging, bytes)
        .with_context(|| format!("Writing staging file {staging:?}"))
        .and_then(|()| {
            fs::rename(staging, target)
                .with_context(|| format!("Moving sheet into place at {target:?}"))
        });
    if result.is_err() {
        let _ = fs::remove_file(staging);
    }
    result
}

/// Sheet names present in a workbook directory, sorted.
pub fn list_sheets(workbook: &Path) -> Result<Vec<String>> {
    if !workbook.exists() {
        return Ok(Vec::new());
    }
    let mut sheets = Vec::new();
    for entry in
        fs::read_dir(workbook).with_context(|| format!("Listing workbook {workbook:?}"))?
    {
        let path = entry?.path();
        let (Some(stem), Some(ext)) = (
            path.file_stem().and_then(|s| s.to_str()),
            path.extension().and_then(|s| s.to_str()),
        ) else {
            continue;
        };
        if stem.starts_with('.') || SheetFormat::from_extension(ext).is_none() {
            continue;
        }
        sheets.push(stem.to_string());
    }
    sheets.sort();
    Ok(sheets)
}

fn render_csv(table: &RankedTable, delimiter: u8, encoding: &'static Encoding) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true)
        .from_writer(Vec::new());
    writer
        .write_record(&table.headers)
        .context("Writing sheet headers")?;
    for (idx, row) in table.cells().into_iter().enumerate() {
        let fields = row
            .iter()
            .map(|cell| cell.as_ref().map(|value| value.as_display()).unwrap_or_default());
        writer
            .write_record(fields)
            .with_context(|| format!("Writing sheet row {}", idx + 2))?;
    }
    let buffer = writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("Flushing sheet buffer: {}", err.error()))?;
    let text = String::from_utf8(buffer).context("Sheet buffer is not valid UTF-8")?;
    io_utils::encode_text(&text, encoding)
}

fn render_json(table: &RankedTable) -> Result<Vec<u8>> {
    let mut rows = Vec::with_capacity(table.len());
    for cells in table.cells() {
        let mut object = Map::new();
        for (header, cell) in table.headers.iter().zip(cells) {
            object.insert(header.clone(), serde_json::to_value(&cell)?);
        }
        rows.push(JsonValue::Object(object));
    }
    serde_json::to_vec_pretty(&rows).context("Serializing sheet as JSON")
}
