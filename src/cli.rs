use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::output::SheetFormat;

#[derive(Debug, Parser)]
#[command(author, version, about = "Aggregate grade sheets into ranked GPA summaries", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Rank every student and write the table as a named sheet of a workbook directory
    Summarize(SummarizeArgs),
    /// Print the ranked table to the terminal
    Preview(PreviewArgs),
    /// Show one student's semester averages and core course detail
    Student(StudentArgs),
}

/// Options shared by every command: where the grades come from and how the
/// engine interprets them.
#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// Grade sheet (CSV or TSV); `-` reads stdin
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Engine configuration (YAML)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// Core course name fragment; repeat to replace the configured list
    #[arg(long = "core", action = clap::ArgAction::Append)]
    pub core: Vec<String>,
    /// Course name marker that excludes lab sections from the core average
    #[arg(long = "lab-marker")]
    pub lab_marker: Option<String>,
    /// Stop scanning a semester once the student's first run of rows ends
    #[arg(long = "contiguous-scan")]
    pub contiguous_scan: bool,
    /// Leave students with unknown letter grades out instead of failing
    #[arg(long = "skip-invalid-students")]
    pub skip_invalid_students: bool,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Number of rows preceding the header line
    #[arg(long = "header-row", default_value_t = 0)]
    pub header_row: usize,
}

#[derive(Debug, Args)]
pub struct SummarizeArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Workbook directory receiving the sheet
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
    /// Sheet name (defaults to ranking_YYYYMMDD)
    #[arg(long)]
    pub sheet: Option<String>,
    /// Sheet file format
    #[arg(long, value_enum, default_value_t = SheetFormat::Csv)]
    pub format: SheetFormat,
    /// Delimiter for CSV sheets
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
    /// Character encoding for CSV sheets (defaults to utf-8)
    #[arg(long = "output-encoding")]
    pub output_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Number of ranked rows to display
    #[arg(long, default_value_t = 20)]
    pub rows: usize,
}

#[derive(Debug, Args)]
pub struct StudentArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Student id to report on
    #[arg(long = "id")]
    pub id: String,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
