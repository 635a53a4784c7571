//! Reads raw grade sheets (CSV/TSV exports) into [`GradeRecord`]s.
//!
//! Headers are matched by canonical snake_case name, by any spelling that
//! snake-cases to it (`Student ID`, `studentId`), or by the registrar's
//! Chinese column labels. The legacy label `課號` is accepted for the course id.

use std::{io::Read, path::Path};

use anyhow::{Context, Result, anyhow, bail};
use encoding_rs::{Encoding, UTF_8};
use heck::ToSnakeCase;
use log::{debug, info};

use crate::{
    io_utils,
    records::{Grade, GradeRecord},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    AcademicYear,
    Semester,
    StudentId,
    StudentName,
    Department,
    YearLevel,
    CourseId,
    CourseName,
    Credit,
    LetterGrade,
}

const FIELD_COUNT: usize = 10;

impl Field {
    pub const ALL: [Field; FIELD_COUNT] = [
        Field::AcademicYear,
        Field::Semester,
        Field::StudentId,
        Field::StudentName,
        Field::Department,
        Field::YearLevel,
        Field::CourseId,
        Field::CourseName,
        Field::Credit,
        Field::LetterGrade,
    ];

    pub fn canonical(self) -> &'static str {
        match self {
            Field::AcademicYear => "academic_year",
            Field::Semester => "semester",
            Field::StudentId => "student_id",
            Field::StudentName => "student_name",
            Field::Department => "department",
            Field::YearLevel => "year_level",
            Field::CourseId => "course_id",
            Field::CourseName => "course_name",
            Field::Credit => "credit",
            Field::LetterGrade => "letter_grade",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Field::AcademicYear => &["學年"],
            Field::Semester => &["學期"],
            Field::StudentId => &["學號"],
            Field::StudentName => &["學生姓名", "name"],
            Field::Department => &["學生本學系"],
            Field::YearLevel => &["年級"],
            Field::CourseId => &["課程識別碼", "課號", "course_code"],
            Field::CourseName => &["課名"],
            Field::Credit => &["學分", "credits"],
            Field::LetterGrade => &["成績", "grade"],
        }
    }

    /// Identity columns may be missing entirely; they then resolve as unknown.
    pub fn is_required(self) -> bool {
        !matches!(
            self,
            Field::StudentName | Field::Department | Field::YearLevel
        )
    }

    fn matches(self, header: &str) -> bool {
        let trimmed = header.trim();
        let snake = trimmed.to_snake_case();
        snake == self.canonical()
            || self
                .aliases()
                .iter()
                .any(|alias| *alias == trimmed || *alias == snake)
    }
}

/// Position of each [`Field`] within a header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    positions: [Option<usize>; FIELD_COUNT],
}

impl ColumnLayout {
    pub fn resolve(headers: &[String]) -> Result<Self> {
        let mut positions = [None; FIELD_COUNT];
        for (slot, field) in positions.iter_mut().zip(Field::ALL) {
            *slot = headers.iter().position(|header| field.matches(header));
            if slot.is_none() && field.is_required() {
                bail!(
                    "Missing required column '{}' (found: {})",
                    field.canonical(),
                    headers.join(", ")
                );
            }
        }
        Ok(Self { positions })
    }

    pub fn position(&self, field: Field) -> Option<usize> {
        self.positions[field as usize]
    }

    fn cell<'r>(&self, row: &'r [String], field: Field) -> &'r str {
        self.position(field)
            .and_then(|idx| row.get(idx))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn parse_row(&self, row: &[String]) -> Result<GradeRecord> {
        let year_level = self.cell(row, Field::YearLevel).trim();
        Ok(GradeRecord {
            academic_year: parse_integer(self.cell(row, Field::AcademicYear), Field::AcademicYear)?,
            semester: parse_integer(self.cell(row, Field::Semester), Field::Semester)?,
            student_id: self.cell(row, Field::StudentId).trim().to_string(),
            student_name: self.cell(row, Field::StudentName).trim().to_string(),
            department: self.cell(row, Field::Department).trim().to_string(),
            year_level: (!year_level.is_empty()).then(|| year_level.to_string()),
            course_id: self.cell(row, Field::CourseId).trim().to_string(),
            course_name: self.cell(row, Field::CourseName).trim().to_string(),
            credit: parse_credit(self.cell(row, Field::Credit))?,
            grade: Grade::from_cell(self.cell(row, Field::LetterGrade)),
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InputOptions {
    /// Overrides the extension-based delimiter.
    pub delimiter: Option<u8>,
    pub encoding: &'static Encoding,
    /// Rows preceding the header line (report titles and the like).
    pub header_row: usize,
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            encoding: UTF_8,
            header_row: 0,
        }
    }
}

pub fn read_grade_records(path: &Path, options: &InputOptions) -> Result<Vec<GradeRecord>> {
    let delimiter = io_utils::resolve_input_delimiter(path, options.delimiter);
    let reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
    let records = parse_grade_records(reader, options)
        .with_context(|| format!("Reading grade records from {path:?}"))?;
    info!("Read {} grade row(s) from {:?}", records.len(), path);
    Ok(records)
}

/// Parses an already opened sheet; rows keep their document order.
pub fn parse_grade_records<R: Read>(
    mut reader: csv::Reader<R>,
    options: &InputOptions,
) -> Result<Vec<GradeRecord>> {
    let mut rows = reader.byte_records();
    for skipped in 0..options.header_row {
        rows.next()
            .ok_or_else(|| anyhow!("Input ends before header row {}", options.header_row + 1))?
            .with_context(|| format!("Reading row {}", skipped + 1))?;
    }
    let header = rows
        .next()
        .ok_or_else(|| anyhow!("Input has no header row"))?
        .context("Reading header row")?;
    let headers = io_utils::decode_record(&header, options.encoding)?;
    let layout = ColumnLayout::resolve(&headers)?;
    debug!("Resolved grade sheet columns: {:?}", layout);

    let mut records = Vec::new();
    for (offset, row) in rows.enumerate() {
        let line = options.header_row + offset + 2;
        let row = row.with_context(|| format!("Reading row {line}"))?;
        let decoded = io_utils::decode_record(&row, options.encoding)
            .with_context(|| format!("Decoding row {line}"))?;
        if decoded.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let record = layout
            .parse_row(&decoded)
            .with_context(|| format!("Parsing row {line}"))?;
        records.push(record);
    }
    Ok(records)
}

fn parse_integer(raw: &str, field: Field) -> Result<i32> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i32>() {
        return Ok(value);
    }
    // Spreadsheet exports sometimes write whole numbers as `110.0`.
    match trimmed.parse::<f64>() {
        Ok(value) if value.fract() == 0.0 && value.abs() <= i32::MAX as f64 => Ok(value as i32),
        _ => bail!("Failed to parse '{raw}' as {} (integer)", field.canonical()),
    }
}

fn parse_credit(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| anyhow!("Failed to parse '{raw}' as credit"))
}
