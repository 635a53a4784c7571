//! Raw grade rows and adjacent-duplicate collapsing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Letter grade cell of a grade row. Withdrawn or audited courses carry no grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    Present(String),
    Absent,
}

impl Grade {
    /// Interprets a raw cell; blank and whitespace-only values (including
    /// non-breaking spaces) mean no grade was recorded.
    pub fn from_cell(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Grade::Absent
        } else {
            Grade::Present(trimmed.to_string())
        }
    }

    pub fn letter(&self) -> Option<&str> {
        match self {
            Grade::Present(letter) => Some(letter.as_str()),
            Grade::Absent => None,
        }
    }
}

/// (academic year, semester) pair identifying one partition bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SemesterKey {
    pub academic_year: i32,
    pub semester: i32,
}

impl SemesterKey {
    pub fn new(academic_year: i32, semester: i32) -> Self {
        Self {
            academic_year,
            semester,
        }
    }
}

impl fmt::Display for SemesterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.academic_year, self.semester)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradeRecord {
    pub academic_year: i32,
    pub semester: i32,
    pub student_id: String,
    pub student_name: String,
    pub department: String,
    pub year_level: Option<String>,
    pub course_id: String,
    pub course_name: String,
    pub credit: f64,
    pub grade: Grade,
}

impl GradeRecord {
    /// Minimal row; identity fields are blank and the course id mirrors the name.
    pub fn new(
        academic_year: i32,
        semester: i32,
        student_id: &str,
        course_name: &str,
        credit: f64,
        grade: Grade,
    ) -> Self {
        Self {
            academic_year,
            semester,
            student_id: student_id.to_string(),
            student_name: String::new(),
            department: String::new(),
            year_level: None,
            course_id: course_name.to_string(),
            course_name: course_name.to_string(),
            credit,
            grade,
        }
    }

    pub fn with_identity(mut self, name: &str, department: &str, year_level: Option<&str>) -> Self {
        self.student_name = name.to_string();
        self.department = department.to_string();
        self.year_level = year_level.map(str::to_string);
        self
    }

    pub fn with_course_id(mut self, course_id: &str) -> Self {
        self.course_id = course_id.to_string();
        self
    }

    pub fn semester_key(&self) -> SemesterKey {
        SemesterKey::new(self.academic_year, self.semester)
    }

    pub fn id(&self) -> &str {
        self.student_id.trim()
    }

    pub fn name(&self) -> Option<&str> {
        non_blank(&self.student_name)
    }

    pub fn department(&self) -> Option<&str> {
        non_blank(&self.department)
    }

    pub fn year_level(&self) -> Option<&str> {
        self.year_level.as_deref().and_then(non_blank)
    }

    /// Two rows describe the same enrolment when year, semester, student,
    /// course id and credit all match.
    pub fn same_enrolment(&self, other: &GradeRecord) -> bool {
        self.academic_year == other.academic_year
            && self.semester == other.semester
            && self.id() == other.id()
            && self.course_id.trim() == other.course_id.trim()
            && self.credit == other.credit
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Drops every row that repeats the enrolment of its immediate predecessor.
///
/// Only adjacent rows are compared; callers holding unsorted data must sort
/// by (year, semester, student, course) first.
pub fn dedupe(records: Vec<GradeRecord>) -> Vec<GradeRecord> {
    // A dropped row matches its predecessor, so the last kept row stands in for it.
    let mut kept: Vec<GradeRecord> = Vec::with_capacity(records.len());
    for record in records {
        if kept.last().is_some_and(|prior| prior.same_enrolment(&record)) {
            continue;
        }
        kept.push(record);
    }
    kept
}
