//! Per-student results assembled into one wide table.

use std::collections::HashMap;

use serde::Serialize;

use crate::{
    averages::{CoreCourseAverage, SemesterAverage},
    data::Value,
    directory::StudentProfile,
    records::SemesterKey,
};

pub const STUDENT_ID_COLUMN: &str = "student_id";
pub const STUDENT_NAME_COLUMN: &str = "student_name";
pub const DEPARTMENT_COLUMN: &str = "department";
pub const YEAR_LEVEL_COLUMN: &str = "year_level";
pub const CORE_AVERAGE_COLUMN: &str = "core_average";

pub fn semester_average_column(key: &SemesterKey) -> String {
    format!("{key} average")
}

pub fn semester_credit_column(key: &SemesterKey) -> String {
    format!("{key} credits")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub profile: StudentProfile,
    pub semesters: Vec<SemesterAverage>,
    pub core: CoreCourseAverage,
}

impl SummaryRow {
    pub fn core_average(&self) -> f64 {
        self.core.average
    }

    /// Cells in the column order of a table whose core course columns are `core_courses`.
    pub fn cells(&self, core_courses: &[String]) -> Vec<Option<Value>> {
        let profile = &self.profile;
        let mut cells = vec![
            Some(Value::Text(profile.student_id.clone())),
            profile.name.clone().map(Value::Text),
            profile.department.clone().map(Value::Text),
            profile.year_level.clone().map(Value::Text),
        ];
        for semester in &self.semesters {
            cells.push(Some(Value::Float(semester.average)));
            cells.push(Some(Value::Float(semester.total_credit)));
        }
        cells.push(Some(Value::Float(self.core.average)));
        for course in core_courses {
            cells.push(
                self.core
                    .detail(course)
                    .map(|detail| Value::Text(detail.to_string())),
            );
        }
        cells
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedStudent {
    pub student_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryTable {
    pub semesters: Vec<SemesterKey>,
    pub core_courses: Vec<String>,
    pub rows: Vec<SummaryRow>,
    pub skipped: Vec<SkippedStudent>,
}

impl SummaryTable {
    pub fn headers(&self) -> Vec<String> {
        let mut headers = vec![
            STUDENT_ID_COLUMN.to_string(),
            STUDENT_NAME_COLUMN.to_string(),
            DEPARTMENT_COLUMN.to_string(),
            YEAR_LEVEL_COLUMN.to_string(),
        ];
        for key in &self.semesters {
            headers.push(semester_average_column(key));
            headers.push(semester_credit_column(key));
        }
        headers.push(CORE_AVERAGE_COLUMN.to_string());
        headers.extend(self.core_courses.iter().cloned());
        headers
    }

    pub fn row(&self, student_id: &str) -> Option<&SummaryRow> {
        self.rows
            .iter()
            .find(|row| row.profile.student_id == student_id)
    }
}

/// Builds one row per profile that has both an overall and a core result.
/// Profiles without results (students skipped upstream) are left out.
pub fn build<'p, I>(
    semesters: &[SemesterKey],
    profiles: I,
    overall: &HashMap<String, Vec<SemesterAverage>>,
    core: &HashMap<String, CoreCourseAverage>,
) -> SummaryTable
where
    I: IntoIterator<Item = &'p StudentProfile>,
{
    let mut table = SummaryTable {
        semesters: semesters.to_vec(),
        ..SummaryTable::default()
    };
    for profile in profiles {
        let (Some(semester_averages), Some(core_average)) = (
            overall.get(&profile.student_id),
            core.get(&profile.student_id),
        ) else {
            continue;
        };
        for course in &core_average.courses {
            if !table.core_courses.contains(&course.course_name) {
                table.core_courses.push(course.course_name.clone());
            }
        }
        table.rows.push(SummaryRow {
            profile: profile.clone(),
            semesters: semester_averages.clone(),
            core: core_average.clone(),
        });
    }
    table
}
