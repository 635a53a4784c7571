//! Credit-weighted averages for a single student.
//!
//! [`AverageCalculator::overall_average`] yields one [`SemesterAverage`] per
//! semester in partition order, counting every graded row.
//! [`AverageCalculator::core_average`] restricts to courses accepted by the
//! [`CoursePredicate`] and keeps a per-course detail string.
//!
//! When a core course name recurs (a re-take), only the first attempt
//! contributes to the average while the detail string shows the latest
//! attempt.

use serde::Serialize;

use crate::{
    config::{CoursePredicate, ScanMode},
    data::{format_grade_point, format_number, round_half_up},
    error::GradeError,
    grade_points::GradePointTable,
    partition::SemesterPartition,
    records::{GradeRecord, SemesterKey},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemesterAverage {
    pub key: SemesterKey,
    pub average: f64,
    pub total_credit: f64,
}

/// `course_name` paired with its `"letter grade_point credit"` detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoreCourseDetail {
    pub course_name: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoreCourseAverage {
    pub average: f64,
    pub courses: Vec<CoreCourseDetail>,
}

impl CoreCourseAverage {
    pub fn detail(&self, course_name: &str) -> Option<&str> {
        self.courses
            .iter()
            .find(|course| course.course_name == course_name)
            .map(|course| course.detail.as_str())
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct WeightedSum {
    weighted: f64,
    credit: f64,
    rows: usize,
}

impl WeightedSum {
    fn add(&mut self, grade_point: f64, credit: f64) {
        self.weighted += grade_point * credit;
        self.credit += credit;
        self.rows += 1;
    }

    fn average(&self) -> f64 {
        if self.rows == 0 || self.credit == 0.0 {
            0.0
        } else {
            round_half_up(self.weighted / self.credit, 2)
        }
    }
}

/// Read-only view over a partition; safe to share across threads.
#[derive(Debug, Clone, Copy)]
pub struct AverageCalculator<'a> {
    partition: &'a SemesterPartition,
    grades: &'a GradePointTable,
    predicate: &'a CoursePredicate,
    scan_mode: ScanMode,
}

impl<'a> AverageCalculator<'a> {
    pub fn new(
        partition: &'a SemesterPartition,
        grades: &'a GradePointTable,
        predicate: &'a CoursePredicate,
        scan_mode: ScanMode,
    ) -> Self {
        Self {
            partition,
            grades,
            predicate,
            scan_mode,
        }
    }

    pub fn overall_average(&self, student_id: &str) -> Result<Vec<SemesterAverage>, GradeError> {
        let student_id = student_id.trim();
        self.partition
            .iter()
            .map(|(key, rows)| {
                let mut sum = WeightedSum::default();
                for (row, letter) in self.graded_rows(rows, student_id) {
                    sum.add(self.grade_point(student_id, letter)?, row.credit);
                }
                Ok(SemesterAverage {
                    key: *key,
                    average: sum.average(),
                    total_credit: sum.credit,
                })
            })
            .collect()
    }

    pub fn core_average(&self, student_id: &str) -> Result<CoreCourseAverage, GradeError> {
        let student_id = student_id.trim();
        let mut sum = WeightedSum::default();
        let mut courses: Vec<CoreCourseDetail> = Vec::new();
        for (_, rows) in self.partition.iter() {
            // Only a newly recorded course arms the contiguous break; retakes do not.
            let mut recorded = false;
            for row in rows {
                if row.id() != student_id {
                    if self.scan_mode == ScanMode::Contiguous && recorded {
                        break;
                    }
                    continue;
                }
                let Some(letter) = row.grade.letter() else {
                    continue;
                };
                if !self.predicate.is_core_course(&row.course_name) {
                    continue;
                }
                let letter = letter.trim();
                let grade_point = self.grade_point(student_id, letter)?;
                let course_name = row.course_name.trim();
                let detail = format!(
                    "{letter} {} {}",
                    format_grade_point(grade_point),
                    format_number(row.credit)
                );
                match courses.iter_mut().find(|c| c.course_name == course_name) {
                    Some(existing) => existing.detail = detail,
                    None => {
                        sum.add(grade_point, row.credit);
                        courses.push(CoreCourseDetail {
                            course_name: course_name.to_string(),
                            detail,
                        });
                        recorded = true;
                    }
                }
            }
        }
        Ok(CoreCourseAverage {
            average: sum.average(),
            courses,
        })
    }

    /// Rows of `student_id` that carry a grade, paired with their letter grade.
    ///
    /// In [`ScanMode::Contiguous`] the scan stops at the first row of another
    /// student once at least one row has been accepted.
    fn graded_rows<'r>(
        &self,
        rows: &'r [GradeRecord],
        student_id: &str,
    ) -> Vec<(&'r GradeRecord, &'r str)> {
        let mut accepted = Vec::new();
        for row in rows {
            if row.id() != student_id {
                if self.scan_mode == ScanMode::Contiguous && !accepted.is_empty() {
                    break;
                }
                continue;
            }
            if let Some(letter) = row.grade.letter() {
                accepted.push((row, letter));
            }
        }
        accepted
    }

    fn grade_point(&self, student_id: &str, letter: &str) -> Result<f64, GradeError> {
        self.grades
            .lookup(letter)
            .map_err(|grade| GradeError::UnknownGrade {
                student_id: student_id.to_string(),
                grade,
            })
    }
}
