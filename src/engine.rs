//! The grade aggregation pipeline behind a single owner.
//!
//! [`GradeEngine::new`] deduplicates, partitions and indexes the records up
//! front. The full summary is computed on first request and kept for the
//! engine's lifetime; build a new engine to recompute.

use std::{cell::OnceCell, collections::HashMap};

use log::{debug, info, warn};

use crate::{
    averages::{AverageCalculator, CoreCourseAverage, SemesterAverage},
    config::{CoursePredicate, EngineConfig, FailurePolicy},
    directory::{StudentDirectory, StudentProfile},
    error::{ConfigError, GradeError},
    grade_points::GradePointTable,
    partition::{self, SemesterPartition},
    rank::RankedTable,
    records::{self, GradeRecord},
    summary::{self, SkippedStudent, SummaryTable},
};

#[derive(Debug)]
pub struct GradeEngine {
    config: EngineConfig,
    grades: GradePointTable,
    predicate: CoursePredicate,
    partition: SemesterPartition,
    directory: StudentDirectory,
    duplicates_dropped: usize,
    summary: OnceCell<SummaryTable>,
}

impl GradeEngine {
    pub fn new(records: Vec<GradeRecord>, config: EngineConfig) -> Result<Self, ConfigError> {
        let grades = config.grade_table()?;
        let predicate = config.course_predicate()?;
        debug!(
            "Grade scale with {} letter(s); core fragments {:?}",
            grades.len(),
            predicate.fragments()
        );

        let raw_count = records.len();
        let deduped = records::dedupe(records);
        let duplicates_dropped = raw_count - deduped.len();
        if duplicates_dropped > 0 {
            info!("Dropped {duplicates_dropped} duplicate grade row(s)");
        }

        let partition = partition::partition(deduped);
        for (key, rows) in partition.iter() {
            debug!("Semester {key}: {} row(s)", rows.len());
        }
        let directory = StudentDirectory::build(&partition);
        info!(
            "Indexed {} student(s) across {} semester(s)",
            directory.len(),
            partition.len()
        );

        Ok(Self {
            config,
            grades,
            predicate,
            partition,
            directory,
            duplicates_dropped,
            summary: OnceCell::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn partition(&self) -> &SemesterPartition {
        &self.partition
    }

    pub fn directory(&self) -> &StudentDirectory {
        &self.directory
    }

    pub fn duplicates_dropped(&self) -> usize {
        self.duplicates_dropped
    }

    pub fn profile(&self, student_id: &str) -> Option<&StudentProfile> {
        self.directory.profile(student_id)
    }

    pub fn calculator(&self) -> AverageCalculator<'_> {
        AverageCalculator::new(
            &self.partition,
            &self.grades,
            &self.predicate,
            self.config.scan_mode,
        )
    }

    pub fn overall_average(&self, student_id: &str) -> Result<Vec<SemesterAverage>, GradeError> {
        self.calculator().overall_average(student_id)
    }

    pub fn core_average(&self, student_id: &str) -> Result<CoreCourseAverage, GradeError> {
        self.calculator().core_average(student_id)
    }

    /// The summary across every student, computed once per engine.
    pub fn summary(&self) -> Result<&SummaryTable, GradeError> {
        if let Some(table) = self.summary.get() {
            return Ok(table);
        }
        let table = self.compute_summary()?;
        Ok(self.summary.get_or_init(|| table))
    }

    pub fn ranked(&self) -> Result<RankedTable, GradeError> {
        Ok(RankedTable::from_summary(self.summary()?))
    }

    fn compute_summary(&self) -> Result<SummaryTable, GradeError> {
        let calculator = self.calculator();
        let mut overall = HashMap::with_capacity(self.directory.len());
        let mut core = HashMap::with_capacity(self.directory.len());
        let mut skipped = Vec::new();

        for student_id in self.directory.student_ids() {
            let result = calculator.overall_average(student_id).and_then(|averages| {
                calculator
                    .core_average(student_id)
                    .map(|core_average| (averages, core_average))
            });
            match result {
                Ok((averages, core_average)) => {
                    overall.insert(student_id.clone(), averages);
                    core.insert(student_id.clone(), core_average);
                }
                Err(err) if self.config.on_unknown_grade == FailurePolicy::SkipStudent => {
                    warn!("Skipping {err}");
                    skipped.push(SkippedStudent {
                        student_id: student_id.clone(),
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        let mut table = summary::build(
            self.partition.keys(),
            self.directory.profiles(),
            &overall,
            &core,
        );
        table.skipped = skipped;
        info!(
            "Summarised {} student(s) with {} core course column(s)",
            table.rows.len(),
            table.core_courses.len()
        );
        Ok(table)
    }
}
