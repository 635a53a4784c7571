//! Canonical student listing and profile resolution across semesters.

use std::collections::HashMap;

use itertools::Itertools;
use serde::Serialize;

use crate::{
    partition::SemesterPartition,
    records::{GradeRecord, SemesterKey},
};

/// Identity columns for one student. Fields never found in any semester stay `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentProfile {
    pub student_id: String,
    pub name: Option<String>,
    pub department: Option<String>,
    pub year_level: Option<String>,
}

/// Ids and names seen within one semester, each deduplicated in first-seen order.
///
/// `departments` and `year_levels` run parallel to `student_ids`: entry `i`
/// comes from the first row of `student_ids[i]` in this semester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemesterRoster {
    pub key: SemesterKey,
    pub student_ids: Vec<String>,
    pub student_names: Vec<String>,
    pub departments: Vec<Option<String>>,
    pub year_levels: Vec<Option<String>>,
}

impl SemesterRoster {
    fn build(key: SemesterKey, rows: &[GradeRecord]) -> Self {
        let first_rows = rows.iter().unique_by(|r| r.id().to_string()).collect::<Vec<_>>();
        Self {
            key,
            student_ids: first_rows.iter().map(|r| r.id().to_string()).collect(),
            student_names: rows
                .iter()
                .filter_map(GradeRecord::name)
                .map(str::to_string)
                .unique()
                .collect(),
            departments: first_rows
                .iter()
                .map(|r| r.department().map(str::to_string))
                .collect(),
            year_levels: first_rows
                .iter()
                .map(|r| r.year_level().map(str::to_string))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudentDirectory {
    student_ids: Vec<String>,
    rosters: Vec<SemesterRoster>,
    profiles: HashMap<String, StudentProfile>,
}

impl StudentDirectory {
    pub fn build(partition: &SemesterPartition) -> Self {
        let rosters = partition
            .iter()
            .map(|(key, rows)| SemesterRoster::build(*key, rows))
            .collect::<Vec<_>>();

        let student_ids = rosters
            .iter()
            .flat_map(|roster| roster.student_ids.iter().cloned())
            .unique()
            .collect::<Vec<_>>();

        let profiles = student_ids
            .iter()
            .map(|id| (id.clone(), resolve_profile(partition, id)))
            .collect();

        Self {
            student_ids,
            rosters,
            profiles,
        }
    }

    /// Every student id across all semesters, in first-seen order.
    pub fn student_ids(&self) -> &[String] {
        &self.student_ids
    }

    pub fn rosters(&self) -> &[SemesterRoster] {
        &self.rosters
    }

    pub fn profile(&self, student_id: &str) -> Option<&StudentProfile> {
        self.profiles.get(student_id.trim())
    }

    /// Profiles in global id order.
    pub fn profiles(&self) -> impl Iterator<Item = &StudentProfile> {
        self.student_ids
            .iter()
            .filter_map(|id| self.profiles.get(id))
    }

    pub fn len(&self) -> usize {
        self.student_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.student_ids.is_empty()
    }
}

fn resolve_profile(partition: &SemesterPartition, student_id: &str) -> StudentProfile {
    StudentProfile {
        student_id: student_id.to_string(),
        name: first_resolved(partition, student_id, GradeRecord::name),
        department: first_resolved(partition, student_id, GradeRecord::department),
        year_level: first_resolved(partition, student_id, GradeRecord::year_level),
    }
}

/// Takes the student's first row in each bucket, walking buckets in partition
/// order, and returns the first non-missing value of `field`.
fn first_resolved<F>(partition: &SemesterPartition, student_id: &str, field: F) -> Option<String>
where
    F: Fn(&GradeRecord) -> Option<&str>,
{
    partition.iter().find_map(|(_, rows)| {
        rows.iter()
            .find(|row| row.id() == student_id)
            .and_then(|row| field(row))
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        partition::partition,
        records::{Grade, GradeRecord},
    };

    fn row(year: i32, semester: i32, id: &str, name: &str, dept: &str, level: Option<&str>) -> GradeRecord {
        GradeRecord::new(year, semester, id, "calc", 3.0, Grade::Absent)
            .with_identity(name, dept, level)
    }

    #[test]
    fn ids_are_trimmed_and_deduplicated_globally() {
        let parts = partition(vec![
            row(110, 1, " s2", "Bea", "Chem", Some("1")),
            row(110, 1, "s1 ", "Ann", "Phys", Some("1")),
            row(110, 2, "s3", "Cid", "Math", None),
            row(110, 2, "s1", "Ann", "Phys", Some("1")),
        ]);
        let directory = StudentDirectory::build(&parts);
        assert_eq!(directory.student_ids(), &["s2", "s1", "s3"]);
        assert_eq!(directory.rosters()[1].student_ids, vec!["s3", "s1"]);
        assert_eq!(directory.rosters()[0].student_names, vec!["Bea", "Ann"]);
    }

    #[test]
    fn roster_departments_and_years_follow_ids() {
        let parts = partition(vec![
            row(110, 1, "s2", "Bea", "Chem", Some("1")),
            row(110, 1, "s1", "Ann", "", None),
            row(110, 1, "s2", "Bea", "Math", Some("2")),
            row(110, 1, "s3", "Cid", "Phys", Some("3")),
            row(110, 1, "s1", "Ann", "Phys", Some("1")),
        ]);
        let directory = StudentDirectory::build(&parts);
        let roster = &directory.rosters()[0];
        assert_eq!(roster.student_ids, vec!["s2", "s1", "s3"]);
        assert_eq!(
            roster.departments,
            vec![Some("Chem".to_string()), None, Some("Phys".to_string())]
        );
        assert_eq!(
            roster.year_levels,
            vec![Some("1".to_string()), None, Some("3".to_string())]
        );
    }

    #[test]
    fn missing_fields_resolve_from_later_semesters() {
        let parts = partition(vec![
            row(110, 1, "s1", "Ann", "", None),
            row(110, 2, "s1", "Ann B.", " Physics ", Some("2")),
            row(111, 1, "s1", "Ann C.", "Chemistry", Some("3")),
        ]);
        let directory = StudentDirectory::build(&parts);
        let profile = directory.profile("s1").unwrap();
        assert_eq!(profile.name.as_deref(), Some("Ann"));
        assert_eq!(profile.department.as_deref(), Some("Physics"));
        assert_eq!(profile.year_level.as_deref(), Some("2"));
    }

    #[test]
    fn never_resolved_fields_stay_unresolved() {
        let parts = partition(vec![row(110, 1, "s1", "Ann", "", None)]);
        let directory = StudentDirectory::build(&parts);
        let profile = directory.profile("s1").unwrap();
        assert_eq!(profile.department, None);
        assert_eq!(profile.year_level, None);
    }
}
