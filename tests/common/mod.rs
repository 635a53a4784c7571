#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use grade_rank::{
    config::EngineConfig,
    engine::GradeEngine,
    input::{InputOptions, read_grade_records},
    records::{Grade, GradeRecord},
};
use tempfile::{TempDir, tempdir};

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}
/// Config matching the English course names used by `grades_sample.csv`.
pub fn sample_config() -> EngineConfig {
    EngineConfig {
        core_fragments: vec![
            "Calculus".to_string(),
            "General Physics".to_string(),
            "General Chemistry".to_string(),
        ],
        lab_marker: "Lab".to_string(),
        ..EngineConfig::default()
    }
}

/// A graded row with no identity columns.
pub fn graded(
    year: i32,
    semester: i32,
    student_id: &str,
    course_name: &str,
    credit: f64,
    letter: &str,
) -> GradeRecord {
    GradeRecord::new(
        year,
        semester,
        student_id,
        course_name,
        credit,
        Grade::from_cell(letter),
    )
}

/// Loads `grades_sample.csv` into an engine using [`sample_config`].
pub fn sample_engine() -> GradeEngine {
    let records = read_grade_records(&fixture_path("grades_sample.csv"), &InputOptions::default())
        .expect("read sample grades");
    GradeEngine::new(records, sample_config()).expect("valid sample config")
}
