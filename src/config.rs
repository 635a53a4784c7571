//! Engine configuration and its YAML persistence.
//!
//! An [`EngineConfig`] names the core-course fragments, the lab marker that
//! excludes experiment sections, an optional replacement grading scale, and
//! the scan and failure policies. Every field has a default so a YAML file
//! only needs to list what it changes:
//!
//! ```yaml
//! core_fragments: ["Calculus", "General Physics", "General Chemistry"]
//! lab_marker: "Lab"
//! scan_mode: full-scan
//! on_unknown_grade: skip-student
//! ```

use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigError,
    grade_points::{DEFAULT_GRADE_SCALE, GradePointTable},
};

pub const DEFAULT_CORE_FRAGMENTS: [&str; 3] = ["微積分", "普通物理", "普通化學"];
pub const DEFAULT_LAB_MARKER: &str = "實驗";

/// How a semester bucket is scanned for one student's rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanMode {
    /// Filter every row of the bucket.
    #[default]
    FullScan,
    /// Stop once the student's first run of rows ends. Rows for the same
    /// student that appear after another student's rows are ignored.
    Contiguous,
}

/// What a batch summary does when a student's grades cannot be converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    #[default]
    Abort,
    SkipStudent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub core_fragments: Vec<String>,
    pub lab_marker: String,
    pub grade_scale: Option<BTreeMap<String, f64>>,
    pub scan_mode: ScanMode,
    pub on_unknown_grade: FailurePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            core_fragments: DEFAULT_CORE_FRAGMENTS.iter().map(|s| s.to_string()).collect(),
            lab_marker: DEFAULT_LAB_MARKER.to_string(),
            grade_scale: None,
            scan_mode: ScanMode::default(),
            on_unknown_grade: FailurePolicy::default(),
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            fs::read_to_string(path).with_context(|| format!("Opening config file {path:?}"))?;
        let config: EngineConfig = serde_yaml::from_str(&raw)
            .with_context(|| format!("Parsing config file {path:?}"))?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let serialized = serde_yaml::to_string(self).context("Serializing engine config")?;
        fs::write(path, serialized).with_context(|| format!("Writing config file {path:?}"))
    }

    pub fn course_predicate(&self) -> Result<CoursePredicate, ConfigError> {
        CoursePredicate::new(&self.core_fragments, &self.lab_marker)
    }

    pub fn grade_table(&self) -> Result<GradePointTable, ConfigError> {
        match &self.grade_scale {
            Some(scale) => GradePointTable::from_entries(scale.iter().map(|(k, v)| (k, *v))),
            None => Ok(GradePointTable::default()),
        }
    }

    /// The scale in effect, for display and round-tripping to YAML.
    pub fn effective_scale(&self) -> BTreeMap<String, f64> {
        self.grade_scale.clone().unwrap_or_else(|| {
            DEFAULT_GRADE_SCALE
                .iter()
                .map(|(letter, point)| (letter.to_string(), *point))
                .collect()
        })
    }
}

/// Decides whether a course name counts toward the core average.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoursePredicate {
    fragments: Vec<String>,
    lab_marker: Option<String>,
}

impl CoursePredicate {
    pub fn new<S: AsRef<str>>(fragments: &[S], lab_marker: &str) -> Result<Self, ConfigError> {
        if fragments.is_empty() {
            return Err(ConfigError::NoCoreFragments);
        }
        let fragments = fragments
            .iter()
            .map(|f| f.as_ref().trim().to_string())
            .collect::<Vec<_>>();
        if fragments.iter().any(String::is_empty) {
            return Err(ConfigError::BlankCoreFragment);
        }
        let marker = lab_marker.trim();
        Ok(Self {
            fragments,
            lab_marker: (!marker.is_empty()).then(|| marker.to_string()),
        })
    }

    pub fn is_core_course(&self, course_name: &str) -> bool {
        let matches_fragment = self
            .fragments
            .iter()
            .any(|fragment| course_name.contains(fragment.as_str()));
        let is_lab = self
            .lab_marker
            .as_deref()
            .is_some_and(|marker| course_name.contains(marker));
        matches_fragment && !is_lab
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }
}
