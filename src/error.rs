use thiserror::Error;

/// A letter grade that has no entry in the active grade point table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown letter grade '{letter}'")]
pub struct UnknownGradeError {
    pub letter: String,
}

/// Failures raised while computing a single student's averages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GradeError {
    #[error("student '{student_id}': {grade}")]
    UnknownGrade {
        student_id: String,
        grade: UnknownGradeError,
    },
}

impl GradeError {
    pub fn student_id(&self) -> &str {
        match self {
            GradeError::UnknownGrade { student_id, .. } => student_id,
        }
    }
}

/// Rejected engine configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("at least one core course fragment is required")]
    NoCoreFragments,
    #[error("core course fragments must not be blank")]
    BlankCoreFragment,
    #[error("grade scale must define at least one letter grade")]
    EmptyGradeScale,
    #[error("grade point for '{letter}' must be a finite, non-negative number (got {value})")]
    InvalidGradePoint { letter: String, value: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_grade_is_reported_once_in_context_chain() {
        let err = GradeError::UnknownGrade {
            student_id: "s2".into(),
            grade: UnknownGradeError { letter: "W".into() },
        };
        let chained = format!(
            "{:#}",
            anyhow::Error::new(err).context("Computing student averages")
        );
        assert_eq!(
            chained,
            "Computing student averages: student 's2': unknown letter grade 'W'"
        );
    }
}
