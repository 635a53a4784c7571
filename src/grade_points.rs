//! Letter grade to grade point conversion.

use std::collections::HashMap;

use crate::error::{ConfigError, UnknownGradeError};

pub const DEFAULT_GRADE_SCALE: &[(&str, f64)] = &[
    ("A+", 4.3),
    ("A", 4.0),
    ("A-", 3.7),
    ("B+", 3.3),
    ("B", 3.0),
    ("B-", 2.7),
    ("C+", 2.3),
    ("C", 2.0),
    ("C-", 1.7),
    ("F", 0.0),
];

#[derive(Debug, Clone, PartialEq)]
pub struct GradePointTable {
    points: HashMap<String, f64>,
}

impl Default for GradePointTable {
    fn default() -> Self {
        Self {
            points: DEFAULT_GRADE_SCALE
                .iter()
                .map(|(letter, point)| (letter.to_string(), *point))
                .collect(),
        }
    }
}

impl GradePointTable {
    /// Builds a table for a non-default grading scale.
    pub fn from_entries<I, S>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut points = HashMap::new();
        for (letter, value) in entries {
            let letter = letter.as_ref().trim().to_string();
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidGradePoint { letter, value });
            }
            points.insert(letter, value);
        }
        if points.is_empty() {
            return Err(ConfigError::EmptyGradeScale);
        }
        Ok(Self { points })
    }

    pub fn lookup(&self, letter: &str) -> Result<f64, UnknownGradeError> {
        let trimmed = letter.trim();
        self.points
            .get(trimmed)
            .copied()
            .ok_or_else(|| UnknownGradeError {
                letter: trimmed.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scale_covers_ten_letters() {
        let table = GradePointTable::default();
        assert_eq!(table.len(), 10);
        assert_eq!(table.lookup("A+").unwrap(), 4.3);
        assert_eq!(table.lookup("B-").unwrap(), 2.7);
        assert_eq!(table.lookup("F").unwrap(), 0.0);
    }

    #[test]
    fn lookup_trims_surrounding_whitespace() {
        let table = GradePointTable::default();
        assert_eq!(table.lookup(" C+ ").unwrap(), 2.3);
    }

    #[test]
    fn unknown_letter_is_an_error() {
        let table = GradePointTable::default();
        let err = table.lookup("D").unwrap_err();
        assert_eq!(err.letter, "D");
        assert_eq!(err.to_string(), "unknown letter grade 'D'");
    }

    #[test]
    fn custom_scale_rejects_negative_points() {
        let err = GradePointTable::from_entries([("P", 1.0), ("X", -1.0)]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidGradePoint { ref letter, .. } if letter == "X"));
        assert_eq!(
            GradePointTable::from_entries(Vec::<(String, f64)>::new()).unwrap_err(),
            ConfigError::EmptyGradeScale
        );
    }

    #[test]
    fn custom_scale_replaces_defaults() {
        let table = GradePointTable::from_entries([("P", 4.0), ("NP", 0.0)]).unwrap();
        assert_eq!(table.lookup("P").unwrap(), 4.0);
        assert!(table.lookup("A").is_err());
    }
}
