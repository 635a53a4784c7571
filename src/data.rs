use std::{fmt, str::FromStr};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Serialize, Serializer};

/// One populated cell of a summary or ranked table.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => format_number(*f),
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Value::Text(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Text(s) => serializer.serialize_str(s),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
        }
    }
}

/// Renders whole numbers without a fractional part (`3`, not `3.0`).
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

/// Renders a grade point the way grade sheets print them: always at least one
/// decimal place (`4.0`, `3.7`).
pub fn format_grade_point(value: f64) -> String {
    format!("{value:?}")
}

/// Rounds half away from zero on the shortest decimal form of `value`, so
/// `4.165` becomes `4.17` even though its binary value sits just below.
pub fn round_half_up(value: f64, dp: u32) -> f64 {
    match Decimal::from_str(&value.to_string()) {
        Ok(decimal) => decimal
            .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
            .to_string()
            .parse()
            .unwrap_or(value),
        Err(_) => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_half_up_uses_decimal_representation() {
        assert_eq!(round_half_up(4.165, 2), 4.17);
        assert_eq!(round_half_up(2.675, 2), 2.68);
        assert_eq!(round_half_up(3.7142857, 2), 3.71);
        assert_eq!(round_half_up(-1.005, 2), -1.01);
        assert_eq!(round_half_up(0.0, 2), 0.0);
    }

    #[test]
    fn round_half_up_passes_non_finite_through() {
        assert!(round_half_up(f64::NAN, 2).is_nan());
        assert_eq!(round_half_up(f64::INFINITY, 2), f64::INFINITY);
    }

    #[test]
    fn numbers_drop_trailing_zero_fraction() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(Value::Float(3.71).as_display(), "3.71");
    }

    #[test]
    fn grade_points_keep_one_decimal() {
        assert_eq!(format_grade_point(4.0), "4.0");
        assert_eq!(format_grade_point(4.3), "4.3");
        assert_eq!(format_grade_point(0.0), "0.0");
    }

    #[test]
    fn values_serialize_as_plain_json() {
        let cells = vec![Value::Text("s1".into()), Value::Integer(2), Value::Float(3.5)];
        assert_eq!(serde_json::to_string(&cells).unwrap(), r#"["s1",2,3.5]"#);
    }
}
