use serde::{Deserialize, Serialize};
use std::fmt;

/// A literal read from a scalar trace, typed by its lexical shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl ScalarValue {
    /// Infer the tightest type for a literal.
    ///
    /// Literals carrying a decimal point or an exponent marker are floats, everything else is
    /// tried as an integer. A literal that fails its numeric parse is kept verbatim as text,
    /// so `"1e10"` is a float while `"NaNtext"` stays a string.
    pub fn coerce(literal: &str) -> Self {
        let parsed = if literal.contains(['.', 'e', 'E']) {
            literal.parse::<f64>().ok().map(ScalarValue::Float)
        } else {
            literal.parse::<i64>().ok().map(ScalarValue::Integer)
        };
        parsed.unwrap_or_else(|| ScalarValue::Text(literal.to_string()))
    }

    /// Numeric view of the value. Text never converts.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScalarValue::Integer(v) => Some(*v as f64),
            ScalarValue::Float(v) => Some(*v),
            ScalarValue::Text(_) => None,
        }
    }

    /// Integer view of the value; floats truncate toward zero.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ScalarValue::Integer(v) => Some(*v),
            ScalarValue::Float(v) if v.is_finite() => Some(v.trunc() as i64),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, ScalarValue::Text(_))
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Integer(v) => write!(f, "{v}"),
            ScalarValue::Float(v) => write!(f, "{v}"),
            ScalarValue::Text(v) => f.write_str(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ScalarValue;

    #[test]
    fn coerces_integers() {
        assert_eq!(ScalarValue::coerce("12345"), ScalarValue::Integer(12345));
        assert_eq!(ScalarValue::coerce("-7"), ScalarValue::Integer(-7));
    }

    #[test]
    fn coerces_floats_by_shape() {
        assert_eq!(ScalarValue::coerce("3.14"), ScalarValue::Float(3.14));
        assert_eq!(ScalarValue::coerce("1e10"), ScalarValue::Float(1e10));
        assert_eq!(ScalarValue::coerce("2E-3"), ScalarValue::Float(2e-3));
    }

    #[test]
    fn keeps_unparseable_literals_as_text() {
        assert_eq!(
            ScalarValue::coerce("NaNtext"),
            ScalarValue::Text("NaNtext".to_string())
        );
        // No '.' or exponent marker: goes through the integer branch and fails there.
        assert_eq!(ScalarValue::coerce("inf"), ScalarValue::Text("inf".to_string()));
        assert_eq!(ScalarValue::coerce("1.2.3"), ScalarValue::Text("1.2.3".to_string()));
    }

    #[test]
    fn numeric_views() {
        assert_eq!(ScalarValue::Integer(4).as_f64(), Some(4.0));
        assert_eq!(ScalarValue::Float(9.9).as_i64(), Some(9));
        assert_eq!(ScalarValue::Text("x".into()).as_f64(), None);
        assert!(!ScalarValue::Text("x".into()).is_numeric());
    }
}
