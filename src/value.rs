//! Semantic value kinds and the leaf value union.
//!
//! Every compiled column resolves to exactly one [`Kind`]; every extracted
//! cell is either a [`Value`] of that kind or absent (`None`). The kind is a
//! property of the compiled path, fixed when the column is built — absence is
//! a property of individual rows.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// The semantic kind of a column.
///
/// This is the closed set of result types a compiled access path can resolve
/// to. `Unavailable` is only ever produced by classification — a successfully
/// compiled column always has one of the other kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    /// No recognized semantic kind; such a type cannot terminate a column.
    Unavailable,
    /// Boolean values.
    Bool,
    /// Signed or unsigned integers, widened to 64 bits.
    Int,
    /// Floating-point values, widened to `f64`.
    Float,
    /// Complex numbers, widened to `Complex64`.
    Complex,
    /// Text values.
    Text,
    /// Calendar timestamps (`DateTime<Utc>`).
    Timestamp,
    /// Elapsed durations (`std::time::Duration`).
    Duration,
}

impl Kind {
    /// The kind's canonical name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unavailable => "unavailable",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Complex => "complex",
            Self::Text => "text",
            Self::Timestamp => "timestamp",
            Self::Duration => "duration",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One extracted leaf value.
///
/// Narrow representations are widened on read: `i8..=i32` and `isize` to
/// [`Value::Int`], `u8..=u32` and `usize` to [`Value::Uint`], `f32` to
/// [`Value::Float`], `Complex32` to [`Value::Complex`]. Unsigned integers get
/// their own variant so magnitudes above `i64::MAX` survive extraction
/// without sign corruption; their kind is still [`Kind::Int`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A boolean.
    Bool(bool),
    /// A signed integer, widened to `i64`.
    Int(i64),
    /// An unsigned integer, widened to `u64`.
    Uint(u64),
    /// A floating-point number, widened to `f64`.
    Float(f64),
    /// A complex number, widened to `Complex64`.
    Complex(Complex64),
    /// A text value.
    Text(String),
    /// A calendar timestamp.
    Timestamp(DateTime<Utc>),
    /// An elapsed duration.
    Duration(Duration),
}

impl Value {
    /// The semantic kind of this value.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Bool(_) => Kind::Bool,
            Self::Int(_) | Self::Uint(_) => Kind::Int,
            Self::Float(_) => Kind::Float,
            Self::Complex(_) => Kind::Complex,
            Self::Text(_) => Kind::Text,
            Self::Timestamp(_) => Kind::Timestamp,
            Self::Duration(_) => Kind::Duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(Kind::Bool.to_string(), "bool");
        assert_eq!(Kind::Int.as_str(), "int");
        assert_eq!(Kind::Unavailable.as_str(), "unavailable");
        assert_eq!(Kind::Duration.to_string(), "duration");
    }

    #[test]
    fn test_kind_serde_round_trip() {
        let json = serde_json::to_string(&Kind::Timestamp).unwrap();
        assert_eq!(json, "\"timestamp\"");
        let back: Kind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Kind::Timestamp);
    }

    #[test]
    fn test_value_kinds() {
        assert_eq!(Value::Bool(true).kind(), Kind::Bool);
        assert_eq!(Value::Int(-3).kind(), Kind::Int);
        assert_eq!(Value::Uint(u64::MAX).kind(), Kind::Int);
        assert_eq!(Value::Float(2.5).kind(), Kind::Float);
        assert_eq!(Value::Complex(Complex64::new(1.0, -1.0)).kind(), Kind::Complex);
        assert_eq!(Value::Text("hi".to_string()).kind(), Kind::Text);
        assert_eq!(Value::Timestamp(Utc::now()).kind(), Kind::Timestamp);
        assert_eq!(Value::Duration(Duration::from_secs(1)).kind(), Kind::Duration);
    }

    #[test]
    fn test_unsigned_magnitude_survives() {
        let v = Value::Uint(u64::MAX);
        match v {
            Value::Uint(u) => assert_eq!(u, u64::MAX),
            _ => panic!("wrong variant"),
        }
    }
}
