use std::fmt;

use serde::{Serialize, Serializer};

/// A numeric result that may fall outside the reals.
///
/// Zero cells and empty groups produce infinite or undefined ratios; those
/// are carried explicitly instead of being coerced to a number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stat {
    Value(f64),
    Infinite,
    NegInfinite,
    Undefined,
}

impl Stat {
    pub fn from_f64(v: f64) -> Self {
        if v.is_nan() {
            Stat::Undefined
        } else if v == f64::INFINITY {
            Stat::Infinite
        } else if v == f64::NEG_INFINITY {
            Stat::NegInfinite
        } else {
            Stat::Value(v)
        }
    }

    /// `num / den` with a zero denominator mapped out of band.
    pub fn ratio(num: f64, den: f64) -> Self {
        if den == 0.0 {
            if num > 0.0 {
                Stat::Infinite
            } else if num < 0.0 {
                Stat::NegInfinite
            } else {
                Stat::Undefined
            }
        } else {
            Stat::from_f64(num / den)
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Stat::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_finite(self) -> bool {
        matches!(self, Stat::Value(_))
    }
}

impl From<f64> for Stat {
    fn from(v: f64) -> Self {
        Stat::from_f64(v)
    }
}

impl Serialize for Stat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Stat::Value(v) => serializer.serialize_f64(*v),
            Stat::Infinite => serializer.serialize_str("inf"),
            Stat::NegInfinite => serializer.serialize_str("-inf"),
            Stat::Undefined => serializer.serialize_str("undefined"),
        }
    }
}

/// Honors the formatter precision for finite values; out-of-band values
/// render as `inf`, `-inf` and `n/a`.
impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stat::Value(v) => match f.precision() {
                Some(p) => write!(f, "{:.*}", p, v),
                None => write!(f, "{}", v),
            },
            Stat::Infinite => f.write_str("inf"),
            Stat::NegInfinite => f.write_str("-inf"),
            Stat::Undefined => f.write_str("n/a"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_out_of_band() {
        assert_eq!(Stat::ratio(3.0, 0.0), Stat::Infinite);
        assert_eq!(Stat::ratio(-3.0, 0.0), Stat::NegInfinite);
        assert_eq!(Stat::ratio(0.0, 0.0), Stat::Undefined);
        assert_eq!(Stat::ratio(1.0, 4.0), Stat::Value(0.25));
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&vec![
            Stat::Value(0.5),
            Stat::Infinite,
            Stat::NegInfinite,
            Stat::Undefined,
        ])
        .unwrap();
        assert_eq!(json, r#"[0.5,"inf","-inf","undefined"]"#);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{:.3}", Stat::Value(0.12345)), "0.123");
        assert_eq!(format!("{:.3}", Stat::Undefined), "n/a");
        assert_eq!(format!("{}", Stat::Infinite), "inf");
    }
}
