//! Conversion between raw argument text and the closed set of flag types.

use crate::error::Error;
use core::fmt;

/// Type tag of every value a flag can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Text,
    Int,
    Int64,
    Float64,
    Uint,
    Uint64,
}

/// A decoded value, tagged by its [`Kind`].
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Text(String),
    Int(i32),
    Int64(i64),
    Float64(f64),
    Uint(usize),
    Uint64(u64),
}

mod sealed {
    pub trait Sealed {}
}

/// Rust types a flag may be declared with. The set is closed.
pub trait FlagType: Clone + Default + fmt::Debug + sealed::Sealed + 'static {
    const KIND: Kind;

    fn into_scalar(self) -> Scalar;
    fn from_scalar(scalar: Scalar) -> Result<Self, Error>;
}

impl Kind {
    /// Name shown after the flag in usage text.
    pub const fn name(self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::Text => "string",
            Kind::Int => "int",
            Kind::Int64 => "int64",
            Kind::Float64 => "float64",
            Kind::Uint => "uint",
            Kind::Uint64 => "uint64",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Scalar {
    pub const fn kind(&self) -> Kind {
        match self {
            Scalar::Bool(_) => Kind::Bool,
            Scalar::Text(_) => Kind::Text,
            Scalar::Int(_) => Kind::Int,
            Scalar::Int64(_) => Kind::Int64,
            Scalar::Float64(_) => Kind::Float64,
            Scalar::Uint(_) => Kind::Uint,
            Scalar::Uint64(_) => Kind::Uint64,
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Scalar::Bool(value) => !value,
            Scalar::Text(value) => value.is_empty(),
            Scalar::Int(value) => *value == 0,
            Scalar::Int64(value) => *value == 0,
            Scalar::Float64(value) => *value == 0.0,
            Scalar::Uint(value) => *value == 0,
            Scalar::Uint64(value) => *value == 0,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(value) => write!(f, "{value}"),
            Scalar::Text(value) => f.write_str(value),
            Scalar::Int(value) => write!(f, "{value}"),
            Scalar::Int64(value) => write!(f, "{value}"),
            Scalar::Float64(value) => f.write_str(&float(*value)),
            Scalar::Uint(value) => write!(f, "{value}"),
            Scalar::Uint64(value) => write!(f, "{value}"),
        }
    }
}

/// Decodes `raw` as a value of the given kind.
pub fn decode(raw: &str, kind: Kind) -> Result<Scalar, Error> {
    match kind {
        Kind::Bool => parse_bool(raw).map(Scalar::Bool),
        Kind::Text => Ok(Scalar::Text(raw.to_owned())),
        Kind::Int => raw
            .parse()
            .map(Scalar::Int)
            .map_err(|error| Error::malformed(raw, kind, error)),
        Kind::Int64 => raw
            .parse()
            .map(Scalar::Int64)
            .map_err(|error| Error::malformed(raw, kind, error)),
        Kind::Float64 => match raw.parse::<f64>() {
            Ok(value) if value.is_finite() || is_special(raw) => Ok(Scalar::Float64(value)),
            Ok(_) => Err(Error::malformed(raw, kind, "value out of range")),
            Err(error) => Err(Error::malformed(raw, kind, error)),
        },
        Kind::Uint => raw
            .parse()
            .map(Scalar::Uint)
            .map_err(|error| Error::malformed(raw, kind, error)),
        Kind::Uint64 => raw
            .parse()
            .map(Scalar::Uint64)
            .map_err(|error| Error::malformed(raw, kind, error)),
    }
}

/// Decodes `raw` straight into `T`.
pub fn parse<T: FlagType>(raw: &str) -> Result<T, Error> {
    decode(raw, T::KIND).and_then(T::from_scalar)
}

/// Renders a value in the textual form [`parse`] accepts back.
pub fn render<T: FlagType>(value: &T) -> String {
    value.clone().into_scalar().to_string()
}

/// Whether `raw` spells infinity or NaN rather than overflowing into one.
fn is_special(raw: &str) -> bool {
    let unsigned = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    ["inf", "infinity", "nan"]
        .iter()
        .any(|special| unsigned.eq_ignore_ascii_case(special))
}

/// Shortest form of `value`, in exponent notation below 1e-4 and from 1e21 on.
fn float(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let scientific = format!("{value:e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return value.to_string();
    };
    match exponent.parse::<i32>() {
        Ok(exponent) if !(-4..21).contains(&exponent) => {
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
        }
        _ => value.to_string(),
    }
}

fn parse_bool(raw: &str) -> Result<bool, Error> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(Error::malformed(raw, Kind::Bool, "invalid syntax")),
    }
}

macro_rules! flag_type {
    ($type: ty, $kind: ident) => {
        impl sealed::Sealed for $type {}

        impl FlagType for $type {
            const KIND: Kind = Kind::$kind;

            #[inline]
            fn into_scalar(self) -> Scalar {
                Scalar::$kind(self)
            }

            #[inline]
            fn from_scalar(scalar: Scalar) -> Result<Self, Error> {
                match scalar {
                    Scalar::$kind(value) => Ok(value),
                    scalar => Err(Error::UnsupportedType {
                        expected: Kind::$kind,
                        found: scalar.kind(),
                    }),
                }
            }
        }
    };
}

flag_type!(bool, Bool);
flag_type!(String, Text);
flag_type!(i32, Int);
flag_type!(i64, Int64);
flag_type!(f64, Float64);
flag_type!(usize, Uint);
flag_type!(u64, Uint64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booleans() {
        for raw in ["1", "t", "T", "true", "TRUE", "True"] {
            assert!(parse::<bool>(raw).unwrap(), "{raw}");
        }
        for raw in ["0", "f", "F", "false", "FALSE", "False"] {
            assert!(!parse::<bool>(raw).unwrap(), "{raw}");
        }
        assert!(matches!(
            parse::<bool>("notabool"),
            Err(Error::MalformedValue { kind: Kind::Bool, .. })
        ));
        assert!(parse::<bool>("yes").is_err());
    }

    #[test]
    fn text_is_unchanged() {
        assert_eq!(parse::<String>("").unwrap(), "");
        assert_eq!(parse::<String>(" a=b ").unwrap(), " a=b ");
    }

    #[test]
    fn integers() {
        assert_eq!(parse::<i32>("-17").unwrap(), -17);
        assert_eq!(parse::<i32>("+4").unwrap(), 4);
        assert_eq!(parse::<i64>("9223372036854775807").unwrap(), i64::MAX);
        assert_eq!(parse::<usize>("42").unwrap(), 42);
        assert_eq!(parse::<u64>("18446744073709551615").unwrap(), u64::MAX);
        assert!(parse::<i32>("notanint").is_err());
        assert!(parse::<i32>("2147483648").is_err());
        assert!(parse::<usize>("-1").is_err());
        assert!(parse::<u64>("18446744073709551616").is_err());
        assert!(parse::<i64>("1.5").is_err());
    }

    #[test]
    fn floats() {
        assert_eq!(parse::<f64>("1.5").unwrap(), 1.5);
        assert_eq!(parse::<f64>("-2e3").unwrap(), -2000.0);
        assert_eq!(parse::<f64>("7").unwrap(), 7.0);
        assert!(parse::<f64>("one").is_err());
    }

    #[test]
    fn float_overflow_is_malformed() {
        for raw in ["1e400", "-1e400"] {
            assert!(
                matches!(parse::<f64>(raw), Err(Error::MalformedValue { kind: Kind::Float64, .. })),
                "{raw}"
            );
        }
        assert_eq!(parse::<f64>("inf").unwrap(), f64::INFINITY);
        assert_eq!(parse::<f64>("-Infinity").unwrap(), f64::NEG_INFINITY);
        assert!(parse::<f64>("NaN").unwrap().is_nan());
        assert_eq!(parse::<f64>("1e-400").unwrap(), 0.0);
    }

    #[test]
    fn mismatched_scalar_is_unsupported() {
        assert!(matches!(
            i32::from_scalar(Scalar::Text("1".into())),
            Err(Error::UnsupportedType {
                expected: Kind::Int,
                found: Kind::Text
            })
        ));
    }

    #[test]
    fn zero_values() {
        assert!(Scalar::Bool(false).is_zero());
        assert!(Scalar::Text(String::new()).is_zero());
        assert!(Scalar::Float64(0.0).is_zero());
        assert!(!Scalar::Int(-1).is_zero());
        assert!(!Scalar::Text("x".into()).is_zero());
    }

    #[test]
    fn renders_natural_form() {
        assert_eq!(render(&true), "true");
        assert_eq!(render(&-1i32), "-1");
        assert_eq!(render(&2.5f64), "2.5");
        assert_eq!(render(&String::from("foo")), "foo");
    }

    #[test]
    fn floats_switch_to_exponent_at_extremes() {
        assert_eq!(render(&1e21f64), "1e+21");
        assert_eq!(render(&1e20f64), "100000000000000000000");
        assert_eq!(render(&1e-7f64), "1e-07");
        assert_eq!(render(&-2.5e-5f64), "-2.5e-05");
        assert_eq!(render(&0.0001f64), "0.0001");
        assert_eq!(render(&1.5e300f64), "1.5e+300");
        assert_eq!(render(&0.0f64), "0");
        assert_eq!(parse::<f64>(&render(&1e-7f64)).unwrap(), 1e-7);
    }
}
