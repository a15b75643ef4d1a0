//! Typed values that config fields are bound to.
//!
//! Every registered field owns one [`Value`]. The built-in values are
//! [`Slot<T>`] for each [`Scalar`] type; applications may register their own
//! implementations through [`ConfSet::var`](super::ConfSet::var).

use std::any::Any;
use std::fmt;
use std::time::Duration;

use super::duration::{format_duration, parse_duration};
use super::ValueError;

/// The dynamic value stored behind a registered field.
pub trait Value: fmt::Display + fmt::Debug + Any {
    /// Parses `text` and stores the result.
    ///
    /// On error the current value is left untouched.
    fn set(&mut self, text: &str) -> Result<(), ValueError>;

    /// Name of the expected type, used in diagnostics.
    fn kind(&self) -> &'static str;

    /// Whether a bare key without `=value` may stand for `true`.
    ///
    /// The file parser always requires `=`, so this only matters to callers
    /// that reuse values in a flag-style front end.
    fn is_bool_flag(&self) -> bool {
        false
    }

    /// Converts the current value for [`ConfSet::to_table`](super::ConfSet::to_table).
    fn to_toml(&self) -> toml::Value {
        toml::Value::String(self.to_string())
    }

    fn as_any(&self) -> &dyn Any;
}

/// A native type that can be parsed from a config token.
pub trait Scalar: Clone + fmt::Debug + 'static {
    const KIND: &'static str;

    fn parse_token(text: &str) -> Result<Self, ValueError>;

    fn render(&self) -> String;

    fn to_toml(&self) -> toml::Value;
}

/// Storage for a single [`Scalar`] value.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot<T>(T);

impl<T: Scalar> Slot<T> {
    pub fn new(initial: T) -> Self {
        Self(initial)
    }

    pub fn get(&self) -> &T {
        &self.0
    }
}

impl<T: Scalar> fmt::Display for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.render())
    }
}

impl<T: Scalar> Value for Slot<T> {
    fn set(&mut self, text: &str) -> Result<(), ValueError> {
        self.0 = T::parse_token(text)?;
        Ok(())
    }

    fn kind(&self) -> &'static str {
        T::KIND
    }

    fn is_bool_flag(&self) -> bool {
        T::KIND == <bool as Scalar>::KIND
    }

    fn to_toml(&self) -> toml::Value {
        self.0.to_toml()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Scalar for bool {
    const KIND: &'static str = "bool";

    fn parse_token(text: &str) -> Result<Self, ValueError> {
        match text {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
            _ => Err(ValueError::new(text, Self::KIND, "expected true or false")),
        }
    }

    fn render(&self) -> String {
        self.to_string()
    }

    fn to_toml(&self) -> toml::Value {
        toml::Value::Boolean(*self)
    }
}

macro_rules! signed_scalar {
    ($ty:ty, $kind:literal) => {
        impl Scalar for $ty {
            const KIND: &'static str = $kind;

            fn parse_token(text: &str) -> Result<Self, ValueError> {
                let err = |reason: &str| ValueError::new(text, Self::KIND, reason);
                let (negative, digits) = match text.as_bytes().first() {
                    Some(b'-') => (true, &text[1..]),
                    Some(b'+') => (false, &text[1..]),
                    _ => (false, text),
                };
                let magnitude = i128::from(parse_magnitude(digits).map_err(err)?);
                let value = if negative { -magnitude } else { magnitude };
                <$ty>::try_from(value).map_err(|_| err("value out of range"))
            }

            fn render(&self) -> String {
                self.to_string()
            }

            fn to_toml(&self) -> toml::Value {
                match i64::try_from(*self) {
                    Ok(v) => toml::Value::Integer(v),
                    Err(_) => toml::Value::String(self.to_string()),
                }
            }
        }
    };
}

macro_rules! unsigned_scalar {
    ($ty:ty, $kind:literal) => {
        impl Scalar for $ty {
            const KIND: &'static str = $kind;

            fn parse_token(text: &str) -> Result<Self, ValueError> {
                let err = |reason: &str| ValueError::new(text, Self::KIND, reason);
                if text.starts_with(['-', '+']) {
                    return Err(err("sign not allowed"));
                }
                let magnitude = parse_magnitude(text).map_err(err)?;
                <$ty>::try_from(magnitude).map_err(|_| err("value out of range"))
            }

            fn render(&self) -> String {
                self.to_string()
            }

            fn to_toml(&self) -> toml::Value {
                match i64::try_from(*self) {
                    Ok(v) => toml::Value::Integer(v),
                    Err(_) => toml::Value::String(self.to_string()),
                }
            }
        }
    };
}

signed_scalar!(isize, "int");
signed_scalar!(i64, "int64");
unsigned_scalar!(usize, "uint");
unsigned_scalar!(u64, "uint64");

impl Scalar for f64 {
    const KIND: &'static str = "float64";

    fn parse_token(text: &str) -> Result<Self, ValueError> {
        text.parse::<f64>()
            .map_err(|e| ValueError::new(text, Self::KIND, e))
    }

    fn render(&self) -> String {
        self.to_string()
    }

    fn to_toml(&self) -> toml::Value {
        toml::Value::Float(*self)
    }
}

impl Scalar for String {
    const KIND: &'static str = "string";

    fn parse_token(text: &str) -> Result<Self, ValueError> {
        Ok(text.to_string())
    }

    fn render(&self) -> String {
        self.clone()
    }

    fn to_toml(&self) -> toml::Value {
        toml::Value::String(self.clone())
    }
}

impl Scalar for Duration {
    const KIND: &'static str = "duration";

    fn parse_token(text: &str) -> Result<Self, ValueError> {
        parse_duration(text)
    }

    fn render(&self) -> String {
        format_duration(*self)
    }

    /// Shaped as `{ secs, nanos }`, which is what serde expects for `Duration`.
    fn to_toml(&self) -> toml::Value {
        let mut table = toml::Table::new();
        let secs = i64::try_from(self.as_secs()).unwrap_or(i64::MAX);
        table.insert("secs".into(), toml::Value::Integer(secs));
        table.insert("nanos".into(), toml::Value::Integer(i64::from(self.subsec_nanos())));
        toml::Value::Table(table)
    }
}

/// Parses an unsigned integer literal with an optional base prefix:
/// `0x` (hex), `0o` or a bare leading `0` (octal), `0b` (binary), else decimal.
/// Underscores may separate digits only after a base prefix.
fn parse_magnitude(text: &str) -> Result<u64, &'static str> {
    let lower = text.get(..2).map(str::to_ascii_lowercase);
    let (radix, digits, prefixed) = match lower.as_deref() {
        Some("0x") => (16, &text[2..], true),
        Some("0o") => (8, &text[2..], true),
        Some("0b") => (2, &text[2..], true),
        _ if text.len() > 1 && text.starts_with('0') => (8, &text[1..], true),
        _ => (10, text, false),
    };

    let digits = if prefixed && digits.contains('_') {
        if digits.starts_with('_') || digits.ends_with('_') || digits.contains("__") {
            return Err("misplaced underscore");
        }
        digits.replace('_', "")
    } else {
        digits.to_string()
    };

    if digits.is_empty() {
        return Err("missing digits");
    }
    // from_str_radix would otherwise accept a second sign
    if !digits.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err("invalid digit");
    }

    u64::from_str_radix(&digits, radix).map_err(|e| match e.kind() {
        std::num::IntErrorKind::PosOverflow => "value out of range",
        _ => "invalid digit",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_aliases() {
        for t in ["1", "t", "T", "TRUE", "true", "True"] {
            assert!(bool::parse_token(t).unwrap(), "{t}");
        }
        for f in ["0", "f", "F", "FALSE", "false", "False"] {
            assert!(!bool::parse_token(f).unwrap(), "{f}");
        }
        assert!(bool::parse_token("yes").is_err());
        assert!(bool::parse_token("tRUE").is_err());
    }

    #[test]
    fn test_signed_bases() {
        assert_eq!(i64::parse_token("42").unwrap(), 42);
        assert_eq!(i64::parse_token("-42").unwrap(), -42);
        assert_eq!(i64::parse_token("+7").unwrap(), 7);
        assert_eq!(i64::parse_token("0x1F").unwrap(), 31);
        assert_eq!(i64::parse_token("-0X10").unwrap(), -16);
        assert_eq!(i64::parse_token("0o17").unwrap(), 15);
        assert_eq!(i64::parse_token("017").unwrap(), 15);
        assert_eq!(i64::parse_token("0b101").unwrap(), 5);
        assert_eq!(i64::parse_token("0xff_ff").unwrap(), 0xffff);
        assert_eq!(i64::parse_token("0").unwrap(), 0);
        assert_eq!(isize::parse_token("-9").unwrap(), -9);
    }

    #[test]
    fn test_signed_limits() {
        assert_eq!(i64::parse_token("-9223372036854775808").unwrap(), i64::MIN);
        assert_eq!(i64::parse_token("9223372036854775807").unwrap(), i64::MAX);
        let err = i64::parse_token("9223372036854775808").unwrap_err();
        assert_eq!(err.reason, "value out of range");
        assert_eq!(err.kind, "int64");
    }

    #[test]
    fn test_signed_rejects_garbage() {
        for token in ["", "-", "abc", "1_000", "12a", "--1", "-+1", "0x", "09", "0x__1", "1.5"] {
            assert!(i64::parse_token(token).is_err(), "{token:?}");
        }
    }

    #[test]
    fn test_unsigned() {
        assert_eq!(u64::parse_token("18446744073709551615").unwrap(), u64::MAX);
        assert_eq!(usize::parse_token("0x10").unwrap(), 16);
        let err = u64::parse_token("-1").unwrap_err();
        assert_eq!(err.kind, "uint64");
        assert_eq!(err.token, "-1");
        assert!(u64::parse_token("+1").is_err());
        assert!(u64::parse_token("18446744073709551616").is_err());
    }

    #[test]
    fn test_float() {
        assert_eq!(f64::parse_token("3.25").unwrap(), 3.25);
        assert_eq!(f64::parse_token("-1e3").unwrap(), -1000.0);
        assert!(f64::parse_token("inf").unwrap().is_infinite());
        assert!(f64::parse_token("NaN").unwrap().is_nan());
        assert!(f64::parse_token("1,5").is_err());
    }

    #[test]
    fn test_string_is_verbatim() {
        assert_eq!(String::parse_token("a = b ").unwrap(), "a = b ");
        assert_eq!(String::parse_token("").unwrap(), "");
    }

    #[test]
    fn test_slot_set_keeps_value_on_error() {
        let mut slot = Slot::new(5i64);
        assert!(slot.set("oops").is_err());
        assert_eq!(*slot.get(), 5);
        slot.set("0x10").unwrap();
        assert_eq!(*slot.get(), 16);
        assert_eq!(slot.to_string(), "16");
    }

    #[test]
    fn test_only_bool_is_bool_flag() {
        assert!(Slot::new(false).is_bool_flag());
        assert!(!Slot::new(0u64).is_bool_flag());
        assert!(!Slot::new(String::new()).is_bool_flag());
    }

    #[test]
    fn test_duration_slot_renders() {
        let mut slot = Slot::new(Duration::from_secs(30));
        assert_eq!(slot.to_string(), "30s");
        slot.set("1h30m").unwrap();
        assert_eq!(slot.to_string(), "1h30m0s");
        assert_eq!(slot.kind(), "duration");
    }

    #[test]
    fn test_toml_conversion() {
        assert_eq!(Slot::new(u64::MAX).to_toml(), toml::Value::String(u64::MAX.to_string()));
        assert_eq!(Slot::new(3i64).to_toml(), toml::Value::Integer(3));
        let d = Slot::new(Duration::from_millis(1500)).to_toml();
        assert_eq!(d["secs"].as_integer(), Some(1));
        assert_eq!(d["nanos"].as_integer(), Some(500_000_000));
    }
}
