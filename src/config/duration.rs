//! Unit-suffixed duration tokens such as `300ms`, `1h30m` or `1.5s`.

use std::fmt::Write;
use std::time::Duration;

use super::ValueError;

const KIND: &str = "duration";

const NANOS_PER_MICRO: u64 = 1_000;
const NANOS_PER_MILLI: u64 = 1_000_000;
const NANOS_PER_SEC: u64 = 1_000_000_000;
const NANOS_PER_MIN: u64 = 60 * NANOS_PER_SEC;
const NANOS_PER_HOUR: u64 = 60 * NANOS_PER_MIN;

/// Parses a duration token.
///
/// A token is an optional sign followed by one or more `<number><unit>`
/// groups, where the number may carry a fraction and the unit is one of
/// `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`. A bare `0` is zero.
/// Negative non-zero durations are rejected since [`Duration`] is unsigned.
pub fn parse_duration(token: &str) -> Result<Duration, ValueError> {
    let err = |reason: &str| ValueError::new(token, KIND, reason);

    let mut rest = token;
    let negative = match rest.as_bytes().first() {
        Some(b'-') => {
            rest = &rest[1..];
            true
        }
        Some(b'+') => {
            rest = &rest[1..];
            false
        }
        _ => false,
    };

    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(err("empty duration"));
    }

    let mut total: u64 = 0;
    while !rest.is_empty() {
        if !rest.starts_with(|c: char| c == '.' || c.is_ascii_digit()) {
            return Err(err("expected a number"));
        }

        let (whole, has_whole, after) = leading_int(rest).ok_or_else(|| err("number out of range"))?;
        rest = after;

        let (mut frac, mut scale, mut has_frac) = (0u64, 1f64, false);
        if let Some(after_dot) = rest.strip_prefix('.') {
            let (f, s, consumed, after) = leading_fraction(after_dot);
            frac = f;
            scale = s;
            has_frac = consumed;
            rest = after;
        }
        if !has_whole && !has_frac {
            return Err(err("expected a number"));
        }

        let unit_end = rest
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (unit_name, after) = rest.split_at(unit_end);
        rest = after;
        if unit_name.is_empty() {
            return Err(err("missing unit"));
        }
        let unit = unit_nanos(unit_name).ok_or_else(|| err(&format!("unknown unit {unit_name:?}")))?;

        let mut nanos = whole.checked_mul(unit).ok_or_else(|| err("duration out of range"))?;
        if frac > 0 {
            let extra = (frac as f64 * (unit as f64 / scale)) as u64;
            nanos = nanos.checked_add(extra).ok_or_else(|| err("duration out of range"))?;
        }
        total = total.checked_add(nanos).ok_or_else(|| err("duration out of range"))?;
    }

    if negative && total != 0 {
        return Err(err("negative durations are not supported"));
    }
    Ok(Duration::from_nanos(total))
}

/// Renders a duration in the same notation [`parse_duration`] accepts,
/// e.g. `1h30m0s`, `2.5s`, `300ms`, `0s`.
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < u128::from(NANOS_PER_MICRO) {
        return format!("{nanos}ns");
    }
    if nanos < u128::from(NANOS_PER_MILLI) {
        return format!("{}µs", decimal(nanos, 3));
    }
    if nanos < u128::from(NANOS_PER_SEC) {
        return format!("{}ms", decimal(nanos, 6));
    }

    let mut out = String::new();
    let minutes = nanos / u128::from(NANOS_PER_MIN);
    let (hours, minutes) = (minutes / 60, minutes % 60);
    if hours > 0 {
        let _ = write!(out, "{hours}h{minutes}m");
    } else if minutes > 0 {
        let _ = write!(out, "{minutes}m");
    }
    let _ = write!(out, "{}s", decimal(nanos % u128::from(NANOS_PER_MIN), 9));
    out
}

/// Formats `value / 10^places` without trailing zeros in the fraction.
fn decimal(value: u128, places: u32) -> String {
    let div = 10u128.pow(places);
    let (int, rem) = (value / div, value % div);
    if rem == 0 {
        return int.to_string();
    }
    let frac = format!("{rem:0width$}", width = places as usize);
    format!("{int}.{}", frac.trim_end_matches('0'))
}

/// Consumes leading ASCII digits. Returns `None` on overflow.
fn leading_int(s: &str) -> Option<(u64, bool, &str)> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let mut value: u64 = 0;
    for b in s[..end].bytes() {
        value = value.checked_mul(10)?.checked_add(u64::from(b - b'0'))?;
    }
    Some((value, end > 0, &s[end..]))
}

/// Consumes fraction digits, keeping as many as fit in a `u64`.
fn leading_fraction(s: &str) -> (u64, f64, bool, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (mut value, mut scale, mut overflow) = (0u64, 1f64, false);
    for b in s[..end].bytes() {
        if overflow {
            continue;
        }
        match value.checked_mul(10).and_then(|v| v.checked_add(u64::from(b - b'0'))) {
            Some(v) => {
                value = v;
                scale *= 10.0;
            }
            None => overflow = true,
        }
    }
    (value, scale, end > 0, &s[end..])
}

fn unit_nanos(unit: &str) -> Option<u64> {
    match unit {
        "ns" => Some(1),
        // U+00B5 micro sign and U+03BC greek mu
        "us" | "\u{b5}s" | "\u{3bc}s" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(NANOS_PER_MIN),
        "h" => Some(NANOS_PER_HOUR),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compound_duration() {
        assert_eq!(parse_duration("2m15s").unwrap(), Duration::from_secs(135));
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("300ms").unwrap(), Duration::from_millis(300));
    }

    #[test]
    fn test_fractional_and_micro_units() {
        assert_eq!(parse_duration("1.5h").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration(".5s").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("10us").unwrap(), Duration::from_micros(10));
        assert_eq!(parse_duration("10µs").unwrap(), Duration::from_micros(10));
        assert_eq!(parse_duration("7ns").unwrap(), Duration::from_nanos(7));
    }

    #[test]
    fn test_zero_forms() {
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
        assert_eq!(parse_duration("-0s").unwrap(), Duration::ZERO);
        assert_eq!(parse_duration("+5s").unwrap(), Duration::from_secs(5));
    }

    #[test]
    fn test_rejects_bad_tokens() {
        for token in ["", "5", "s", "1x", "1.s.", "-3s", "1h-2m", "."] {
            let err = parse_duration(token).unwrap_err();
            assert_eq!(err.kind, "duration", "token {token:?}");
            assert_eq!(err.token, token);
        }
    }

    #[test]
    fn test_overflow_is_an_error() {
        let err = parse_duration("99999999999999999999h").unwrap_err();
        assert_eq!(err.reason, "number out of range");
        assert!(parse_duration("9999999999h").is_err());
    }

    #[test]
    fn test_format() {
        assert_eq!(format_duration(Duration::ZERO), "0s");
        assert_eq!(format_duration(Duration::from_nanos(12)), "12ns");
        assert_eq!(format_duration(Duration::from_nanos(1_500)), "1.5µs");
        assert_eq!(format_duration(Duration::from_millis(300)), "300ms");
        assert_eq!(format_duration(Duration::from_millis(2_500)), "2.5s");
        assert_eq!(format_duration(Duration::from_secs(135)), "2m15s");
        assert_eq!(format_duration(Duration::from_secs(5400)), "1h30m0s");
    }
}
