// Duration parsing module
// Accepts the compact "72h", "1h30m", "1.5s", "250ms" notation used for cache durations
// on top of humantime

use std::time::Duration;

use thiserror::Error;

/// Reasons a duration string can be rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseDurationError {
    #[error("empty duration")]
    Empty,
    #[error("negative durations are not allowed")]
    Negative,
    #[error("missing unit after '{0}'")]
    MissingUnit(String),
    #[error("unknown unit '{0}'")]
    UnknownUnit(String),
    #[error("invalid number")]
    Invalid,
    #[error("duration out of range")]
    Overflow,
}

// Fraction digits beyond this are below nanosecond precision for every unit
const MAX_FRACTION_DIGITS: usize = 18;

impl From<humantime::DurationError> for ParseDurationError {
    fn from(err: humantime::DurationError) -> Self {
        match err {
            humantime::DurationError::UnknownUnit { unit, value, .. } if unit.is_empty() => {
                Self::MissingUnit(value.to_string())
            }
            humantime::DurationError::UnknownUnit { unit, .. } => Self::UnknownUnit(unit),
            humantime::DurationError::NumberOverflow => Self::Overflow,
            humantime::DurationError::Empty => Self::Empty,
            _ => Self::Invalid,
        }
    }
}

/// Parse a duration made of one or more `<number><unit>` terms
///
/// Unit names and integer terms are handled by `humantime`, so `ns`, `us`,
/// `ms`, `s`, `m`, `h` and its longer spellings all work. On top of that a term
/// may carry a fraction (`1.5h`), a bare `0` needs no unit, a leading `+` is
/// ignored and negative values are rejected.
///
/// # Examples
/// ```
/// use spahost::config::parse_duration;
/// assert_eq!(parse_duration("720h").unwrap().as_secs(), 2_592_000);
/// assert_eq!(parse_duration("1h30m").unwrap().as_secs(), 5_400);
/// assert!(parse_duration("invalid").is_err());
/// ```
pub fn parse_duration(input: &str) -> Result<Duration, ParseDurationError> {
    if input.is_empty() {
        return Err(ParseDurationError::Empty);
    }

    let (negative, rest) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input.strip_prefix('+').unwrap_or(input)),
    };
    if rest.is_empty() {
        return Err(ParseDurationError::Invalid);
    }

    let rest = rest.replace(['µ', 'μ'], "u");
    let total = if rest == "0" {
        Duration::ZERO
    } else if rest.contains('.') {
        parse_terms(&rest)?
    } else {
        humantime::parse_duration(&rest)?
    };

    if u64::try_from(total.as_nanos()).is_err() {
        return Err(ParseDurationError::Overflow);
    }
    if negative && !total.is_zero() {
        return Err(ParseDurationError::Negative);
    }
    Ok(total)
}

/// Sum the terms one by one so fractional ones can be scaled by their unit
fn parse_terms(input: &str) -> Result<Duration, ParseDurationError> {
    let mut total = Duration::ZERO;
    let mut rest = input;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, after) = rest.split_at(number_end);
        let unit_end = after
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after.len());
        let (unit, next) = after.split_at(unit_end);

        let term = match number.split_once('.') {
            Some((whole, fraction)) => fractional_term(whole, fraction, unit)?,
            None => humantime::parse_duration(&format!("{number}{unit}"))?,
        };
        total = total
            .checked_add(term)
            .ok_or(ParseDurationError::Overflow)?;
        rest = next;
    }
    Ok(total)
}

fn fractional_term(whole: &str, fraction: &str, unit: &str) -> Result<Duration, ParseDurationError> {
    if (whole.is_empty() && fraction.is_empty()) || fraction.contains('.') {
        return Err(ParseDurationError::Invalid);
    }
    if unit.is_empty() {
        return Err(ParseDurationError::MissingUnit(format!("{whole}.{fraction}")));
    }
    let unit_nanos = humantime::parse_duration(&format!("1{unit}"))?.as_nanos();

    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| ParseDurationError::Overflow)?
    };
    let digits = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
    let numerator: u128 = if digits.is_empty() {
        0
    } else {
        digits.parse().map_err(|_| ParseDurationError::Invalid)?
    };
    let denominator = 10u128.pow(u32::try_from(digits.len()).unwrap_or(0));

    let nanos = whole
        .checked_mul(unit_nanos)
        .zip(numerator.checked_mul(unit_nanos))
        .and_then(|(whole, part)| whole.checked_add(part / denominator))
        .and_then(|nanos| u64::try_from(nanos).ok())
        .ok_or(ParseDurationError::Overflow)?;
    Ok(Duration::from_nanos(nanos))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hours() {
        assert_eq!(parse_duration("720h").unwrap().as_secs(), 2_592_000);
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
    }

    #[test]
    fn test_compound() {
        assert_eq!(parse_duration("1h30m").unwrap().as_secs(), 5_400);
        assert_eq!(parse_duration("2m3s").unwrap().as_secs(), 123);
        assert_eq!(
            parse_duration("1s500ms").unwrap(),
            Duration::from_millis(1_500)
        );
    }

    #[test]
    fn test_fractions() {
        assert_eq!(parse_duration("1.5h").unwrap().as_secs(), 5_400);
        assert_eq!(parse_duration(".5s").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("2.s").unwrap(), Duration::from_secs(2));
    }

    #[test]
    fn test_sub_second_units() {
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("10us").unwrap(), Duration::from_micros(10));
        assert_eq!(parse_duration("10µs").unwrap(), Duration::from_micros(10));
        assert_eq!(parse_duration("7ns").unwrap(), Duration::from_nanos(7));
        // Whole seconds are floored
        assert_eq!(parse_duration("1999ms").unwrap().as_secs(), 1);
    }

    #[test]
    fn test_zero_and_sign() {
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
        assert_eq!(parse_duration("+5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_duration("-0s").unwrap(), Duration::ZERO);
        assert_eq!(parse_duration("-5m"), Err(ParseDurationError::Negative));
    }

    #[test]
    fn test_invalid() {
        assert_eq!(parse_duration(""), Err(ParseDurationError::Empty));
        assert_eq!(
            parse_duration("invalid"),
            Err(ParseDurationError::Invalid)
        );
        assert_eq!(
            parse_duration("10"),
            Err(ParseDurationError::MissingUnit("10".to_string()))
        );
        assert_eq!(
            parse_duration("5x"),
            Err(ParseDurationError::UnknownUnit("x".to_string()))
        );
        assert_eq!(parse_duration("-"), Err(ParseDurationError::Invalid));
        assert_eq!(parse_duration("."), Err(ParseDurationError::Invalid));
        assert_eq!(
            parse_duration("99999999999999999999999h"),
            Err(ParseDurationError::Overflow)
        );
    }

    #[test]
    fn test_fraction_overflow_is_rejected() {
        let huge = format!("{}ns0.5h", u128::MAX);
        assert_eq!(parse_duration(&huge), Err(ParseDurationError::Overflow));
        // Each term fits on its own, the sum does not
        assert_eq!(
            parse_duration("18446744073s0.5h"),
            Err(ParseDurationError::Overflow)
        );
        assert_eq!(
            parse_duration("0.5h18446744073s"),
            Err(ParseDurationError::Overflow)
        );
    }

    #[test]
    fn test_long_unit_names() {
        assert_eq!(parse_duration("2hours").unwrap().as_secs(), 7_200);
        assert_eq!(parse_duration("1.5min").unwrap().as_secs(), 90);
    }
}
