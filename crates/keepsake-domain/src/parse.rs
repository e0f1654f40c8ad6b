//! Textual tier parsing and Duration/Period classification
//!
//! Tier definitions arrive as pairs of ISO-8601 expressions such as
//! `("PT48H", "PT1H")` or `("P12M", "P1M")`. Each expression is classified as
//! either elapsed time ([`TierKind::Duration`]) or calendar time
//! ([`TierKind::Period`]) and then parsed with the grammar of that kind.
//!
//! ## Classification
//!
//! Applied to the trimmed, upper-cased expression after its `P` prefix:
//!
//! 1. A `T` time marker means Duration: hours, minutes and seconds only make
//!    sense as elapsed time.
//! 2. Otherwise a `Y` or `M` designator means Period: years and months follow
//!    calendar arithmetic.
//! 3. Otherwise (day-only forms such as `P7D`) the expression is a Duration.
//!    Day spans could be read either way; they are treated as fixed elapsed
//!    time.
//!
//! An expression without the `P` prefix cannot be classified and is reported
//! as a format error.
//!
//! ## Grammars
//!
//! - Duration: `[+-]P[nD][T[nH][nM][n[.f]S]]`, fractions on seconds only
//! - Period: `[+-]P[nY][nM][nW][nD]`, weeks folded into days

use crate::error::TierError;
use crate::tier::{CalendarPeriod, CalendarTier, FixedTier, Tier, TierKind};
use chrono::TimeDelta;
use thiserror::Error;

const NANOS_PER_SECOND: i128 = 1_000_000_000;

/// Failure to read an ISO-8601 duration or period expression
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationParseError {
    /// Nothing left after trimming
    #[error("expression is empty")]
    Empty,

    /// Expression does not start with `P` (after an optional sign)
    #[error("'{0}' must start with 'P'")]
    MissingPrefix(String),

    /// No `<number><designator>` component present
    #[error("'{0}' has no components")]
    NoComponents(String),

    /// A `T` marker with no time component after it
    #[error("'{0}' has a 'T' with no time component")]
    DanglingTime(String),

    /// Designator not allowed by the grammar, repeated, or out of order
    #[error("'{input}' has unexpected designator '{designator}'")]
    UnexpectedDesignator {
        /// Normalized expression
        input: String,
        /// Offending designator
        designator: char,
    },

    /// Number missing, malformed, or fractional where not allowed
    #[error("'{input}' has an invalid number at offset {offset}")]
    InvalidNumber {
        /// Normalized expression
        input: String,
        /// Byte offset of the number
        offset: usize,
    },

    /// Value does not fit the target representation
    #[error("'{0}' is out of range")]
    Overflow(String),
}

/// Trim and upper-case a raw expression
fn normalize(text: &str) -> String {
    text.trim().to_ascii_uppercase()
}

/// Split off the optional leading sign and the `P` prefix
///
/// Returns whether the whole expression is negated, and the body after `P`.
fn split_prefix(norm: &str) -> Result<(bool, &str), DurationParseError> {
    if norm.is_empty() {
        return Err(DurationParseError::Empty);
    }
    let (negated, rest) = match norm.as_bytes()[0] {
        b'-' => (true, &norm[1..]),
        b'+' => (false, &norm[1..]),
        _ => (false, norm),
    };
    let body = rest
        .strip_prefix('P')
        .ok_or_else(|| DurationParseError::MissingPrefix(norm.to_string()))?;
    Ok((negated, body))
}

/// Decide whether an expression denotes elapsed time or calendar time
///
/// # Errors
/// Returns an error if the expression is empty or lacks the `P` prefix
pub fn classify(text: &str) -> Result<TierKind, DurationParseError> {
    let norm = normalize(text);
    let (_, body) = split_prefix(&norm)?;

    if body.contains('T') {
        Ok(TierKind::Duration)
    } else if body.contains(['Y', 'M']) {
        Ok(TierKind::Period)
    } else {
        Ok(TierKind::Duration)
    }
}

/// One `<number><designator>` component
struct Component {
    designator: char,
    /// Value scaled by 10^9 when a fraction is allowed, otherwise the integer value
    value: i128,
}

/// Cursor over the body of an expression
struct Scanner<'a> {
    input: &'a str,
    body: &'a [u8],
    base: usize,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str, body: &'a str) -> Self {
        Self {
            input,
            body: body.as_bytes(),
            base: input.len() - body.len(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.body.len()
    }

    fn peek(&self) -> Option<u8> {
        self.body.get(self.pos).copied()
    }

    fn invalid_number(&self, at: usize) -> DurationParseError {
        DurationParseError::InvalidNumber {
            input: self.input.to_string(),
            offset: self.base + at,
        }
    }

    /// Read `[+-]digits[(.|,)digits]` followed by a designator letter
    fn component(&mut self, allow_fraction: bool) -> Result<Component, DurationParseError> {
        let start = self.pos;
        let negative = match self.peek() {
            Some(b'-') => {
                self.pos += 1;
                true
            }
            Some(b'+') => {
                self.pos += 1;
                false
            }
            _ => false,
        };

        let digits_start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        if self.pos == digits_start {
            return Err(self.invalid_number(start));
        }
        let whole: i128 = std::str::from_utf8(&self.body[digits_start..self.pos])
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .map(i128::from)
            .ok_or_else(|| DurationParseError::Overflow(self.input.to_string()))?;

        let mut nanos: i128 = 0;
        let mut fractional = false;
        if matches!(self.peek(), Some(b'.') | Some(b',')) {
            fractional = true;
            self.pos += 1;
            let frac_start = self.pos;
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.pos += 1;
            }
            let frac = &self.body[frac_start..self.pos];
            if frac.is_empty() || frac.len() > 9 {
                return Err(self.invalid_number(start));
            }
            for (i, digit) in frac.iter().enumerate() {
                nanos += i128::from(digit - b'0') * 10_i128.pow(8 - i as u32);
            }
        }

        let designator = match self.peek() {
            Some(c) if c.is_ascii_alphabetic() => c as char,
            _ => return Err(self.invalid_number(start)),
        };
        self.pos += 1;

        if fractional && !(allow_fraction && designator == 'S') {
            return Err(self.invalid_number(start));
        }

        let magnitude = if allow_fraction {
            whole * NANOS_PER_SECOND + nanos
        } else {
            whole
        };
        Ok(Component {
            designator,
            value: if negative { -magnitude } else { magnitude },
        })
    }
}

/// Read components of a section, enforcing designator order from `allowed`
fn section(
    scanner: &mut Scanner<'_>,
    allowed: &[char],
    allow_fraction: bool,
    stop_at: Option<u8>,
) -> Result<Vec<Component>, DurationParseError> {
    let mut components: Vec<Component> = Vec::new();
    let mut next_allowed = 0;

    while !scanner.at_end() && scanner.peek() != stop_at {
        let component = scanner.component(allow_fraction)?;
        let rank = allowed[next_allowed..]
            .iter()
            .position(|&d| d == component.designator)
            .ok_or_else(|| DurationParseError::UnexpectedDesignator {
                input: scanner.input.to_string(),
                designator: component.designator,
            })?;
        next_allowed += rank + 1;
        components.push(component);
    }
    Ok(components)
}

/// Parse an elapsed-time expression such as `PT48H`, `P7D` or `P1DT2H30M`
///
/// # Errors
/// Returns an error if the expression does not follow the duration grammar or
/// its value does not fit a [`TimeDelta`]
pub fn parse_duration(text: &str) -> Result<TimeDelta, DurationParseError> {
    let norm = normalize(text);
    let (negated, body) = split_prefix(&norm)?;
    let mut scanner = Scanner::new(&norm, body);

    // Only the seconds component may carry a fraction, so scale everything to nanos
    let date = section(&mut scanner, &['D'], true, Some(b'T'))?;
    let mut time = Vec::new();
    if scanner.peek() == Some(b'T') {
        scanner.pos += 1;
        time = section(&mut scanner, &['H', 'M', 'S'], true, None)?;
        if time.is_empty() {
            return Err(DurationParseError::DanglingTime(norm.clone()));
        }
    }
    if date.is_empty() && time.is_empty() {
        return Err(DurationParseError::NoComponents(norm.clone()));
    }

    let overflow = || DurationParseError::Overflow(norm.clone());
    let mut total: i128 = 0;
    for component in date.iter().chain(time.iter()) {
        let unit: i128 = match component.designator {
            'D' => 86_400,
            'H' => 3_600,
            'M' => 60,
            _ => 1,
        };
        let scaled = if component.designator == 'S' {
            component.value
        } else {
            component.value.checked_mul(unit).ok_or_else(overflow)?
        };
        total = total.checked_add(scaled).ok_or_else(overflow)?;
    }
    if negated {
        total = -total;
    }

    let secs = i64::try_from(total.div_euclid(NANOS_PER_SECOND)).map_err(|_| overflow())?;
    let nanos = u32::try_from(total.rem_euclid(NANOS_PER_SECOND)).map_err(|_| overflow())?;
    TimeDelta::new(secs, nanos).ok_or_else(overflow)
}

/// Parse a calendar expression such as `P12M`, `P1Y` or `P1Y6M`
///
/// # Errors
/// Returns an error if the expression does not follow the period grammar or a
/// component does not fit in 32 bits
pub fn parse_period(text: &str) -> Result<CalendarPeriod, DurationParseError> {
    let norm = normalize(text);
    let (negated, body) = split_prefix(&norm)?;
    let mut scanner = Scanner::new(&norm, body);

    let components = section(&mut scanner, &['Y', 'M', 'W', 'D'], false, None)?;
    if components.is_empty() {
        return Err(DurationParseError::NoComponents(norm.clone()));
    }

    let overflow = || DurationParseError::Overflow(norm.clone());
    let to_i32 = |v: i128| i32::try_from(v).map_err(|_| overflow());
    let sign: i128 = if negated { -1 } else { 1 };

    let mut period = CalendarPeriod::default();
    let mut days: i128 = 0;
    for component in &components {
        let value = component.value * sign;
        match component.designator {
            'Y' => period.years = to_i32(value)?,
            'M' => period.months = to_i32(value)?,
            'W' => days += value.checked_mul(7).ok_or_else(overflow)?,
            _ => days += value,
        }
    }
    period.days = to_i32(days)?;
    Ok(period)
}

/// Parse a textual window/bucket pair into a [`Tier`]
///
/// Both expressions must classify to the same [`TierKind`]: two durations
/// produce a [`FixedTier`], two periods produce a [`CalendarTier`].
///
/// # Errors
/// - [`TierError::MissingInput`] if either expression is blank
/// - [`TierError::MixedKinds`] if window and bucket classify differently
/// - [`TierError::InvalidFormat`] if either expression is malformed
/// - [`TierError::InvalidWindow`] / [`TierError::InvalidBucket`] for
///   zero or negative values
///
/// # Examples
///
/// ```
/// use keepsake_domain::{parse_tier, Tier};
///
/// let tier = parse_tier("P7D", "P1D").unwrap();
/// assert!(matches!(tier, Tier::Fixed(_)));
///
/// let tier = parse_tier("P12M", "P1M").unwrap();
/// assert!(matches!(tier, Tier::Calendar(_)));
///
/// assert!(parse_tier("P1Y", "P1D").is_err());
/// ```
pub fn parse_tier(window: &str, bucket: &str) -> Result<Tier, TierError> {
    if window.trim().is_empty() || bucket.trim().is_empty() {
        return Err(TierError::MissingInput(
            "window and bucket must be non-empty".to_string(),
        ));
    }

    let invalid = |source: DurationParseError| TierError::InvalidFormat {
        window: window.to_string(),
        bucket: bucket.to_string(),
        source,
    };

    let window_kind = classify(window).map_err(invalid)?;
    let bucket_kind = classify(bucket).map_err(invalid)?;

    if window_kind != bucket_kind {
        return Err(TierError::MixedKinds {
            window: window.to_string(),
            window_kind,
            bucket: bucket.to_string(),
            bucket_kind,
        });
    }

    match window_kind {
        TierKind::Duration => {
            let w = parse_duration(window).map_err(invalid)?;
            let b = parse_duration(bucket).map_err(invalid)?;
            FixedTier::new(w, b).map(Tier::Fixed)
        }
        TierKind::Period => {
            let w = parse_period(window).map_err(invalid)?;
            let b = parse_period(bucket).map_err(invalid)?;
            CalendarTier::new(w, b).map(Tier::Calendar)
        }
    }
}
