//! Compact duration strings: `[<minutes>m][<seconds>s][<milliseconds>ms][<ticks>t]`.
//!
//! Segments are optional, appear in that fixed order and have no separators.
//! Matching mirrors the anchored pattern
//! `^((\d+)m)?((\d+)s)?((\d+)ms)?((\d+)t)?$`, backtracking included, so
//! `5ms` reads as five milliseconds rather than five minutes plus a stray `s`.

use std::fmt;
use std::str::FromStr;

use crate::error::{ClatterError, Result};

/// Ticks per second (libav's `AV_TIME_BASE`).
pub const TICKS_PER_SECOND: u64 = 1_000_000;

const FORMAT_HINT: &str = "Must be of the form [MINUTESm][SECONDSs][MILLISECONDSms][TICKSt], \
     e.g. \"30m11s\", \"28s\", \"12392424t\" or \"4m300ms90090t\".";

/// Segment suffixes in grammar order.
const SUFFIXES: [&str; 4] = ["m", "s", "ms", "t"];

/// A duration split into its four grammar components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TimeSpec {
    pub minutes: u64,
    pub seconds: u64,
    pub milliseconds: u64,
    pub ticks: u64,
}

impl TimeSpec {
    pub fn new(minutes: u64, seconds: u64, milliseconds: u64, ticks: u64) -> Self {
        Self {
            minutes,
            seconds,
            milliseconds,
            ticks,
        }
    }

    /// A whole-second time as written in annotation files (`MM:SS`).
    pub fn from_min_sec(minutes: u64, seconds: u64) -> Self {
        Self::new(minutes, seconds, 0, 0)
    }

    /// Components as a `(minutes, seconds, milliseconds, ticks)` tuple.
    pub fn as_tuple(&self) -> (u64, u64, u64, u64) {
        (self.minutes, self.seconds, self.milliseconds, self.ticks)
    }

    /// Total length in seconds.
    pub fn as_secs_f64(&self) -> f64 {
        self.ticks as f64 / TICKS_PER_SECOND as f64
            + self.milliseconds as f64 / 1000.0
            + self.seconds as f64
            + 60.0 * self.minutes as f64
    }

    /// Total length as an integer count of ticks (truncated).
    pub fn to_ticks(&self) -> i64 {
        secs_to_ticks(self.as_secs_f64())
    }
}

/// Convert seconds to ticks, truncating toward zero.
pub fn secs_to_ticks(secs: f64) -> i64 {
    (secs * TICKS_PER_SECOND as f64) as i64
}

/// Parse a duration string such as `17m9s`, `300ms` or `12392424t`.
///
/// # Errors
/// Returns `ClatterError::InvalidTime` when `input` is empty or does not
/// match the grammar (including digit runs that overflow `u64`).
pub fn parse_time(input: &str) -> Result<TimeSpec> {
    let invalid = || ClatterError::InvalidTime {
        input: input.to_string(),
        reason: FORMAT_HINT.to_string(),
    };

    if input.is_empty() {
        return Err(invalid());
    }
    // A single trailing newline is tolerated, as when a value is read from a line.
    let text = input.strip_suffix('\n').unwrap_or(input);

    let mut parts = [None; 4];
    if !match_segments(text.as_bytes(), 0, 0, &mut parts) {
        return Err(invalid());
    }

    let mut values = [0u64; 4];
    for (value, part) in values.iter_mut().zip(parts) {
        if let Some((start, end)) = part {
            *value = text[start..end].parse().map_err(|_| invalid())?;
        }
    }

    Ok(TimeSpec::new(values[0], values[1], values[2], values[3]))
}

/// Try to match segments `seg..` starting at byte `pos`, recording the digit
/// span of each matched segment. Prefers taking a segment over skipping it.
fn match_segments(
    bytes: &[u8],
    pos: usize,
    seg: usize,
    parts: &mut [Option<(usize, usize)>; 4],
) -> bool {
    if seg == SUFFIXES.len() {
        return pos == bytes.len();
    }

    let digits_end = pos + bytes[pos..].iter().take_while(|b| b.is_ascii_digit()).count();
    let suffix = SUFFIXES[seg].as_bytes();

    // `\d+` is greedy but a shorter run can never be followed by the suffix,
    // so only the full run needs trying.
    if digits_end > pos && bytes[digits_end..].starts_with(suffix) {
        parts[seg] = Some((pos, digits_end));
        if match_segments(bytes, digits_end + suffix.len(), seg + 1, parts) {
            return true;
        }
        parts[seg] = None;
    }

    match_segments(bytes, pos, seg + 1, parts)
}

impl FromStr for TimeSpec {
    type Err = ClatterError;

    fn from_str(s: &str) -> Result<Self> {
        parse_time(s)
    }
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = [self.minutes, self.seconds, self.milliseconds, self.ticks];
        if values.iter().all(|v| *v == 0) {
            return f.write_str("0s");
        }
        for (value, suffix) in values.iter().zip(SUFFIXES) {
            if *value != 0 {
                write!(f, "{value}{suffix}")?;
            }
        }
        Ok(())
    }
}
