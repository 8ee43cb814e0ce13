//! Annotation files: one time range per line, `MM:SS-MM:SS   free text label`.
//!
//! Lines that do not start with that shape are ignored, so the files can
//! carry headings and notes alongside the ranges.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::time::TimeSpec;

/// Separator between the range and its label.
const LABEL_SEPARATOR: &str = "   ";

/// One annotated time range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub start: TimeSpec,
    pub end: TimeSpec,
    /// Free text after the range, trimmed.
    pub label: String,
    /// 1-based line number in the source file.
    pub line: usize,
}

impl Annotation {
    /// Length of the range in seconds. Negative when `end` precedes `start`.
    pub fn duration_secs(&self) -> f64 {
        self.end.as_secs_f64() - self.start.as_secs_f64()
    }
}

/// Parse a single line. Returns `None` for lines that are not annotations.
pub fn parse_line(line: &str) -> Option<(TimeSpec, TimeSpec, &str)> {
    let line = line.trim_end_matches(['\r', '\n']);

    let (start, rest) = take_min_sec(line)?;
    let rest = rest.strip_prefix('-')?;
    let (end, rest) = take_min_sec(rest)?;
    let label = rest.strip_prefix(LABEL_SEPARATOR)?;

    Some((start, end, label))
}

/// Parse every annotation in `text`, skipping non-matching lines.
pub fn parse_annotations(text: &str) -> Vec<Annotation> {
    text.lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let Some((start, end, label)) = parse_line(line) else {
                debug!(line = idx + 1, "ignoring non-annotation line");
                return None;
            };
            Some(Annotation {
                start,
                end,
                label: label.trim().to_string(),
                line: idx + 1,
            })
        })
        .collect()
}

/// Read and parse an annotation file.
///
/// # Errors
/// Returns `ClatterError::Io` if the file cannot be read.
pub fn read_annotations(path: &Path) -> Result<Vec<Annotation>> {
    let text = fs::read_to_string(path)?;
    let annotations = parse_annotations(&text);
    debug!(
        path = %path.display(),
        count = annotations.len(),
        "loaded annotations"
    );
    Ok(annotations)
}

/// Consume `<digits>:<digits>` from the front of `s`.
fn take_min_sec(s: &str) -> Option<(TimeSpec, &str)> {
    let (minutes, rest) = take_number(s)?;
    let rest = rest.strip_prefix(':')?;
    let (seconds, rest) = take_number(rest)?;
    Some((TimeSpec::from_min_sec(minutes, seconds), rest))
}

fn take_number(s: &str) -> Option<(u64, &str)> {
    let len = s.bytes().take_while(|b| b.is_ascii_digit()).count();
    if len == 0 {
        return None;
    }
    let value = s[..len].parse().ok()?;
    Some((value, &s[len..]))
}
