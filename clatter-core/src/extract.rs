//! Seek + bounded collection of one time window.
//!
//! ```text
//! seek(start) → next_frame() → drop if frame.time < start
//!                            → observer (streamed playback)
//!                            → SampleWindow::push (never past the end)
//!             ↺ until the window is full or the source runs dry
//! ```

use tracing::{debug, info, trace};

use crate::{
    annotation::Annotation,
    buffering::{clip::Clip, window::SampleWindow},
    decode::{DecodedFrame, FrameSource},
    error::{ClatterError, Result},
    time::{secs_to_ticks, TimeSpec},
};

/// A time range to extract, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    /// Where to seek first. `None` reads from the current stream position.
    pub start: Option<f64>,
    /// Length of the window.
    pub duration: f64,
}

impl Window {
    /// # Errors
    /// `ClatterError::InvalidWindow` if either value is negative or not finite.
    pub fn new(start: Option<f64>, duration: f64) -> Result<Self> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(ClatterError::InvalidWindow(format!(
                "duration must be a non-negative number of seconds, got {duration}"
            )));
        }
        if let Some(s) = start {
            if !s.is_finite() || s < 0.0 {
                return Err(ClatterError::InvalidWindow(format!(
                    "start must be a non-negative number of seconds, got {s}"
                )));
            }
        }
        Ok(Self { start, duration })
    }

    /// Window from parsed `--begin` / `--duration` values.
    ///
    /// # Errors
    /// Same as [`Window::new`].
    pub fn from_times(begin: Option<&TimeSpec>, duration: &TimeSpec) -> Result<Self> {
        Self::new(begin.map(TimeSpec::as_secs_f64), duration.as_secs_f64())
    }

    /// Window spanning an annotated range.
    ///
    /// # Errors
    /// `ClatterError::InvalidWindow` if the range does not end after it starts.
    pub fn from_annotation(annotation: &Annotation) -> Result<Self> {
        let duration = annotation.duration_secs();
        if duration <= 0.0 {
            return Err(ClatterError::InvalidWindow(format!(
                "line {}: range {}-{} does not end after it starts",
                annotation.line, annotation.start, annotation.end
            )));
        }
        Self::new(Some(annotation.start.as_secs_f64()), duration)
    }
}

/// Collect `window` from `source` into a fixed-length clip.
pub fn collect_window<S>(source: &mut S, window: &Window) -> Result<Clip>
where
    S: FrameSource + ?Sized,
{
    collect_window_with(source, window, |_| Ok(()))
}

/// Collect `window`, handing every accepted frame to `on_frame` before it is
/// copied.
///
/// Stops pulling frames as soon as the buffer is full. A source that runs
/// out early leaves the tail zeroed; that is not an error.
///
/// # Errors
/// `ClatterError::InvalidWindow` if the window holds more samples than can
/// be buffered at the source rate; source and observer errors pass through.
pub fn collect_window_with<S, F>(source: &mut S, window: &Window, mut on_frame: F) -> Result<Clip>
where
    S: FrameSource + ?Sized,
    F: FnMut(&DecodedFrame) -> Result<()>,
{
    let sample_rate = source.sample_rate();
    let mut buffer = SampleWindow::for_duration(sample_rate, window.duration)?;

    if let Some(start) = window.start {
        info!(ticks = secs_to_ticks(start), "seeking to {start:.3}s");
        source.seek(start)?;
    }
    let mut frames_used = 0usize;
    let mut frames_skipped = 0usize;

    while !buffer.is_full() {
        let Some(frame) = source.next_frame()? else {
            break;
        };

        if let Some(start) = window.start {
            if frame.time < start {
                trace!("skipping {:.3} < {:.3}", frame.time, start);
                frames_skipped += 1;
                continue;
            }
        }

        on_frame(&frame)?;
        buffer.push(&frame.samples);
        frames_used += 1;
    }

    let clip = buffer.into_clip();
    debug!(
        sample_rate,
        len = clip.samples.len(),
        filled = clip.filled,
        frames_used,
        frames_skipped,
        "window collected"
    );
    Ok(clip)
}
