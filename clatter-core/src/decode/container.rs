//! Container/codec decoding through symphonia.

use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use symphonia::core::audio::Signal;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::{Error as SymphoniaError, SeekErrorKind};
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::{Time, TimeBase};
use tracing::{debug, trace, warn};

use super::{DecodedFrame, FrameSource};
use crate::error::{ClatterError, Result};

/// Decodes the first audio track of a file.
pub struct SymphoniaSource {
    path: PathBuf,
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: u32,
    time_base: Option<TimeBase>,
    /// Set when a seek lands past the end of the stream.
    exhausted: bool,
}

impl SymphoniaSource {
    /// Probe `path` and prepare a decoder for its first audio track.
    ///
    /// # Errors
    /// - `ClatterError::Io` if the file cannot be opened.
    /// - `ClatterError::UnsupportedFormat` if no demuxer or codec accepts it.
    /// - `ClatterError::NoAudioTrack` if the container holds no decodable audio.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| ClatterError::UnsupportedFormat(format!("{}: {e}", path.display())))?;
        let format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL && t.codec_params.sample_rate.is_some())
            .ok_or_else(|| ClatterError::NoAudioTrack {
                path: path.to_path_buf(),
            })?;

        let track_id = track.id;
        let time_base = track.codec_params.time_base;
        let sample_rate = track.codec_params.sample_rate.unwrap_or_default();

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| ClatterError::UnsupportedFormat(format!("{}: {e}", path.display())))?;

        debug!(
            path = %path.display(),
            track_id,
            sample_rate,
            channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(0),
            "opened audio track"
        );

        Ok(Self {
            path: path.to_path_buf(),
            format,
            decoder,
            track_id,
            sample_rate,
            time_base,
            exhausted: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn packet_time(&self, ts: u64) -> f64 {
        match self.time_base {
            Some(tb) => {
                let t = tb.calc_time(ts);
                t.seconds as f64 + t.frac
            }
            None => ts as f64 / self.sample_rate.max(1) as f64,
        }
    }
}

impl FrameSource for SymphoniaSource {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn seek(&mut self, secs: f64) -> Result<()> {
        let secs = secs.max(0.0);
        let to = SeekTo::Time {
            time: Time::new(secs.trunc() as u64, secs.fract()),
            track_id: Some(self.track_id),
        };

        match self.format.seek(SeekMode::Accurate, to) {
            Ok(seeked) => {
                debug!(
                    required_ts = seeked.required_ts,
                    actual_ts = seeked.actual_ts,
                    "seek complete"
                );
                self.exhausted = false;
            }
            Err(SymphoniaError::SeekError(SeekErrorKind::OutOfRange)) => {
                warn!(secs, "seek target is past the end of the stream");
                self.exhausted = true;
            }
            Err(e) => {
                return Err(ClatterError::Decode(format!(
                    "seek to {secs:.3}s failed: {e}"
                )))
            }
        }

        self.decoder.reset();
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<DecodedFrame>> {
        if self.exhausted {
            return Ok(None);
        }

        loop {
            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => {
                    self.exhausted = true;
                    return Ok(None);
                }
                Err(SymphoniaError::ResetRequired) => {
                    warn!("stream parameters changed mid-file, stopping");
                    self.exhausted = true;
                    return Ok(None);
                }
                Err(e) => return Err(ClatterError::Decode(e.to_string())),
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            let time = self.packet_time(packet.ts());

            match self.decoder.decode(&packet) {
                Ok(decoded) => {
                    let mut buf = decoded.make_equivalent::<f32>();
                    decoded.convert(&mut buf);

                    let samples = if buf.spec().channels.count() == 0 {
                        Vec::new()
                    } else {
                        buf.chan(0).to_vec()
                    };

                    trace!(
                        dts = packet.ts(),
                        pts = packet.ts(),
                        time,
                        frames = samples.len(),
                        "decoded frame"
                    );
                    return Ok(Some(DecodedFrame::new(time, samples)));
                }
                Err(SymphoniaError::DecodeError(e)) => {
                    warn!(time, "skipping undecodable packet: {e}");
                    continue;
                }
                Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => {
                    self.exhausted = true;
                    return Ok(None);
                }
                Err(e) => return Err(ClatterError::Decode(e.to_string())),
            }
        }
    }
}
