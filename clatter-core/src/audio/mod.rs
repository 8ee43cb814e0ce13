//! Audio playback via cpal backend.
//!
//! # Design constraints
//!
//! The cpal output callback runs on an OS audio thread at elevated priority.
//! It **must not**:
//! - Allocate heap memory
//! - Block on a mutex or condvar
//! - Perform I/O
//!
//! `Playback` satisfies that contract by moving the consumer half of an SPSC
//! ring buffer into the callback, which pops one sample per output frame and
//! plays silence on underrun. The decoding thread is the producer and blocks
//! (briefly sleeping) while the ring is full.
//!
//! # Resource scope
//!
//! The device stream lives exactly as long as `Playback`. Dropping it, on any
//! path including early `?` returns, silences the callback and closes the
//! stream.

pub mod device;
pub mod resample;

#[cfg(feature = "audio-cpal")]
use cpal::{
    traits::{DeviceTrait, StreamTrait},
    SampleFormat, SampleRate, Stream, StreamConfig,
};

use crate::{
    audio::resample::RateConverter,
    buffering::{create_audio_ring, AudioProducer, Producer},
    error::{ClatterError, Result},
};
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Default playback device rate (Hz).
pub const DEFAULT_PLAYBACK_RATE: u32 = 48_000;

/// Sleep between attempts to push into a full ring, or to observe it drain.
const WRITE_BACKOFF: Duration = Duration::from_millis(5);

/// Extra wait after the ring drains so the device plays out its own buffer.
const DEVICE_TAIL: Duration = Duration::from_millis(100);

/// Destination for decoded samples that should be heard.
pub trait AudioSink {
    /// Queue `samples` (mono, at the source sample rate) for output.
    fn write(&mut self, samples: &[f32]) -> Result<()>;

    /// Block until everything written so far has been played.
    fn finish(&mut self) -> Result<()>;
}

/// Handle to an open output stream.
///
/// **Not `Send`**: `cpal::Stream` is bound to its creation thread on
/// Windows/macOS. Create and drop this type on the same OS thread.
pub struct Playback {
    /// Kept alive so the stream is not dropped prematurely.
    #[cfg(feature = "audio-cpal")]
    _stream: Stream,
    producer: AudioProducer,
    converter: RateConverter,
    /// Shared flag. Set to `false` to make the callback emit silence.
    running: Arc<AtomicBool>,
    /// Set by the stream error callback.
    failed: Arc<AtomicBool>,
    /// Samples the callback has taken out of the ring.
    played: Arc<AtomicU64>,
    /// Samples pushed into the ring.
    queued: u64,
    /// Rate the device actually runs at (Hz).
    pub device_rate: u32,
}

impl Playback {
    /// Open an output device by preferred name, otherwise fall back to the
    /// default output device and then the first available device.
    ///
    /// The device is asked for `playback_rate`; if it cannot do that rate its
    /// default rate is used instead. Samples written at `source_rate` are
    /// resampled to whatever rate the device ends up at.
    ///
    /// # Errors
    /// `ClatterError::NoDefaultOutputDevice` when no output exists, or
    /// `ClatterError::AudioStream` if cpal fails to build or start the stream.
    #[cfg(feature = "audio-cpal")]
    pub fn open(
        preferred_device_name: Option<&str>,
        playback_rate: u32,
        source_rate: u32,
        resample_chunk: usize,
    ) -> Result<Self> {
        use crate::audio::device::matches_device_name;
        use crate::buffering::Consumer;
        use cpal::traits::HostTrait;

        let host = cpal::default_host();
        let mut selected_device = None;

        if let Some(preferred_name) = preferred_device_name {
            match host.output_devices() {
                Ok(mut devices) => {
                    selected_device = devices.find(|device| {
                        device
                            .name()
                            .map(|name| matches_device_name(&name, preferred_name))
                            .unwrap_or(false)
                    });

                    if selected_device.is_none() {
                        warn!(
                            "preferred output device '{}' not found, falling back",
                            preferred_name
                        );
                    }
                }
                Err(e) => {
                    warn!("failed to list output devices while resolving preference: {e}");
                }
            }
        }

        let device = if let Some(device) = selected_device {
            device
        } else if let Some(default) = host.default_output_device() {
            default
        } else {
            let mut devices = host
                .output_devices()
                .map_err(|e| ClatterError::AudioDevice(e.to_string()))?;
            let fallback = devices.next().ok_or(ClatterError::NoDefaultOutputDevice)?;
            warn!("no default output device, falling back to first available output");
            fallback
        };

        info!(
            device = device.name().unwrap_or_default().as_str(),
            "opening output device"
        );

        let wanted = SampleRate(playback_rate);
        let supported = device
            .supported_output_configs()
            .map_err(|e| ClatterError::AudioDevice(e.to_string()))?
            .filter(|range| {
                matches!(range.sample_format(), SampleFormat::F32 | SampleFormat::I16)
                    && range.min_sample_rate() <= wanted
                    && wanted <= range.max_sample_rate()
            })
            .min_by_key(|range| {
                (
                    range.sample_format() != SampleFormat::F32,
                    range.channels() != 1,
                    range.channels(),
                )
            })
            .map(|range| range.with_sample_rate(wanted));

        let supported = match supported {
            Some(config) => config,
            None => {
                let fallback = device
                    .default_output_config()
                    .map_err(|e| ClatterError::AudioDevice(e.to_string()))?;
                warn!(
                    requested = playback_rate,
                    using = fallback.sample_rate().0,
                    "device cannot play at the requested rate"
                );
                fallback
            }
        };

        let device_rate = supported.sample_rate().0;
        let channels = supported.channels();

        debug!(device_rate, channels, format = ?supported.sample_format(), "output config selected");

        let config = StreamConfig {
            channels,
            sample_rate: SampleRate(device_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let (producer, mut consumer) = create_audio_ring();
        let running = Arc::new(AtomicBool::new(true));
        let failed = Arc::new(AtomicBool::new(false));
        let played = Arc::new(AtomicU64::new(0));
        let running_cb = Arc::clone(&running);
        let failed_cb = Arc::clone(&failed);
        let played_cb = Arc::clone(&played);
        let ch = usize::from(channels.max(1));

        let on_error = move |err: cpal::StreamError| {
            error!("audio stream error: {err}");
            failed_cb.store(true, Ordering::Release);
        };

        let stream = match supported.sample_format() {
            SampleFormat::F32 => device.build_output_stream(
                &config,
                move |data: &mut [f32], _info| {
                    if !running_cb.load(Ordering::Relaxed) {
                        data.fill(0.0);
                        return;
                    }
                    let mut taken = 0u64;
                    for frame in data.chunks_mut(ch) {
                        let s = match consumer.try_pop() {
                            Some(s) => {
                                taken += 1;
                                s
                            }
                            None => 0.0,
                        };
                        frame.fill(s);
                    }
                    played_cb.fetch_add(taken, Ordering::Release);
                },
                on_error,
                None,
            ),

            SampleFormat::I16 => device.build_output_stream(
                &config,
                move |data: &mut [i16], _info| {
                    if !running_cb.load(Ordering::Relaxed) {
                        data.fill(0);
                        return;
                    }
                    let mut taken = 0u64;
                    for frame in data.chunks_mut(ch) {
                        let s = match consumer.try_pop() {
                            Some(s) => {
                                taken += 1;
                                s.clamp(-1.0, 1.0)
                            }
                            None => 0.0,
                        };
                        frame.fill((s * i16::MAX as f32) as i16);
                    }
                    played_cb.fetch_add(taken, Ordering::Release);
                },
                on_error,
                None,
            ),

            fmt => {
                return Err(ClatterError::AudioStream(format!(
                    "unsupported sample format: {fmt:?}"
                )))
            }
        }
        .map_err(|e| ClatterError::AudioStream(e.to_string()))?;

        stream
            .play()
            .map_err(|e| ClatterError::AudioStream(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            producer,
            converter: RateConverter::new(source_rate, device_rate, resample_chunk)?,
            running,
            failed,
            played,
            queued: 0,
            device_rate,
        })
    }

    /// Push samples into the ring, waiting for the callback to make room.
    fn push_blocking(&mut self, mut samples: &[f32]) -> Result<()> {
        while !samples.is_empty() {
            self.check_stream()?;
            let written = self.producer.push_slice(samples);
            self.queued += written as u64;
            samples = &samples[written..];
            if !samples.is_empty() {
                thread::sleep(WRITE_BACKOFF);
            }
        }
        Ok(())
    }

    fn check_stream(&self) -> Result<()> {
        if self.failed.load(Ordering::Acquire) {
            return Err(ClatterError::AudioStream(
                "output stream stopped after a device error".into(),
            ));
        }
        Ok(())
    }

    /// Stop: make the callback emit silence on its next invocation.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }
}

/// Stub when the `audio-cpal` feature is disabled.
#[cfg(not(feature = "audio-cpal"))]
impl Playback {
    pub fn open(
        _preferred_device_name: Option<&str>,
        _playback_rate: u32,
        _source_rate: u32,
        _resample_chunk: usize,
    ) -> Result<Self> {
        Err(ClatterError::AudioStream(
            "compiled without audio-cpal feature".into(),
        ))
    }
}

impl AudioSink for Playback {
    fn write(&mut self, samples: &[f32]) -> Result<()> {
        let converted = self.converter.process(samples);
        self.push_blocking(&converted)
    }

    fn finish(&mut self) -> Result<()> {
        let tail = self.converter.flush();
        self.push_blocking(&tail)?;

        while self.played.load(Ordering::Acquire) < self.queued {
            self.check_stream()?;
            thread::sleep(WRITE_BACKOFF);
        }
        thread::sleep(DEVICE_TAIL);
        debug!("playback drained");
        Ok(())
    }
}

impl Drop for Playback {
    fn drop(&mut self) {
        self.stop();
    }
}
