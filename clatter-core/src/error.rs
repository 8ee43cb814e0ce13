use thiserror::Error;

/// All errors produced by clatter-core.
#[derive(Debug, Error)]
pub enum ClatterError {
    #[error("could not parse time {input:?}: {reason}")]
    InvalidTime { input: String, reason: String },

    #[error("invalid window: {0}")]
    InvalidWindow(String),

    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("no audio stream found in {path}")]
    NoAudioTrack { path: std::path::PathBuf },

    #[error("audio device error: {0}")]
    AudioDevice(String),

    #[error("audio stream error: {0}")]
    AudioStream(String),

    #[error("no default output device found")]
    NoDefaultOutputDevice,

    #[error("analysis error: {0}")]
    Analysis(String),

    #[error("visualization error: {0}")]
    Visualization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ClatterError>;
