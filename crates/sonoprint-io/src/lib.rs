//! WAV file I/O for sonoprint.
//!
//! Files are read into [`AudioBuffer`](sonoprint_core::AudioBuffer)s, either
//! mixed down to mono ([`read_wav`]) or one buffer per channel
//! ([`read_wav_channels`]), and written back as 16/24-bit PCM or 32-bit float.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sonoprint_io::{read_wav, write_wav};
//!
//! let (buffer, spec) = read_wav("input.wav")?;
//! write_wav("copy.wav", &buffer, spec)?;
//! ```

mod wav;

pub use wav::{
    WavFormat, WavInfo, WavSpec, read_wav, read_wav_channels, read_wav_info, write_wav,
    write_wav_channels,
};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Channel buffers disagree with each other or with the spec.
    #[error("Channel mismatch: {0}")]
    ChannelMismatch(String),

    /// The requested sample format is not supported.
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
