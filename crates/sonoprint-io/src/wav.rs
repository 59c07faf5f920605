//! WAV file reading and writing.

use crate::{Error, Result};
use hound::{SampleFormat, WavReader, WavWriter};
use sonoprint_core::AudioBuffer;
use std::io::Read;
use std::path::Path;

/// WAV audio encoding format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavFormat {
    /// Linear PCM (integer samples).
    Pcm,
    /// IEEE 754 floating-point samples.
    IeeeFloat,
}

/// WAV file metadata extracted without loading sample data.
#[derive(Debug, Clone)]
pub struct WavInfo {
    /// Number of audio channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
    /// Total number of sample frames (samples per channel).
    pub num_frames: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Audio encoding format.
    pub format: WavFormat,
}

/// Read WAV metadata without loading sample data.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let total_samples = u64::from(reader.len());
    let num_frames = total_samples / u64::from(spec.channels.max(1));
    let duration_secs = if spec.sample_rate == 0 {
        0.0
    } else {
        num_frames as f64 / f64::from(spec.sample_rate)
    };

    let format = match spec.sample_format {
        SampleFormat::Float => WavFormat::IeeeFloat,
        SampleFormat::Int => WavFormat::Pcm,
    };

    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_secs,
        format,
    })
}

/// WAV file specification.
///
/// `bits_per_sample` of 32 is written as IEEE float, 16 and 24 as PCM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of audio channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz (e.g., 44100, 48000).
    pub sample_rate: u32,
    /// Bit depth per sample (16, 24, or 32).
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 32,
        }
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

impl WavSpec {
    fn to_hound(self) -> Result<hound::WavSpec> {
        let sample_format = match self.bits_per_sample {
            16 | 24 => SampleFormat::Int,
            32 => SampleFormat::Float,
            other => {
                return Err(Error::UnsupportedFormat(format!(
                    "{other}-bit output (expected 16, 24, or 32)"
                )));
            }
        };
        Ok(hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: self.bits_per_sample,
            sample_format,
        })
    }
}

/// Decode every sample of a reader to f32, interleaved.
fn read_interleaved<R: Read>(reader: WavReader<R>) -> Result<Vec<f32>> {
    let spec = reader.spec();
    let samples = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };
    Ok(samples)
}

/// Read a WAV file into a mono buffer along with the spec.
///
/// Multi-channel files are mixed down to mono by averaging channels. The
/// returned spec still reports the file's channel count.
///
/// # Example
/// ```ignore
/// let (buffer, spec) = read_wav("input.wav")?;
/// println!("Loaded {} samples at {} Hz", buffer.len(), spec.sample_rate);
/// ```
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(AudioBuffer, WavSpec)> {
    let reader = WavReader::open(path)?;
    let spec = WavSpec::from(reader.spec());
    let channels = usize::from(spec.channels.max(1));
    let samples = read_interleaved(reader)?;

    // Mix down to mono if multi-channel
    let mono = if channels > 1 {
        samples
            .chunks(channels)
            .map(|chunk| chunk.iter().sum::<f32>() / channels as f32)
            .collect()
    } else {
        samples
    };

    Ok((AudioBuffer::new(mono, spec.sample_rate), spec))
}

/// Read a WAV file into one buffer per channel, along with the spec.
pub fn read_wav_channels<P: AsRef<Path>>(path: P) -> Result<(Vec<AudioBuffer>, WavSpec)> {
    let reader = WavReader::open(path)?;
    let spec = WavSpec::from(reader.spec());
    let channels = usize::from(spec.channels.max(1));
    let samples = read_interleaved(reader)?;

    let frames = samples.len() / channels;
    let mut split: Vec<Vec<f32>> = (0..channels).map(|_| Vec::with_capacity(frames)).collect();
    for frame in samples.chunks_exact(channels) {
        for (channel, &sample) in split.iter_mut().zip(frame) {
            channel.push(sample);
        }
    }

    tracing::debug!(channels, frames, "WAV channels loaded");

    let buffers = split
        .into_iter()
        .map(|s| AudioBuffer::new(s, spec.sample_rate))
        .collect();
    Ok((buffers, spec))
}

/// Write a mono buffer to a WAV file.
///
/// The buffer's sample rate wins over `spec.sample_rate`, and the file is
/// always written with one channel.
///
/// # Example
/// ```ignore
/// let buffer = AudioBuffer::silence(48000, 48000); // 1 second of silence
/// write_wav("output.wav", &buffer, WavSpec::default())?;
/// ```
pub fn write_wav<P: AsRef<Path>>(path: P, buffer: &AudioBuffer, spec: WavSpec) -> Result<()> {
    write_wav_channels(path, std::slice::from_ref(buffer), spec)
}

/// Write one buffer per channel to an interleaved WAV file.
///
/// All buffers must share a length and sample rate; the channel count is
/// taken from `channels.len()`.
pub fn write_wav_channels<P: AsRef<Path>>(
    path: P,
    channels: &[AudioBuffer],
    spec: WavSpec,
) -> Result<()> {
    let Some(first) = channels.first() else {
        return Err(Error::ChannelMismatch("no channels to write".to_string()));
    };
    if let Some((index, other)) = channels
        .iter()
        .enumerate()
        .find(|(_, c)| c.len() != first.len() || c.sample_rate() != first.sample_rate())
    {
        return Err(Error::ChannelMismatch(format!(
            "channel {index} has {} samples at {} Hz, channel 0 has {} samples at {} Hz",
            other.len(),
            other.sample_rate(),
            first.len(),
            first.sample_rate()
        )));
    }
    let channel_count = u16::try_from(channels.len())
        .map_err(|_| Error::ChannelMismatch(format!("{} channels", channels.len())))?;

    let hound_spec = WavSpec {
        channels: channel_count,
        sample_rate: first.sample_rate(),
        bits_per_sample: spec.bits_per_sample,
    }
    .to_hound()?;
    let mut writer = WavWriter::create(path, hound_spec)?;

    if hound_spec.sample_format == SampleFormat::Float {
        for i in 0..first.len() {
            for channel in channels {
                writer.write_sample(channel.samples()[i])?;
            }
        }
    } else {
        let max_val = (1i32 << (spec.bits_per_sample - 1)) as f32;
        for i in 0..first.len() {
            for channel in channels {
                let int_sample =
                    (channel.samples()[i] * max_val).clamp(-max_val, max_val - 1.0) as i32;
                writer.write_sample(int_sample)?;
            }
        }
    }

    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn sine_buffer(len: usize, sample_rate: u32, scale: f32) -> AudioBuffer {
        AudioBuffer::new(
            (0..len).map(|i| (i as f32 / 1000.0).sin() * scale).collect(),
            sample_rate,
        )
    }

    #[test]
    fn test_roundtrip_f32() {
        let buffer = sine_buffer(1000, 48000, 1.0);
        let file = NamedTempFile::new().unwrap();
        write_wav(file.path(), &buffer, WavSpec::default()).unwrap();

        let (loaded, loaded_spec) = read_wav(file.path()).unwrap();
        assert_eq!(loaded_spec.sample_rate, 48000);
        assert_eq!(loaded.sample_rate(), 48000);
        assert_eq!(loaded.samples(), buffer.samples());
    }

    #[test]
    fn test_roundtrip_i16() {
        let buffer = sine_buffer(1000, 44100, 0.9);
        let spec = WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 16,
        };

        let file = NamedTempFile::new().unwrap();
        write_wav(file.path(), &buffer, spec).unwrap();

        let (loaded, loaded_spec) = read_wav(file.path()).unwrap();
        assert_eq!(loaded_spec.sample_rate, 44100);
        assert_eq!(loaded_spec.bits_per_sample, 16);
        assert_eq!(loaded.len(), buffer.len());

        // 16-bit has less precision
        for (a, b) in buffer.samples().iter().zip(loaded.samples()) {
            assert!((a - b).abs() < 0.001);
        }
    }

    #[test]
    fn test_roundtrip_i24() {
        let buffer = sine_buffer(500, 96000, 0.5);
        let spec = WavSpec {
            bits_per_sample: 24,
            ..WavSpec::default()
        };
        let file = NamedTempFile::new().unwrap();
        write_wav(file.path(), &buffer, spec).unwrap();

        let (loaded, loaded_spec) = read_wav(file.path()).unwrap();
        assert_eq!(loaded_spec.sample_rate, 96000);
        for (a, b) in buffer.samples().iter().zip(loaded.samples()) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn test_unsupported_bit_depth() {
        let file = NamedTempFile::new().unwrap();
        let spec = WavSpec {
            bits_per_sample: 12,
            ..WavSpec::default()
        };
        let err = write_wav(file.path(), &sine_buffer(10, 48000, 0.5), spec).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn test_channels_roundtrip() {
        let left = sine_buffer(800, 48000, 0.5);
        let right = AudioBuffer::new(vec![0.25; 800], 48000);

        let file = NamedTempFile::new().unwrap();
        write_wav_channels(file.path(), &[left.clone(), right.clone()], WavSpec::default())
            .unwrap();

        let (channels, spec) = read_wav_channels(file.path()).unwrap();
        assert_eq!(spec.channels, 2);
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0], left);
        assert_eq!(channels[1], right);

        // Mono read averages the channels
        let (mono, _) = read_wav(file.path()).unwrap();
        assert_eq!(mono.len(), 800);
        assert!((mono.samples()[0] - (left.samples()[0] + 0.25) / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_channel_mismatch() {
        let file = NamedTempFile::new().unwrap();
        let a = AudioBuffer::new(vec![0.0; 100], 48000);
        let b = AudioBuffer::new(vec![0.0; 99], 48000);
        assert!(matches!(
            write_wav_channels(file.path(), &[a.clone(), b], WavSpec::default()),
            Err(Error::ChannelMismatch(_))
        ));

        let c = AudioBuffer::new(vec![0.0; 100], 44100);
        assert!(matches!(
            write_wav_channels(file.path(), &[a, c], WavSpec::default()),
            Err(Error::ChannelMismatch(_))
        ));

        assert!(matches!(
            write_wav_channels(file.path(), &[], WavSpec::default()),
            Err(Error::ChannelMismatch(_))
        ));
    }

    #[test]
    fn test_read_wav_info() {
        let file = NamedTempFile::new().unwrap();
        let channels = vec![AudioBuffer::new(vec![0.1; 4800], 48000); 2];
        write_wav_channels(file.path(), &channels, WavSpec::default()).unwrap();

        let info = read_wav_info(file.path()).unwrap();
        assert_eq!(info.channels, 2);
        assert_eq!(info.sample_rate, 48000);
        assert_eq!(info.bits_per_sample, 32);
        assert_eq!(info.num_frames, 4800);
        assert_eq!(info.format, WavFormat::IeeeFloat);
        assert!((info.duration_secs - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_missing_file() {
        assert!(read_wav("/nonexistent/path/to/file.wav").is_err());
    }
}
