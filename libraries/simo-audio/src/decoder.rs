//! Audio probing using Symphonia
//!
//! Fetched tracks arrive as whole in-memory files. Probing reads the container
//! header, opens a decoder for the default track, decodes the first packet to
//! reject corrupt data early and works out the duration.

use crate::error::{AudioError, Result};
use bytes::Bytes;
use std::io::Cursor;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Stream properties of a probed track
#[derive(Debug, Clone, PartialEq)]
pub struct AudioInfo {
    /// Duration in seconds
    pub duration: f64,
    pub sample_rate: u32,
    pub channels: usize,
}

/// Probe an in-memory audio file.
///
/// `extension` is a format hint (e.g. "mp3"); probing still works without it.
pub fn probe(data: Bytes, extension: Option<&str>) -> Result<AudioInfo> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(data)), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::UnsupportedFormat(format!("Failed to probe format: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::DecodeError("No audio track found".into()))?;

    let track_id = track.id;
    let params = track.codec_params.clone();

    let sample_rate = params
        .sample_rate
        .ok_or_else(|| AudioError::DecodeError("Unknown sample rate".into()))?;
    let channels = params.channels.map_or(0, |c| c.count());

    let mut decoder = symphonia::default::get_codecs()
        .make(&params, &DecoderOptions::default())
        .map_err(|e| AudioError::Symphonia(format!("Failed to create decoder: {}", e)))?;

    // Header duration when the container has one, else sum packet durations
    let mut total_ts: u64 = 0;
    let mut decoded_first = false;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(AudioError::Symphonia(format!("Failed to read packet: {}", e))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        if !decoded_first {
            decoder
                .decode(&packet)
                .map_err(|e| AudioError::DecodeError(format!("Failed to decode: {}", e)))?;
            decoded_first = true;
        }

        if params.n_frames.is_some() {
            break;
        }
        total_ts += packet.dur;
    }

    if !decoded_first {
        return Err(AudioError::DecodeError("Track contains no audio".into()));
    }

    let duration = match params.n_frames {
        Some(frames) => frames as f64 / f64::from(sample_rate),
        None => match params.time_base {
            Some(tb) => {
                let time = tb.calc_time(total_ts);
                time.seconds as f64 + time.frac
            }
            None => total_ts as f64 / f64::from(sample_rate),
        },
    };

    Ok(AudioInfo {
        duration,
        sample_rate,
        channels,
    })
}

/// Lowercased extension of a filename, used as the probe hint
pub fn extension_of(filename: &str) -> Option<String> {
    std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine_wav(sample_rate: u32, seconds: f64) -> Bytes {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            let frames = (f64::from(sample_rate) * seconds) as usize;
            for i in 0..frames {
                let t = i as f64 / f64::from(sample_rate);
                let sample = ((t * 440.0 * 2.0 * std::f64::consts::PI).sin() * 8000.0) as i16;
                writer.write_sample(sample).unwrap();
                writer.write_sample(sample).unwrap();
            }
            writer.finalize().unwrap();
        }
        Bytes::from(cursor.into_inner())
    }

    #[test]
    fn probes_wav_duration() {
        let info = probe(sine_wav(8000, 2.0), Some("wav")).unwrap();
        assert!((info.duration - 2.0).abs() < 0.01);
        assert_eq!(info.sample_rate, 8000);
        assert_eq!(info.channels, 2);
    }

    #[test]
    fn probes_without_hint() {
        let info = probe(sine_wav(22050, 0.5), None).unwrap();
        assert!((info.duration - 0.5).abs() < 0.01);
    }

    #[test]
    fn rejects_garbage() {
        let garbage = Bytes::from(vec![0x42u8; 4096]);
        assert!(probe(garbage, Some("mp3")).is_err());
    }

    #[test]
    fn rejects_empty_input() {
        assert!(probe(Bytes::new(), Some("mp3")).is_err());
    }

    #[test]
    fn extension_hint() {
        assert_eq!(extension_of("1_Song.MP3").as_deref(), Some("mp3"));
        assert_eq!(extension_of("noext"), None);
    }
}
