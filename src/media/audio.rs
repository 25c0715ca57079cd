//! Streaming audio transcode to MP3.
//!
//! Packets are decoded one at a time and every decoded frame is handed to the
//! encoder before the next packet is read, so memory use does not grow with
//! the duration of the source.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use mp3lame_encoder::{Bitrate, Builder, FlushNoGap, InterleavedPcm, Quality};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use super::TransformError;

pub const MP3_SAMPLE_RATE: u32 = 44_100;
pub const MP3_CHANNELS: u8 = 2;
pub const MP3_BITRATE: Bitrate = Bitrate::Kbps128;
/// LAME quality 2.
pub const MP3_QUALITY: Quality = Quality::NearBest;

/// One block of decoded samples, interleaved by channel.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmFrame {
    pub samples: Vec<i16>,
}

pub trait PcmSource {
    /// Next decoded frame in source order, `None` once the stream is exhausted.
    fn next_frame(&mut self) -> Result<Option<PcmFrame>, TransformError>;
}

pub trait FrameEncoder {
    fn encode(&mut self, frame: &PcmFrame) -> Result<Vec<u8>, TransformError>;

    /// Emit whatever the encoder is still buffering. Called once, after the last frame.
    fn flush(&mut self) -> Result<Vec<u8>, TransformError>;
}

/// Feed every frame of `source` through `encoder` into `sink`, then append the
/// flushed tail. Returns the number of bytes written.
pub fn stream_transcode<S, E, W>(
    source: &mut S,
    encoder: &mut E,
    sink: &mut W,
) -> Result<u64, TransformError>
where
    S: PcmSource + ?Sized,
    E: FrameEncoder + ?Sized,
    W: Write + ?Sized,
{
    let mut frames = 0u64;
    let mut written = 0u64;

    while let Some(frame) = source.next_frame()? {
        let chunk = encoder.encode(&frame)?;
        sink.write_all(&chunk)?;
        written += chunk.len() as u64;
        frames += 1;
    }

    let tail = encoder.flush()?;
    sink.write_all(&tail)?;
    sink.flush()?;
    written += tail.len() as u64;

    debug!(frames, bytes = written, "Audio stream encoded");
    Ok(written)
}

/// Decode `source` and write it to `sink` as a 128 kbps MP3.
///
/// `extension` is only a probing hint; the container is detected from content.
pub fn transcode<W: Write>(
    source: Box<dyn MediaSource>,
    extension: Option<&str>,
    sink: &mut W,
) -> Result<u64, TransformError> {
    let mut decoder = SymphoniaSource::open(source, extension)?;
    let mut encoder = LameEncoder::new()?;

    stream_transcode(&mut decoder, &mut encoder, sink)
}

/// Transcode a staged file into another staged file without loading either
/// into memory.
pub fn transcode_file(input: &Path, output: &Path) -> Result<u64, TransformError> {
    let extension = input.extension().and_then(|e| e.to_str());
    let mut sink = BufWriter::new(File::create(output)?);

    transcode(Box::new(File::open(input)?), extension, &mut sink)
}

/// Packet-by-packet decoder over any container/codec symphonia recognises.
pub struct SymphoniaSource {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
}

impl SymphoniaSource {
    pub fn open(source: Box<dyn MediaSource>, extension: Option<&str>) -> Result<Self, TransformError> {
        let stream = MediaSourceStream::new(source, Default::default());

        let mut hint = Hint::new();
        if let Some(extension) = extension {
            hint.with_extension(extension);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                stream,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| TransformError::Decode(e.to_string()))?;

        let format = probed.format;
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| TransformError::Decode("no audio track found".to_string()))?;

        let track_id = track.id;
        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| TransformError::Decode(e.to_string()))?;

        Ok(Self {
            format,
            decoder,
            track_id,
        })
    }
}

impl PcmSource for SymphoniaSource {
    fn next_frame(&mut self) -> Result<Option<PcmFrame>, TransformError> {
        loop {
            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    return Ok(None);
                }
                Err(e) => return Err(TransformError::Decode(e.to_string())),
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            match self.decoder.decode(&packet) {
                Ok(decoded) => {
                    if decoded.frames() == 0 {
                        continue;
                    }
                    let spec = *decoded.spec();
                    let mut buffer = SampleBuffer::<i16>::new(decoded.capacity() as u64, spec);
                    buffer.copy_interleaved_ref(decoded);

                    return Ok(Some(PcmFrame {
                        samples: buffer.samples().to_vec(),
                    }));
                }
                Err(SymphoniaError::DecodeError(reason)) => {
                    warn!(reason, "Skipping undecodable packet");
                }
                Err(e) => return Err(TransformError::Decode(e.to_string())),
            }
        }
    }
}

/// LAME MP3 encoder with fixed output parameters.
///
/// The input is assumed to already be 44.1 kHz stereo; other layouts are
/// encoded as-is without resampling or down-mixing.
pub struct LameEncoder {
    inner: mp3lame_encoder::Encoder,
}

impl LameEncoder {
    pub fn new() -> Result<Self, TransformError> {
        let mut builder = Builder::new()
            .ok_or_else(|| TransformError::Encode("failed to allocate LAME encoder".to_string()))?;

        builder.set_num_channels(MP3_CHANNELS).map_err(encode_error)?;
        builder.set_sample_rate(MP3_SAMPLE_RATE).map_err(encode_error)?;
        builder.set_brate(MP3_BITRATE).map_err(encode_error)?;
        builder.set_quality(MP3_QUALITY).map_err(encode_error)?;

        let inner = builder.build().map_err(encode_error)?;
        Ok(Self { inner })
    }
}

impl FrameEncoder for LameEncoder {
    fn encode(&mut self, frame: &PcmFrame) -> Result<Vec<u8>, TransformError> {
        let per_channel = frame.samples.len() / MP3_CHANNELS as usize;
        let mut out = Vec::with_capacity(mp3lame_encoder::max_required_buffer_size(per_channel));
        self.inner
            .encode_to_vec(InterleavedPcm(frame.samples.as_slice()), &mut out)
            .map_err(encode_error)?;
        Ok(out)
    }

    fn flush(&mut self) -> Result<Vec<u8>, TransformError> {
        // LAME needs at most 7200 bytes to drain its internal buffers.
        let mut out = Vec::with_capacity(7200);
        self.inner
            .flush_to_vec::<FlushNoGap>(&mut out)
            .map_err(encode_error)?;
        Ok(out)
    }
}

fn encode_error<E: std::fmt::Debug>(error: E) -> TransformError {
    TransformError::Encode(format!("{:?}", error))
}
