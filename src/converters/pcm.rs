//! Interleaved PCM conversion kernel.
//!
//! Every sample is unpacked to a normalized `f64`, mixed to the output
//! channel layout, then requantized and packed in the output format.

use super::kernel::{ConversionKernel, KernelInput};
use super::mix::ChannelMix;
use super::quantize::Quantizer;
use crate::config::ConvertConfig;
use crate::error::{Error, Result};
use crate::format::{AudioFormat, Endianness, SampleEncoding};

/// Largest output depth that gets dither and noise shaping.
pub const MAX_SHAPED_DEPTH: u32 = 20;

/// Converts between any two [`AudioFormat`]s of the same rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PcmKernel;

impl PcmKernel {
    /// Create the kernel.
    pub fn new() -> Self {
        Self
    }
}

/// Prepared state of a [`PcmKernel`] conversion.
pub struct PcmContext {
    input: AudioFormat,
    output: AudioFormat,
    config: ConvertConfig,
    mix: ChannelMix,
    quantizer: Option<Quantizer>,
    frame_in: Vec<f64>,
    frame_out: Vec<f64>,
    identity: bool,
}

impl PcmContext {
    /// Input format.
    pub fn input(&self) -> &AudioFormat {
        &self.input
    }

    /// Output format.
    pub fn output(&self) -> &AudioFormat {
        &self.output
    }

    /// Quality settings this context was prepared with.
    pub fn config(&self) -> ConvertConfig {
        self.config
    }

    /// Whether dither or noise shaping is applied.
    pub fn is_shaping(&self) -> bool {
        self.quantizer.as_ref().is_some_and(Quantizer::is_shaping)
    }

    /// Whether bytes are copied unchanged.
    pub fn is_identity(&self) -> bool {
        self.identity
    }
}

impl std::fmt::Debug for PcmContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PcmContext")
            .field("input", &self.input)
            .field("output", &self.output)
            .field("config", &self.config)
            .field("identity", &self.identity)
            .finish()
    }
}

/// Whether converting `input` to `output` drops precision.
fn is_lossy(input: &AudioFormat, output: &AudioFormat) -> bool {
    match (input.encoding, output.encoding) {
        (_, SampleEncoding::Float) => false,
        (SampleEncoding::Float, SampleEncoding::Int { depth, .. }) => depth <= MAX_SHAPED_DEPTH,
        (SampleEncoding::Int { depth: d_in, .. }, SampleEncoding::Int { depth: d_out, .. }) => {
            d_in > d_out && d_out <= MAX_SHAPED_DEPTH
        }
    }
}

impl ConversionKernel for PcmKernel {
    type Context = PcmContext;

    fn prepare(
        &self,
        input: &AudioFormat,
        output: &AudioFormat,
        config: ConvertConfig,
    ) -> Result<PcmContext> {
        input
            .validate()
            .and_then(|()| output.validate())
            .map_err(|e| Error::Converter(e.to_string()))?;

        if input.rate != output.rate {
            return Err(Error::Converter(format!(
                "cannot resample from {} Hz to {} Hz",
                input.rate, output.rate
            )));
        }

        let mix = ChannelMix::new(&input.layout, input.channels, &output.layout, output.channels);
        let quantizer = output.depth().map(|depth| {
            Quantizer::new(
                config,
                output.channels as usize,
                depth,
                is_lossy(input, output),
            )
        });

        Ok(PcmContext {
            identity: input == output,
            input: input.clone(),
            output: output.clone(),
            config,
            mix,
            quantizer,
            frame_in: vec![0.0; input.channels as usize],
            frame_out: vec![0.0; output.channels as usize],
        })
    }

    fn sizes(&self, ctx: &PcmContext, samples: usize) -> Result<(usize, usize)> {
        let size = |unit: usize| {
            samples
                .checked_mul(unit)
                .ok_or_else(|| Error::Conversion(format!("{samples} samples overflow")))
        };
        Ok((size(ctx.input.unit_size())?, size(ctx.output.unit_size())?))
    }

    fn convert(
        &self,
        ctx: &mut PcmContext,
        src: KernelInput<'_>,
        dst: &mut [u8],
        samples: usize,
    ) -> Result<()> {
        let (in_bytes, out_bytes) = self.sizes(ctx, samples)?;
        let src = src.as_bytes();
        if src.len() < in_bytes || dst.len() < out_bytes {
            return Err(Error::Conversion(format!(
                "{samples} samples need {in_bytes} -> {out_bytes} bytes, have {} -> {}",
                src.len(),
                dst.len()
            )));
        }

        if ctx.identity {
            dst[..out_bytes].copy_from_slice(&src[..in_bytes]);
            return Ok(());
        }

        let in_bps = ctx.input.bytes_per_sample();
        let out_bps = ctx.output.bytes_per_sample();
        let frames_in = src[..in_bytes].chunks_exact(ctx.input.unit_size());
        let frames_out = dst[..out_bytes].chunks_exact_mut(ctx.output.unit_size());

        for (frame_in, frame_out) in frames_in.zip(frames_out) {
            for (value, bytes) in ctx.frame_in.iter_mut().zip(frame_in.chunks_exact(in_bps)) {
                *value = read_sample(bytes, &ctx.input);
            }

            ctx.mix.apply(&ctx.frame_in, &mut ctx.frame_out);

            for (channel, bytes) in frame_out.chunks_exact_mut(out_bps).enumerate() {
                write_sample(
                    bytes,
                    &ctx.output,
                    ctx.frame_out[channel],
                    ctx.quantizer.as_mut(),
                    channel,
                );
            }
        }

        Ok(())
    }
}

#[inline]
fn read_uint(bytes: &[u8], endianness: Endianness) -> u64 {
    let fold = |acc: u64, b: &u8| (acc << 8) | u64::from(*b);
    match endianness {
        Endianness::Little => bytes.iter().rev().fold(0, fold),
        Endianness::Big => bytes.iter().fold(0, fold),
    }
}

#[inline]
fn write_uint(bytes: &mut [u8], value: u64, endianness: Endianness) {
    let n = bytes.len();
    for (i, b) in bytes.iter_mut().enumerate() {
        let shift = match endianness {
            Endianness::Little => 8 * i,
            Endianness::Big => 8 * (n - 1 - i),
        };
        *b = (value >> shift) as u8;
    }
}

/// Unpack one sample to `[-1.0, 1.0)` (floats pass through unscaled).
#[inline]
fn read_sample(bytes: &[u8], format: &AudioFormat) -> f64 {
    let raw = read_uint(bytes, format.endianness);
    match format.encoding {
        SampleEncoding::Float if format.width == 32 => f64::from(f32::from_bits(raw as u32)),
        SampleEncoding::Float => f64::from_bits(raw),
        SampleEncoding::Int { depth, signed } => {
            let value = if signed {
                // Sign extend from the container width
                let shift = 64 - format.width;
                ((raw << shift) as i64) >> shift
            } else {
                raw as i64 - (1i64 << (depth - 1))
            };
            value as f64 / (1u64 << (depth - 1)) as f64
        }
    }
}

/// Pack one normalized sample.
#[inline]
fn write_sample(
    bytes: &mut [u8],
    format: &AudioFormat,
    value: f64,
    quantizer: Option<&mut Quantizer>,
    channel: usize,
) {
    let raw = match format.encoding {
        SampleEncoding::Float if format.width == 32 => u64::from((value as f32).to_bits()),
        SampleEncoding::Float => value.to_bits(),
        SampleEncoding::Int { depth, signed } => {
            let scale = 1i64 << (depth - 1);
            let scaled = value * scale as f64;
            let q = match quantizer {
                Some(quantizer) => quantizer.quantize(scaled, channel),
                None => (scaled.round() as i64).clamp(-scale, scale - 1),
            };
            if signed {
                (q as u64) & (u64::MAX >> (64 - format.width))
            } else {
                (q + scale) as u64
            }
        }
    };
    write_uint(bytes, raw, format.endianness);
}
