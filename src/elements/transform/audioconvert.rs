//! Audio format conversion element.
//!
//! Converts raw audio between sample formats: integer and float, any width,
//! depth, signedness, byte order, channel count and channel layout. The
//! sample rate is never changed.

use crate::buffer::Buffer;
use crate::caps::{AudioCaps, AudioStructure, pad_template};
use crate::config::{ConvertConfig, ConvertSettings};
use crate::converters::{ConversionKernel, KernelInput, PcmKernel};
use crate::element::{BaseTransform, Element, PadDirection, PadTemplate};
use crate::error::{BufferKind, Error, Result};
use crate::format::{AudioFormat, Endianness, SampleEncoding};
use crate::negotiation::{expand, fixate_structure};
use crate::observability::{
    ElementMetrics, TracingConfig, instrument_element, record_error, record_format_change,
    span_buffer, trace_buffer_converted, trace_error, trace_format_change,
};
use std::sync::Arc;

/// State for one configured format pair.
struct Negotiated<C> {
    input: AudioFormat,
    output: AudioFormat,
    ctx: C,
    passthrough: bool,
}

/// Audio format conversion element.
///
/// Negotiates an output format for a fixed input format, then converts
/// every buffer through a [`ConversionKernel`]. Gap buffers are answered
/// with bit-exact silence in the output format without running the kernel.
///
/// The `dithering` and `noise-shaping` properties live in a shared
/// [`ConvertSettings`] and may be changed from any thread; a change takes
/// effect at the next [`set_format`](Self::set_format).
///
/// # Example
///
/// ```rust
/// use audioconvert::buffer::Buffer;
/// use audioconvert::caps::AudioStructure;
/// use audioconvert::elements::AudioConvertElement;
/// use audioconvert::format::{AudioFormat, Endianness};
///
/// let input = AudioFormat::int(44100, 1, 16, 16, true, Endianness::Little);
/// let output = AudioFormat::int(44100, 1, 16, 16, true, Endianness::Big);
///
/// let mut element = AudioConvertElement::new();
/// element
///     .set_format(&AudioStructure::from(&input), &AudioStructure::from(&output))
///     .unwrap();
///
/// let mut inbuf = Buffer::from_bytes(vec![0x34, 0x12]);
/// let mut outbuf = Buffer::from_bytes(vec![0; 2]);
/// element.transform(&mut inbuf, &mut outbuf).unwrap();
/// assert_eq!(outbuf.as_bytes(), &[0x12, 0x34]);
/// ```
pub struct AudioConvertElement<K: ConversionKernel = PcmKernel> {
    /// Element name
    name: String,
    /// Conversion engine
    kernel: K,
    /// Dithering and noise shaping, shared with property setters
    settings: Arc<ConvertSettings>,
    /// Configured format pair (set by `set_format`)
    state: Option<Negotiated<K::Context>>,
    metrics: ElementMetrics,
    tracing: TracingConfig,
}

impl AudioConvertElement {
    /// Create a new audio convert element using the [`PcmKernel`].
    pub fn new() -> Self {
        Self::with_kernel(PcmKernel::new())
    }
}

impl Default for AudioConvertElement {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ConversionKernel> AudioConvertElement<K> {
    /// Create an element converting with `kernel`.
    pub fn with_kernel(kernel: K) -> Self {
        let name = "audioconvert".to_string();
        Self {
            metrics: ElementMetrics::new(&name),
            name,
            kernel,
            settings: Arc::new(ConvertSettings::default()),
            state: None,
            tracing: TracingConfig::default(),
        }
    }

    /// Set the element name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self.metrics = ElementMetrics::new(&self.name);
        self
    }

    /// Set dithering and noise shaping.
    pub fn with_config(self, config: ConvertConfig) -> Self {
        self.settings.set(config);
        self
    }

    /// Share settings with other owners (e.g. a control thread).
    pub fn with_settings(mut self, settings: Arc<ConvertSettings>) -> Self {
        self.settings = settings;
        self
    }

    /// Set which spans are emitted.
    pub fn with_tracing(mut self, tracing: TracingConfig) -> Self {
        self.tracing = tracing;
        self
    }

    /// The live settings.
    pub fn settings(&self) -> &Arc<ConvertSettings> {
        &self.settings
    }

    /// Set a property by name (`dithering` or `noise-shaping`).
    pub fn set_property(&self, name: &str, value: &str) -> Result<()> {
        self.settings.set_property(name, value)?;
        tracing::debug!(element = %self.name, property = name, value, "property set");
        Ok(())
    }

    /// Read a property by name.
    pub fn property(&self, name: &str) -> Result<String> {
        self.settings.property(name)
    }

    /// The kernel.
    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// The configured input format.
    pub fn input_format(&self) -> Option<&AudioFormat> {
        self.state.as_ref().map(|s| &s.input)
    }

    /// The configured output format.
    pub fn output_format(&self) -> Option<&AudioFormat> {
        self.state.as_ref().map(|s| &s.output)
    }

    /// The prepared conversion context.
    pub fn context(&self) -> Option<&K::Context> {
        self.state.as_ref().map(|s| &s.ctx)
    }

    /// Whether input and output formats are identical.
    pub fn is_passthrough(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.passthrough)
    }

    /// Configure the conversion from `input` to `output`.
    ///
    /// Both structures must describe concrete formats. On failure the
    /// element is left unconfigured.
    pub fn set_format(&mut self, input: &AudioStructure, output: &AudioStructure) -> Result<()> {
        let _span = self
            .tracing
            .element_spans
            .then(|| instrument_element(&self.name, "set_format"));

        self.state = None;
        self.configure(input, output).inspect_err(|e| {
            record_error(&self.name, e.kind());
            tracing::warn!(element = %self.name, error = %e, "failed to configure conversion");
        })
    }

    fn configure(&mut self, input: &AudioStructure, output: &AudioStructure) -> Result<()> {
        tracing::debug!(element = %self.name, incaps = %input, outcaps = %output, "setting format");

        let input = input.to_format()?;
        let output = output.to_format()?;

        let config = self.settings.snapshot();
        let ctx = self
            .kernel
            .prepare(&input, &output, config)
            .map_err(|e| match e {
                Error::Converter(_) => e,
                other => Error::Converter(other.to_string()),
            })?;

        record_format_change(&self.name);
        trace_format_change(&self.name, &input, &output);

        self.state = Some(Negotiated {
            passthrough: input == output,
            input,
            output,
            ctx,
        });
        Ok(())
    }

    /// Convert `input` into `output`.
    ///
    /// `output` must hold at least the converted size of `input` and must
    /// not be shared. Gap buffers produce silence. The input is converted in
    /// place when it is not shared. The input metadata is copied to the
    /// output.
    pub fn transform(&mut self, input: &mut Buffer, output: &mut Buffer) -> Result<()> {
        self.transform_reporting(input, output)
    }

    fn transform_reporting(&mut self, input: &mut Buffer, output: &mut Buffer) -> Result<()> {
        let _span = self
            .tracing
            .buffer_spans
            .then(|| span_buffer(&self.name, input.metadata().sequence).entered());

        self.convert_buffer(input, output).inspect_err(|e| {
            record_error(&self.name, e.kind());
            trace_error(&self.name, e);
        })
    }

    fn convert_buffer(&mut self, input: &mut Buffer, output: &mut Buffer) -> Result<()> {
        let state = self.state.as_mut().ok_or(Error::NotNegotiated)?;
        let _timer = self.metrics.start_timer();

        let samples = input.len() / state.input.unit_size();
        let (in_bytes, out_bytes) = self.kernel.sizes(&state.ctx, samples)?;
        if in_bytes == 0 || out_bytes == 0 {
            return Ok(());
        }

        if input.len() < in_bytes {
            return Err(Error::Size {
                kind: BufferKind::Input,
                have: input.len(),
                need: in_bytes,
            });
        }
        if output.len() < out_bytes {
            return Err(Error::Size {
                kind: BufferKind::Output,
                have: output.len(),
                need: out_bytes,
            });
        }

        let gap = input.is_gap();
        let dst = output
            .as_mut_bytes()
            .ok_or_else(|| Error::Conversion("output buffer is not writable".to_string()))?;

        if gap {
            fill_silence(&state.output, &mut dst[..out_bytes]);
            self.metrics.record_gap(out_bytes);
        } else {
            let src = if input.is_writable() {
                KernelInput::Writable(input.make_mut())
            } else {
                KernelInput::Shared(input.as_bytes())
            };
            self.kernel
                .convert(&mut state.ctx, src, dst, samples)
                .map_err(|e| match e {
                    Error::Conversion(_) => e,
                    other => Error::Conversion(other.to_string()),
                })?;
            self.metrics.record_converted(in_bytes, out_bytes);
        }

        *output.metadata_mut() = input.metadata().clone();
        trace_buffer_converted(&self.name, out_bytes, input.metadata().sequence, gap);
        Ok(())
    }

    /// Convert one buffer into a newly allocated output buffer.
    ///
    /// In passthrough the input is returned unchanged.
    fn process_buffer(&mut self, mut buffer: Buffer) -> Result<Buffer> {
        let state = self.state.as_ref().ok_or(Error::NotNegotiated)?;
        if state.passthrough {
            self.transform_ip(&mut buffer)?;
            return Ok(buffer);
        }

        let samples = buffer.len() / state.input.unit_size();
        let (_, out_bytes) = self.kernel.sizes(&state.ctx, samples)?;
        let mut output = Buffer::zeroed(out_bytes, buffer.metadata().clone());
        self.transform_reporting(&mut buffer, &mut output)?;
        Ok(output)
    }
}

/// Fill `dst` with digital silence in `format`.
///
/// Unsigned integers are silent at mid scale, `1 << (depth - 1)`, written in
/// the format's byte order for every sample. Signed integers and floats are
/// silent at zero.
///
/// # Panics
///
/// Panics for an unsigned integer format whose width is not 8, 16, 24 or 32.
pub fn fill_silence(format: &AudioFormat, dst: &mut [u8]) {
    let SampleEncoding::Int {
        depth,
        signed: false,
    } = format.encoding
    else {
        dst.fill(0);
        return;
    };

    let width = format.width;
    let zero = (1u32 << (width - 1)) >> (width - depth);
    let little = format.endianness == Endianness::Little;

    match width {
        8 => dst.fill(zero as u8),
        16 => {
            let zero = zero as u16;
            let bytes = if little {
                zero.to_le_bytes()
            } else {
                zero.to_be_bytes()
            };
            repeat(dst, &bytes);
        }
        24 => {
            if little {
                repeat(dst, &zero.to_le_bytes()[..3]);
            } else {
                repeat(dst, &zero.to_be_bytes()[1..]);
            }
        }
        32 => {
            let bytes = if little {
                zero.to_le_bytes()
            } else {
                zero.to_be_bytes()
            };
            repeat(dst, &bytes);
        }
        _ => unreachable!("no silence for {width}-bit samples"),
    }
}

fn repeat(dst: &mut [u8], pattern: &[u8]) {
    for chunk in dst.chunks_exact_mut(pattern.len()) {
        chunk.copy_from_slice(pattern);
    }
}

impl<K: ConversionKernel> BaseTransform for AudioConvertElement<K> {
    fn name(&self) -> &str {
        &self.name
    }

    fn transform_caps(
        &self,
        direction: PadDirection,
        caps: &AudioCaps,
        filter: Option<&AudioCaps>,
    ) -> AudioCaps {
        let _span = self
            .tracing
            .element_spans
            .then(|| instrument_element(&self.name, "transform_caps"));
        tracing::debug!(element = %self.name, %direction, "transforming caps");

        // Conversion works the same way in both directions
        expand(caps, filter)
    }

    fn fixate_caps(
        &self,
        direction: PadDirection,
        caps: &AudioCaps,
        othercaps: &AudioCaps,
    ) -> Result<AudioCaps> {
        let _span = self
            .tracing
            .element_spans
            .then(|| instrument_element(&self.name, "fixate_caps"));
        tracing::debug!(element = %self.name, %direction, "fixating caps");

        let fixed = caps.to_format()?;
        Ok(AudioCaps::new(fixate_structure(&fixed, othercaps)?))
    }

    fn set_caps(&mut self, incaps: &AudioCaps, outcaps: &AudioCaps) -> Result<()> {
        let input = incaps.first().ok_or_else(|| Error::format("empty input caps"))?;
        let output = outcaps.first().ok_or_else(|| Error::format("empty output caps"))?;
        self.set_format(input, output)
    }

    fn unit_size(&self, caps: &AudioCaps) -> Result<usize> {
        let format = caps.to_format().inspect_err(|e| {
            tracing::info!(element = %self.name, error = %e, "failed to parse caps to get unit_size");
        })?;
        Ok(format.unit_size())
    }

    fn transform(&mut self, input: &mut Buffer, output: &mut Buffer) -> Result<()> {
        self.transform_reporting(input, output)
    }

    fn passthrough_on_same_caps(&self) -> bool {
        true
    }

    fn pad_templates(&self) -> [PadTemplate; 2] {
        [PadTemplate::sink(pad_template()), PadTemplate::src(pad_template())]
    }
}

impl<K: ConversionKernel> Element for AudioConvertElement<K> {
    fn process(&mut self, buffer: Buffer) -> Result<Option<Buffer>> {
        self.process_buffer(buffer).map(Some)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn input_caps(&self) -> AudioCaps {
        self.input_format()
            .map(AudioCaps::from_format)
            .unwrap_or_else(pad_template)
    }

    fn output_caps(&self) -> AudioCaps {
        self.output_format()
            .map(AudioCaps::from_format)
            .unwrap_or_else(pad_template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DitherMode, NoiseShapingMode};
    use crate::format::CapsValue;
    use crate::metadata::Metadata;

    fn s16le(channels: u32) -> AudioFormat {
        AudioFormat::int(44100, channels, 16, 16, true, Endianness::Little)
    }

    fn configured(input: &AudioFormat, output: &AudioFormat) -> AudioConvertElement {
        let mut element = AudioConvertElement::new();
        element
            .set_format(&AudioStructure::from(input), &AudioStructure::from(output))
            .unwrap();
        element
    }

    fn silence(format: &AudioFormat, len: usize) -> Vec<u8> {
        let mut dst = vec![0xaa; len];
        fill_silence(format, &mut dst);
        dst
    }

    #[test]
    fn test_silence_unsigned_16_little() {
        let format = AudioFormat::int(44100, 1, 16, 16, false, Endianness::Little);
        assert_eq!(silence(&format, 6), [0x00, 0x80, 0x00, 0x80, 0x00, 0x80]);
    }

    #[test]
    fn test_silence_unsigned_16_big() {
        let format = AudioFormat::int(44100, 1, 16, 16, false, Endianness::Big);
        assert_eq!(silence(&format, 4), [0x80, 0x00, 0x80, 0x00]);
    }

    #[test]
    fn test_silence_unsigned_8() {
        let format = AudioFormat::int(8000, 2, 8, 8, false, Endianness::Little);
        assert_eq!(silence(&format, 5), [0x80; 5]);

        let shallow = AudioFormat::int(8000, 2, 8, 4, false, Endianness::Little);
        assert_eq!(silence(&shallow, 2), [0x08; 2]);
    }

    #[test]
    fn test_silence_unsigned_24() {
        let little = AudioFormat::int(48000, 1, 24, 24, false, Endianness::Little);
        assert_eq!(silence(&little, 6), [0x00, 0x00, 0x80, 0x00, 0x00, 0x80]);

        let big = AudioFormat::int(48000, 1, 24, 20, false, Endianness::Big);
        assert_eq!(silence(&big, 3), [0x08, 0x00, 0x00]);
    }

    #[test]
    fn test_silence_unsigned_32() {
        let little = AudioFormat::int(48000, 1, 32, 32, false, Endianness::Little);
        assert_eq!(silence(&little, 4), [0x00, 0x00, 0x00, 0x80]);

        let big = AudioFormat::int(48000, 1, 32, 24, false, Endianness::Big);
        assert_eq!(silence(&big, 4), [0x00, 0x80, 0x00, 0x00]);
    }

    #[test]
    fn test_silence_signed_and_float_zero() {
        assert_eq!(silence(&s16le(1), 4), [0; 4]);
        let float = AudioFormat::float(48000, 1, 32, Endianness::Big);
        assert_eq!(silence(&float, 8), [0; 8]);
    }

    #[test]
    fn test_not_negotiated() {
        let mut element = AudioConvertElement::new();
        let mut inbuf = Buffer::from_bytes(vec![0; 4]);
        let mut outbuf = Buffer::from_bytes(vec![0; 4]);
        let err = element.transform(&mut inbuf, &mut outbuf).unwrap_err();
        assert!(matches!(err, Error::NotNegotiated));
    }

    #[test]
    fn test_set_format_rejects_unfixed() {
        let mut element = AudioConvertElement::new();
        let unfixed = AudioStructure::from(&s16le(2)).with_width(CapsValue::List(vec![16, 32]));
        let err = element
            .set_format(&unfixed, &AudioStructure::from(&s16le(2)))
            .unwrap_err();
        assert!(matches!(err, Error::Format(_)));
        assert!(element.input_format().is_none());
    }

    #[test]
    fn test_set_format_rejects_resample() {
        let mut element = AudioConvertElement::new();
        let output = AudioFormat::int(48000, 2, 16, 16, true, Endianness::Little);
        let err = element
            .set_format(&AudioStructure::from(&s16le(2)), &AudioStructure::from(&output))
            .unwrap_err();
        assert!(matches!(err, Error::Converter(_)));
    }

    #[test]
    fn test_failed_set_format_clears_state() {
        let mut element = configured(&s16le(2), &s16le(2));
        assert!(element.is_passthrough());

        let output = AudioFormat::int(48000, 2, 16, 16, true, Endianness::Little);
        assert!(element
            .set_format(&AudioStructure::from(&s16le(2)), &AudioStructure::from(&output))
            .is_err());
        assert!(!element.is_passthrough());
        assert!(element.output_format().is_none());
    }

    #[test]
    fn test_zero_samples_is_noop() {
        let mut element = configured(&s16le(2), &s16le(1));
        let mut inbuf = Buffer::from_bytes(vec![1, 2, 3]);
        let mut outbuf = Buffer::from_bytes(vec![9; 2]);
        element.transform(&mut inbuf, &mut outbuf).unwrap();
        assert_eq!(outbuf.as_bytes(), &[9, 9]);
    }

    #[test]
    fn test_output_too_small() {
        let mut element = configured(&s16le(1), &s16le(2));
        let mut inbuf = Buffer::from_bytes(vec![0; 4]);
        let mut outbuf = Buffer::from_bytes(vec![0; 7]);
        let err = element.transform(&mut inbuf, &mut outbuf).unwrap_err();
        assert!(matches!(
            err,
            Error::Size {
                kind: BufferKind::Output,
                have: 7,
                need: 8
            }
        ));
        assert!(err.is_per_buffer());

        // The context survives a per-buffer error
        let mut outbuf = Buffer::from_bytes(vec![0; 8]);
        element.transform(&mut inbuf, &mut outbuf).unwrap();
    }

    #[test]
    fn test_shared_output_rejected() {
        let mut element = configured(&s16le(1), &s16le(1));
        let mut inbuf = Buffer::from_bytes(vec![0; 2]);
        let mut outbuf = Buffer::from_bytes(vec![0; 2]);
        let _shared = outbuf.clone();
        let err = element.transform(&mut inbuf, &mut outbuf).unwrap_err();
        assert!(matches!(err, Error::Conversion(_)));
    }

    #[test]
    fn test_shared_input_left_untouched() {
        let float = AudioFormat::float(44100, 1, 32, Endianness::Little);
        let mut element = configured(&s16le(1), &float);

        let mut inbuf = Buffer::from_bytes(0x4000i16.to_le_bytes().to_vec());
        let keep = inbuf.clone();
        let mut outbuf = Buffer::from_bytes(vec![0; 4]);
        element.transform(&mut inbuf, &mut outbuf).unwrap();

        assert_eq!(keep.as_bytes(), &0x4000i16.to_le_bytes());
        assert_eq!(outbuf.as_bytes(), &0.5f32.to_le_bytes());
    }

    #[test]
    fn test_gap_skips_kernel_and_copies_metadata() {
        let unsigned = AudioFormat::int(44100, 2, 16, 16, false, Endianness::Little);
        let mut element = configured(&s16le(2), &unsigned);

        let metadata = Metadata::with_sequence(3)
            .with_pts(std::time::Duration::from_millis(40))
            .with_offsets(1764, 1766)
            .with_gap();
        let mut inbuf = Buffer::new(vec![0x7f; 8], metadata.clone());
        let mut outbuf = Buffer::zeroed(8, Metadata::new());
        element.transform(&mut inbuf, &mut outbuf).unwrap();

        assert_eq!(outbuf.as_bytes(), &[0x00, 0x80, 0x00, 0x80, 0x00, 0x80, 0x00, 0x80]);
        assert_eq!(outbuf.metadata(), &metadata);
    }

    #[test]
    fn test_process_allocates_output() {
        let mut element = configured(&s16le(1), &s16le(2));
        let input = Buffer::new(vec![0x00, 0x40], Metadata::with_sequence(1));
        let output = element.process(input).unwrap().unwrap();
        assert_eq!(output.as_bytes(), &[0x00, 0x40, 0x00, 0x40]);
        assert_eq!(output.metadata().sequence, 1);
    }

    #[test]
    fn test_process_passthrough_returns_input() {
        let mut element = configured(&s16le(2), &s16le(2));
        let input = Buffer::from_bytes(vec![1, 2, 3, 4]);
        let output = element.process(input).unwrap().unwrap();
        assert_eq!(output.as_bytes(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_properties() {
        let element = AudioConvertElement::new();
        assert_eq!(element.property("dithering").unwrap(), "tpdf");
        assert_eq!(element.property("noise-shaping").unwrap(), "none");

        element.set_property("dithering", "rpdf").unwrap();
        element.set_property("noise-shaping", "high").unwrap();
        assert_eq!(element.settings().snapshot().dithering, DitherMode::Rpdf);
        assert_eq!(element.settings().snapshot().noise_shaping, NoiseShapingMode::High);

        assert!(matches!(
            element.set_property("volume", "1.0"),
            Err(Error::Property { .. })
        ));
        assert!(element.set_property("dithering", "loud").is_err());
    }

    #[test]
    fn test_settings_snapshot_at_set_format() {
        let s32 = AudioFormat::int(44100, 1, 32, 32, true, Endianness::Little);
        let s16 = s16le(1);

        let mut element = AudioConvertElement::new().with_config(
            ConvertConfig::new()
                .with_dithering(DitherMode::None)
                .with_noise_shaping(NoiseShapingMode::None),
        );
        element
            .set_format(&AudioStructure::from(&s32), &AudioStructure::from(&s16))
            .unwrap();
        element.set_property("dithering", "tpdf").unwrap();

        let ctx = element.context().unwrap();
        assert_eq!(ctx.config().dithering, DitherMode::None);
        assert!(!ctx.is_shaping());
    }

    #[test]
    fn test_base_transform_negotiation() {
        let mut element = AudioConvertElement::new().with_name("convert0");
        let incaps = AudioCaps::from_format(&s16le(2));
        let peer: AudioCaps = "audio/x-raw-float, rate=(int)44100, channels=(int)2"
            .parse()
            .unwrap();

        let othercaps = element.transform_caps(PadDirection::Input, &incaps, Some(&peer));
        assert!(!othercaps.is_empty());

        let outcaps = element
            .fixate_caps(PadDirection::Input, &incaps, &othercaps)
            .unwrap();
        assert!(outcaps.is_fixed());
        assert_eq!(element.unit_size(&outcaps).unwrap(), 8);

        element.set_caps(&incaps, &outcaps).unwrap();
        assert_eq!(
            element.output_format(),
            Some(&AudioFormat::float(44100, 2, 32, Endianness::Little))
        );
        assert_eq!(BaseTransform::name(&element), "convert0");
    }

    #[test]
    fn test_unit_size_needs_fixed_caps() {
        let element = AudioConvertElement::new();
        assert!(element.unit_size(&pad_template()).is_err());
        assert_eq!(element.unit_size(&AudioCaps::from_format(&s16le(2))).unwrap(), 4);
    }

    #[test]
    fn test_pad_templates() {
        let element = AudioConvertElement::new();
        let [sink, src] = element.pad_templates();
        assert_eq!(sink.direction, PadDirection::Input);
        assert_eq!(src.direction, PadDirection::Output);
        assert_eq!(sink.caps, pad_template());
        assert!(element.passthrough_on_same_caps());
    }
}
