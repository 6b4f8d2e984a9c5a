//! The conversion kernel seam.

use crate::config::ConvertConfig;
use crate::error::Result;
use crate::format::AudioFormat;

/// Source bytes handed to a kernel.
///
/// `Writable` means the caller owns the input exclusively for the duration of
/// the call, so the kernel may scribble over it (convert in place).
#[derive(Debug)]
pub enum KernelInput<'a> {
    /// Input shared with other readers; must not be modified.
    Shared(&'a [u8]),
    /// Input owned exclusively by this call.
    Writable(&'a mut [u8]),
}

impl KernelInput<'_> {
    /// The input bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Shared(bytes) => bytes,
            Self::Writable(bytes) => bytes,
        }
    }
}

/// A sample conversion engine.
///
/// The driver calls [`prepare`](Self::prepare) once per format pair and keeps
/// the returned context until the formats change. [`sizes`](Self::sizes) and
/// [`convert`](Self::convert) are called for every buffer.
pub trait ConversionKernel: Send {
    /// Prepared state for one format pair and quality setting.
    type Context: Send;

    /// Build a context converting `input` to `output`.
    ///
    /// Fails with [`Error::Converter`](crate::Error::Converter) when the pair
    /// is not supported.
    fn prepare(
        &self,
        input: &AudioFormat,
        output: &AudioFormat,
        config: ConvertConfig,
    ) -> Result<Self::Context>;

    /// Byte sizes `(input, output)` of `samples` sample frames.
    fn sizes(&self, ctx: &Self::Context, samples: usize) -> Result<(usize, usize)>;

    /// Convert `samples` sample frames from `src` into `dst`.
    fn convert(
        &self,
        ctx: &mut Self::Context,
        src: KernelInput<'_>,
        dst: &mut [u8],
        samples: usize,
    ) -> Result<()>;
}
