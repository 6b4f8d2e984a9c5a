//! Sample conversion kernels.
//!
//! The conversion stage talks to its numeric engine through the
//! [`ConversionKernel`] trait: `prepare` once per format pair, then `sizes`
//! and `convert` per buffer. [`PcmKernel`] is the built-in engine for
//! interleaved integer and float PCM:
//!
//! - width, depth, signedness and byte order conversion through `f64`
//! - channel mixing by position (up/down mix, reordering)
//! - dither (`rpdf`, `tpdf`, `tpdf-hf`) and noise shaping when precision drops
//!
//! # Example
//!
//! ```rust
//! use audioconvert::config::ConvertConfig;
//! use audioconvert::converters::{ConversionKernel, KernelInput, PcmKernel};
//! use audioconvert::format::{AudioFormat, Endianness};
//!
//! let input = AudioFormat::int(44100, 2, 16, 16, true, Endianness::Little);
//! let output = AudioFormat::float(44100, 2, 32, Endianness::Little);
//!
//! let kernel = PcmKernel::new();
//! let mut ctx = kernel.prepare(&input, &output, ConvertConfig::default())?;
//! let (_, out_bytes) = kernel.sizes(&ctx, 1)?;
//!
//! let mut dst = vec![0u8; out_bytes];
//! kernel.convert(&mut ctx, KernelInput::Shared(&[0, 0, 0, 0]), &mut dst, 1)?;
//! assert_eq!(dst, vec![0u8; 8]);
//! # Ok::<(), audioconvert::Error>(())
//! ```

mod kernel;
mod mix;
mod pcm;
mod quantize;

pub use kernel::{ConversionKernel, KernelInput};
pub use pcm::{MAX_SHAPED_DEPTH, PcmContext, PcmKernel};
