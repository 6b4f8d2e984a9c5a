//! # audioconvert
//!
//! Raw audio format negotiation and conversion for streaming pipelines.
//!
//! The crate has two halves:
//!
//! - **Negotiation**: given the fixed format on one side of the stage,
//!   [`negotiation::expand`] lists every format the stage can produce on the
//!   other side, lossless conversions first, and [`negotiation::fixate`]
//!   picks the one closest to the input among what the peer accepts.
//! - **Conversion**: [`elements::AudioConvertElement`] configures a
//!   [`converters::ConversionKernel`] for the negotiated pair and converts
//!   every buffer, synthesizing bit-exact silence for gap buffers.
//!
//! ## Features
//!
//! - **Integer and float samples**: 8/16/24/32-bit integers of any depth,
//!   signed or unsigned, 32/64-bit floats, either byte order
//! - **Channel layouts**: positioned layouts are never mixed implicitly;
//!   unpositioned streams may change channel count
//! - **Dithering and noise shaping** when precision is dropped
//! - **Textual caps**: `audio/x-raw-int, rate=(int)44100, ...` parsing and
//!   printing
//!
//! ## Quick Start
//!
//! ```rust
//! use audioconvert::prelude::*;
//!
//! let input = AudioFormat::int(44100, 2, 16, 16, true, Endianness::Little);
//! let incaps = AudioCaps::from_format(&input);
//! let peer: AudioCaps = "audio/x-raw-float, width=(int)32".parse()?;
//!
//! let mut element = AudioConvertElement::new();
//! let othercaps = element.transform_caps(PadDirection::Input, &incaps, Some(&peer));
//! let outcaps = element.fixate_caps(PadDirection::Input, &incaps, &othercaps)?;
//! element.set_caps(&incaps, &outcaps)?;
//!
//! let mut inbuf = Buffer::from_bytes(vec![0x00, 0x40, 0x00, 0xc0]);
//! let mut outbuf = Buffer::from_bytes(vec![0; 8]);
//! element.transform(&mut inbuf, &mut outbuf)?;
//!
//! assert_eq!(&outbuf.as_bytes()[..4], &0.5f32.to_le_bytes());
//! assert_eq!(&outbuf.as_bytes()[4..], &(-0.5f32).to_le_bytes());
//! # Ok::<(), audioconvert::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod buffer;
pub mod caps;
pub mod channel;
pub mod config;
pub mod converters;
pub mod element;
pub mod elements;
pub mod error;
pub mod format;
pub mod metadata;
pub mod negotiation;
pub mod observability;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::buffer::Buffer;
    pub use crate::caps::{AudioCaps, AudioStructure};
    pub use crate::channel::{ChannelLayout, ChannelPosition};
    pub use crate::config::{ConvertConfig, DitherMode, NoiseShapingMode};
    pub use crate::element::{BaseTransform, Element, PadDirection};
    pub use crate::elements::AudioConvertElement;
    pub use crate::error::{Error, Result};
    pub use crate::format::{AudioFormat, CapsValue, Endianness, SampleFamily};
    pub use crate::metadata::Metadata;
    pub use crate::negotiation::{expand, fixate};
}

pub use error::{Error, Result};
