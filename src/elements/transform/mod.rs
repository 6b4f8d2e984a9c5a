//! Data transformation elements.
//!
//! ## Audio Processing
//! - [`AudioConvertElement`]: Convert between raw audio sample formats
//!   (S16LE -> F32BE, 5.1 -> stereo, etc.)

mod audioconvert;

pub use audioconvert::{AudioConvertElement, fill_silence};
