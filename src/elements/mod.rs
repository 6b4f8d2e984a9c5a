//! Built-in pipeline elements.
//!
//! ## Transforms
//! - [`AudioConvertElement`]: Negotiates and converts raw audio formats

mod transform;

pub use transform::{AudioConvertElement, fill_silence};
