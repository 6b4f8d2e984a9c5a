//! Format negotiation for the conversion stage.
//!
//! Negotiation happens in two steps:
//!
//! 1. [`expand`] turns the caps on one side of the stage into every caps the
//!    stage can produce on the other side, ranked by how much the conversion
//!    costs in fidelity.
//! 2. [`fixate`] reduces the caps chosen by the peer to one concrete
//!    [`AudioFormat`](crate::format::AudioFormat), staying as close to the
//!    known side as the caps allow.
//!
//! ```text
//!   known side (fixed)         peer caps
//!          │                       │
//!          ▼                       │
//!       expand ──► ranked caps ──► ∩ ──► candidates ──► fixate ──► AudioFormat
//! ```
//!
//! # Ranking
//!
//! Alternatives are ordered from lossless to lossy:
//!
//! | Tier | Conversion                                   |
//! |------|----------------------------------------------|
//! | 1    | byte order, signedness, int <-> float         |
//! | 2    | widening width/depth, adding channels         |
//! | 3    | depth reduction down to 16 bits               |
//! | 4    | channel reduction (unpositioned only)         |
//! | 5    | any width and depth                           |
//!
//! # Example
//!
//! ```rust
//! use audioconvert::caps::AudioCaps;
//! use audioconvert::format::{AudioFormat, Endianness};
//! use audioconvert::negotiation::{expand, fixate};
//!
//! let input = AudioFormat::int(44100, 2, 16, 16, true, Endianness::Little);
//! let peer: AudioCaps = "audio/x-raw-float, width=(int)32".parse().unwrap();
//!
//! let candidates = expand(&AudioCaps::from_format(&input), Some(&peer));
//! let output = fixate(&input, &candidates).unwrap();
//!
//! assert_eq!(output, AudioFormat::float(44100, 2, 32, Endianness::Little));
//! ```

mod expand;
mod fixate;

pub use expand::expand;
pub use fixate::{fixate, fixate_structure};
