//! Concrete audio sample formats and constraint values.
//!
//! This module provides the two halves of the format model:
//!
//! - [`AudioFormat`]: one fully resolved sample format (what a buffer holds)
//! - [`CapsValue<T>`]: a single field constraint used by caps structures
//!
//! Caps structures and expressions built from these live in [`crate::caps`].
//!
//! ```rust
//! use audioconvert::format::{AudioFormat, Endianness};
//!
//! let cd = AudioFormat::int(44100, 2, 16, 16, true, Endianness::Little);
//! assert_eq!(cd.unit_size(), 4);
//! ```

use crate::channel::ChannelLayout;
use crate::error::{Error, Result};

/// Widths accepted for integer samples.
pub const INT_WIDTHS: [u32; 4] = [8, 16, 24, 32];

/// Widths accepted for floating point samples.
pub const FLOAT_WIDTHS: [u32; 2] = [32, 64];

/// Largest integer depth.
pub const MAX_DEPTH: u32 = 32;

// ============================================================================
// CapsValue - constraint value for negotiation
// ============================================================================

/// A value that can be fixed, range, list, or any.
///
/// `Any` also stands for a field that is absent from a caps structure.
///
/// ```rust
/// use audioconvert::format::CapsValue;
///
/// let range: CapsValue<u32> = CapsValue::Range { min: 16, max: 32 };
/// let list: CapsValue<u32> = CapsValue::List(vec![8, 16, 24]);
///
/// assert_eq!(range.intersect(&list), Some(CapsValue::List(vec![16, 24])));
/// assert_eq!(range.fixate_nearest(8), Some(16));
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub enum CapsValue<T> {
    /// Exact value (fully constrained).
    Fixed(T),
    /// Range of acceptable values (inclusive).
    Range {
        /// Minimum acceptable value.
        min: T,
        /// Maximum acceptable value.
        max: T,
    },
    /// List of acceptable values (ordered by preference, first is best).
    List(Vec<T>),
    /// Any value accepted (unconstrained or absent).
    #[default]
    Any,
}

impl<T: Clone + Ord> CapsValue<T> {
    /// Build a constraint from a list of values, collapsing single values.
    ///
    /// Returns `None` for an empty list.
    pub fn from_values(values: Vec<T>) -> Option<Self> {
        match values.len() {
            0 => None,
            1 => values.into_iter().next().map(Self::Fixed),
            _ => Some(Self::List(values)),
        }
    }

    /// Build a range, collapsing `min == max` to a fixed value.
    ///
    /// Returns `None` when `min > max`.
    pub fn range(min: T, max: T) -> Option<Self> {
        if min > max {
            None
        } else if min == max {
            Some(Self::Fixed(min))
        } else {
            Some(Self::Range { min, max })
        }
    }

    /// Check if a value is accepted by this constraint.
    pub fn accepts(&self, value: &T) -> bool {
        match self {
            Self::Fixed(v) => v == value,
            Self::Range { min, max } => value >= min && value <= max,
            Self::List(values) => values.contains(value),
            Self::Any => true,
        }
    }

    /// Intersect two constraints, finding common values.
    ///
    /// Returns `None` if there's no overlap. List order follows `self`.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        match (self, other) {
            (Self::Any, other) => Some(other.clone()),
            (self_, Self::Any) => Some(self_.clone()),

            (Self::Fixed(a), Self::Fixed(b)) => (a == b).then(|| Self::Fixed(a.clone())),

            (Self::Fixed(v), Self::Range { min, max })
            | (Self::Range { min, max }, Self::Fixed(v)) => {
                (v >= min && v <= max).then(|| Self::Fixed(v.clone()))
            }

            (Self::Fixed(v), Self::List(list)) | (Self::List(list), Self::Fixed(v)) => {
                list.contains(v).then(|| Self::Fixed(v.clone()))
            }

            (
                Self::Range {
                    min: min1,
                    max: max1,
                },
                Self::Range {
                    min: min2,
                    max: max2,
                },
            ) => Self::range(min1.max(min2).clone(), max1.min(max2).clone()),

            (Self::Range { min, max }, Self::List(list))
            | (Self::List(list), Self::Range { min, max }) => Self::from_values(
                list.iter()
                    .filter(|v| *v >= min && *v <= max)
                    .cloned()
                    .collect(),
            ),

            (Self::List(list1), Self::List(list2)) => Self::from_values(
                list1
                    .iter()
                    .filter(|v| list2.contains(v))
                    .cloned()
                    .collect(),
            ),
        }
    }

    /// Check whether every value accepted by `self` is accepted by `other`.
    ///
    /// Ranges are only known to be inside a list when they hold one value.
    pub fn is_subset_of(&self, other: &Self) -> bool {
        match (self, other) {
            (_, Self::Any) => true,
            (Self::Any, _) => false,
            (Self::Fixed(v), other) => other.accepts(v),
            (Self::List(values), other) => values.iter().all(|v| other.accepts(v)),
            (Self::Range { min, max }, Self::Range { min: lo, max: hi }) => min >= lo && max <= hi,
            (Self::Range { min, max }, other) => min == max && other.accepts(min),
        }
    }

    /// Fixate: choose a single value from the constraint.
    ///
    /// Returns the preferred value (first in list, min in range).
    /// Returns `None` for `Any` (cannot fixate without default).
    pub fn fixate(&self) -> Option<T> {
        match self {
            Self::Fixed(v) => Some(v.clone()),
            Self::Range { min, .. } => Some(min.clone()),
            Self::List(values) => values.first().cloned(),
            Self::Any => None,
        }
    }

    /// Fixate, keeping `preferred` when the constraint accepts it.
    ///
    /// `Any` stays unresolved and returns `None`.
    pub fn fixate_prefer(&self, preferred: &T) -> Option<T> {
        if self.is_any() {
            None
        } else if self.accepts(preferred) {
            Some(preferred.clone())
        } else {
            self.fixate()
        }
    }

    /// Check if this is a fixed value.
    #[inline]
    pub fn is_fixed(&self) -> bool {
        matches!(self, Self::Fixed(_))
    }

    /// Check if this accepts any value.
    #[inline]
    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    /// Get the fixed value if this is fixed.
    #[inline]
    pub fn as_fixed(&self) -> Option<&T> {
        match self {
            Self::Fixed(v) => Some(v),
            _ => None,
        }
    }
}

impl CapsValue<u32> {
    /// Fixate to the accepted value closest to `target`.
    ///
    /// Ties in a list resolve to the earlier entry. `Any` returns `None`.
    pub fn fixate_nearest(&self, target: u32) -> Option<u32> {
        match self {
            Self::Fixed(v) => Some(*v),
            Self::Range { min, max } if min <= max => Some(target.clamp(*min, *max)),
            Self::Range { .. } => None,
            Self::List(values) => values.iter().copied().min_by_key(|v| v.abs_diff(target)),
            Self::Any => None,
        }
    }
}

impl<T: Clone + Ord> From<T> for CapsValue<T> {
    fn from(value: T) -> Self {
        Self::Fixed(value)
    }
}

impl<T: Clone + Ord> From<std::ops::RangeInclusive<T>> for CapsValue<T> {
    fn from(range: std::ops::RangeInclusive<T>) -> Self {
        let (min, max) = range.into_inner();
        Self::Range { min, max }
    }
}

impl<T: Clone + Ord> From<Vec<T>> for CapsValue<T> {
    fn from(values: Vec<T>) -> Self {
        Self::from_values(values).unwrap_or(Self::Any)
    }
}

// ============================================================================
// Sample encodings
// ============================================================================

/// Sample encoding family (the caps structure name).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SampleFamily {
    /// Integer PCM (`audio/x-raw-int`).
    Int,
    /// Floating point (`audio/x-raw-float`).
    Float,
}

impl SampleFamily {
    /// Media type name used in caps strings.
    pub const fn media_type(&self) -> &'static str {
        match self {
            Self::Int => "audio/x-raw-int",
            Self::Float => "audio/x-raw-float",
        }
    }

    /// The other family.
    pub const fn swapped(&self) -> Self {
        match self {
            Self::Int => Self::Float,
            Self::Float => Self::Int,
        }
    }

    /// Widths supported by this family.
    pub const fn widths(&self) -> &'static [u32] {
        match self {
            Self::Int => &INT_WIDTHS,
            Self::Float => &FLOAT_WIDTHS,
        }
    }
}

impl std::fmt::Display for SampleFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.media_type())
    }
}

/// Byte order of multi-byte samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Endianness {
    /// Least significant byte first.
    Little,
    /// Most significant byte first.
    Big,
}

impl Endianness {
    /// Byte order of the host.
    #[cfg(target_endian = "little")]
    pub const NATIVE: Self = Self::Little;
    /// Byte order of the host.
    #[cfg(target_endian = "big")]
    pub const NATIVE: Self = Self::Big;

    /// Numeric code used in caps strings (1234 / 4321).
    pub const fn code(&self) -> u32 {
        match self {
            Self::Little => 1234,
            Self::Big => 4321,
        }
    }

    /// Parse a numeric caps code.
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            1234 => Some(Self::Little),
            4321 => Some(Self::Big),
            _ => None,
        }
    }
}

/// Integer or float specific part of an [`AudioFormat`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SampleEncoding {
    /// Integer PCM.
    Int {
        /// Significant bits (1..=width).
        depth: u32,
        /// Two's complement if true, offset binary otherwise.
        signed: bool,
    },
    /// IEEE floating point.
    Float,
}

// ============================================================================
// AudioFormat - concrete descriptor
// ============================================================================

/// Raw audio format, fully resolved.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AudioFormat {
    /// Sample rate in Hz.
    pub rate: u32,
    /// Number of channels.
    pub channels: u32,
    /// Channel roles, or unpositioned.
    pub layout: ChannelLayout,
    /// Bits per sample container.
    pub width: u32,
    /// Byte order.
    pub endianness: Endianness,
    /// Integer depth/sign, or float.
    pub encoding: SampleEncoding,
}

impl AudioFormat {
    /// Create an integer format with the default layout for `channels`.
    ///
    /// Channel counts above 8 get an unpositioned layout.
    pub fn int(
        rate: u32,
        channels: u32,
        width: u32,
        depth: u32,
        signed: bool,
        endianness: Endianness,
    ) -> Self {
        Self {
            rate,
            channels,
            layout: ChannelLayout::default_for(channels).unwrap_or(ChannelLayout::Unpositioned),
            width,
            endianness,
            encoding: SampleEncoding::Int { depth, signed },
        }
    }

    /// Create a float format with the default layout for `channels`.
    pub fn float(rate: u32, channels: u32, width: u32, endianness: Endianness) -> Self {
        Self {
            rate,
            channels,
            layout: ChannelLayout::default_for(channels).unwrap_or(ChannelLayout::Unpositioned),
            width,
            endianness,
            encoding: SampleEncoding::Float,
        }
    }

    /// Replace the channel layout.
    pub fn with_layout(mut self, layout: ChannelLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Sample family.
    pub const fn family(&self) -> SampleFamily {
        match self.encoding {
            SampleEncoding::Int { .. } => SampleFamily::Int,
            SampleEncoding::Float => SampleFamily::Float,
        }
    }

    /// Integer depth, `None` for float.
    pub const fn depth(&self) -> Option<u32> {
        match self.encoding {
            SampleEncoding::Int { depth, .. } => Some(depth),
            SampleEncoding::Float => None,
        }
    }

    /// Integer signedness, `None` for float.
    pub const fn signed(&self) -> Option<bool> {
        match self.encoding {
            SampleEncoding::Int { signed, .. } => Some(signed),
            SampleEncoding::Float => None,
        }
    }

    /// Bytes per sample of one channel.
    pub const fn bytes_per_sample(&self) -> usize {
        self.width as usize / 8
    }

    /// Bytes per sample frame (all channels).
    pub const fn unit_size(&self) -> usize {
        (self.width as usize * self.channels as usize) / 8
    }

    /// Check the format invariants.
    pub fn validate(&self) -> Result<()> {
        if self.rate == 0 {
            return Err(Error::format("rate must be positive"));
        }
        if self.channels == 0 {
            return Err(Error::format("channels must be at least 1"));
        }
        if !self.family().widths().contains(&self.width) {
            return Err(Error::format(format!(
                "width {} not supported for {}",
                self.width,
                self.family()
            )));
        }
        if let SampleEncoding::Int { depth, .. } = self.encoding {
            if depth == 0 || depth > self.width {
                return Err(Error::format(format!(
                    "depth {} not allowed for width {}",
                    depth, self.width
                )));
            }
        }
        self.layout.validate(self.channels)
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.encoding {
            SampleEncoding::Int { depth, signed } => write!(
                f,
                "{}{}/{} {:?} {}Hz {}ch",
                if signed { "S" } else { "U" },
                self.width,
                depth,
                self.endianness,
                self.rate,
                self.channels
            ),
            SampleEncoding::Float => write!(
                f,
                "F{} {:?} {}Hz {}ch",
                self.width, self.endianness, self.rate, self.channels
            ),
        }
    }
}
