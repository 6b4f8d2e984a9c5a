//! Capability structures and ordered capability expressions.
//!
//! An [`AudioStructure`] constrains every field of a raw audio format with a
//! [`CapsValue`]; an [`AudioCaps`] is an ordered union of structures where
//! earlier entries are preferred.
//!
//! Caps can be written in the usual textual form:
//!
//! ```rust
//! use audioconvert::caps::AudioCaps;
//!
//! let caps: AudioCaps = "audio/x-raw-int, rate=(int)44100, channels=(int)[ 1, 2 ], \
//!                        width=(int)16, depth=(int)16, signed=(boolean)true, \
//!                        endianness=(int)1234"
//!     .parse()
//!     .unwrap();
//! assert_eq!(caps.len(), 1);
//! assert!(!caps.is_fixed());
//! ```

mod parser;

pub use parser::parse_caps;

use crate::channel::{ChannelLayout, LayoutCaps};
use crate::error::{Error, Result};
use crate::format::{AudioFormat, CapsValue, Endianness, SampleEncoding, SampleFamily};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// Largest value of an integer caps field.
pub const MAX_INT: u32 = i32::MAX as u32;

// ============================================================================
// AudioStructure
// ============================================================================

/// One alternative of a capability expression.
///
/// Fields set to [`CapsValue::Any`] (or [`LayoutCaps::Any`]) are absent.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioStructure {
    /// Sample family (the structure name).
    pub family: SampleFamily,
    /// Sample rate in Hz.
    pub rate: CapsValue<u32>,
    /// Channel count.
    pub channels: CapsValue<u32>,
    /// Channel positions.
    pub layout: LayoutCaps,
    /// Container width in bits.
    pub width: CapsValue<u32>,
    /// Significant bits (integer only).
    pub depth: CapsValue<u32>,
    /// Signedness (integer only).
    pub signed: CapsValue<bool>,
    /// Byte order.
    pub endianness: CapsValue<Endianness>,
    /// Fields not interpreted by this crate, as written.
    pub extra: Vec<(String, String)>,
}

impl AudioStructure {
    /// Create a structure with every field absent.
    pub fn new(family: SampleFamily) -> Self {
        Self {
            family,
            rate: CapsValue::Any,
            channels: CapsValue::Any,
            layout: LayoutCaps::Any,
            width: CapsValue::Any,
            depth: CapsValue::Any,
            signed: CapsValue::Any,
            endianness: CapsValue::Any,
            extra: Vec::new(),
        }
    }

    /// Set the rate constraint.
    pub fn with_rate(mut self, rate: impl Into<CapsValue<u32>>) -> Self {
        self.rate = rate.into();
        self
    }

    /// Set the channel count constraint.
    pub fn with_channels(mut self, channels: impl Into<CapsValue<u32>>) -> Self {
        self.channels = channels.into();
        self
    }

    /// Set the layout constraint.
    pub fn with_layout(mut self, layout: LayoutCaps) -> Self {
        self.layout = layout;
        self
    }

    /// Set the width constraint.
    pub fn with_width(mut self, width: impl Into<CapsValue<u32>>) -> Self {
        self.width = width.into();
        self
    }

    /// Set the depth constraint.
    pub fn with_depth(mut self, depth: impl Into<CapsValue<u32>>) -> Self {
        self.depth = depth.into();
        self
    }

    /// Set the signedness constraint.
    pub fn with_signed(mut self, signed: impl Into<CapsValue<bool>>) -> Self {
        self.signed = signed.into();
        self
    }

    /// Set the byte order constraint.
    pub fn with_endianness(mut self, endianness: impl Into<CapsValue<Endianness>>) -> Self {
        self.endianness = endianness.into();
        self
    }

    /// Add an uninterpreted field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((name.into(), value.into()));
        self
    }

    /// Whether every present field holds a single value.
    pub fn is_fixed(&self) -> bool {
        fn fixed_or_absent<T: Clone + Ord>(v: &CapsValue<T>) -> bool {
            v.is_fixed() || v.is_any()
        }

        fixed_or_absent(&self.rate)
            && fixed_or_absent(&self.channels)
            && fixed_or_absent(&self.width)
            && fixed_or_absent(&self.depth)
            && fixed_or_absent(&self.signed)
            && fixed_or_absent(&self.endianness)
            && !matches!(self.layout, LayoutCaps::List(_))
    }

    /// Intersect with another structure.
    ///
    /// Value lists keep the order of `self`. Returns `None` when the
    /// families differ or any field has no common value.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        if self.family != other.family {
            return None;
        }

        let mut extra = self.extra.clone();
        for (name, value) in &other.extra {
            match extra.iter().find(|(n, _)| n == name) {
                Some((_, v)) if v != value => return None,
                Some(_) => {}
                None => extra.push((name.clone(), value.clone())),
            }
        }

        Some(Self {
            family: self.family,
            rate: self.rate.intersect(&other.rate)?,
            channels: self.channels.intersect(&other.channels)?,
            layout: self.layout.intersect(&other.layout)?,
            width: self.width.intersect(&other.width)?,
            depth: self.depth.intersect(&other.depth)?,
            signed: self.signed.intersect(&other.signed)?,
            endianness: self.endianness.intersect(&other.endianness)?,
            extra,
        })
    }

    /// Check whether every format described by `self` is described by `other`.
    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.family == other.family
            && self.rate.is_subset_of(&other.rate)
            && self.channels.is_subset_of(&other.channels)
            && self.layout.is_subset_of(&other.layout)
            && self.width.is_subset_of(&other.width)
            && self.depth.is_subset_of(&other.depth)
            && self.signed.is_subset_of(&other.signed)
            && self.endianness.is_subset_of(&other.endianness)
            && other
                .extra
                .iter()
                .all(|field| self.extra.contains(field))
    }

    /// Check whether a concrete format satisfies this structure.
    pub fn accepts(&self, format: &AudioFormat) -> bool {
        AudioStructure::from(format).is_subset_of(self)
    }

    /// Keep only width, depth, rate, channels, endianness and signedness.
    pub fn stripped(&self) -> Self {
        Self {
            layout: LayoutCaps::Any,
            extra: Vec::new(),
            ..self.clone()
        }
    }

    /// Whether the channel positions are known, and if so whether they are
    /// unpositioned.
    ///
    /// Returns `Some(unpositioned)` when the channel count is fixed and the
    /// layout is either fixed, or implied unpositioned by more than 8
    /// channels. Returns `None` otherwise.
    pub fn fixed_channel_positions(&self) -> Option<bool> {
        let channels = *self.channels.as_fixed()?;
        match &self.layout {
            LayoutCaps::Fixed(layout) => Some(!layout.is_positioned()),
            _ if channels > 8 => Some(true),
            _ => None,
        }
    }

    /// Resolve to a concrete format.
    pub fn to_format(&self) -> Result<AudioFormat> {
        AudioFormat::try_from(self)
    }
}

impl From<&AudioFormat> for AudioStructure {
    fn from(format: &AudioFormat) -> Self {
        let structure = Self::new(format.family())
            .with_rate(format.rate)
            .with_channels(format.channels)
            .with_layout(LayoutCaps::Fixed(format.layout.clone()))
            .with_width(format.width)
            .with_endianness(format.endianness);

        match format.encoding {
            SampleEncoding::Int { depth, signed } => {
                structure.with_depth(depth).with_signed(signed)
            }
            SampleEncoding::Float => structure,
        }
    }
}

fn fixed_field<T: Clone + Ord>(value: &CapsValue<T>, name: &str) -> Result<T> {
    match value {
        CapsValue::Fixed(v) => Ok(v.clone()),
        CapsValue::Any => Err(Error::format(format!("missing field '{name}'"))),
        _ => Err(Error::format(format!("field '{name}' is not fixed"))),
    }
}

impl TryFrom<&AudioStructure> for AudioFormat {
    type Error = Error;

    fn try_from(s: &AudioStructure) -> Result<Self> {
        let rate = fixed_field(&s.rate, "rate")?;
        let channels = fixed_field(&s.channels, "channels")?;
        let width = fixed_field(&s.width, "width")?;

        // Byte order is meaningless for single-byte samples
        let endianness = if width == 8 {
            s.endianness
                .as_fixed()
                .copied()
                .unwrap_or(Endianness::NATIVE)
        } else {
            fixed_field(&s.endianness, "endianness")?
        };

        let encoding = match s.family {
            SampleFamily::Int => {
                let signed = fixed_field(&s.signed, "signed")?;
                let depth = fixed_field(&s.depth, "depth")?;
                if depth > width {
                    return Err(Error::format(format!(
                        "depth {depth} larger than width {width}"
                    )));
                }
                SampleEncoding::Int { depth, signed }
            }
            SampleFamily::Float => SampleEncoding::Float,
        };

        let layout = match &s.layout {
            LayoutCaps::Fixed(layout) => layout.clone(),
            LayoutCaps::List(_) => {
                return Err(Error::format("field 'channel-positions' is not fixed"));
            }
            LayoutCaps::Any if channels > 8 => ChannelLayout::Unpositioned,
            LayoutCaps::Any if channels <= 2 => ChannelLayout::default_for(channels)
                .ok_or_else(|| Error::format("channels must be at least 1"))?,
            LayoutCaps::Any => {
                return Err(Error::format(format!(
                    "missing channel-positions for {channels} channels"
                )));
            }
        };

        let format = AudioFormat {
            rate,
            channels,
            layout,
            width,
            endianness,
            encoding,
        };
        format.validate()?;
        Ok(format)
    }
}

// ============================================================================
// AudioCaps
// ============================================================================

/// Ordered union of capability structures.
///
/// Order is preference: earlier structures are better matches.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct AudioCaps(SmallVec<[AudioStructure; 2]>);

impl AudioCaps {
    /// Caps matching nothing.
    pub fn new_empty() -> Self {
        Self(SmallVec::new())
    }

    /// Caps with a single structure.
    pub fn new(structure: AudioStructure) -> Self {
        let mut caps = SmallVec::new();
        caps.push(structure);
        Self(caps)
    }

    /// Caps from structures, kept as given.
    pub fn from_structures(structures: impl IntoIterator<Item = AudioStructure>) -> Self {
        Self(structures.into_iter().collect())
    }

    /// Caps describing exactly one concrete format.
    pub fn from_format(format: &AudioFormat) -> Self {
        Self::new(AudioStructure::from(format))
    }

    /// The structures, in preference order.
    pub fn structures(&self) -> &[AudioStructure] {
        &self.0
    }

    /// Iterate the structures.
    pub fn iter(&self) -> std::slice::Iter<'_, AudioStructure> {
        self.0.iter()
    }

    /// Number of structures.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no structure is present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether this holds exactly one fixed structure.
    pub fn is_fixed(&self) -> bool {
        self.0.len() == 1 && self.0[0].is_fixed()
    }

    /// The preferred structure.
    pub fn first(&self) -> Option<&AudioStructure> {
        self.0.first()
    }

    /// Whether `structure` is a subset of some existing entry.
    pub fn is_redundant(&self, structure: &AudioStructure) -> bool {
        self.0.iter().any(|s| structure.is_subset_of(s))
    }

    /// Append unless already covered by an existing entry.
    ///
    /// Returns whether the structure was added.
    pub fn merge(&mut self, structure: AudioStructure) -> bool {
        if self.is_redundant(&structure) {
            false
        } else {
            self.0.push(structure);
            true
        }
    }

    /// Append unconditionally.
    pub fn append(&mut self, structure: AudioStructure) {
        self.0.push(structure);
    }

    /// Intersect, keeping the order of `self`.
    ///
    /// Each structure of `self` is intersected with every structure of
    /// `other` in turn, so the result follows `self`'s preference.
    pub fn intersect(&self, other: &Self) -> Self {
        let mut result = Self::new_empty();
        for a in &self.0 {
            for b in &other.0 {
                if let Some(s) = a.intersect(b) {
                    result.merge(s);
                }
            }
        }
        result
    }

    /// Check whether some structure accepts a concrete format.
    pub fn accepts(&self, format: &AudioFormat) -> bool {
        self.0.iter().any(|s| s.accepts(format))
    }

    /// Resolve a fixed caps to a concrete format.
    pub fn to_format(&self) -> Result<AudioFormat> {
        match self.0.as_slice() {
            [structure] => structure.to_format(),
            [] => Err(Error::format("empty caps")),
            _ => Err(Error::format("caps hold more than one structure")),
        }
    }
}

impl<'a> IntoIterator for &'a AudioCaps {
    type Item = &'a AudioStructure;
    type IntoIter = std::slice::Iter<'a, AudioStructure>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromStr for AudioCaps {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_caps(s)
    }
}

/// Every format the conversion stage can handle on either side.
pub fn pad_template() -> AudioCaps {
    let both = CapsValue::List(vec![Endianness::Little, Endianness::Big]);
    let signed = CapsValue::List(vec![true, false]);

    let float = |width: u32| {
        AudioStructure::new(SampleFamily::Float)
            .with_rate(1..=MAX_INT)
            .with_channels(1..=MAX_INT)
            .with_endianness(both.clone())
            .with_width(width)
    };
    let int = |width: u32| {
        AudioStructure::new(SampleFamily::Int)
            .with_rate(1..=MAX_INT)
            .with_channels(1..=MAX_INT)
            .with_endianness(both.clone())
            .with_width(width)
            .with_depth(1..=width)
            .with_signed(signed.clone())
    };

    AudioCaps::from_structures([float(64), float(32), int(32), int(24), int(16), int(8)])
}

// ============================================================================
// Display
// ============================================================================

fn write_field<T: Clone + Ord, D: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    ty: &str,
    value: &CapsValue<T>,
    show: impl Fn(&T) -> D,
) -> fmt::Result {
    match value {
        CapsValue::Any => Ok(()),
        CapsValue::Fixed(v) => write!(f, ", {name}=({ty}){}", show(v)),
        CapsValue::Range { min, max } => {
            write!(f, ", {name}=({ty})[ {}, {} ]", show(min), show(max))
        }
        CapsValue::List(values) => {
            write!(f, ", {name}=({ty}){{ ")?;
            for (i, v) in values.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", show(v))?;
            }
            f.write_str(" }")
        }
    }
}

impl fmt::Display for AudioStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.family.media_type())?;
        write_field(f, "rate", "int", &self.rate, |v| *v)?;
        write_field(f, "channels", "int", &self.channels, |v| *v)?;
        if !self.layout.is_any() {
            write!(f, ", channel-positions={}", self.layout)?;
        }
        write_field(f, "endianness", "int", &self.endianness, |v| v.code())?;
        write_field(f, "width", "int", &self.width, |v| *v)?;
        write_field(f, "depth", "int", &self.depth, |v| *v)?;
        write_field(f, "signed", "boolean", &self.signed, |v| *v)?;
        for (name, value) in &self.extra {
            write!(f, ", {name}={value}")?;
        }
        Ok(())
    }
}

impl fmt::Display for AudioCaps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("EMPTY");
        }
        for (i, s) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{s}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ChannelPosition;

    fn s16le_stereo() -> AudioFormat {
        AudioFormat::int(44100, 2, 16, 16, true, Endianness::Little)
    }

    #[test]
    fn test_structure_roundtrip_format() {
        let format = s16le_stereo();
        let structure = AudioStructure::from(&format);
        assert!(structure.is_fixed());
        assert_eq!(structure.to_format().unwrap(), format);
        assert!(structure.accepts(&format));
    }

    #[test]
    fn test_to_format_missing_fields() {
        let s = AudioStructure::new(SampleFamily::Int)
            .with_rate(44100)
            .with_channels(2)
            .with_width(16)
            .with_endianness(Endianness::Little)
            .with_signed(true);
        let err = s.to_format().unwrap_err();
        assert!(err.to_string().contains("depth"));

        let s = s.with_depth(24);
        assert!(s.to_format().is_err());
    }

    #[test]
    fn test_to_format_width_8_without_endianness() {
        let s = AudioStructure::new(SampleFamily::Int)
            .with_rate(8000)
            .with_channels(1)
            .with_width(8)
            .with_depth(8)
            .with_signed(false);
        let format = s.to_format().unwrap();
        assert_eq!(format.endianness, Endianness::NATIVE);
        assert_eq!(
            format.layout,
            ChannelLayout::from_positions([ChannelPosition::FrontMono])
        );
    }

    #[test]
    fn test_to_format_layout_rules() {
        let base = AudioStructure::new(SampleFamily::Float)
            .with_rate(48000)
            .with_width(32)
            .with_endianness(Endianness::Little);

        let twelve = base.clone().with_channels(12).to_format().unwrap();
        assert_eq!(twelve.layout, ChannelLayout::Unpositioned);

        // 3 to 8 channels need explicit positions
        assert!(base.clone().with_channels(6).to_format().is_err());

        let wrong = base
            .with_channels(3)
            .with_layout(LayoutCaps::Fixed(ChannelLayout::default_for(2).unwrap()));
        assert!(wrong.to_format().is_err());
    }

    #[test]
    fn test_fixed_channel_positions() {
        let s = AudioStructure::from(&s16le_stereo());
        assert_eq!(s.fixed_channel_positions(), Some(false));

        let s = s.with_layout(LayoutCaps::Any);
        assert_eq!(s.fixed_channel_positions(), None);

        let s = s.with_channels(12);
        assert_eq!(s.fixed_channel_positions(), Some(true));

        let s = s.with_channels(1..=11);
        assert_eq!(s.fixed_channel_positions(), None);

        let s = s
            .with_channels(4)
            .with_layout(LayoutCaps::Fixed(ChannelLayout::Unpositioned));
        assert_eq!(s.fixed_channel_positions(), Some(true));
    }

    #[test]
    fn test_merge_skips_subsets() {
        let wide = AudioStructure::new(SampleFamily::Int)
            .with_width(vec![16, 24, 32])
            .with_rate(44100);
        let narrow = AudioStructure::new(SampleFamily::Int)
            .with_width(16)
            .with_rate(44100);

        let mut caps = AudioCaps::new(wide.clone());
        assert!(!caps.merge(narrow.clone()));
        assert_eq!(caps.len(), 1);

        let mut caps = AudioCaps::new(narrow);
        assert!(caps.merge(wide));
        assert_eq!(caps.len(), 2);
    }

    #[test]
    fn test_intersect_keeps_first_order() {
        let filter: AudioCaps = "audio/x-raw-float; audio/x-raw-int".parse().unwrap();
        let caps = AudioCaps::from_structures([
            AudioStructure::new(SampleFamily::Int).with_width(16),
            AudioStructure::new(SampleFamily::Float).with_width(32),
        ]);

        let result = filter.intersect(&caps);
        assert_eq!(result.len(), 2);
        assert_eq!(result.structures()[0].family, SampleFamily::Float);
        assert_eq!(result.structures()[1].family, SampleFamily::Int);
    }

    #[test]
    fn test_extra_fields_intersect() {
        let a = AudioStructure::new(SampleFamily::Int).with_field("layout", "interleaved");
        let b = AudioStructure::new(SampleFamily::Int).with_field("layout", "planar");
        let c = AudioStructure::new(SampleFamily::Int);

        assert!(a.intersect(&b).is_none());
        assert_eq!(a.intersect(&c).unwrap().extra.len(), 1);
        assert!(a.is_subset_of(&c));
        assert!(!c.is_subset_of(&a));
        assert!(a.stripped().extra.is_empty());
    }

    #[test]
    fn test_pad_template_accepts_formats() {
        let template = pad_template();
        assert_eq!(template.len(), 6);
        assert!(template.accepts(&s16le_stereo()));
        assert!(template.accepts(&AudioFormat::float(96000, 6, 64, Endianness::Big)));
        assert!(template.accepts(&AudioFormat::int(8000, 1, 24, 20, false, Endianness::Big)));
    }

    #[test]
    fn test_display() {
        let s = AudioStructure::new(SampleFamily::Int)
            .with_rate(44100)
            .with_channels(1..=11)
            .with_endianness(vec![Endianness::Little, Endianness::Big])
            .with_width(16)
            .with_depth(16)
            .with_signed(true);
        assert_eq!(
            s.to_string(),
            "audio/x-raw-int, rate=(int)44100, channels=(int)[ 1, 11 ], \
             endianness=(int){ 1234, 4321 }, width=(int)16, depth=(int)16, signed=(boolean)true"
        );
        assert_eq!(AudioCaps::new_empty().to_string(), "EMPTY");
    }
}
