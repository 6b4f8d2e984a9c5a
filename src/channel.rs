//! Channel positions and layouts.
//!
//! A [`ChannelLayout`] assigns a speaker role to every channel of a stream, or
//! marks the stream as unpositioned (channels have no spatial meaning).
//! [`LayoutCaps`] is the matching constraint used inside caps structures.

use crate::error::{Error, Result};
use smallvec::SmallVec;
use std::str::FromStr;

/// Speaker role of a single channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChannelPosition {
    /// Single mono channel.
    FrontMono,
    /// Front left.
    FrontLeft,
    /// Front right.
    FrontRight,
    /// Rear center.
    RearCenter,
    /// Rear left.
    RearLeft,
    /// Rear right.
    RearRight,
    /// Low frequency effects.
    Lfe,
    /// Front center.
    FrontCenter,
    /// Front left of center.
    FrontLeftOfCenter,
    /// Front right of center.
    FrontRightOfCenter,
    /// Side left.
    SideLeft,
    /// Side right.
    SideRight,
    /// No position; only valid as the marker of an unpositioned layout.
    None,
}

impl ChannelPosition {
    /// Every position, in nick table order.
    pub const ALL: [Self; 13] = [
        Self::FrontMono,
        Self::FrontLeft,
        Self::FrontRight,
        Self::RearCenter,
        Self::RearLeft,
        Self::RearRight,
        Self::Lfe,
        Self::FrontCenter,
        Self::FrontLeftOfCenter,
        Self::FrontRightOfCenter,
        Self::SideLeft,
        Self::SideRight,
        Self::None,
    ];

    /// Short name used in caps strings.
    pub const fn nick(&self) -> &'static str {
        match self {
            Self::FrontMono => "front-mono",
            Self::FrontLeft => "front-left",
            Self::FrontRight => "front-right",
            Self::RearCenter => "rear-center",
            Self::RearLeft => "rear-left",
            Self::RearRight => "rear-right",
            Self::Lfe => "lfe",
            Self::FrontCenter => "front-center",
            Self::FrontLeftOfCenter => "front-left-of-center",
            Self::FrontRightOfCenter => "front-right-of-center",
            Self::SideLeft => "side-left",
            Self::SideRight => "side-right",
            Self::None => "none",
        }
    }

    /// Whether this position sits on the left of the listener.
    pub const fn is_left(&self) -> bool {
        matches!(
            self,
            Self::FrontLeft | Self::RearLeft | Self::SideLeft | Self::FrontLeftOfCenter
        )
    }

    /// Whether this position sits on the right of the listener.
    pub const fn is_right(&self) -> bool {
        matches!(
            self,
            Self::FrontRight | Self::RearRight | Self::SideRight | Self::FrontRightOfCenter
        )
    }

    /// Whether this position is centered (mono, front or rear center).
    pub const fn is_center(&self) -> bool {
        matches!(self, Self::FrontMono | Self::FrontCenter | Self::RearCenter)
    }
}

impl std::fmt::Display for ChannelPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.nick())
    }
}

impl FromStr for ChannelPosition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        // Accept both the short nick and the long enum-style name
        let short = s
            .strip_prefix("GST_AUDIO_CHANNEL_POSITION_")
            .map(|long| long.to_ascii_lowercase().replace('_', "-"));
        let name = short.as_deref().unwrap_or(s);

        Self::ALL
            .iter()
            .find(|p| p.nick() == name)
            .copied()
            .ok_or_else(|| Error::format(format!("unknown channel position '{s}'")))
    }
}

/// Ordered speaker roles for every channel, or the unpositioned marker.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChannelLayout {
    /// One position per channel.
    Positioned(SmallVec<[ChannelPosition; 8]>),
    /// Channels carry no spatial meaning.
    Unpositioned,
}

impl ChannelLayout {
    /// Build a layout from positions.
    ///
    /// A leading [`ChannelPosition::None`] marks the whole layout unpositioned.
    pub fn from_positions(positions: impl IntoIterator<Item = ChannelPosition>) -> Self {
        let positions: SmallVec<[ChannelPosition; 8]> = positions.into_iter().collect();
        if positions.first() == Some(&ChannelPosition::None) {
            Self::Unpositioned
        } else {
            Self::Positioned(positions)
        }
    }

    /// Default layout for a channel count.
    ///
    /// Known for 1 to 8 channels; `None` otherwise.
    pub fn default_for(channels: u32) -> Option<Self> {
        use ChannelPosition::*;

        let positions: &[ChannelPosition] = match channels {
            1 => &[FrontMono],
            2 => &[FrontLeft, FrontRight],
            3 => &[FrontLeft, FrontRight, Lfe],
            4 => &[FrontLeft, FrontRight, RearLeft, RearRight],
            5 => &[FrontLeft, FrontRight, RearLeft, RearRight, FrontCenter],
            6 => &[FrontLeft, FrontRight, RearLeft, RearRight, FrontCenter, Lfe],
            7 => &[FrontLeft, FrontRight, RearLeft, RearRight, FrontCenter, Lfe, RearCenter],
            8 => &[FrontLeft, FrontRight, RearLeft, RearRight, FrontCenter, Lfe, SideLeft, SideRight],
            _ => return Option::None,
        };
        Some(Self::Positioned(positions.iter().copied().collect()))
    }

    /// Whether channels carry speaker roles.
    #[inline]
    pub fn is_positioned(&self) -> bool {
        matches!(self, Self::Positioned(_))
    }

    /// Positions, `None` for an unpositioned layout.
    pub fn positions(&self) -> Option<&[ChannelPosition]> {
        match self {
            Self::Positioned(positions) => Some(positions),
            Self::Unpositioned => None,
        }
    }

    /// Whether the layout can describe `channels` channels.
    pub fn fits(&self, channels: u32) -> bool {
        match self {
            Self::Positioned(positions) => positions.len() == channels as usize,
            Self::Unpositioned => true,
        }
    }

    /// Check the layout against a channel count.
    pub fn validate(&self, channels: u32) -> Result<()> {
        let Self::Positioned(positions) = self else {
            return Ok(());
        };

        if positions.len() != channels as usize {
            return Err(Error::format(format!(
                "{} channel positions for {} channels",
                positions.len(),
                channels
            )));
        }
        for (i, pos) in positions.iter().enumerate() {
            if *pos == ChannelPosition::None {
                return Err(Error::format("'none' mixed with real channel positions"));
            }
            if positions[..i].contains(pos) {
                return Err(Error::format(format!("channel position {pos} used twice")));
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for ChannelLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Positioned(positions) => {
                f.write_str("<")?;
                for (i, pos) in positions.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{pos}")?;
                }
                f.write_str(">")
            }
            Self::Unpositioned => f.write_str("<none>"),
        }
    }
}

/// A layout candidate as written in caps: one layout or nested alternatives.
#[derive(Clone, Debug, PartialEq)]
pub enum LayoutCandidate {
    /// A single layout.
    Layout(ChannelLayout),
    /// A list of alternatives, possibly nested.
    Alternatives(Vec<LayoutCandidate>),
}

/// Constraint on the channel layout of a caps structure.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum LayoutCaps {
    /// No constraint (field absent).
    #[default]
    Any,
    /// Exactly this layout.
    Fixed(ChannelLayout),
    /// One of these layouts, in preference order.
    List(Vec<ChannelLayout>),
}

impl LayoutCaps {
    /// Flatten nested alternatives depth first, keeping order.
    ///
    /// Duplicates keep their first occurrence. An empty result is `Any`.
    pub fn from_candidates(candidates: impl IntoIterator<Item = LayoutCandidate>) -> Self {
        fn flatten(candidate: LayoutCandidate, out: &mut Vec<ChannelLayout>) {
            match candidate {
                LayoutCandidate::Layout(layout) => {
                    if !out.contains(&layout) {
                        out.push(layout);
                    }
                }
                LayoutCandidate::Alternatives(nested) => {
                    for c in nested {
                        flatten(c, out);
                    }
                }
            }
        }

        let mut layouts = Vec::new();
        for candidate in candidates {
            flatten(candidate, &mut layouts);
        }
        Self::from_layouts(layouts)
    }

    fn from_layouts(mut layouts: Vec<ChannelLayout>) -> Self {
        match layouts.len() {
            0 => Self::Any,
            1 => layouts.pop().map(Self::Fixed).unwrap_or(Self::Any),
            _ => Self::List(layouts),
        }
    }

    /// Check if a layout is accepted.
    pub fn accepts(&self, layout: &ChannelLayout) -> bool {
        match self {
            Self::Any => true,
            Self::Fixed(l) => l == layout,
            Self::List(layouts) => layouts.contains(layout),
        }
    }

    /// Intersect two constraints; order follows `self`.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        match (self, other) {
            (Self::Any, other) => Some(other.clone()),
            (self_, Self::Any) => Some(self_.clone()),
            (Self::Fixed(l), other) | (other, Self::Fixed(l)) => {
                other.accepts(l).then(|| Self::Fixed(l.clone()))
            }
            (Self::List(a), Self::List(b)) => {
                let common: Vec<_> = a.iter().filter(|l| b.contains(l)).cloned().collect();
                (!common.is_empty()).then(|| Self::from_layouts(common))
            }
        }
    }

    /// Check whether every layout accepted by `self` is accepted by `other`.
    pub fn is_subset_of(&self, other: &Self) -> bool {
        match (self, other) {
            (_, Self::Any) => true,
            (Self::Any, _) => false,
            (Self::Fixed(l), other) => other.accepts(l),
            (Self::List(layouts), other) => layouts.iter().all(|l| other.accepts(l)),
        }
    }

    /// First alternative that can describe `channels` channels.
    pub fn first_fitting(&self, channels: u32) -> Option<&ChannelLayout> {
        match self {
            Self::Any => None,
            Self::Fixed(l) => l.fits(channels).then_some(l),
            Self::List(layouts) => layouts.iter().find(|l| l.fits(channels)),
        }
    }

    /// The layout if this is fixed.
    pub fn as_fixed(&self) -> Option<&ChannelLayout> {
        match self {
            Self::Fixed(l) => Some(l),
            _ => None,
        }
    }

    /// Check if this is a fixed layout.
    #[inline]
    pub fn is_fixed(&self) -> bool {
        matches!(self, Self::Fixed(_))
    }

    /// Check if this accepts any layout.
    #[inline]
    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }
}

impl std::fmt::Display for LayoutCaps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Any => f.write_str("ANY"),
            Self::Fixed(l) => write!(f, "{l}"),
            Self::List(layouts) => {
                f.write_str("{ ")?;
                for (i, l) in layouts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{l}")?;
                }
                f.write_str(" }")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ChannelPosition::*;

    fn layout(positions: &[ChannelPosition]) -> ChannelLayout {
        ChannelLayout::from_positions(positions.iter().copied())
    }

    #[test]
    fn test_default_layouts() {
        assert_eq!(ChannelLayout::default_for(1), Some(layout(&[FrontMono])));
        assert_eq!(
            ChannelLayout::default_for(6),
            Some(layout(&[FrontLeft, FrontRight, RearLeft, RearRight, FrontCenter, Lfe]))
        );
        for n in 1..=8 {
            let l = ChannelLayout::default_for(n).unwrap();
            assert!(l.validate(n).is_ok());
        }
        assert_eq!(ChannelLayout::default_for(0), Option::None);
        assert_eq!(ChannelLayout::default_for(9), Option::None);
    }

    #[test]
    fn test_leading_none_is_unpositioned() {
        assert_eq!(layout(&[None, None]), ChannelLayout::Unpositioned);
        assert!(ChannelLayout::Unpositioned.fits(12));
    }

    #[test]
    fn test_layout_validate() {
        assert!(layout(&[FrontLeft, FrontRight]).validate(2).is_ok());
        assert!(layout(&[FrontLeft, FrontRight]).validate(3).is_err());
        assert!(layout(&[FrontLeft, FrontLeft]).validate(2).is_err());
        assert!(layout(&[FrontLeft, None]).validate(2).is_err());
    }

    #[test]
    fn test_position_parse() {
        assert_eq!("front-left".parse::<ChannelPosition>().unwrap(), FrontLeft);
        assert_eq!(
            "GST_AUDIO_CHANNEL_POSITION_FRONT_RIGHT_OF_CENTER"
                .parse::<ChannelPosition>()
                .unwrap(),
            FrontRightOfCenter
        );
        assert!("middle".parse::<ChannelPosition>().is_err());
    }

    #[test]
    fn test_candidates_flatten() {
        let stereo = layout(&[FrontLeft, FrontRight]);
        let quad = layout(&[FrontLeft, FrontRight, RearLeft, RearRight]);
        let mono = layout(&[FrontMono]);

        let caps = LayoutCaps::from_candidates([
            LayoutCandidate::Alternatives(vec![
                LayoutCandidate::Layout(quad.clone()),
                LayoutCandidate::Layout(stereo.clone()),
            ]),
            LayoutCandidate::Layout(mono.clone()),
            LayoutCandidate::Layout(stereo.clone()),
        ]);

        assert_eq!(caps, LayoutCaps::List(vec![quad.clone(), stereo.clone(), mono]));
        assert_eq!(caps.first_fitting(2), Some(&stereo));
        assert_eq!(caps.first_fitting(4), Some(&quad));
        assert_eq!(caps.first_fitting(6), Option::None);

        let single = LayoutCaps::from_candidates([LayoutCandidate::Layout(stereo.clone())]);
        assert_eq!(single, LayoutCaps::Fixed(stereo));
    }

    #[test]
    fn test_layout_caps_intersect() {
        let stereo = layout(&[FrontLeft, FrontRight]);
        let mono = layout(&[FrontMono]);
        let list = LayoutCaps::List(vec![mono.clone(), stereo.clone()]);

        assert_eq!(
            LayoutCaps::Fixed(stereo.clone()).intersect(&list),
            Some(LayoutCaps::Fixed(stereo.clone()))
        );
        assert_eq!(LayoutCaps::Any.intersect(&list), Some(list.clone()));
        assert_eq!(
            LayoutCaps::Fixed(ChannelLayout::Unpositioned).intersect(&list),
            Option::None
        );
        assert!(LayoutCaps::Fixed(mono).is_subset_of(&list));
        assert!(!list.is_subset_of(&LayoutCaps::Fixed(stereo)));
    }

    #[test]
    fn test_layout_display() {
        assert_eq!(layout(&[FrontLeft, FrontRight]).to_string(), "<front-left, front-right>");
        assert_eq!(ChannelLayout::Unpositioned.to_string(), "<none>");
    }
}
