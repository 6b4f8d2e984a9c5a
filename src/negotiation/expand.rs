//! Caps expansion: everything the stage can produce from given caps.

use crate::caps::{AudioCaps, AudioStructure};
use crate::channel::LayoutCaps;
use crate::format::{CapsValue, Endianness, MAX_DEPTH, SampleFamily};

/// Highest channel count offered when channels may be mixed.
const MAX_MIXED_CHANNELS: u32 = 11;

/// Lowest width and depth offered by depth reduction.
const MIN_REDUCED_DEPTH: u32 = 16;

/// Expand `caps` into every caps the stage can convert them to.
///
/// Each structure of `caps` is expanded on its own and merged into the
/// result, lossless alternatives first. Structures already covered by the
/// result are skipped. With a `filter`, the result is intersected with it
/// and follows the filter's order.
pub fn expand(caps: &AudioCaps, filter: Option<&AudioCaps>) -> AudioCaps {
    let mut result = AudioCaps::new_empty();

    for (j, structure) in caps.iter().enumerate() {
        // Already covered: it would expand to the same alternatives
        if j > 0 && result.is_redundant(structure) {
            continue;
        }
        expand_structure(structure, &mut result);
    }

    tracing::debug!(caps = %caps, expanded = %result, "caps transformed");

    match filter {
        Some(filter) => {
            let intersection = filter.intersect(&result);
            tracing::debug!(filter = %filter, result = %intersection, "intersected with filter");
            intersection
        }
        None => result,
    }
}

fn expand_structure(structure: &AudioStructure, result: &mut AudioCaps) {
    let is_float = structure.family == SampleFamily::Float;

    let mut s = structure.stripped();
    if !is_float && s.depth.is_any() {
        if let Some(&width) = s.width.as_fixed() {
            s.depth = CapsValue::Fixed(width);
        }
    }

    // Tier 1: lossless changes, same family and swapped
    let mut s = lossless(s);
    result.merge(s.clone());
    merge_other_family(result, &s);

    // Tier 2: widening is safe
    if !is_float {
        if let Some(&width) = structure.width.as_fixed() {
            s.width = widths(width, MAX_DEPTH);
        }
        if let Some(&depth) = s.depth.as_fixed() {
            s.depth = depth_range(depth);
        }
    }

    let channels = structure.channels.as_fixed().copied();
    let allow_mixing = match structure.fixed_channel_positions() {
        Some(unpositioned) => unpositioned,
        None => true,
    };

    if allow_mixing {
        s.channels = match channels {
            None => CapsValue::Range {
                min: 1,
                max: MAX_MIXED_CHANNELS,
            },
            Some(c) if c >= MAX_MIXED_CHANNELS => CapsValue::Fixed(c),
            Some(c) => CapsValue::Range {
                min: c,
                max: MAX_MIXED_CHANNELS,
            },
        };
        s.layout = LayoutCaps::Any;
    } else {
        keep_positions(&mut s, structure);
    }
    result.merge(s.clone());
    merge_other_family(result, &s);

    // Tier 3: reduce depth, but not below 16 bits
    let wide = structure
        .width
        .as_fixed()
        .is_none_or(|&width| width > MIN_REDUCED_DEPTH);
    if wide {
        let mut s2 = s.clone();
        if is_float {
            s2.width = float_widths();
            merge_other_family(result, &s2);
        } else {
            s2.width = widths(MIN_REDUCED_DEPTH, MAX_DEPTH);
            s2.depth = CapsValue::Range {
                min: MIN_REDUCED_DEPTH,
                max: MAX_DEPTH,
            };
            result.merge(s2);
        }
    }

    // Tier 4: fewer channels, only without positions to preserve
    if allow_mixing {
        s.channels = CapsValue::Range {
            min: 1,
            max: MAX_MIXED_CHANNELS,
        };
        s.layout = LayoutCaps::Any;
    } else {
        keep_positions(&mut s, structure);
    }
    result.merge(s.clone());
    merge_other_family(result, &s);

    // Tier 5: any integer format
    s.width = widths(8, MAX_DEPTH);
    s.depth = CapsValue::Range {
        min: 1,
        max: MAX_DEPTH,
    };
    if is_float {
        merge_other_family(result, &s);
    } else {
        result.merge(s);
    }
}

/// Open up the fields that convert without loss.
fn lossless(mut s: AudioStructure) -> AudioStructure {
    s.endianness = CapsValue::List(vec![Endianness::Little, Endianness::Big]);
    match s.family {
        SampleFamily::Float => {
            s.depth = CapsValue::Any;
            s.signed = CapsValue::Any;
            s.width = float_widths();
        }
        SampleFamily::Int => {
            s.signed = CapsValue::List(vec![true, false]);
        }
    }
    s
}

/// Merge the same structure reinterpreted in the other sample family.
fn merge_other_family(result: &mut AudioCaps, s: &AudioStructure) {
    let mut other = s.clone();
    other.family = s.family.swapped();
    let mut other = lossless(other);

    if other.family == SampleFamily::Int {
        // No 64-bit integers
        if let CapsValue::List(values) = &other.width {
            let narrow: Vec<u32> = values.iter().copied().filter(|&w| w != 64).collect();
            match CapsValue::from_values(narrow) {
                Some(width) => other.width = width,
                None => return,
            }
        }
    }

    result.merge(other);
}

/// Fixed channel count and the positions of the original structure.
fn keep_positions(s: &mut AudioStructure, original: &AudioStructure) {
    s.channels = original.channels.clone();
    s.layout = original.layout.clone();
}

/// Multiples of 8 between `min` and `max`.
fn widths(min: u32, max: u32) -> CapsValue<u32> {
    if min == max {
        CapsValue::Fixed(min)
    } else {
        CapsValue::List((min..=max).step_by(8).collect())
    }
}

fn float_widths() -> CapsValue<u32> {
    CapsValue::List(vec![32, 64])
}

fn depth_range(depth: u32) -> CapsValue<u32> {
    if depth >= MAX_DEPTH {
        CapsValue::Fixed(MAX_DEPTH)
    } else {
        CapsValue::Range {
            min: depth,
            max: MAX_DEPTH,
        }
    }
}
