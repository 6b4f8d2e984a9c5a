//! Caps fixation: pick the one output format closest to the input.

use crate::caps::{AudioCaps, AudioStructure};
use crate::channel::{ChannelLayout, LayoutCaps};
use crate::error::{Error, Result};
use crate::format::{AudioFormat, CapsValue, SampleFamily};

/// Fixate `candidates` to a concrete format as close to `input` as possible.
///
/// Only the first structure of `candidates` is considered. Rate, width and
/// depth move to the accepted value nearest the input's; byte order and
/// signedness keep the input's value when allowed. Channel positions follow
/// a positioned input layout when the channel count is unchanged, and fall
/// back to the default layout for the channel count otherwise.
pub fn fixate(input: &AudioFormat, candidates: &AudioCaps) -> Result<AudioFormat> {
    fixate_structure(input, candidates)?.to_format()
}

/// Fixate `candidates` without resolving the result to a concrete format.
///
/// Fields absent from the candidate stay absent, so the returned structure
/// may still be incomplete.
pub fn fixate_structure(input: &AudioFormat, candidates: &AudioCaps) -> Result<AudioStructure> {
    let mut out = candidates
        .first()
        .cloned()
        .ok_or_else(|| Error::format("no caps to fixate"))?;

    tracing::debug!(input = %input, candidates = %candidates, "fixating caps");

    fixate_channels(input, &mut out);

    if let Some(rate) = out.rate.fixate_nearest(input.rate) {
        out.rate = CapsValue::Fixed(rate);
    }
    if let Some(endianness) = out.endianness.fixate_prefer(&input.endianness) {
        out.endianness = CapsValue::Fixed(endianness);
    }
    if let Some(width) = out.width.fixate_nearest(input.width) {
        out.width = CapsValue::Fixed(width);
    }

    if out.family == SampleFamily::Int {
        fixate_depth(input, &mut out)?;
    }
    if let Some(signed) = input.signed() {
        if let Some(signed) = out.signed.fixate_prefer(&signed) {
            out.signed = CapsValue::Fixed(signed);
        }
    }

    fixate_remaining(&mut out.rate);
    fixate_remaining(&mut out.width);
    fixate_remaining(&mut out.depth);
    fixate_remaining(&mut out.signed);
    fixate_remaining(&mut out.endianness);

    tracing::debug!(fixated = %out, "fixated caps");
    Ok(out)
}

fn fixate_depth(input: &AudioFormat, out: &mut AudioStructure) -> Result<()> {
    let Some(&width) = out.width.as_fixed() else {
        return Ok(());
    };

    if out.depth.is_any() {
        out.depth = CapsValue::Fixed(width);
        return Ok(());
    }

    let depth = out
        .depth
        .intersect(&CapsValue::Range { min: 1, max: width })
        .ok_or_else(|| Error::format(format!("no depth fits width {width}")))?;

    // Float input keeps as many bits as its width allows
    let target = input.depth().unwrap_or(input.width);
    out.depth = match depth.fixate_nearest(target) {
        Some(depth) => CapsValue::Fixed(depth),
        None => depth,
    };
    Ok(())
}

fn fixate_channels(input: &AudioFormat, out: &mut AudioStructure) {
    let Some(channels) = out.channels.fixate_nearest(input.channels) else {
        // Channel count undetermined: positions would be meaningless
        out.layout = LayoutCaps::Any;
        return;
    };
    out.channels = CapsValue::Fixed(channels);

    if channels == input.channels {
        // Unpositioned input leaves a free layout to the default table
        let layout = match &out.layout {
            LayoutCaps::Any if input.layout.is_positioned() => Some(&input.layout),
            LayoutCaps::Any => None,
            LayoutCaps::Fixed(layout) if layout.fits(channels) => return,
            other if other.accepts(&input.layout) => Some(&input.layout),
            other => other.first_fitting(channels),
        };
        if let Some(layout) = layout {
            out.layout = LayoutCaps::Fixed(layout.clone());
            return;
        }
        if !out.layout.is_any() {
            tracing::warn!(layout = %out.layout, "unexpected output channel layout");
        }
    } else {
        if let Some(layout) = out.layout.first_fitting(channels) {
            out.layout = LayoutCaps::Fixed(layout.clone());
            return;
        }
        if !out.layout.is_any() {
            tracing::warn!(layout = %out.layout, "invalid or unexpected channel-positions");
        }
    }

    out.layout = match ChannelLayout::default_for(channels) {
        Some(layout) => {
            tracing::debug!(channels, "using default channel layout as fallback");
            LayoutCaps::Fixed(layout)
        }
        None => LayoutCaps::Any,
    };
}

fn fixate_remaining<T: Clone + Ord>(value: &mut CapsValue<T>) {
    if value.is_fixed() {
        return;
    }
    if let Some(v) = value.fixate() {
        *value = CapsValue::Fixed(v);
    }
}
