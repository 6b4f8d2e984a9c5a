//! Core element traits: Element, BaseTransform.

use super::pad::{PadDirection, PadTemplate};
use crate::buffer::Buffer;
use crate::caps::AudioCaps;
use crate::error::Result;

// ============================================================================
// Element Trait
// ============================================================================

/// A pipeline element that turns one buffer into at most one buffer.
///
/// # Return Values
///
/// - `Ok(Some(buffer))`: Emit a buffer downstream
/// - `Ok(None)`: Drop this buffer (filter it out)
/// - `Err(...)`: Signal an error
pub trait Element: Send {
    /// Process an input buffer and optionally produce an output buffer.
    ///
    /// Return `Ok(None)` to filter out (drop) the buffer.
    fn process(&mut self, buffer: Buffer) -> Result<Option<Buffer>>;

    /// Get the name of this element (for debugging/logging).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Get the input caps (what formats this element accepts).
    fn input_caps(&self) -> AudioCaps;

    /// Get the output caps (what formats this element produces).
    fn output_caps(&self) -> AudioCaps;
}

// ============================================================================
// BaseTransform Trait
// ============================================================================

/// The hooks a hosting pipeline calls on a one-in, one-out transform.
///
/// Negotiation calls [`transform_caps`](Self::transform_caps) and
/// [`fixate_caps`](Self::fixate_caps) any number of times, in both
/// directions. Once both sides are fixed the host calls
/// [`set_caps`](Self::set_caps), then [`transform`](Self::transform) for every
/// buffer, or [`transform_ip`](Self::transform_ip) when running in
/// passthrough.
///
/// # Example
///
/// ```rust,ignore
/// let mut element = AudioConvertElement::new();
///
/// let downstream = element.transform_caps(PadDirection::Input, &incaps, Some(&peer));
/// let outcaps = element.fixate_caps(PadDirection::Input, &incaps, &downstream)?;
/// element.set_caps(&incaps, &outcaps)?;
///
/// element.transform(&mut inbuf, &mut outbuf)?;
/// ```
pub trait BaseTransform: Send {
    /// Get the name of this transform (for debugging/logging).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Caps this transform can produce on the pad opposite `direction`,
    /// given `caps` on the `direction` pad.
    ///
    /// With a `filter`, the result is intersected with it, filter first.
    fn transform_caps(
        &self,
        direction: PadDirection,
        caps: &AudioCaps,
        filter: Option<&AudioCaps>,
    ) -> AudioCaps;

    /// Reduce `othercaps` to a single fixed structure, given the fixed `caps`
    /// on the `direction` pad.
    fn fixate_caps(
        &self,
        direction: PadDirection,
        caps: &AudioCaps,
        othercaps: &AudioCaps,
    ) -> Result<AudioCaps>;

    /// Configure the transform for fixed input and output caps.
    fn set_caps(&mut self, incaps: &AudioCaps, outcaps: &AudioCaps) -> Result<()>;

    /// Size in bytes of one unit (sample frame) of fixed `caps`.
    fn unit_size(&self, caps: &AudioCaps) -> Result<usize>;

    /// Transform `input` into `output`.
    fn transform(&mut self, input: &mut Buffer, output: &mut Buffer) -> Result<()>;

    /// Transform a buffer in place.
    fn transform_ip(&mut self, _buffer: &mut Buffer) -> Result<()> {
        Ok(())
    }

    /// Whether identical input and output caps skip [`transform`](Self::transform).
    fn passthrough_on_same_caps(&self) -> bool {
        false
    }

    /// Templates of the input and output pads.
    fn pad_templates(&self) -> [PadTemplate; 2];
}
