//! Channel mixing matrix.

use crate::channel::{ChannelLayout, ChannelPosition};
use std::f64::consts::FRAC_1_SQRT_2;

const LEFT_SIDE: [ChannelPosition; 4] = [
    ChannelPosition::FrontLeft,
    ChannelPosition::SideLeft,
    ChannelPosition::RearLeft,
    ChannelPosition::FrontLeftOfCenter,
];

const RIGHT_SIDE: [ChannelPosition; 4] = [
    ChannelPosition::FrontRight,
    ChannelPosition::SideRight,
    ChannelPosition::RearRight,
    ChannelPosition::FrontRightOfCenter,
];

const CENTER: [ChannelPosition; 3] = [
    ChannelPosition::FrontMono,
    ChannelPosition::FrontCenter,
    ChannelPosition::RearCenter,
];

/// Linear map from input channels to output channels.
///
/// Channels present on both sides pass straight through. Channels missing from
/// the output fold into the nearest outputs on the same side, or into the
/// center when there is no such side. Each output row is scaled down so its
/// gains sum to at most one.
#[derive(Debug, Clone)]
pub(crate) struct ChannelMix {
    in_channels: usize,
    out_channels: usize,
    /// Row major, `out_channels` rows of `in_channels` gains.
    matrix: Vec<f64>,
    identity: bool,
}

impl ChannelMix {
    pub fn new(
        input: &ChannelLayout,
        in_channels: u32,
        output: &ChannelLayout,
        out_channels: u32,
    ) -> Self {
        let in_channels = in_channels as usize;
        let out_channels = out_channels as usize;
        let mut matrix = vec![0.0; in_channels * out_channels];

        match (input.positions(), output.positions()) {
            (Some(inp), Some(outp)) if inp != outp => {
                let mono_source = in_channels == 1;
                for (i, pos) in inp.iter().enumerate() {
                    for (o, gain) in targets(*pos, outp, mono_source) {
                        matrix[o * in_channels + i] += gain;
                    }
                }
                for row in matrix.chunks_exact_mut(in_channels.max(1)) {
                    let sum: f64 = row.iter().map(|g| g.abs()).sum();
                    if sum > 1.0 {
                        row.iter_mut().for_each(|g| *g /= sum);
                    }
                }
            }
            // Same positions, or no spatial meaning: copy by index
            _ => {
                for c in 0..in_channels.min(out_channels) {
                    matrix[c * in_channels + c] = 1.0;
                }
            }
        }

        let identity = in_channels == out_channels
            && (0..out_channels).all(|o| {
                (0..in_channels).all(|i| matrix[o * in_channels + i] == if o == i { 1.0 } else { 0.0 })
            });

        Self {
            in_channels,
            out_channels,
            matrix,
            identity,
        }
    }

    /// Whether the mix copies every channel unchanged.
    pub fn is_identity(&self) -> bool {
        self.identity
    }

    /// Gain from input channel `input` to output channel `output`.
    pub fn gain(&self, output: usize, input: usize) -> f64 {
        self.matrix[output * self.in_channels + input]
    }

    /// Mix one frame.
    #[inline]
    pub fn apply(&self, frame_in: &[f64], frame_out: &mut [f64]) {
        if self.identity {
            frame_out.copy_from_slice(frame_in);
            return;
        }
        for (o, out) in frame_out.iter_mut().enumerate().take(self.out_channels) {
            let row = &self.matrix[o * self.in_channels..(o + 1) * self.in_channels];
            *out = row.iter().zip(frame_in).map(|(g, s)| g * s).sum();
        }
    }
}

fn find(outputs: &[ChannelPosition], candidates: &[ChannelPosition]) -> Option<usize> {
    candidates
        .iter()
        .find_map(|c| outputs.iter().position(|p| p == c))
}

/// Output channels and gains receiving input position `pos`.
fn targets(pos: ChannelPosition, outputs: &[ChannelPosition], mono_source: bool) -> Vec<(usize, f64)> {
    if let Some(o) = outputs.iter().position(|p| *p == pos) {
        return vec![(o, 1.0)];
    }

    if pos.is_center() {
        if let Some(o) = find(outputs, &CENTER) {
            return vec![(o, 1.0)];
        }
        let gain = if mono_source { 1.0 } else { FRAC_1_SQRT_2 };
        return [find(outputs, &LEFT_SIDE), find(outputs, &RIGHT_SIDE)]
            .into_iter()
            .flatten()
            .map(|o| (o, gain))
            .collect();
    }

    let side: &[ChannelPosition] = if pos.is_left() {
        &LEFT_SIDE
    } else if pos.is_right() {
        &RIGHT_SIDE
    } else {
        // LFE without an LFE output is dropped
        return Vec::new();
    };

    if let Some(o) = find(outputs, side) {
        vec![(o, FRAC_1_SQRT_2)]
    } else if let Some(o) = find(outputs, &CENTER) {
        vec![(o, 1.0)]
    } else {
        Vec::new()
    }
}
