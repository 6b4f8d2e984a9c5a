//! Requantization with dither and noise shaping.

use crate::config::{ConvertConfig, DitherMode};

mod prng {
    #[inline]
    fn split_mix_64(x: &mut u64) -> u64 {
        *x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = *x;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// xoshiro128++ generator.
    pub struct Xoshiro128pp {
        s: [u32; 4],
    }

    impl Xoshiro128pp {
        pub fn new(mut seed: u64) -> Self {
            let a = split_mix_64(&mut seed);
            let b = split_mix_64(&mut seed);

            Self {
                s: [a as u32, (a >> 32) as u32, b as u32, (b >> 32) as u32],
            }
        }

        #[inline]
        pub fn next(&mut self) -> u32 {
            let result = self.s[0]
                .wrapping_add(self.s[3])
                .rotate_left(7)
                .wrapping_add(self.s[0]);

            let t = self.s[1] << 9;

            self.s[2] ^= self.s[0];
            self.s[3] ^= self.s[1];
            self.s[1] ^= self.s[2];
            self.s[0] ^= self.s[3];

            self.s[2] ^= t;
            self.s[3] = self.s[3].rotate_left(11);

            result
        }

        /// Uniform value in `[-0.5, 0.5)`.
        #[inline]
        pub fn uniform(&mut self) -> f64 {
            f64::from(self.next()) / 4_294_967_296.0 - 0.5
        }
    }
}

const SEED: u64 = 0xb2c1_01f4_425b_987e;

/// Rounds scaled samples to integers, adding dither noise and feeding back
/// the quantization error when precision is being dropped.
pub(crate) struct Quantizer {
    dither: DitherMode,
    coefficients: &'static [f64],
    prng: prng::Xoshiro128pp,
    /// Previous rectangular draw per channel (high-pass triangular dither).
    last_random: Vec<f64>,
    /// Error history per channel, most recent first.
    errors: Vec<f64>,
    min: f64,
    max: f64,
}

impl Quantizer {
    /// Quantizer for `channels` channels of `depth`-bit integers.
    ///
    /// With `lossy` false the configuration is ignored and values are only
    /// rounded.
    pub fn new(config: ConvertConfig, channels: usize, depth: u32, lossy: bool) -> Self {
        let (dither, coefficients) = if lossy {
            (config.dithering, config.noise_shaping.coefficients())
        } else {
            (DitherMode::None, &[][..])
        };
        let scale = (1u64 << (depth - 1)) as f64;

        Self {
            dither,
            coefficients,
            prng: prng::Xoshiro128pp::new(SEED),
            last_random: vec![0.0; channels],
            errors: vec![0.0; channels * coefficients.len()],
            min: -scale,
            max: scale - 1.0,
        }
    }

    /// Whether dither or noise shaping is applied.
    pub fn is_shaping(&self) -> bool {
        self.dither != DitherMode::None || !self.coefficients.is_empty()
    }

    /// Quantize one value, already scaled to output steps.
    #[inline]
    pub fn quantize(&mut self, value: f64, channel: usize) -> i64 {
        if !self.is_shaping() {
            return value.round().clamp(self.min, self.max) as i64;
        }

        let taps = self.coefficients.len();
        let history = &mut self.errors[channel * taps..(channel + 1) * taps];
        let feedback: f64 = self
            .coefficients
            .iter()
            .zip(history.iter())
            .map(|(c, e)| c * e)
            .sum();
        let shaped = value - feedback;

        let noise = match self.dither {
            DitherMode::None => 0.0,
            DitherMode::Rpdf => self.prng.uniform(),
            DitherMode::Tpdf => self.prng.uniform() + self.prng.uniform(),
            DitherMode::TpdfHf => {
                let r = self.prng.uniform();
                let noise = r - self.last_random[channel];
                self.last_random[channel] = r;
                noise
            }
        };

        let quantized = (shaped + noise).round().clamp(self.min, self.max);
        if taps > 0 {
            history.rotate_right(1);
            history[0] = quantized - shaped;
        }
        quantized as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NoiseShapingMode;

    #[test]
    fn test_lossless_only_rounds() {
        let mut q = Quantizer::new(ConvertConfig::default(), 1, 16, false);
        assert!(!q.is_shaping());
        assert_eq!(q.quantize(100.4, 0), 100);
        assert_eq!(q.quantize(-100.6, 0), -101);
        assert_eq!(q.quantize(40000.0, 0), 32767);
        assert_eq!(q.quantize(-40000.0, 0), -32768);
    }

    #[test]
    fn test_tpdf_noise_bounded() {
        let mut q = Quantizer::new(ConvertConfig::default(), 2, 16, true);
        assert!(q.is_shaping());
        for i in 0..10_000 {
            let v = q.quantize(1000.25, i % 2);
            assert!((999..=1002).contains(&v), "got {v}");
        }
    }

    #[test]
    fn test_dither_averages_to_input() {
        let config = ConvertConfig::new().with_dithering(DitherMode::Rpdf);
        let mut q = Quantizer::new(config, 1, 8, true);
        let n = 20_000;
        let sum: i64 = (0..n).map(|_| q.quantize(10.25, 0)).sum();
        let mean = sum as f64 / n as f64;
        assert!((mean - 10.25).abs() < 0.05, "mean {mean}");
    }

    #[test]
    fn test_error_feedback_tracks_input() {
        let config = ConvertConfig::new()
            .with_dithering(DitherMode::None)
            .with_noise_shaping(NoiseShapingMode::ErrorFeedback);
        let mut q = Quantizer::new(config, 1, 16, true);

        // A constant 0.5 step offset alternates so the running error stays small
        let out: Vec<i64> = (0..8).map(|_| q.quantize(0.5, 0)).collect();
        let sum: i64 = out.iter().sum();
        assert!((sum - 4).abs() <= 1, "{out:?}");
    }

    #[test]
    fn test_prng_is_deterministic() {
        let mut a = prng::Xoshiro128pp::new(SEED);
        let mut b = prng::Xoshiro128pp::new(SEED);
        for _ in 0..16 {
            let x = a.uniform();
            assert_eq!(x, b.uniform());
            assert!((-0.5..0.5).contains(&x));
        }
    }
}
