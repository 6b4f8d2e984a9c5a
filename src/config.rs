//! Conversion quality settings.
//!
//! Two knobs control how precision is dropped when the output has fewer
//! significant bits than the input:
//!
//! | Property | Values | Default |
//! |----------|--------|---------|
//! | `dithering` | `none`, `rpdf`, `tpdf`, `tpdf-hf` | `tpdf` |
//! | `noise-shaping` | `none`, `error-feedback`, `simple`, `medium`, `high` | `none` |
//!
//! The live values are held in [`ConvertSettings`], which packs both modes
//! into one atomic word so a reader always sees a consistent pair.

use crate::error::{Error, Result};
use std::str::FromStr;
use std::sync::atomic::{AtomicU16, Ordering};

/// Property name of the dithering mode.
pub const PROP_DITHERING: &str = "dithering";

/// Property name of the noise shaping mode.
pub const PROP_NOISE_SHAPING: &str = "noise-shaping";

fn invalid_value(name: &str, value: &str) -> Error {
    Error::Property {
        name: name.to_string(),
        reason: format!("invalid value '{value}'"),
    }
}

/// Dither noise added before quantizing to a lower depth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DitherMode {
    /// No dither.
    None = 0,
    /// Rectangular probability density.
    Rpdf = 1,
    /// Triangular probability density.
    #[default]
    Tpdf = 2,
    /// High frequency triangular probability density.
    TpdfHf = 3,
}

impl DitherMode {
    /// Every mode.
    pub const ALL: [Self; 4] = [Self::None, Self::Rpdf, Self::Tpdf, Self::TpdfHf];

    /// Short name used as property value.
    pub const fn nick(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Rpdf => "rpdf",
            Self::Tpdf => "tpdf",
            Self::TpdfHf => "tpdf-hf",
        }
    }

    fn from_bits(bits: u8) -> Self {
        Self::ALL
            .get(bits as usize)
            .copied()
            .unwrap_or_default()
    }
}

impl std::fmt::Display for DitherMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.nick())
    }
}

impl FromStr for DitherMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.nick() == s)
            .ok_or_else(|| invalid_value(PROP_DITHERING, s))
    }
}

/// Feedback filter applied to the quantization error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NoiseShapingMode {
    /// No noise shaping.
    #[default]
    None = 0,
    /// First order error feedback.
    ErrorFeedback = 1,
    /// Second order filter.
    Simple = 2,
    /// Five tap filter.
    Medium = 3,
    /// Nine tap filter.
    High = 4,
}

impl NoiseShapingMode {
    /// Every mode.
    pub const ALL: [Self; 5] = [
        Self::None,
        Self::ErrorFeedback,
        Self::Simple,
        Self::Medium,
        Self::High,
    ];

    /// Short name used as property value.
    pub const fn nick(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ErrorFeedback => "error-feedback",
            Self::Simple => "simple",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Error filter coefficients, most recent error first.
    pub const fn coefficients(&self) -> &'static [f64] {
        match self {
            Self::None => &[],
            Self::ErrorFeedback => &[1.0],
            Self::Simple => &[2.0, -1.0],
            Self::Medium => &[2.033, -2.165, 1.959, -1.590, 0.6149],
            Self::High => &[
                2.412, -3.370, 3.937, -4.174, 3.353, -2.205, 1.281, -0.569, 0.0847,
            ],
        }
    }

    fn from_bits(bits: u8) -> Self {
        Self::ALL
            .get(bits as usize)
            .copied()
            .unwrap_or_default()
    }
}

impl std::fmt::Display for NoiseShapingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.nick())
    }
}

impl FromStr for NoiseShapingMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.nick() == s)
            .ok_or_else(|| invalid_value(PROP_NOISE_SHAPING, s))
    }
}

/// A pair of quality settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ConvertConfig {
    /// Dither mode.
    pub dithering: DitherMode,
    /// Noise shaping mode.
    pub noise_shaping: NoiseShapingMode,
}

impl ConvertConfig {
    /// Create the default configuration (TPDF dither, no noise shaping).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the dither mode.
    pub fn with_dithering(mut self, dithering: DitherMode) -> Self {
        self.dithering = dithering;
        self
    }

    /// Set the noise shaping mode.
    pub fn with_noise_shaping(mut self, noise_shaping: NoiseShapingMode) -> Self {
        self.noise_shaping = noise_shaping;
        self
    }

    /// Build from `name=value` property pairs.
    ///
    /// Unknown names and unparsable values are errors.
    pub fn from_properties<'a>(props: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self> {
        let mut config = Self::default();
        for (name, value) in props {
            match name {
                PROP_DITHERING => config.dithering = value.parse()?,
                PROP_NOISE_SHAPING => config.noise_shaping = value.parse()?,
                other => {
                    return Err(Error::Property {
                        name: other.to_string(),
                        reason: "no such property".to_string(),
                    });
                }
            }
        }
        Ok(config)
    }

    fn pack(&self) -> u16 {
        (self.dithering as u16) | ((self.noise_shaping as u16) << 8)
    }

    fn unpack(packed: u16) -> Self {
        Self {
            dithering: DitherMode::from_bits((packed & 0xff) as u8),
            noise_shaping: NoiseShapingMode::from_bits((packed >> 8) as u8),
        }
    }
}

/// Live quality settings, shared between the property setter and the
/// conversion stage.
///
/// Both modes share one atomic word, so [`snapshot`](Self::snapshot) never
/// observes a torn pair.
#[derive(Debug)]
pub struct ConvertSettings {
    packed: AtomicU16,
}

impl ConvertSettings {
    /// Create settings holding `config`.
    pub fn new(config: ConvertConfig) -> Self {
        Self {
            packed: AtomicU16::new(config.pack()),
        }
    }

    /// Read both modes at once.
    pub fn snapshot(&self) -> ConvertConfig {
        ConvertConfig::unpack(self.packed.load(Ordering::Acquire))
    }

    /// Replace both modes.
    pub fn set(&self, config: ConvertConfig) {
        self.packed.store(config.pack(), Ordering::Release);
    }

    /// Replace the dither mode, keeping the noise shaping mode.
    pub fn set_dithering(&self, dithering: DitherMode) {
        self.update(|config| config.with_dithering(dithering));
    }

    /// Replace the noise shaping mode, keeping the dither mode.
    pub fn set_noise_shaping(&self, noise_shaping: NoiseShapingMode) {
        self.update(|config| config.with_noise_shaping(noise_shaping));
    }

    fn update(&self, f: impl Fn(ConvertConfig) -> ConvertConfig) {
        // The closure never returns None, so this cannot fail
        let _ = self
            .packed
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |packed| {
                Some(f(ConvertConfig::unpack(packed)).pack())
            });
    }

    /// Set a property by name from its string value.
    pub fn set_property(&self, name: &str, value: &str) -> Result<()> {
        match name {
            PROP_DITHERING => self.set_dithering(value.parse()?),
            PROP_NOISE_SHAPING => self.set_noise_shaping(value.parse()?),
            other => {
                return Err(Error::Property {
                    name: other.to_string(),
                    reason: "no such property".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Read a property by name as its string value.
    pub fn property(&self, name: &str) -> Result<String> {
        let config = self.snapshot();
        match name {
            PROP_DITHERING => Ok(config.dithering.to_string()),
            PROP_NOISE_SHAPING => Ok(config.noise_shaping.to_string()),
            other => Err(Error::Property {
                name: other.to_string(),
                reason: "no such property".to_string(),
            }),
        }
    }
}

impl Default for ConvertSettings {
    fn default() -> Self {
        Self::new(ConvertConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_defaults() {
        let config = ConvertConfig::default();
        assert_eq!(config.dithering, DitherMode::Tpdf);
        assert_eq!(config.noise_shaping, NoiseShapingMode::None);
    }

    #[test]
    fn test_mode_nicks() {
        for mode in DitherMode::ALL {
            assert_eq!(mode.to_string().parse::<DitherMode>().unwrap(), mode);
        }
        for mode in NoiseShapingMode::ALL {
            assert_eq!(mode.to_string().parse::<NoiseShapingMode>().unwrap(), mode);
        }
        assert_eq!("tpdf-hf".parse::<DitherMode>().unwrap(), DitherMode::TpdfHf);
        assert!("triangular".parse::<DitherMode>().is_err());
    }

    #[test]
    fn test_from_properties() {
        let config =
            ConvertConfig::from_properties([("dithering", "none"), ("noise-shaping", "high")])
                .unwrap();
        assert_eq!(config.dithering, DitherMode::None);
        assert_eq!(config.noise_shaping, NoiseShapingMode::High);

        let err = ConvertConfig::from_properties([("volume", "1.0")]).unwrap_err();
        assert!(matches!(err, Error::Property { name, .. } if name == "volume"));
    }

    #[test]
    fn test_settings_update_one_field() {
        let settings = ConvertSettings::new(
            ConvertConfig::new().with_noise_shaping(NoiseShapingMode::Medium),
        );
        settings.set_dithering(DitherMode::Rpdf);

        let snapshot = settings.snapshot();
        assert_eq!(snapshot.dithering, DitherMode::Rpdf);
        assert_eq!(snapshot.noise_shaping, NoiseShapingMode::Medium);
    }

    #[test]
    fn test_settings_properties() {
        let settings = ConvertSettings::default();
        settings.set_property("noise-shaping", "simple").unwrap();
        assert_eq!(settings.property("noise-shaping").unwrap(), "simple");
        assert_eq!(settings.property("dithering").unwrap(), "tpdf");

        assert!(settings.set_property("dithering", "loud").is_err());
        assert!(settings.property("gain").is_err());
        assert_eq!(settings.snapshot().dithering, DitherMode::Tpdf);
    }

    #[test]
    fn test_settings_concurrent_updates() {
        let settings = Arc::new(ConvertSettings::default());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let settings = Arc::clone(&settings);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        if i % 2 == 0 {
                            settings.set_dithering(DitherMode::ALL[i % 4]);
                        } else {
                            settings.set_noise_shaping(NoiseShapingMode::ALL[i % 5]);
                        }
                        let _ = settings.snapshot();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = settings.snapshot();
        assert!(matches!(snapshot.dithering, DitherMode::None | DitherMode::Tpdf));
        assert!(matches!(
            snapshot.noise_shaping,
            NoiseShapingMode::ErrorFeedback | NoiseShapingMode::Medium
        ));
    }
}
