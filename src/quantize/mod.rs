//! Color quantization: RGBA8 raster to palette + index buffer.
//!
//! [`FastQuantizer`] collects exact unique colors after an optional
//! per-channel crush and retries with stronger crush when the palette
//! overflows. [`MedianCutQuantizer`] is a statistical alternative for
//! photographic content, and [`FallbackQuantizer`] chains the two.

pub mod dither;
pub mod fast;
pub mod median_cut;

pub use fast::{FastQuantizer, QuantizeStats};
pub use median_cut::{DistanceMetric, MedianCutQuantizer};

use crate::color::MAX_PALETTE_LEN;
use crate::error::{Error, Result};
use crate::image::{IndexedImage, RasterBuffer};

/// Default cap on full scans in [`FastQuantizer`].
///
/// Backoff from a divisor of 1 reaches 256 in 28 steps, so the default never
/// cuts the divisor range short.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 32;

/// Anything that turns a raster into an indexed image.
///
/// Implementations may keep scratch state between calls, hence `&mut self`;
/// output never depends on a previous call.
pub trait Quantizer {
    /// Quantize `raster`. Either a complete image or an error; never partial.
    fn quantize(&mut self, raster: &RasterBuffer) -> Result<IndexedImage>;
}

/// Settings for [`FastQuantizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantizationConfig {
    /// Levels kept per RGB channel (0 = keep all 256).
    pub crush_rgb: u16,
    /// Levels kept for alpha below 255 (0 = keep all 256).
    pub crush_alpha: u16,
    /// Ordered (Bayer 4x4) dithering instead of rounding down.
    pub dither: bool,
    /// Palette size ceiling (1-256).
    pub target_colors: u16,
    /// Maximum number of full scans before giving up (at least 1).
    pub max_attempts: u32,
}

impl Default for QuantizationConfig {
    fn default() -> Self {
        Self {
            crush_rgb: 0,
            crush_alpha: 0,
            dither: false,
            target_colors: MAX_PALETTE_LEN as u16,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl QuantizationConfig {
    /// No crushing: succeeds on the first scan iff the image already has few
    /// enough colors, otherwise backs off.
    pub fn lossless() -> Self {
        Self::default()
    }

    /// Start from `levels` levels per channel (RGB and alpha), with dithering.
    pub fn crushed(levels: u16) -> Self {
        Self {
            crush_rgb: levels,
            crush_alpha: levels,
            dither: true,
            ..Self::default()
        }
    }

    /// Set the palette ceiling.
    pub fn with_target_colors(mut self, target_colors: u16) -> Self {
        self.target_colors = target_colors;
        self
    }

    /// Check ranges.
    pub fn validate(&self) -> Result<()> {
        if self.target_colors == 0 || self.target_colors as usize > MAX_PALETTE_LEN {
            return Err(Error::InvalidTargetColors(self.target_colors));
        }
        if self.max_attempts == 0 {
            return Err(Error::InvalidMaxAttempts(0));
        }
        Ok(())
    }
}

/// Runs `primary`, and `secondary` only if `primary` cannot reach its
/// palette ceiling.
#[derive(Debug, Clone)]
pub struct FallbackQuantizer<P, S> {
    primary: P,
    secondary: S,
}

impl<P: Quantizer, S: Quantizer> FallbackQuantizer<P, S> {
    /// Compose two quantizers.
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

impl<P: Quantizer, S: Quantizer> Quantizer for FallbackQuantizer<P, S> {
    fn quantize(&mut self, raster: &RasterBuffer) -> Result<IndexedImage> {
        match self.primary.quantize(raster) {
            Err(err @ Error::PaletteUnreachable { .. }) => {
                log::warn!("{err}; falling back to secondary quantizer");
                self.secondary.quantize(raster)
            }
            other => other,
        }
    }
}
