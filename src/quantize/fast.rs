//! Unique-color quantizer with crush backoff.
//!
//! Each attempt scans the whole raster in row-major order, reducing every
//! pixel by the current channel divisors and assigning palette slots in
//! first-seen order. When a new color would overflow the palette the scan
//! stops, both divisors grow by 20% (at least +1, capped at 256), and the
//! scan restarts from pixel zero with an empty palette. A divisor already at
//! 256 stays there while the other keeps growing.

use std::collections::HashMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::dither::{levels_to_divisor, Crush};
use super::{QuantizationConfig, Quantizer};
use crate::color::{Palette, Rgba};
use crate::error::{Error, Result};
use crate::image::{IndexedImage, RasterBuffer};

/// Largest meaningful divisor: the full channel range.
const MAX_DIVISOR: u32 = 256;

/// What a successful [`FastQuantizer`] run settled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantizeStats {
    /// Full scans performed, including the successful one.
    pub attempts: u32,
    /// RGB divisor of the successful scan.
    pub rgb_divisor: u32,
    /// Alpha divisor of the successful scan.
    pub alpha_divisor: u32,
    /// Palette entries produced.
    pub colors: usize,
}

/// Key-to-slot map plus the palette and indices being built.
///
/// Lives across calls to keep its allocations; cleared before every scan.
#[derive(Debug, Default)]
struct ColorTable {
    lookup: HashMap<u32, u8>,
    palette: Vec<Rgba>,
    indices: Vec<u8>,
}

impl ColorTable {
    fn reset(&mut self, pixel_count: usize) {
        self.lookup.clear();
        self.palette.clear();
        self.indices.clear();
        self.indices.reserve(pixel_count);
    }

    /// Append indices for `keys`; false as soon as the palette would overflow.
    fn push_keys(&mut self, keys: &[u32], target: usize) -> bool {
        for &key in keys {
            let idx = match self.lookup.get(&key) {
                Some(&idx) => idx,
                None => {
                    if self.palette.len() >= target {
                        return false;
                    }
                    // target <= 256, so the slot fits in a byte
                    let idx = self.palette.len() as u8;
                    self.palette.push(Rgba::from_key(key));
                    self.lookup.insert(key, idx);
                    idx
                }
            };
            self.indices.push(idx);
        }
        true
    }
}

/// Exact unique-color quantizer with ordered dithering and bounded retries.
#[derive(Debug)]
pub struct FastQuantizer {
    config: QuantizationConfig,
    table: ColorTable,
    keys: Vec<u32>,
}

impl FastQuantizer {
    /// Create a quantizer with the given settings.
    pub fn new(config: QuantizationConfig) -> Self {
        Self {
            config,
            table: ColorTable::default(),
            keys: Vec::new(),
        }
    }

    /// Quantize and report the attempt count and divisors that succeeded.
    pub fn quantize_with_stats(
        &mut self,
        raster: &RasterBuffer,
    ) -> Result<(IndexedImage, QuantizeStats)> {
        self.config.validate()?;
        let target = self.config.target_colors as usize;
        let mut crush = Crush {
            rgb: levels_to_divisor(self.config.crush_rgb),
            alpha: levels_to_divisor(self.config.crush_alpha),
            dither: self.config.dither,
        };

        let mut attempts = 0u32;
        loop {
            attempts += 1;
            if self.scan(raster, &crush, target) {
                break;
            }

            let exhausted = crush.rgb >= MAX_DIVISOR && crush.alpha >= MAX_DIVISOR;
            if exhausted || attempts >= self.config.max_attempts {
                return Err(Error::PaletteUnreachable {
                    target_colors: self.config.target_colors,
                    attempts,
                    rgb_divisor: crush.rgb,
                    alpha_divisor: crush.alpha,
                });
            }

            let (rgb, alpha) = (backoff(crush.rgb), backoff(crush.alpha));
            log::debug!(
                "palette overflow at divisors rgb={} alpha={}, retrying with rgb={} alpha={}",
                crush.rgb,
                crush.alpha,
                rgb,
                alpha
            );
            crush.rgb = rgb;
            crush.alpha = alpha;
        }

        let palette = Palette::new(std::mem::take(&mut self.table.palette))?;
        let indices = std::mem::take(&mut self.table.indices);
        let stats = QuantizeStats {
            attempts,
            rgb_divisor: crush.rgb,
            alpha_divisor: crush.alpha,
            colors: palette.len(),
        };
        log::debug!(
            "quantized {}x{} to {} colors in {} attempt(s), divisors rgb={} alpha={}",
            raster.width(),
            raster.height(),
            stats.colors,
            attempts,
            crush.rgb,
            crush.alpha
        );
        let image = IndexedImage::new(raster.width(), raster.height(), indices, palette)?;
        Ok((image, stats))
    }

    /// One full row-major scan. False if the palette overflowed.
    #[cfg(not(feature = "parallel"))]
    fn scan(&mut self, raster: &RasterBuffer, crush: &Crush, target: usize) -> bool {
        let width = raster.width() as usize;
        self.table.reset(raster.pixel_count());
        self.keys.clear();
        self.keys.resize(width, 0);

        for (y, row) in raster.pixels().chunks_exact(width * 4).enumerate() {
            crush.reduce_row(row, y, &mut self.keys);
            if !self.table.push_keys(&self.keys, target) {
                return false;
            }
        }
        true
    }

    /// Reduce all rows in parallel, then assign slots on this thread in
    /// row-major order so the palette matches the sequential scan.
    #[cfg(feature = "parallel")]
    fn scan(&mut self, raster: &RasterBuffer, crush: &Crush, target: usize) -> bool {
        let width = raster.width() as usize;
        self.table.reset(raster.pixel_count());
        self.keys.clear();
        self.keys.resize(raster.pixel_count(), 0);

        let pixels = raster.pixels();
        self.keys
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, keys)| {
                let row = &pixels[y * width * 4..(y + 1) * width * 4];
                crush.reduce_row(row, y, keys);
            });
        self.table.push_keys(&self.keys, target)
    }
}

impl Quantizer for FastQuantizer {
    fn quantize(&mut self, raster: &RasterBuffer) -> Result<IndexedImage> {
        self.quantize_with_stats(raster).map(|(image, _)| image)
    }
}

/// Grow a divisor by 20%, at least +1, clamped to 256.
fn backoff(divisor: u32) -> u32 {
    let grown = (divisor + divisor / 5).max(divisor + 1);
    grown.min(MAX_DIVISOR)
}
