//! Per-channel level reduction ("crush") with optional ordered dithering.

use crate::color::Rgba;

/// 4x4 Bayer index matrix, row = `y % 4`, column = `x % 4`.
const BAYER_4X4: [[u8; 4]; 4] = [[0, 8, 2, 10], [12, 4, 14, 6], [3, 11, 1, 9], [15, 7, 13, 5]];

/// Threshold in `(0, 1]` for the pixel at `(x, y)`: `(bayer + 1) / 16`.
///
/// Kept as a numerator over 16 so comparisons stay in integers.
#[inline]
pub fn threshold_sixteenths(x: usize, y: usize) -> u32 {
    BAYER_4X4[y & 3][x & 3] as u32 + 1
}

/// Convert a level count to a divisor: `floor(256 / levels)`, 0 levels = 1.
///
/// A divisor of 0 or 1 means no reduction; both normalize to 1.
#[inline]
pub fn levels_to_divisor(levels: u16) -> u32 {
    if levels == 0 {
        1
    } else {
        (256 / levels as u32).max(1)
    }
}

/// Round `v` down to a multiple of `divisor`, keeping 255 at full brightness.
#[inline]
pub fn round_down(v: u8, divisor: u32) -> u8 {
    if divisor <= 1 || v == 255 {
        return v;
    }
    let v = v as u32;
    (v - v % divisor) as u8
}

/// Ordered-dither `v`: round up when `residual / divisor >= threshold`.
#[inline]
pub fn round_dithered(v: u8, divisor: u32, threshold_16: u32) -> u8 {
    if divisor <= 1 {
        return v;
    }
    let v = v as u32;
    let residual = v % divisor;
    let floor = v - residual;
    // residual / divisor >= t / 16  <=>  residual * 16 >= t * divisor
    if residual * 16 >= threshold_16 * divisor {
        (floor + divisor).min(255) as u8
    } else {
        floor as u8
    }
}

/// Channel divisors and dither switch for one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crush {
    /// Divisor applied to R, G and B.
    pub rgb: u32,
    /// Divisor applied to alpha below 255.
    pub alpha: u32,
    /// Ordered dithering instead of plain rounding.
    pub dither: bool,
}

impl Crush {
    /// Reduce one RGBA pixel at `(x, y)` and pack it as a palette key.
    #[inline]
    pub fn reduce_pixel(&self, px: &[u8], x: usize, y: usize) -> u32 {
        let (r, g, b, a) = if self.dither {
            let t = threshold_sixteenths(x, y);
            let a = if px[3] < 255 {
                round_dithered(px[3], self.alpha, t)
            } else {
                255
            };
            (
                round_dithered(px[0], self.rgb, t),
                round_dithered(px[1], self.rgb, t),
                round_dithered(px[2], self.rgb, t),
                a,
            )
        } else {
            let a = if px[3] < 255 {
                round_down(px[3], self.alpha)
            } else {
                255
            };
            (
                round_down(px[0], self.rgb),
                round_down(px[1], self.rgb),
                round_down(px[2], self.rgb),
                a,
            )
        };
        Rgba::new(r, g, b, a).key()
    }

    /// Reduce one scanline of RGBA pixels into `keys`.
    pub fn reduce_row(&self, row: &[u8], y: usize, keys: &mut [u32]) {
        for (x, (px, key)) in row.chunks_exact(4).zip(keys.iter_mut()).enumerate() {
            *key = self.reduce_pixel(px, x, y);
        }
    }
}
