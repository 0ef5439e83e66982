//! Median-cut palette quantizer.
//!
//! Statistical alternative to [`super::FastQuantizer`]: builds a color
//! histogram, repeatedly splits the box with the widest channel at its
//! population median, averages each box into one palette entry, and maps
//! every pixel to its nearest entry. No dithering.

use std::collections::HashMap;

use super::Quantizer;
use crate::color::{Palette, Rgba, MAX_PALETTE_LEN};
use crate::error::{Error, Result};
use crate::image::{IndexedImage, RasterBuffer};

/// How color distance is measured when remapping pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMetric {
    /// Squared Euclidean distance over R, G, B and A.
    #[default]
    Rgba,
    /// Squared distance with perceptual weights (green heaviest).
    WeightedRgb,
}

impl DistanceMetric {
    #[inline]
    fn distance(self, a: [u8; 4], b: [u8; 4]) -> u32 {
        let d = |i: usize| {
            let v = a[i] as i32 - b[i] as i32;
            (v * v) as u32
        };
        match self {
            DistanceMetric::Rgba => d(0) + d(1) + d(2) + d(3),
            DistanceMetric::WeightedRgb => 2 * d(0) + 4 * d(1) + 3 * d(2) + 3 * d(3),
        }
    }
}

#[derive(Clone, Copy)]
struct ColorCount {
    rgba: [u8; 4],
    count: u32,
}

struct ColorBox {
    colors: Vec<ColorCount>,
    min: [u8; 4],
    max: [u8; 4],
}

impl ColorBox {
    fn from_colors(colors: Vec<ColorCount>) -> Self {
        let mut min = [255u8; 4];
        let mut max = [0u8; 4];
        for c in &colors {
            for ch in 0..4 {
                min[ch] = min[ch].min(c.rgba[ch]);
                max[ch] = max[ch].max(c.rgba[ch]);
            }
        }
        Self { colors, min, max }
    }

    /// Widest channel and its extent.
    fn widest(&self) -> (usize, u8) {
        (0..4)
            .map(|ch| (ch, self.max[ch] - self.min[ch]))
            .fold((0, 0), |best, cur| if cur.1 > best.1 { cur } else { best })
    }

    fn can_split(&self) -> bool {
        self.colors.len() > 1
    }

    fn split(self) -> (ColorBox, ColorBox) {
        let (channel, _) = self.widest();
        let mut colors = self.colors;
        colors.sort_by_key(|c| (c.rgba[channel], Rgba::from(c.rgba).key()));

        let total: u64 = colors.iter().map(|c| c.count as u64).sum();
        let mut acc = 0u64;
        let mut split_at = 0;
        for (i, c) in colors.iter().enumerate() {
            acc += c.count as u64;
            if acc * 2 >= total {
                split_at = i;
                break;
            }
        }
        // Both halves must be non-empty.
        let split_at = split_at.min(colors.len() - 2);
        let right = colors.split_off(split_at + 1);
        (ColorBox::from_colors(colors), ColorBox::from_colors(right))
    }

    fn average(&self) -> Rgba {
        let mut sums = [0u64; 4];
        let mut total = 0u64;
        for c in &self.colors {
            let n = c.count as u64;
            for ch in 0..4 {
                sums[ch] += c.rgba[ch] as u64 * n;
            }
            total += n;
        }
        if total == 0 {
            return Rgba::new(0, 0, 0, 255);
        }
        Rgba::new(
            (sums[0] / total) as u8,
            (sums[1] / total) as u8,
            (sums[2] / total) as u8,
            (sums[3] / total) as u8,
        )
    }
}

/// Median-cut quantizer producing at most `target_colors` entries.
#[derive(Debug, Clone)]
pub struct MedianCutQuantizer {
    target_colors: u16,
    metric: DistanceMetric,
}

impl MedianCutQuantizer {
    /// Create a quantizer with a palette ceiling and remap metric.
    pub fn new(target_colors: u16, metric: DistanceMetric) -> Self {
        Self {
            target_colors,
            metric,
        }
    }

    fn build_palette(&self, colors: Vec<ColorCount>, max_colors: usize) -> Vec<Rgba> {
        let mut boxes = vec![ColorBox::from_colors(colors)];
        while boxes.len() < max_colors {
            let candidate = boxes
                .iter()
                .enumerate()
                .filter(|(_, b)| b.can_split())
                .max_by_key(|(i, b)| (b.widest().1, std::cmp::Reverse(*i)))
                .map(|(i, _)| i);
            let Some(idx) = candidate else {
                break;
            };
            let (left, right) = boxes.remove(idx).split();
            boxes.push(left);
            boxes.push(right);
        }
        boxes.iter().map(ColorBox::average).collect()
    }

    fn nearest(&self, color: [u8; 4], palette: &[Rgba]) -> u8 {
        let mut best_idx = 0u8;
        let mut best_dist = u32::MAX;
        for (i, p) in palette.iter().enumerate() {
            let dist = self.metric.distance(color, p.to_array());
            if dist < best_dist {
                best_dist = dist;
                best_idx = i as u8;
            }
        }
        best_idx
    }
}

impl Quantizer for MedianCutQuantizer {
    fn quantize(&mut self, raster: &RasterBuffer) -> Result<IndexedImage> {
        if self.target_colors == 0 || self.target_colors as usize > MAX_PALETTE_LEN {
            return Err(Error::InvalidTargetColors(self.target_colors));
        }
        let max_colors = self.target_colors as usize;

        // Histogram, remembering first-seen order for the exact path.
        let mut hist: HashMap<u32, u32> = HashMap::new();
        let mut order: Vec<u32> = Vec::new();
        for px in raster.pixels().chunks_exact(4) {
            let key = Rgba::new(px[0], px[1], px[2], px[3]).key();
            let count = hist.entry(key).or_insert_with(|| {
                order.push(key);
                0
            });
            *count += 1;
        }

        let palette: Vec<Rgba> = if order.len() <= max_colors {
            order.iter().map(|&k| Rgba::from_key(k)).collect()
        } else {
            order.sort_unstable();
            let colors = order
                .iter()
                .map(|&k| ColorCount {
                    rgba: Rgba::from_key(k).to_array(),
                    count: hist[&k],
                })
                .collect();
            self.build_palette(colors, max_colors)
        };

        let mut memo: HashMap<u32, u8> = HashMap::with_capacity(hist.len());
        let indices: Vec<u8> = raster
            .pixels()
            .chunks_exact(4)
            .map(|px| {
                let rgba = [px[0], px[1], px[2], px[3]];
                *memo
                    .entry(Rgba::from(rgba).key())
                    .or_insert_with(|| self.nearest(rgba, &palette))
            })
            .collect();

        IndexedImage::new(
            raster.width(),
            raster.height(),
            indices,
            Palette::new(palette)?,
        )
    }
}
