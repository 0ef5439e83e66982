//! Synthetic test image generation.
//!
//! Deterministic RGBA8 patterns for quantizer and encoder tests.

use palettize::RasterBuffer;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Wrap RGBA bytes, panicking on bad dimensions.
pub fn raster(width: u32, height: u32, pixels: Vec<u8>) -> RasterBuffer {
    RasterBuffer::new(width, height, pixels).expect("valid raster")
}

/// A solid RGBA image.
pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RasterBuffer {
    let pixels = rgba
        .iter()
        .copied()
        .cycle()
        .take((width * height * 4) as usize)
        .collect();
    raster(width, height, pixels)
}

/// An opaque diagonal RGB gradient; far more than 256 colors at 64x64.
pub fn gradient(width: u32, height: u32) -> RasterBuffer {
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let r = ((x * 255) / width.max(1)) as u8;
            let g = ((y * 255) / height.max(1)) as u8;
            let b = (((x + y) * 127) / (width + height).max(1)) as u8;
            pixels.extend_from_slice(&[r, g, b, 255]);
        }
    }
    raster(width, height, pixels)
}

/// Tiles colors from `palette` across the image in a seeded random order.
pub fn from_palette(width: u32, height: u32, palette: &[[u8; 4]], seed: u64) -> RasterBuffer {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for _ in 0..width * height {
        let c = palette[rng.gen_range(0..palette.len())];
        pixels.extend_from_slice(&c);
    }
    raster(width, height, pixels)
}

/// `count` distinct colors from a seeded RNG, some with partial or zero alpha.
pub fn random_palette(count: usize, seed: u64) -> Vec<[u8; 4]> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out: Vec<[u8; 4]> = Vec::with_capacity(count);
    while out.len() < count {
        let alpha = match rng.gen_range(0..4) {
            0 => 0,
            1 => rng.gen(),
            _ => 255,
        };
        let c = [rng.gen(), rng.gen(), rng.gen(), alpha];
        if !out.contains(&c) {
            out.push(c);
        }
    }
    out
}

/// A checkerboard of opaque red and fully transparent cells.
pub fn transparent_checkerboard(width: u32, height: u32, cell: u32) -> RasterBuffer {
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            if ((x / cell) + (y / cell)) % 2 == 0 {
                pixels.extend_from_slice(&[200, 30, 30, 255]);
            } else {
                pixels.extend_from_slice(&[0, 0, 0, 0]);
            }
        }
    }
    raster(width, height, pixels)
}
