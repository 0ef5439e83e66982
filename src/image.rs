//! Raster and indexed image containers.

use crate::color::{Palette, Rgba};
use crate::error::{Error, Result};

/// Default ceiling on `width * height` (64 Mi pixels).
pub const DEFAULT_MAX_AREA: u64 = 1 << 26;

/// Size limits applied when a raster is accepted from the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum pixel count.
    pub max_area: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_area: DEFAULT_MAX_AREA,
        }
    }
}

impl Limits {
    /// Check dimensions against these limits.
    pub fn check(&self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        if width as u64 * height as u64 > self.max_area {
            return Err(Error::ImageTooLarge {
                width,
                height,
                max_area: self.max_area,
            });
        }
        Ok(())
    }
}

/// Uncompressed RGBA8 pixels, row-major, no row padding.
///
/// Read-only once constructed; quantizers derive new buffers from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterBuffer {
    /// Wrap RGBA8 pixel data using [`Limits::default`].
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        Self::with_limits(width, height, pixels, &Limits::default())
    }

    /// Wrap RGBA8 pixel data, checking dimensions against `limits`.
    pub fn with_limits(width: u32, height: u32, pixels: Vec<u8>, limits: &Limits) -> Result<Self> {
        limits.check(width, height)?;
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(Error::InvalidDataLength {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// One palette index per pixel plus the palette it indexes.
///
/// Every index is guaranteed to be `< palette.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedImage {
    width: u32,
    height: u32,
    indices: Vec<u8>,
    palette: Palette,
}

impl IndexedImage {
    /// Assemble an indexed image, validating every index against the palette.
    pub fn new(width: u32, height: u32, indices: Vec<u8>, palette: Palette) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        let expected = width as usize * height as usize;
        if indices.len() != expected {
            return Err(Error::InvalidDataLength {
                expected,
                actual: indices.len(),
            });
        }
        check_indices(&indices, palette.len())?;
        Ok(Self {
            width,
            height,
            indices,
            palette,
        })
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Index bytes, row-major.
    #[inline]
    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    /// The palette indexed by [`IndexedImage::indices`].
    #[inline]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Expand back to RGBA8 by palette lookup.
    pub fn to_raster(&self) -> Result<RasterBuffer> {
        let entries = self.palette.entries();
        let mut pixels = Vec::with_capacity(self.indices.len() * 4);
        for &idx in &self.indices {
            let c: Rgba = entries[idx as usize];
            pixels.extend_from_slice(&c.to_array());
        }
        RasterBuffer::with_limits(
            self.width,
            self.height,
            pixels,
            &Limits { max_area: u64::MAX },
        )
    }
}

/// Reject any index that does not resolve to a palette entry.
pub(crate) fn check_indices(indices: &[u8], palette_len: usize) -> Result<()> {
    match indices.iter().position(|&i| i as usize >= palette_len) {
        Some(position) => Err(Error::CorruptIndex {
            position,
            index: indices[position],
            palette_len,
        }),
        None => Ok(()),
    }
}

/// An image in whichever representation the caller currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageData {
    /// True-color pixels, not yet quantized.
    TrueColor(RasterBuffer),
    /// Palette-indexed pixels.
    Indexed(IndexedImage),
}

impl ImageData {
    /// The indexed form, or [`Error::EncodeNotReady`] if this is still a raster.
    pub fn require_indexed(&self) -> Result<&IndexedImage> {
        match self {
            ImageData::Indexed(i) => Ok(i),
            ImageData::TrueColor(_) => Err(Error::EncodeNotReady(
                "image is true-color; run a quantizer first",
            )),
        }
    }
}

impl From<RasterBuffer> for ImageData {
    fn from(raster: RasterBuffer) -> Self {
        ImageData::TrueColor(raster)
    }
}

impl From<IndexedImage> for ImageData {
    fn from(image: IndexedImage) -> Self {
        ImageData::Indexed(image)
    }
}
