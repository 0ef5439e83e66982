//! # palettize
//!
//! Color quantization and indexed-image codecs.
//!
//! This library turns a true-color RGBA8 raster into a bounded palette plus
//! one index byte per pixel, and serializes that representation as an
//! indexed-color PNG or a single-frame GIF.
//!
//! ## Features
//!
//! - **Fast quantization** by unique-color collection with per-channel crush,
//!   ordered dithering and bounded retry/backoff
//! - **Median-cut quantization** for photographic input, usable as a fallback
//! - **Indexed PNG encoding** with hand-packed chunks (`IHDR`, `PLTE`, `tRNS`,
//!   `IDAT`, `IEND`)
//! - **GIF preparation** (transparency collapse, power-of-two palettes)
//! - Optional parallel scanline reduction via the `parallel` feature
//!
//! ## Example
//!
//! ```rust
//! use palettize::quantize::{FastQuantizer, QuantizationConfig, Quantizer};
//! use palettize::{png, RasterBuffer};
//!
//! // 2x1 image: opaque red, opaque blue
//! let raster = RasterBuffer::new(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255]).unwrap();
//!
//! let mut quantizer = FastQuantizer::new(QuantizationConfig::default());
//! let indexed = quantizer.quantize(&raster).unwrap();
//! assert_eq!(indexed.palette().len(), 2);
//!
//! let png_data = png::encode_indexed(&indexed, false, &png::PngOptions::default()).unwrap();
//! assert_eq!(png_data[25], 3); // indexed color type
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod color;
pub mod compress;
pub mod error;
pub mod gif;
pub mod image;
pub mod png;
pub mod quantize;

pub use crate::color::{Palette, Rgba};
pub use crate::error::{Error, Result};
pub use crate::image::{ImageData, IndexedImage, Limits, RasterBuffer};

/// A serializer from an [`ImageData`] to a complete file.
///
/// Encoders only lay out bytes; they never reduce colors. Handing them a
/// [`ImageData::TrueColor`] raster yields [`Error::EncodeNotReady`].
pub trait Encoder {
    /// Encode the image into a new byte buffer.
    fn encode(&self, image: &ImageData) -> Result<Vec<u8>>;
}
