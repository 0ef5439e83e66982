//! GIF output for indexed images.
//!
//! GIF differs from indexed PNG in two ways that matter here:
//! - a frame has at most one transparent index, and alpha is all-or-nothing
//! - the color table length must be a power of two
//!
//! [`prepare_frame`] normalizes an [`IndexedImage`] for those rules; the LZW
//! bitstream itself is left to a [`GifFrameWriter`].

use crate::color::Palette;
use crate::error::{Error, Result};
use crate::image::{ImageData, IndexedImage};
use crate::Encoder;

/// Smallest color table GIF allows.
const MIN_TABLE_LEN: usize = 2;

/// Everything a single-frame writer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GifFrame {
    /// Width in pixels.
    pub width: u16,
    /// Height in pixels.
    pub height: u16,
    /// `(r<<16)|(g<<8)|b` per entry, padded to a power of two.
    pub palette: Vec<u32>,
    /// One index per pixel, row-major.
    pub indices: Vec<u8>,
    /// The single transparent index, if any.
    pub transparent: Option<u8>,
}

/// Writes one prepared frame as a complete GIF file.
pub trait GifFrameWriter {
    /// Serialize `frame` (header, color table, LZW image data, trailer).
    fn write_single_frame(&self, frame: &GifFrame) -> Result<Vec<u8>>;
}

/// [`GifFrameWriter`] backed by the `gif` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct LzwGifWriter;

impl GifFrameWriter for LzwGifWriter {
    fn write_single_frame(&self, frame: &GifFrame) -> Result<Vec<u8>> {
        let rgb: Vec<u8> = frame
            .palette
            .iter()
            .flat_map(|&c| [(c >> 16) as u8, (c >> 8) as u8, c as u8])
            .collect();

        let mut output = Vec::new();
        {
            let mut encoder = ::gif::Encoder::new(&mut output, frame.width, frame.height, &rgb)
                .map_err(|e| Error::GifWrite(format!("encoder creation failed: {e}")))?;

            let mut gif_frame = ::gif::Frame::from_palette_pixels(
                frame.width,
                frame.height,
                frame.indices.clone(),
                rgb.clone(),
                frame.transparent,
            );
            // Global color table only.
            gif_frame.palette = None;
            gif_frame.delay = 0;

            encoder
                .write_frame(&gif_frame)
                .map_err(|e| Error::GifWrite(format!("frame write failed: {e}")))?;
        }
        Ok(output)
    }
}

/// Collapse every fully transparent index onto the first one seen.
///
/// Scans `indices` in order; the first index whose entry has `a == 0`
/// becomes canonical and every later fully transparent index is rewritten
/// to it. Returns the canonical index, or `None` if no pixel is transparent.
pub fn collapse_transparency(indices: &mut [u8], palette: &Palette) -> Option<u8> {
    let entries = palette.entries();
    let mut canonical = None;
    let mut rewritten = 0usize;
    for idx in indices.iter_mut() {
        if entries[*idx as usize].a != 0 {
            continue;
        }
        match canonical {
            None => canonical = Some(*idx),
            Some(c) if c != *idx => {
                *idx = c;
                rewritten += 1;
            }
            Some(_) => {}
        }
    }
    if rewritten > 0 {
        log::trace!("collapsed {rewritten} transparent pixels onto index {canonical:?}");
    }
    canonical
}

/// 24-bit RGB table in palette order, black-padded to a power of two >= 2.
pub fn padded_palette(palette: &Palette) -> Vec<u32> {
    let len = palette.len().max(MIN_TABLE_LEN).next_power_of_two();
    let mut table: Vec<u32> = palette.iter().map(|c| c.rgb_u32()).collect();
    table.resize(len, 0x000000);
    table
}

/// Build the writer input for `image`.
///
/// With `has_alpha` unset no transparent index is designated and the
/// indices pass through untouched.
pub fn prepare_frame(image: &IndexedImage, has_alpha: bool) -> Result<GifFrame> {
    let (width, height) = match (
        u16::try_from(image.width()),
        u16::try_from(image.height()),
    ) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            return Err(Error::ImageTooLarge {
                width: image.width(),
                height: image.height(),
                max_area: u16::MAX as u64 * u16::MAX as u64,
            })
        }
    };

    let mut indices = image.indices().to_vec();
    let transparent = if has_alpha {
        collapse_transparency(&mut indices, image.palette())
    } else {
        None
    };

    Ok(GifFrame {
        width,
        height,
        palette: padded_palette(image.palette()),
        indices,
        transparent,
    })
}

/// Prepares indexed images and hands them to a [`GifFrameWriter`].
///
/// Never quantizes: a true-color input is refused with
/// [`Error::EncodeNotReady`].
#[derive(Debug, Clone, Default)]
pub struct GifEncoderAdapter<W = LzwGifWriter> {
    writer: W,
}

impl GifEncoderAdapter<LzwGifWriter> {
    /// Adapter using the bundled LZW writer.
    pub fn new() -> Self {
        Self {
            writer: LzwGifWriter,
        }
    }
}

impl<W: GifFrameWriter> GifEncoderAdapter<W> {
    /// Adapter using a caller-supplied writer.
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Prepare and write `image` as a single-frame GIF.
    pub fn encode_indexed(&self, image: &IndexedImage, has_alpha: bool) -> Result<Vec<u8>> {
        let frame = prepare_frame(image, has_alpha)?;
        self.writer.write_single_frame(&frame)
    }
}

impl<W: GifFrameWriter> Encoder for GifEncoderAdapter<W> {
    fn encode(&self, image: &ImageData) -> Result<Vec<u8>> {
        let indexed = image.require_indexed()?;
        self.encode_indexed(indexed, indexed.palette().has_transparency())
    }
}
