//! Indexed-color PNG encoder.
//!
//! Writes color type 3, bit depth 8, non-interlaced PNG files (RFC 2083):
//! signature, `IHDR`, `PLTE`, optional `tRNS`, `IDAT`, `IEND`, in that order.
//! Every scanline uses filter type 0 (None) and the pixel stream is
//! compressed with the RLE strategy.

pub mod chunk;

use chunk::Chunk;

use crate::color::Palette;
use crate::compress::{Compressor, Strategy, ZlibCompressor};
use crate::error::{Error, Result};
use crate::image::{check_indices, ImageData, IndexedImage};
use crate::Encoder;

/// PNG file signature (magic bytes).
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Largest width or height PNG can record.
const MAX_DIMENSION: u32 = i32::MAX as u32;

/// Compressed data above this size is split across several `IDAT` chunks.
const IDAT_CHUNK_SIZE: usize = 256 * 1024;

/// Scanline filter type 0: bytes stored as-is.
const FILTER_NONE: u8 = 0;

/// PNG encoding options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngOptions {
    /// zlib compression level (0-9, default 6).
    pub compression_level: u8,
}

impl Default for PngOptions {
    fn default() -> Self {
        Self {
            compression_level: 6,
        }
    }
}

impl PngOptions {
    /// Speed-focused preset.
    pub fn fast() -> Self {
        Self {
            compression_level: 1,
        }
    }

    /// Balanced preset (matches the default).
    pub fn balanced() -> Self {
        Self::default()
    }

    /// Highest compression preset; slowest.
    pub fn max_compression() -> Self {
        Self {
            compression_level: 9,
        }
    }
}

/// Serializes indexed images as PNG through a pluggable [`Compressor`].
#[derive(Debug, Clone, Default)]
pub struct PngIndexedEncoder<C = ZlibCompressor> {
    options: PngOptions,
    compressor: C,
}

impl PngIndexedEncoder<ZlibCompressor> {
    /// Encoder using the bundled zlib compressor.
    pub fn new(options: PngOptions) -> Self {
        Self {
            options,
            compressor: ZlibCompressor,
        }
    }
}

impl<C: Compressor> PngIndexedEncoder<C> {
    /// Encoder using a caller-supplied compressor.
    pub fn with_compressor(options: PngOptions, compressor: C) -> Self {
        Self {
            options,
            compressor,
        }
    }

    /// Encode an indexed image. `has_alpha` controls whether `tRNS` is written.
    pub fn encode_indexed(&self, image: &IndexedImage, has_alpha: bool) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.encode_indexed_into(
            &mut output,
            image.indices(),
            image.width(),
            image.height(),
            image.palette(),
            has_alpha,
        )?;
        Ok(output)
    }

    /// Encode raw index data into a caller-provided buffer.
    ///
    /// The buffer is cleared first and only written once every check and the
    /// compression step have succeeded, so on error it is left empty.
    pub fn encode_indexed_into(
        &self,
        output: &mut Vec<u8>,
        indices: &[u8],
        width: u32,
        height: u32,
        palette: &Palette,
        has_alpha: bool,
    ) -> Result<()> {
        output.clear();
        validate(indices, width, height, palette, &self.options)?;

        let scanlines = build_scanlines(indices, width as usize);
        let compressed = self.compressor.deflate(
            &scanlines,
            self.options.compression_level,
            Strategy::Rle,
        )?;

        output.reserve(compressed.len() + palette.len() * 4 + 64);
        output.extend_from_slice(&PNG_SIGNATURE);
        ihdr(width, height).write_to(output);
        plte(palette).write_to(output);
        if has_alpha {
            trns(palette).write_to(output);
        }
        for part in compressed.chunks(IDAT_CHUNK_SIZE) {
            Chunk::new(chunk::IDAT, part).write_to(output);
        }
        Chunk::new(chunk::IEND, &b""[..]).write_to(output);
        Ok(())
    }
}

impl<C: Compressor> Encoder for PngIndexedEncoder<C> {
    fn encode(&self, image: &ImageData) -> Result<Vec<u8>> {
        let indexed = image.require_indexed()?;
        self.encode_indexed(indexed, indexed.palette().has_transparency())
    }
}

/// Encode an indexed image as PNG with the bundled compressor.
pub fn encode_indexed(image: &IndexedImage, has_alpha: bool, options: &PngOptions) -> Result<Vec<u8>> {
    PngIndexedEncoder::new(options.clone()).encode_indexed(image, has_alpha)
}

fn validate(
    indices: &[u8],
    width: u32,
    height: u32,
    palette: &Palette,
    options: &PngOptions,
) -> Result<()> {
    if options.compression_level > 9 {
        return Err(Error::InvalidCompressionLevel(options.compression_level));
    }
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimensions { width, height });
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(Error::ImageTooLarge {
            width,
            height,
            max_area: MAX_DIMENSION as u64 * MAX_DIMENSION as u64,
        });
    }
    let expected = width as usize * height as usize;
    if indices.len() != expected {
        return Err(Error::InvalidDataLength {
            expected,
            actual: indices.len(),
        });
    }
    check_indices(indices, palette.len())
}

/// Prefix every row with filter byte 0.
fn build_scanlines(indices: &[u8], width: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(indices.len() + indices.len() / width);
    for row in indices.chunks_exact(width) {
        out.push(FILTER_NONE);
        out.extend_from_slice(row);
    }
    out
}

/// IHDR for indexed color (bit depth 8, color type 3).
fn ihdr(width: u32, height: u32) -> Chunk<'static> {
    let mut data = Vec::with_capacity(13);
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data.push(8); // bit depth
    data.push(3); // color type: indexed
    data.push(0); // compression
    data.push(0); // filter
    data.push(0); // interlace
    Chunk::new(chunk::IHDR, data)
}

/// PLTE: RGB triples in palette order.
fn plte(palette: &Palette) -> Chunk<'static> {
    let mut data = Vec::with_capacity(palette.len() * 3);
    for c in palette {
        data.extend_from_slice(&[c.r, c.g, c.b]);
    }
    Chunk::new(chunk::PLTE, data)
}

/// tRNS: one alpha byte per palette entry.
fn trns(palette: &Palette) -> Chunk<'static> {
    let data: Vec<u8> = palette.iter().map(|c| c.a).collect();
    Chunk::new(chunk::TRNS, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::image::RasterBuffer;
    use miniz_oxide::inflate::decompress_to_vec_zlib;

    fn palette3() -> Palette {
        Palette::new(vec![
            Rgba::new(255, 0, 0, 255),
            Rgba::new(0, 255, 0, 0),
            Rgba::new(0, 0, 255, 128),
        ])
        .unwrap()
    }

    fn image_2x2() -> IndexedImage {
        IndexedImage::new(2, 2, vec![0, 1, 2, 0], palette3()).unwrap()
    }

    /// Find a chunk's payload by type.
    fn find_chunk<'a>(png: &'a [u8], kind: &[u8; 4]) -> Option<&'a [u8]> {
        let mut pos = 8;
        while pos + 12 <= png.len() {
            let len = u32::from_be_bytes(png[pos..pos + 4].try_into().unwrap()) as usize;
            if &png[pos + 4..pos + 8] == kind {
                return Some(&png[pos + 8..pos + 8 + len]);
            }
            pos += 12 + len;
        }
        None
    }

    #[test]
    fn test_signature_and_ihdr() {
        let png = encode_indexed(&image_2x2(), false, &PngOptions::default()).unwrap();
        assert_eq!(&png[0..8], &PNG_SIGNATURE);
        assert_eq!(&png[8..12], &[0, 0, 0, 13]);
        assert_eq!(&png[12..16], b"IHDR");
        assert_eq!(&png[16..20], &[0, 0, 0, 2]);
        assert_eq!(&png[20..24], &[0, 0, 0, 2]);
        assert_eq!(&png[24..29], &[8, 3, 0, 0, 0]);
    }

    #[test]
    fn test_plte_is_rgb_in_order() {
        let png = encode_indexed(&image_2x2(), false, &PngOptions::default()).unwrap();
        assert_eq!(
            find_chunk(&png, b"PLTE").unwrap(),
            &[255, 0, 0, 0, 255, 0, 0, 0, 255]
        );
    }

    #[test]
    fn test_trns_only_with_alpha() {
        let without = encode_indexed(&image_2x2(), false, &PngOptions::default()).unwrap();
        assert!(find_chunk(&without, b"tRNS").is_none());

        let with = encode_indexed(&image_2x2(), true, &PngOptions::default()).unwrap();
        assert_eq!(find_chunk(&with, b"tRNS").unwrap(), &[255, 0, 128]);
    }

    #[test]
    fn test_idat_holds_unfiltered_rows() {
        let png = encode_indexed(&image_2x2(), false, &PngOptions::default()).unwrap();
        let idat = find_chunk(&png, b"IDAT").unwrap();
        let raw = decompress_to_vec_zlib(idat).unwrap();
        assert_eq!(raw, vec![0, 0, 1, 0, 2, 0]);
    }

    #[test]
    fn test_ends_with_iend() {
        let png = encode_indexed(&image_2x2(), false, &PngOptions::default()).unwrap();
        assert_eq!(
            &png[png.len() - 12..],
            &[0, 0, 0, 0, b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82]
        );
    }

    #[test]
    fn test_corrupt_index_rejected_without_output() {
        let encoder = PngIndexedEncoder::new(PngOptions::default());
        let mut output = vec![1, 2, 3];
        let result =
            encoder.encode_indexed_into(&mut output, &[0, 3, 1, 0], 2, 2, &palette3(), false);
        assert_eq!(
            result,
            Err(Error::CorruptIndex {
                position: 1,
                index: 3,
                palette_len: 3
            })
        );
        assert!(output.is_empty());
    }

    #[test]
    fn test_invalid_inputs() {
        let encoder = PngIndexedEncoder::new(PngOptions::default());
        let mut out = Vec::new();
        assert!(matches!(
            encoder.encode_indexed_into(&mut out, &[], 0, 2, &palette3(), false),
            Err(Error::InvalidDimensions { .. })
        ));
        assert!(matches!(
            encoder.encode_indexed_into(&mut out, &[0, 0, 0], 2, 2, &palette3(), false),
            Err(Error::InvalidDataLength {
                expected: 4,
                actual: 3
            })
        ));
        let bad_level = PngIndexedEncoder::new(PngOptions {
            compression_level: 10,
        });
        assert_eq!(
            bad_level.encode_indexed(&image_2x2(), false),
            Err(Error::InvalidCompressionLevel(10))
        );
    }

    #[test]
    fn test_compressor_failure_propagates() {
        struct Broken;
        impl Compressor for Broken {
            fn deflate(&self, _: &[u8], _: u8, _: Strategy) -> Result<Vec<u8>> {
                Err(Error::CompressionFailure("out of memory".into()))
            }
        }
        let encoder = PngIndexedEncoder::with_compressor(PngOptions::default(), Broken);
        assert_eq!(
            encoder.encode_indexed(&image_2x2(), false),
            Err(Error::CompressionFailure("out of memory".into()))
        );
    }

    #[test]
    fn test_encoder_trait_requires_indexed() {
        let encoder = PngIndexedEncoder::new(PngOptions::default());
        let raster = RasterBuffer::new(1, 1, vec![0, 0, 0, 255]).unwrap();
        assert!(matches!(
            encoder.encode(&ImageData::from(raster)),
            Err(Error::EncodeNotReady(_))
        ));

        let png = encoder.encode(&ImageData::from(image_2x2())).unwrap();
        // palette has non-opaque entries, so tRNS is written
        assert!(find_chunk(&png, b"tRNS").is_some());
    }

    #[test]
    fn test_large_image_splits_idat() {
        // Pseudo-random indices defeat compression so IDAT exceeds one chunk.
        let width = 1024u32;
        let height = 512u32;
        let mut seed = 12345u32;
        let indices: Vec<u8> = (0..width * height)
            .map(|_| {
                seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
                (seed >> 16) as u8
            })
            .collect();
        let palette = Palette::new((0..=255).map(|v| Rgba::new(v, v, v, 255)).collect()).unwrap();
        let img = IndexedImage::new(width, height, indices.clone(), palette).unwrap();
        let png = encode_indexed(&img, false, &PngOptions::fast()).unwrap();

        let mut pos = 8;
        let mut idat = Vec::new();
        let mut idat_count = 0;
        while pos < png.len() {
            let len = u32::from_be_bytes(png[pos..pos + 4].try_into().unwrap()) as usize;
            if &png[pos + 4..pos + 8] == b"IDAT" {
                idat_count += 1;
                idat.extend_from_slice(&png[pos + 8..pos + 8 + len]);
            }
            pos += 12 + len;
        }
        assert!(idat_count >= 2);
        let raw = decompress_to_vec_zlib(&idat).unwrap();
        assert_eq!(raw.len(), (width as usize + 1) * height as usize);
        assert_eq!(&raw[1..1 + width as usize], &indices[..width as usize]);
    }
}
