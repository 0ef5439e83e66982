//! DEFLATE and CRC32 collaborators.
//!
//! The PNG encoder only needs `deflate(bytes, level, strategy)` and
//! `crc32(bytes)`. Both are backed by established crates; the [`Compressor`]
//! trait lets callers substitute another zlib implementation.

use miniz_oxide::deflate::core::{
    compress, create_comp_flags_from_zip_params, CompressionStrategy, CompressorOxide,
    TDEFLFlush, TDEFLStatus,
};

use crate::error::{Error, Result};

/// zlib window size; positive `window_bits` also selects the zlib wrapper.
const WINDOW_BITS: i32 = 15;

/// DEFLATE match-finding strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// General-purpose LZ77 + Huffman.
    Default,
    /// Matches restricted to distance 1 (run-length).
    #[default]
    Rle,
    /// Huffman coding only, no matches.
    HuffmanOnly,
}

impl Strategy {
    fn to_miniz(self) -> i32 {
        match self {
            Strategy::Default => CompressionStrategy::Default as i32,
            Strategy::Rle => CompressionStrategy::RLE as i32,
            Strategy::HuffmanOnly => CompressionStrategy::HuffmanOnly as i32,
        }
    }
}

/// Produces a zlib stream (header, DEFLATE data, Adler-32).
pub trait Compressor {
    /// Compress `data` at `level` (0-9) with the given strategy.
    fn deflate(&self, data: &[u8], level: u8, strategy: Strategy) -> Result<Vec<u8>>;
}

/// [`Compressor`] backed by `miniz_oxide`.
///
/// Each call builds its own compressor state, so one instance can serve
/// concurrent encodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZlibCompressor;

impl Compressor for ZlibCompressor {
    fn deflate(&self, data: &[u8], level: u8, strategy: Strategy) -> Result<Vec<u8>> {
        if level > 9 {
            return Err(Error::InvalidCompressionLevel(level));
        }
        let flags = create_comp_flags_from_zip_params(level as i32, WINDOW_BITS, strategy.to_miniz());
        let mut state = CompressorOxide::new(flags);

        let mut output = vec![0u8; (data.len() / 2).max(64)];
        let mut in_pos = 0;
        let mut out_pos = 0;
        loop {
            let (status, bytes_in, bytes_out) = compress(
                &mut state,
                &data[in_pos..],
                &mut output[out_pos..],
                TDEFLFlush::Finish,
            );
            in_pos += bytes_in;
            out_pos += bytes_out;

            match status {
                TDEFLStatus::Done => {
                    output.truncate(out_pos);
                    return Ok(output);
                }
                TDEFLStatus::Okay => {
                    // Out of room; grow and continue.
                    if output.len() - out_pos < 64 {
                        let grown = output.len() * 2;
                        output.resize(grown, 0);
                    }
                }
                other => {
                    return Err(Error::CompressionFailure(format!(
                        "deflate stopped with status {other:?} after {in_pos} of {} bytes",
                        data.len()
                    )))
                }
            }
        }
    }
}

/// CRC-32/ISO-HDLC, the checksum PNG chunks carry.
#[inline]
pub fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}
