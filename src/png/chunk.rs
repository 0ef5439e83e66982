//! PNG chunk records.
//!
//! A chunk on disk is `length (4, BE) || type (4) || data || crc32 (4, BE)`
//! where the CRC covers `type || data` but not the length. [`Chunk`] stores
//! only the type and payload; length and CRC are derived at write time.

use std::borrow::Cow;

/// A four-byte chunk type tag.
pub type ChunkType = [u8; 4];

/// Image header.
pub const IHDR: ChunkType = *b"IHDR";
/// Palette.
pub const PLTE: ChunkType = *b"PLTE";
/// Palette transparency.
pub const TRNS: ChunkType = *b"tRNS";
/// Compressed image data.
pub const IDAT: ChunkType = *b"IDAT";
/// End of file.
pub const IEND: ChunkType = *b"IEND";

/// Length, type and CRC fields around the payload.
pub const CHUNK_OVERHEAD: usize = 12;

/// A chunk type plus payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk<'a> {
    kind: ChunkType,
    data: Cow<'a, [u8]>,
}

impl<'a> Chunk<'a> {
    /// Create a chunk from a type tag and payload.
    pub fn new(kind: ChunkType, data: impl Into<Cow<'a, [u8]>>) -> Self {
        Self {
            kind,
            data: data.into(),
        }
    }

    /// CRC32 over `type || data`.
    pub fn crc(&self) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&self.kind);
        hasher.update(&self.data);
        hasher.finalize()
    }

    /// Bytes this chunk occupies once written.
    #[inline]
    pub fn encoded_len(&self) -> usize {
        CHUNK_OVERHEAD + self.data.len()
    }

    /// Append the serialized chunk to `output`.
    pub fn write_to(&self, output: &mut Vec<u8>) {
        debug_assert!(self.data.len() <= i32::MAX as usize);
        output.reserve(self.encoded_len());
        output.extend_from_slice(&(self.data.len() as u32).to_be_bytes());
        output.extend_from_slice(&self.kind);
        output.extend_from_slice(&self.data);
        output.extend_from_slice(&self.crc().to_be_bytes());
        log::trace!(
            "wrote {} chunk, {} data bytes",
            String::from_utf8_lossy(&self.kind),
            self.data.len()
        );
    }
}
