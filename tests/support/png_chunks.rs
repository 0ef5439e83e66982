//! Minimal PNG chunk walker for structural assertions.

/// One chunk as found in a PNG byte stream.
#[derive(Debug, Clone)]
pub struct RawChunk {
    /// Declared payload length.
    pub length: u32,
    /// Four-byte type tag.
    pub kind: [u8; 4],
    /// Payload bytes.
    pub data: Vec<u8>,
    /// CRC field as stored.
    pub crc: u32,
}

impl RawChunk {
    /// CRC32 recomputed over `type || data`.
    pub fn computed_crc(&self) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&self.kind);
        hasher.update(&self.data);
        hasher.finalize()
    }

    /// Type tag as text.
    pub fn name(&self) -> String {
        String::from_utf8_lossy(&self.kind).into_owned()
    }
}

/// Split a PNG file (after the signature) into chunks.
pub fn read_chunks(png: &[u8]) -> Vec<RawChunk> {
    assert!(png.len() >= 8, "missing signature");
    let mut chunks = Vec::new();
    let mut pos = 8;
    while pos < png.len() {
        assert!(pos + 12 <= png.len(), "truncated chunk header at {pos}");
        let length = u32::from_be_bytes(png[pos..pos + 4].try_into().unwrap());
        let kind: [u8; 4] = png[pos + 4..pos + 8].try_into().unwrap();
        let start = pos + 8;
        let end = start + length as usize;
        assert!(end + 4 <= png.len(), "truncated chunk data at {pos}");
        let data = png[start..end].to_vec();
        let crc = u32::from_be_bytes(png[end..end + 4].try_into().unwrap());
        chunks.push(RawChunk {
            length,
            kind,
            data,
            crc,
        });
        pos = end + 4;
    }
    chunks
}

/// Chunk type names in file order.
pub fn chunk_names(png: &[u8]) -> Vec<String> {
    read_chunks(png).iter().map(RawChunk::name).collect()
}
