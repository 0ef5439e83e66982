//! Error types for the palettize library.

/// Result type alias for palettize operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during quantization and encoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Invalid image dimensions (zero width or height).
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Image width.
        width: u32,
        /// Image height.
        height: u32,
    },
    /// Pixel or index data length doesn't match the dimensions.
    #[error("Invalid data length: expected {expected} bytes, got {actual}")]
    InvalidDataLength {
        /// Expected number of bytes.
        expected: usize,
        /// Actual number of bytes provided.
        actual: usize,
    },
    /// Image area exceeds the configured limit, or a dimension exceeds what
    /// the output format can store.
    #[error("Image {width}x{height} exceeds maximum area of {max_area} pixels")]
    ImageTooLarge {
        /// Image width.
        width: u32,
        /// Image height.
        height: u32,
        /// Maximum supported pixel count.
        max_area: u64,
    },
    /// Palette must hold between 1 and 256 entries.
    #[error("Invalid palette length {len}: must be 1-256")]
    InvalidPaletteLength {
        /// Number of entries supplied.
        len: usize,
    },
    /// Invalid zlib compression level (must be 0-9).
    #[error("Invalid compression level {0}: must be 0-9")]
    InvalidCompressionLevel(u8),
    /// Invalid palette size ceiling (must be 1-256).
    #[error("Invalid target color count {0}: must be 1-256")]
    InvalidTargetColors(u16),
    /// The fast quantizer needs at least one scan.
    #[error("Invalid attempt limit {0}: must be at least 1")]
    InvalidMaxAttempts(u32),
    /// The fast quantizer could not fit the image into the palette ceiling,
    /// even at the strongest crush it was allowed to try.
    #[error(
        "Palette of {target_colors} colors unreachable after {attempts} attempts \
         (rgb divisor {rgb_divisor}, alpha divisor {alpha_divisor})"
    )]
    PaletteUnreachable {
        /// Requested palette size ceiling.
        target_colors: u16,
        /// Number of full scans performed.
        attempts: u32,
        /// RGB divisor of the last attempt.
        rgb_divisor: u32,
        /// Alpha divisor of the last attempt.
        alpha_divisor: u32,
    },
    /// An index points past the end of the palette.
    #[error("Corrupt index {index} at pixel {position}: palette has {palette_len} entries")]
    CorruptIndex {
        /// Pixel offset in row-major order.
        position: usize,
        /// Offending index value.
        index: u8,
        /// Palette length.
        palette_len: usize,
    },
    /// The DEFLATE collaborator failed.
    #[error("Compression error: {0}")]
    CompressionFailure(String),
    /// An encoder received an image in the wrong representation.
    #[error("Encoder not ready: {0}")]
    EncodeNotReady(&'static str),
    /// The GIF writer collaborator failed.
    #[error("GIF write error: {0}")]
    GifWrite(String),
}
