//! Palette color entries.

use crate::error::{Error, Result};

/// Largest palette an 8-bit index can address.
pub const MAX_PALETTE_LEN: usize = 256;

/// One RGBA8 palette entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha (0 = fully transparent).
    pub a: u8,
}

impl Rgba {
    /// Create a color from its channels.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Pack the channels as `((r<<8|g)<<8|b)<<8|a`.
    ///
    /// Only used as a uniqueness key; never persisted.
    #[inline]
    pub const fn key(self) -> u32 {
        u32::from_be_bytes([self.r, self.g, self.b, self.a])
    }

    /// Inverse of [`Rgba::key`].
    #[inline]
    pub const fn from_key(key: u32) -> Self {
        let [r, g, b, a] = key.to_be_bytes();
        Self { r, g, b, a }
    }

    /// 24-bit `(r<<16)|(g<<8)|b`, alpha discarded.
    #[inline]
    pub const fn rgb_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// The channels in R, G, B, A byte order.
    #[inline]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[u8; 4]> for Rgba {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

/// An ordered list of 1 to 256 colors.
///
/// Position is the index referenced by pixel data, so entry order is
/// preserved exactly through every encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<Rgba>,
}

impl Palette {
    /// Build a palette, checking the 1..=256 length bound.
    pub fn new(entries: Vec<Rgba>) -> Result<Self> {
        if entries.is_empty() || entries.len() > MAX_PALETTE_LEN {
            return Err(Error::InvalidPaletteLength { len: entries.len() });
        }
        Ok(Self { entries })
    }

    /// Number of entries (never zero).
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; present for API symmetry with slices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in index order.
    #[inline]
    pub fn entries(&self) -> &[Rgba] {
        &self.entries
    }

    /// Iterate entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Rgba> + '_ {
        self.entries.iter()
    }

    /// True when any entry is not fully opaque.
    pub fn has_transparency(&self) -> bool {
        self.entries.iter().any(|c| c.a != 255)
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a Rgba;
    type IntoIter = std::slice::Iter<'a, Rgba>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
