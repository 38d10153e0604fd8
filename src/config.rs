//! Configuration options for reading tables.

/// Options controlling how a table is read.
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Verify the 4-byte checksum in each block trailer against the block
    /// contents before decoding.
    /// Default: false
    pub verify_checksums: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self { verify_checksums: false }
    }
}

impl ReadOptions {
    /// Creates a new ReadOptions with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether block checksums are verified on read.
    pub fn verify_checksums(mut self, value: bool) -> Self {
        self.verify_checksums = value;
        self
    }
}

/// Compression codecs a block trailer can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CompressionType {
    /// No compression.
    None = 0,

    /// Snappy compression.
    Snappy = 1,
}

impl CompressionType {
    /// Convert from the compression byte of a block trailer.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(CompressionType::None),
            1 => Some(CompressionType::Snappy),
            _ => None,
        }
    }
}
