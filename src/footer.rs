//! Block handles and the fixed-size trailer at the end of every table.
//!
//! The footer is the only structure located by absolute position; everything
//! else in the file is reached through the handles it carries.

use crate::coding::ByteReader;
use crate::error::{Error, Result};
use crate::source::ByteSource;

/// Footer size in bytes (fixed).
pub const FOOTER_SIZE: usize = 53;

/// Magic number terminating every table file.
pub const MAGIC_NUMBER: u64 = 0x88e241b785f4cff7;

/// Byte offset of the fixed footer tail: version, checksum kind, magic.
const FOOTER_TAIL_OFFSET: usize = FOOTER_SIZE - 16;

/// Format versions this reader targets.
const SUPPORTED_VERSIONS: std::ops::RangeInclusive<u32> = 1..=2;

/// BlockHandle locates a block inside the file.
///
/// Encoded as two consecutive unsigned varints: offset, then size. The size
/// counts the block payload only; the 5-byte compression/checksum trailer
/// follows it on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHandle {
    /// Offset of the block payload in the file.
    pub offset: u64,
    /// Size of the block payload in bytes.
    pub size: u64,
}

impl BlockHandle {
    /// Create a new BlockHandle.
    pub fn new(offset: u64, size: u64) -> Self {
        Self { offset, size }
    }

    /// Decode a BlockHandle from two unsigned varints.
    pub fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        let offset = reader.read_uvarint()?;
        let size = reader.read_uvarint()?;
        Ok(Self { offset, size })
    }

    /// First byte offset past the block payload.
    pub fn end_offset(&self) -> u64 {
        self.offset + self.size
    }
}

/// Footer is the last 53 bytes of a table file.
///
/// Layout:
/// ```text
/// [meta-index handle: varints]
/// [index handle: varints]
/// [zero padding up to the fixed tail]
/// [format version: u32 LE]
/// [checksum kind: u32 LE]
/// [magic: u64 LE]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footer {
    /// Handle to the meta-index block.
    pub metaindex_handle: BlockHandle,
    /// Handle to the index block.
    pub index_handle: BlockHandle,
    /// On-disk format version.
    pub version: u32,
    /// Checksum kind named by the writer (0 = none, 1 = crc32c, ...).
    ///
    /// Surfaced verbatim; block trailers are only verified when the caller
    /// switches verification on.
    pub checksum_kind: u32,
}

impl Footer {
    /// Decode a footer from exactly [`FOOTER_SIZE`] bytes.
    ///
    /// Fields are consumed in stored order, so a successful decode leaves the
    /// cursor exhausted: handles, padding, version, checksum kind, magic.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() != FOOTER_SIZE {
            return Err(Error::bad_file_format(format!(
                "footer size mismatch: expected {}, got {}",
                FOOTER_SIZE,
                data.len()
            )));
        }

        let mut reader = ByteReader::new(data);
        let metaindex_handle = BlockHandle::decode(&mut reader)?;
        let index_handle = BlockHandle::decode(&mut reader)?;

        if reader.consumed() > FOOTER_TAIL_OFFSET {
            return Err(Error::bad_file_format(format!(
                "footer handles occupy {} bytes, overrunning the fixed tail at {}",
                reader.consumed(),
                FOOTER_TAIL_OFFSET
            )));
        }
        reader.skip_to(FOOTER_TAIL_OFFSET)?;

        let version = reader.read_fixed32()? as u32;
        let checksum_kind = reader.read_fixed32()? as u32;
        reader.expect_magic(&MAGIC_NUMBER.to_le_bytes())?;

        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(Error::UnsupportedVersion(version));
        }

        Ok(Self { metaindex_handle, index_handle, version, checksum_kind })
    }

    /// Read the footer from the last [`FOOTER_SIZE`] bytes of a source.
    pub fn read_from<S: ByteSource + ?Sized>(source: &S) -> Result<Self> {
        let len = source.len();
        if len < FOOTER_SIZE as u64 {
            return Err(Error::bad_file_format(format!(
                "file of {} bytes is too small to hold a footer",
                len
            )));
        }

        let data = source.read_at(len - FOOTER_SIZE as u64, FOOTER_SIZE)?;
        Self::decode(&data)
    }
}
