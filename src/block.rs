//! Block format: prefix-compressed entries with restart points.
//!
//! Data, index, meta-index and properties blocks all share one physical
//! layout:
//!
//! ```text
//! [Entry 1]
//! [Entry 2]
//! ...
//! [Entry N]
//! [Restart Point 1: u32]
//! ...
//! [Restart Point M: u32]
//! [Num Restarts: u32]
//! ```
//!
//! Each entry:
//!
//! ```text
//! [shared: uvarint]       // Length of prefix shared with the previous key
//! [unshared: uvarint]     // Length of the key suffix stored inline
//! [value_len: uvarint]    // Length of the value
//! [key_suffix: bytes]
//! [value: bytes]
//! ```
//!
//! At every restart point the prefix compression resets (`shared == 0`).
//! On disk each block payload is followed by a 5-byte trailer: one
//! compression byte and a 4-byte checksum.

use crate::coding::ByteReader;
use crate::config::{CompressionType, ReadOptions};
use crate::error::{Error, Result};
use crate::footer::BlockHandle;
use crate::source::ByteSource;
use bytes::Bytes;

/// Bytes following every block payload: compression type, then checksum.
pub const BLOCK_TRAILER_SIZE: usize = 5;

/// Length of the sequence/kind trailer carried by every key in a data block.
pub const INTERNAL_KEY_TRAILER_SIZE: usize = 8;

/// Fetch a block by handle: payload plus its 5-byte trailer.
///
/// The compression byte selects the codec (`0` is raw; `1` is snappy when the
/// `snappy` feature is enabled; anything else fails with
/// [`Error::UnsupportedCompression`]). The trailing checksum is compared
/// against the payload only when `options.verify_checksums` is set.
pub fn read_block<S: ByteSource + ?Sized>(
    source: &S,
    handle: &BlockHandle,
    options: &ReadOptions,
) -> Result<Block> {
    match handle.offset.checked_add(handle.size).and_then(|end| {
        end.checked_add(BLOCK_TRAILER_SIZE as u64)
    }) {
        Some(end) if end <= source.len() => {}
        _ => {
            return Err(Error::bad_file_format(format!(
                "block handle ({}, {}) runs past the {}-byte file",
                handle.offset,
                handle.size,
                source.len()
            )))
        }
    }

    let size = usize::try_from(handle.size)
        .map_err(|_| Error::bad_file_format("block size does not fit in memory"))?;
    let raw = source.read_at(handle.offset, size + BLOCK_TRAILER_SIZE)?;

    let compression = raw[size];
    let stored_checksum = u32::from_le_bytes(raw[size + 1..size + 5].try_into().unwrap());

    if options.verify_checksums {
        let actual = crc32fast::hash(&raw[..size]);
        if actual != stored_checksum {
            return Err(Error::ChecksumMismatch { expected: stored_checksum, actual });
        }
    }

    let payload = match CompressionType::from_u8(compression) {
        Some(CompressionType::None) => raw.slice(..size),
        #[cfg(feature = "snappy")]
        Some(CompressionType::Snappy) => {
            let decompressed = snap::raw::Decoder::new()
                .decompress_vec(&raw[..size])
                .map_err(|e| {
                    Error::bad_block_structure(format!("snappy block failed to decompress: {}", e))
                })?;
            Bytes::from(decompressed)
        }
        #[cfg(not(feature = "snappy"))]
        Some(CompressionType::Snappy) => return Err(Error::UnsupportedCompression(compression)),
        None => return Err(Error::UnsupportedCompression(compression)),
    };

    Block::new(payload)
}

/// A decoded block payload with its restart array located and validated.
#[derive(Debug, Clone)]
pub struct Block {
    data: Bytes,
    restart_offset: usize,
    num_restarts: u32,
}

impl Block {
    /// Parse the restart algebra of a block payload.
    ///
    /// The trailing four bytes carry the restart count `N`; the `N` restart
    /// offsets precede it, so the entry area ends `4 * (N + 1)` bytes before
    /// the end of the payload. Restart offsets must be strictly increasing
    /// and lie within the entry area.
    pub fn new(data: Bytes) -> Result<Self> {
        if data.len() < 4 {
            return Err(Error::bad_file_format(format!(
                "block of {} bytes is too small for a restart count",
                data.len()
            )));
        }

        let tail = data.len() - 4;
        let num_restarts = i32::from_le_bytes(data[tail..].try_into().unwrap());
        if num_restarts < 0 {
            return Err(Error::bad_file_format(format!(
                "negative restart count {}",
                num_restarts
            )));
        }
        let num_restarts = num_restarts as u32;

        let restart_offset = (num_restarts as usize)
            .checked_mul(4)
            .and_then(|bytes| tail.checked_sub(bytes))
            .ok_or_else(|| {
                Error::bad_block_structure(format!(
                    "restart array of {} entries does not fit a {}-byte block",
                    num_restarts,
                    data.len()
                ))
            })?;

        let block = Self { data, restart_offset, num_restarts };
        block.check_restarts()?;
        Ok(block)
    }

    fn check_restarts(&self) -> Result<()> {
        let mut previous: Option<u32> = None;
        for index in 0..self.num_restarts {
            let restart = self.restart_point(index);
            if restart as usize > self.restart_offset {
                return Err(Error::bad_block_structure(format!(
                    "restart offset {} points past the {}-byte entry area",
                    restart, self.restart_offset
                )));
            }
            if let Some(previous) = previous {
                if restart <= previous {
                    return Err(Error::bad_block_structure(format!(
                        "restart offsets not strictly increasing: {} after {}",
                        restart, previous
                    )));
                }
            }
            previous = Some(restart);
        }
        Ok(())
    }

    /// Number of restart points.
    pub fn num_restarts(&self) -> u32 {
        self.num_restarts
    }

    /// Restart offset `index`, counted from the start of the entry area.
    pub fn restart_point(&self, index: u32) -> u32 {
        let offset = self.restart_offset + index as usize * 4;
        u32::from_le_bytes(self.data[offset..offset + 4].try_into().unwrap())
    }

    /// Create an iterator over the block's entries.
    pub fn iter(&self) -> BlockIterator {
        BlockIterator::new(self.clone())
    }

    /// Count the entries in this block by walking them.
    pub fn entry_count(&self) -> Result<usize> {
        let mut iter = self.iter();
        let mut count = 0;
        while iter.advance()? {
            count += 1;
        }
        Ok(count)
    }

    /// The raw block payload.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Forward-only iterator over the prefix-compressed entries of a block.
///
/// Keys and values are exposed raw, exactly as stored; data-block keys carry
/// the 8-byte internal trailer, which [`Entry::from_internal`] splits off.
pub struct BlockIterator {
    block: Block,
    current: usize,
    key: Vec<u8>,
    value: Vec<u8>,
    valid: bool,
    done: bool,
}

impl BlockIterator {
    fn new(block: Block) -> Self {
        Self {
            block,
            current: 0,
            key: Vec::new(),
            value: Vec::new(),
            valid: false,
            done: false,
        }
    }

    /// Reposition at restart point `index`, resetting prefix compression.
    ///
    /// Test-only: the entry stream itself is forward-only and not
    /// restartable.
    #[cfg(test)]
    pub(crate) fn seek_to_restart(&mut self, index: u32) {
        self.current = self.block.restart_point(index) as usize;
        self.key.clear();
        self.value.clear();
        self.valid = false;
        self.done = false;
    }

    /// Decode the next entry.
    ///
    /// Returns `Ok(false)` at the end of the entry area. A decode error
    /// exhausts the iterator: the failing call returns the error and every
    /// later call reports end of sequence.
    pub fn advance(&mut self) -> Result<bool> {
        if self.done || self.current >= self.block.restart_offset {
            self.valid = false;
            self.done = true;
            return Ok(false);
        }

        match self.parse_entry() {
            Ok(()) => {
                self.valid = true;
                Ok(true)
            }
            Err(e) => {
                self.valid = false;
                self.done = true;
                Err(e)
            }
        }
    }

    fn parse_entry(&mut self) -> Result<()> {
        let offset = self.current;
        let mut reader = ByteReader::new(&self.block.data[..self.block.restart_offset]);
        reader.skip_to(offset)?;

        let shared = reader.read_uvarint()?;
        let unshared = reader.read_uvarint()?;
        let value_len = reader.read_uvarint()?;

        if shared > self.key.len() as u64 {
            return Err(Error::bad_block_structure(format!(
                "entry at offset {} shares {} bytes but the previous key has {}",
                offset,
                shared,
                self.key.len()
            )));
        }
        let shared = shared as usize;
        let unshared = usize::try_from(unshared)
            .map_err(|_| Error::Truncated { offset })?;
        let value_len = usize::try_from(value_len)
            .map_err(|_| Error::Truncated { offset })?;

        let suffix = reader.read_slice(unshared)?;
        let value = reader.read_slice(value_len)?;

        // The previous key's shared prefix stays in place; only the suffix
        // changes.
        self.key.truncate(shared);
        self.key.extend_from_slice(suffix);
        self.value.clear();
        self.value.extend_from_slice(value);
        self.current = reader.consumed();
        Ok(())
    }

    /// Check if the iterator is positioned on an entry.
    pub fn valid(&self) -> bool {
        self.valid
    }

    /// Get the current key, exactly as stored.
    pub fn key(&self) -> &[u8] {
        assert!(self.valid, "Iterator not valid");
        &self.key
    }

    /// Get the current value.
    pub fn value(&self) -> &[u8] {
        assert!(self.valid, "Iterator not valid");
        &self.value
    }
}

/// A decoded table entry.
///
/// `key` is the user-visible portion of the stored key; the 8-byte trailer
/// packing `sequence` and `kind` has been split off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The user key.
    pub key: Vec<u8>,
    /// The value bytes.
    pub value: Vec<u8>,
    /// Sequence number from the key trailer (low 56 bits).
    pub sequence: u64,
    /// Record kind from the key trailer (top byte).
    pub kind: u8,
}

impl Entry {
    /// Build an entry from a raw in-block key and value.
    pub fn from_internal(internal_key: &[u8], value: &[u8]) -> Result<Self> {
        let (key, sequence, kind) = split_internal_key(internal_key)?;
        Ok(Self { key: key.to_vec(), value: value.to_vec(), sequence, kind })
    }
}

/// Split the 8-byte trailer off an in-block key.
///
/// The trailer is a u64 little-endian quadword whose top byte (the last byte
/// on disk) is the record kind and whose low 56 bits are the sequence number.
pub fn split_internal_key(key: &[u8]) -> Result<(&[u8], u64, u8)> {
    if key.len() < INTERNAL_KEY_TRAILER_SIZE {
        return Err(Error::bad_block_structure(format!(
            "internal key of {} bytes is shorter than its 8-byte trailer",
            key.len()
        )));
    }

    let split = key.len() - INTERNAL_KEY_TRAILER_SIZE;
    let trailer = u64::from_le_bytes(key[split..].try_into().unwrap());
    let sequence = trailer & 0x00FF_FFFF_FFFF_FFFF;
    let kind = (trailer >> 56) as u8;
    Ok((&key[..split], sequence, kind))
}
