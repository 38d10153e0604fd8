//! Random-access byte sources backing the table reader.
//!
//! A table is decoded from a single immutable file of known length. The
//! reader only ever asks for bounded ranges, so the source contract is two
//! operations: total length, and an exact read of `count` bytes at `offset`.

use crate::error::{Error, Result};
use bytes::Bytes;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Random read access to an immutable byte sequence.
///
/// Reads never return fewer bytes than requested: a range that runs past the
/// end of the source fails with [`Error::Truncated`]. The caller owns the
/// source and releases it by dropping it; decoders borrow and do not retain.
pub trait ByteSource {
    /// Total length of the source in bytes.
    fn len(&self) -> u64;

    /// Read exactly `count` bytes starting at `offset`.
    fn read_at(&self, offset: u64, count: usize) -> Result<Bytes>;

    /// Returns true if the source contains no bytes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A [`ByteSource`] backed by a local file.
///
/// The length is captured at open; the file must not change afterwards.
#[derive(Debug)]
pub struct FileSource {
    file: File,
    len: u64,
}

impl FileSource {
    /// Open a file for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        Ok(Self { file, len })
    }
}

impl ByteSource for FileSource {
    fn len(&self) -> u64 {
        self.len
    }

    fn read_at(&self, offset: u64, count: usize) -> Result<Bytes> {
        match offset.checked_add(count as u64) {
            Some(end) if end <= self.len => {}
            _ => return Err(Error::Truncated { offset: offset as usize }),
        }

        // Clone the descriptor so the read can go through a shared reference.
        let mut file = self.file.try_clone()?;
        file.seek(SeekFrom::Start(offset))?;

        let mut buffer = vec![0u8; count];
        file.read_exact(&mut buffer)?;
        Ok(Bytes::from(buffer))
    }
}

/// A [`ByteSource`] over an in-memory buffer.
#[derive(Debug, Clone)]
pub struct MemSource {
    data: Bytes,
}

impl MemSource {
    /// Wrap a byte buffer as a source.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }
}

impl ByteSource for MemSource {
    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    fn read_at(&self, offset: u64, count: usize) -> Result<Bytes> {
        let start = usize::try_from(offset).map_err(|_| Error::Truncated { offset: usize::MAX })?;
        match start.checked_add(count) {
            Some(end) if end <= self.data.len() => Ok(self.data.slice(start..end)),
            _ => Err(Error::Truncated { offset: start }),
        }
    }
}
