//! Error types for the table reader.

use std::fmt;
use std::io;

/// The result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for table decoding operations.
///
/// Every decoder returns the first error it encounters; nothing is swallowed
/// or replaced with a default. Where the failure is tied to a position in the
/// decoded input, the variant carries that byte offset.
#[derive(Debug)]
pub enum Error {
    /// An I/O error occurred.
    Io(io::Error),

    /// The input ended in the middle of a field starting at `offset`.
    Truncated {
        /// Byte offset of the field that ran past the end of the input.
        offset: usize,
    },

    /// A varint starting at `offset` exceeded 10 bytes or set bits above bit 63.
    Overflow {
        /// Byte offset of the offending varint.
        offset: usize,
    },

    /// The file is not a table: magic mismatch or a structurally impossible
    /// layout (negative lengths, handles past end of file).
    BadFileFormat(String),

    /// A block violated its own structure: restart offsets out of range,
    /// a shared prefix longer than the previous key, a key shorter than
    /// its trailer.
    BadBlockStructure(String),

    /// A block names a compression codec this reader does not implement.
    UnsupportedCompression(u8),

    /// The footer carries a format version this reader does not target.
    UnsupportedVersion(u32),

    /// A block checksum did not match its contents (only with verification on).
    ChecksumMismatch {
        /// The checksum stored in the block trailer.
        expected: u32,
        /// The checksum computed over the block contents.
        actual: u32,
    },
}

impl Error {
    /// Creates a new bad file format error.
    pub fn bad_file_format(msg: impl Into<String>) -> Self {
        Error::BadFileFormat(msg.into())
    }

    /// Creates a new bad block structure error.
    pub fn bad_block_structure(msg: impl Into<String>) -> Self {
        Error::BadBlockStructure(msg.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::Truncated { offset } => {
                write!(f, "input truncated inside a field at offset {}", offset)
            }
            Error::Overflow { offset } => {
                write!(f, "varint at offset {} overflows 64 bits", offset)
            }
            Error::BadFileFormat(msg) => write!(f, "bad file format: {}", msg),
            Error::BadBlockStructure(msg) => write!(f, "bad block structure: {}", msg),
            Error::UnsupportedCompression(kind) => {
                write!(f, "unsupported compression type {}", kind)
            }
            Error::UnsupportedVersion(version) => {
                write!(f, "unsupported table format version {}", version)
            }
            Error::ChecksumMismatch { expected, actual } => {
                write!(f, "checksum mismatch: expected {:#x}, got {:#x}", expected, actual)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
