//! # sstread - a reader for RocksDB/Pebble block-based tables
//!
//! `sstread` decodes the on-disk SSTable (Sorted String Table) format written
//! by RocksDB and Pebble: given random read access to a single immutable
//! file, it locates the trailer, walks the index, decodes data blocks and
//! yields every key/value entry in stored order.
//!
//! ## File Format
//!
//! ```text
//! [Data Block 1]
//! [Data Block 2]
//! ...
//! [Data Block N]
//! [Second-Level Index Blocks]  // two-level tables only
//! [Properties Block]           // key/value table metadata
//! [Meta Index Block]           // names the properties block
//! [Index Block]                // points to data blocks
//! [Footer: 53B]                // handles, version, checksum kind, magic
//! ```
//!
//! Every block shares one layout: prefix-compressed entries, a restart-point
//! array and a restart count, followed on disk by a compression byte and a
//! 4-byte checksum. Keys inside data blocks carry an 8-byte trailer packing
//! a sequence number and a record kind.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sstread::SSTableReader;
//!
//! # fn main() -> sstread::Result<()> {
//! let reader = SSTableReader::open("words.sst")?;
//! let mut iter = reader.iter();
//! while iter.advance()? {
//!     let entry = iter.entry().unwrap();
//!     println!("{:?} => {:?}", entry.key, entry.value);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The reader is strictly sequential over one byte source; a single table's
//! iterator is not meant for concurrent use, though distinct files can be
//! read from distinct threads freely.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod block;
pub mod coding;
pub mod config;
pub mod error;
pub mod footer;
pub mod index;
pub mod properties;
pub mod reader;
pub mod source;

#[cfg(test)]
pub(crate) mod test_util;

pub use block::{read_block, split_internal_key, Block, BlockIterator, Entry};
pub use coding::ByteReader;
pub use config::{CompressionType, ReadOptions};
pub use error::{Error, Result};
pub use footer::{BlockHandle, Footer, FOOTER_SIZE, MAGIC_NUMBER};
pub use index::{IndexBlock, IndexEntry};
pub use properties::{read_properties, IndexType, Properties};
pub use reader::{SSTableReader, TableIterator};
pub use source::{ByteSource, FileSource, MemSource};
