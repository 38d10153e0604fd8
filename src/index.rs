//! Index walking: from the index block to the ordered data-block handles.
//!
//! An index block has the same physical layout as a data block; each value is
//! an encoded [`BlockHandle`]. A single-level index points straight at data
//! blocks. A two-level index points at second-level index blocks, whose
//! entries in turn point at data blocks; [`collect_data_handles`] composes
//! the levels so callers always receive a flat, in-order handle sequence.

use crate::block::{read_block, Block, BlockIterator};
use crate::coding::ByteReader;
use crate::config::ReadOptions;
use crate::error::Result;
use crate::footer::BlockHandle;
use crate::properties::IndexType;
use crate::source::ByteSource;

/// A single index entry: a separator key and the block it points at.
///
/// The separator is exposed raw, as stored; in data-block indexes it carries
/// the usual 8-byte internal trailer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Separator key: all keys in the referenced block compare <= it.
    pub separator: Vec<u8>,
    /// Handle of the referenced block.
    pub handle: BlockHandle,
}

/// An index block: block-handle values keyed by separator.
#[derive(Debug)]
pub struct IndexBlock {
    block: Block,
}

impl IndexBlock {
    /// Wrap a decoded block as an index.
    pub fn new(block: Block) -> Self {
        Self { block }
    }

    /// Create an iterator over the index entries.
    pub fn iter(&self) -> IndexIterator {
        IndexIterator { iter: self.block.iter() }
    }

    /// Collect every index entry in stored order.
    pub fn entries(&self) -> Result<Vec<IndexEntry>> {
        let mut entries = Vec::new();
        let mut iter = self.iter();
        while iter.advance()? {
            entries.push(iter.entry()?);
        }
        Ok(entries)
    }
}

/// Iterator over `(separator, handle)` pairs of an index block.
pub struct IndexIterator {
    iter: BlockIterator,
}

impl IndexIterator {
    /// Move to the next index entry.
    pub fn advance(&mut self) -> Result<bool> {
        self.iter.advance()
    }

    /// Check if the iterator is positioned on an entry.
    pub fn valid(&self) -> bool {
        self.iter.valid()
    }

    /// Decode the current entry.
    pub fn entry(&self) -> Result<IndexEntry> {
        let mut reader = ByteReader::new(self.iter.value());
        let handle = BlockHandle::decode(&mut reader)?;
        Ok(IndexEntry { separator: self.iter.key().to_vec(), handle })
    }
}

/// Flatten the index topology into the ordered list of data-block handles.
///
/// With a single-level index the handles come straight out of `index_block`;
/// with a two-level index each top-level entry names a second-level index
/// block that is fetched and unrolled in place.
pub fn collect_data_handles<S: ByteSource + ?Sized>(
    source: &S,
    index_block: &IndexBlock,
    index_type: IndexType,
    options: &ReadOptions,
) -> Result<Vec<BlockHandle>> {
    let top = index_block.entries()?;
    if index_type != IndexType::TwoLevelIndexSearch {
        return Ok(top.into_iter().map(|entry| entry.handle).collect());
    }

    let mut handles = Vec::new();
    for entry in top {
        let second = IndexBlock::new(read_block(source, &entry.handle, options)?);
        for leaf in second.entries()? {
            handles.push(leaf.handle);
        }
    }
    Ok(handles)
}
