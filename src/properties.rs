//! Meta-index and table properties.
//!
//! The meta-index block maps block names to handles; the properties block it
//! names carries key/value metadata about the table. Both use the shared
//! block layout with plain keys (no internal trailer).

use crate::block::read_block;
use crate::coding::ByteReader;
use crate::config::ReadOptions;
use crate::error::Result;
use crate::footer::{BlockHandle, Footer};
use crate::source::ByteSource;
use std::collections::BTreeMap;

/// Meta-index name of the properties block.
pub const PROPERTIES_BLOCK_NAME: &[u8] = b"rocksdb.properties";

/// Meta-index name written by older writers.
pub const LEGACY_PROPERTIES_BLOCK_NAME: &[u8] = b"rocksdb.stats";

/// Property naming the index topology.
pub const INDEX_TYPE_PROPERTY: &[u8] = b"rocksdb.block.based.table.index.type";

/// Property carrying the total entry count.
pub const NUM_ENTRIES_PROPERTY: &[u8] = b"rocksdb.num.entries";

/// Table properties: a name -> value byte mapping.
pub type Properties = BTreeMap<Vec<u8>, Vec<u8>>;

/// Index topologies a table can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    /// A single index block pointing straight at data blocks.
    BinarySearch,
    /// Hash-assisted variant of the single-level index.
    HashSearch,
    /// A top-level index pointing at second-level index blocks.
    TwoLevelIndexSearch,
}

impl IndexType {
    /// Map the on-disk property value to a topology.
    ///
    /// Only value 2 selects the two-level walk; unknown values fall back to
    /// the single-level walk so future single-level variants keep reading.
    pub fn from_u64(value: u64) -> Self {
        match value {
            1 => IndexType::HashSearch,
            2 => IndexType::TwoLevelIndexSearch,
            _ => IndexType::BinarySearch,
        }
    }

    /// Decode the topology from a properties mapping.
    ///
    /// The property value is a little-endian unsigned varint; a missing
    /// property means the default single-level index.
    pub fn from_properties(properties: &Properties) -> Result<Self> {
        match properties.get(INDEX_TYPE_PROPERTY) {
            Some(value) => {
                let mut reader = ByteReader::new(value);
                Ok(Self::from_u64(reader.read_uvarint()?))
            }
            None => Ok(IndexType::BinarySearch),
        }
    }
}

/// Read the table properties named by the footer's meta-index handle.
///
/// Walks the meta-index for the `rocksdb.properties` entry (or its legacy
/// name), reads that block and returns its entries. A table without a
/// properties block yields an empty mapping.
pub fn read_properties<S: ByteSource + ?Sized>(
    source: &S,
    footer: &Footer,
    options: &ReadOptions,
) -> Result<Properties> {
    let metaindex = read_block(source, &footer.metaindex_handle, options)?;

    let mut properties_handle = None;
    let mut iter = metaindex.iter();
    while iter.advance()? {
        let name = iter.key();
        if name == PROPERTIES_BLOCK_NAME || name == LEGACY_PROPERTIES_BLOCK_NAME {
            let mut reader = ByteReader::new(iter.value());
            properties_handle = Some(BlockHandle::decode(&mut reader)?);
            break;
        }
    }

    let handle = match properties_handle {
        Some(handle) => handle,
        None => return Ok(Properties::new()),
    };

    let block = read_block(source, &handle, options)?;
    let mut properties = Properties::new();
    let mut iter = block.iter();
    while iter.advance()? {
        properties.insert(iter.key().to_vec(), iter.value().to_vec());
    }
    Ok(properties)
}

/// Read a numeric property encoded as an unsigned varint.
pub fn uvarint_property(properties: &Properties, name: &[u8]) -> Result<Option<u64>> {
    match properties.get(name) {
        Some(value) => {
            let mut reader = ByteReader::new(value);
            Ok(Some(reader.read_uvarint()?))
        }
        None => Ok(None),
    }
}
