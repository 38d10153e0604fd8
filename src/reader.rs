//! The composed table reader: footer, properties, index, entry stream.

use crate::block::{read_block, BlockIterator, Entry};
use crate::config::ReadOptions;
use crate::error::Result;
use crate::footer::{BlockHandle, Footer};
use crate::index::{collect_data_handles, IndexBlock};
use crate::properties::{self, IndexType, Properties, NUM_ENTRIES_PROPERTY};
use crate::source::{ByteSource, FileSource};
use std::path::Path;

/// SSTableReader provides read access to a single table file.
///
/// Construction eagerly locates the footer, decodes the meta-index and
/// properties, determines the index topology and collects the ordered list
/// of data-block handles; entries are then streamed lazily through
/// [`SSTableReader::iter`].
///
/// Usage:
/// ```no_run
/// use sstread::SSTableReader;
///
/// # fn main() -> sstread::Result<()> {
/// let reader = SSTableReader::open("table.sst")?;
/// let mut iter = reader.iter();
/// while iter.advance()? {
///     let entry = iter.entry().unwrap();
///     println!("{:?} => {:?}", entry.key, entry.value);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SSTableReader<S: ByteSource = FileSource> {
    source: S,
    footer: Footer,
    properties: Properties,
    index_type: IndexType,
    data_handles: Vec<BlockHandle>,
    options: ReadOptions,
}

impl SSTableReader<FileSource> {
    /// Open a table file for reading with default options.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, ReadOptions::default())
    }

    /// Open a table file for reading.
    pub fn open_with<P: AsRef<Path>>(path: P, options: ReadOptions) -> Result<Self> {
        Self::new(FileSource::open(path)?, options)
    }
}

impl<S: ByteSource> SSTableReader<S> {
    /// Open a table over an arbitrary byte source.
    ///
    /// The reader takes ownership of the source and releases it on drop.
    pub fn new(source: S, options: ReadOptions) -> Result<Self> {
        let footer = Footer::read_from(&source)?;
        let properties = properties::read_properties(&source, &footer, &options)?;
        let index_type = IndexType::from_properties(&properties)?;

        let index_block =
            IndexBlock::new(read_block(&source, &footer.index_handle, &options)?);
        let data_handles = collect_data_handles(&source, &index_block, index_type, &options)?;

        Ok(Self { source, footer, properties, index_type, data_handles, options })
    }

    /// The decoded footer.
    pub fn footer(&self) -> &Footer {
        &self.footer
    }

    /// The decoded table properties.
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// The index topology declared by the table.
    pub fn index_type(&self) -> IndexType {
        self.index_type
    }

    /// The ordered data-block handles behind the index.
    pub fn data_block_handles(&self) -> &[BlockHandle] {
        &self.data_handles
    }

    /// Number of data blocks.
    pub fn num_blocks(&self) -> usize {
        self.data_handles.len()
    }

    /// Entry count as declared by the table properties, when present.
    pub fn num_entries(&self) -> Result<Option<u64>> {
        properties::uvarint_property(&self.properties, NUM_ENTRIES_PROPERTY)
    }

    /// Total file size in bytes.
    pub fn file_size(&self) -> u64 {
        self.source.len()
    }

    /// Create an iterator over every entry in the table, in stored order.
    pub fn iter(&self) -> TableIterator<'_, S> {
        TableIterator {
            reader: self,
            next_block: 0,
            block_iter: None,
            entry: None,
            done: false,
        }
    }
}

/// Lazy, forward-only iterator over every entry of a table.
///
/// Entries come out in stored order: physical order within a block, index
/// order across blocks. The sequence is single-pass and not restartable; a
/// new scan starts from [`SSTableReader::iter`]. A decode error exhausts the
/// iterator: the failing [`advance`](TableIterator::advance) returns the
/// error and every later call reports end of sequence.
pub struct TableIterator<'a, S: ByteSource> {
    reader: &'a SSTableReader<S>,
    next_block: usize,
    block_iter: Option<BlockIterator>,
    entry: Option<Entry>,
    done: bool,
}

impl<S: ByteSource> TableIterator<'_, S> {
    /// Move to the next entry.
    pub fn advance(&mut self) -> Result<bool> {
        if self.done {
            return Ok(false);
        }

        match self.step() {
            Ok(true) => Ok(true),
            Ok(false) => {
                self.entry = None;
                self.done = true;
                Ok(false)
            }
            Err(e) => {
                self.entry = None;
                self.done = true;
                Err(e)
            }
        }
    }

    fn step(&mut self) -> Result<bool> {
        loop {
            if let Some(iter) = self.block_iter.as_mut() {
                if iter.advance()? {
                    self.entry = Some(Entry::from_internal(iter.key(), iter.value())?);
                    return Ok(true);
                }
                self.block_iter = None;
            }

            let handle = match self.reader.data_handles.get(self.next_block) {
                Some(handle) => *handle,
                None => return Ok(false),
            };
            self.next_block += 1;

            let block = read_block(&self.reader.source, &handle, &self.reader.options)?;
            self.block_iter = Some(block.iter());
        }
    }

    /// Check if the iterator is positioned on an entry.
    pub fn valid(&self) -> bool {
        self.entry.is_some()
    }

    /// The current entry, if [`advance`](TableIterator::advance) returned true.
    pub fn entry(&self) -> Option<&Entry> {
        self.entry.as_ref()
    }
}
