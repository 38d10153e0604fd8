//! Test-only table writer.
//!
//! Produces byte-exact block-based tables for the reader tests: prefix
//! compression with restart points, internal-key trailers, properties and
//! meta-index blocks, single- or two-level indexes, and the 53-byte footer.
//! The write path is not part of the public crate; it lives here as fixture
//! tooling only.

use sstread::{BlockHandle, FOOTER_SIZE, MAGIC_NUMBER};

/// Knobs controlling the produced layout.
pub struct FixtureOptions {
    /// Entries per data block before a new block starts.
    pub entries_per_block: usize,
    /// Entries between restart points inside a data block.
    pub restart_interval: usize,
    /// Write a two-level index instead of a single-level one.
    pub two_level: bool,
    /// Data blocks per second-level index block (two-level only).
    pub blocks_per_leaf: usize,
}

impl Default for FixtureOptions {
    fn default() -> Self {
        Self {
            entries_per_block: 4,
            restart_interval: 3,
            two_level: false,
            blocks_per_leaf: 2,
        }
    }
}

pub fn put_uvarint(buf: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        buf.push((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

fn put_handle(buf: &mut Vec<u8>, handle: &BlockHandle) {
    put_uvarint(buf, handle.offset);
    put_uvarint(buf, handle.size);
}

/// Build an on-disk key: user key plus the packed sequence/kind trailer.
pub fn internal_key(user_key: &[u8], sequence: u64, kind: u8) -> Vec<u8> {
    let mut key = Vec::with_capacity(user_key.len() + 8);
    key.extend_from_slice(user_key);
    let trailer = (u64::from(kind) << 56) | (sequence & 0x00FF_FFFF_FFFF_FFFF);
    key.extend_from_slice(&trailer.to_le_bytes());
    key
}

struct BlockBuilder {
    buf: Vec<u8>,
    restarts: Vec<u32>,
    counter: usize,
    last_key: Vec<u8>,
    restart_interval: usize,
}

impl BlockBuilder {
    fn new(restart_interval: usize) -> Self {
        Self {
            buf: Vec::new(),
            restarts: vec![0],
            counter: 0,
            last_key: Vec::new(),
            restart_interval,
        }
    }

    fn add(&mut self, key: &[u8], value: &[u8]) {
        let mut shared = 0;
        if self.counter >= self.restart_interval {
            self.restarts.push(self.buf.len() as u32);
            self.counter = 0;
        } else {
            let limit = self.last_key.len().min(key.len());
            while shared < limit && self.last_key[shared] == key[shared] {
                shared += 1;
            }
        }

        put_uvarint(&mut self.buf, shared as u64);
        put_uvarint(&mut self.buf, (key.len() - shared) as u64);
        put_uvarint(&mut self.buf, value.len() as u64);
        self.buf.extend_from_slice(&key[shared..]);
        self.buf.extend_from_slice(value);

        self.last_key.clear();
        self.last_key.extend_from_slice(key);
        self.counter += 1;
    }

    fn finish(mut self) -> Vec<u8> {
        for restart in &self.restarts {
            self.buf.extend_from_slice(&restart.to_le_bytes());
        }
        self.buf.extend_from_slice(&(self.restarts.len() as u32).to_le_bytes());
        self.buf
    }
}

/// Append a block payload plus its uncompressed 5-byte trailer.
fn append_block(file: &mut Vec<u8>, payload: &[u8]) -> BlockHandle {
    let handle = BlockHandle::new(file.len() as u64, payload.len() as u64);
    file.extend_from_slice(payload);
    file.push(0); // no compression
    file.extend_from_slice(&crc32fast::hash(payload).to_le_bytes());
    handle
}

fn build_index_block(entries: &[(Vec<u8>, BlockHandle)]) -> Vec<u8> {
    let mut builder = BlockBuilder::new(1);
    for (separator, handle) in entries {
        let mut value = Vec::new();
        put_handle(&mut value, handle);
        builder.add(separator, &value);
    }
    builder.finish()
}

/// Write a complete table from sorted `(user_key, value)` pairs.
///
/// Sequence numbers are assigned by position and every record kind is 1
/// (a plain value).
pub fn write_table(entries: &[(Vec<u8>, Vec<u8>)], options: &FixtureOptions) -> Vec<u8> {
    assert!(options.entries_per_block > 0 && options.blocks_per_leaf > 0);
    let mut file = Vec::new();

    // Data blocks, remembering each block's last stored key as separator.
    let mut data_index: Vec<(Vec<u8>, BlockHandle)> = Vec::new();
    for (chunk_index, chunk) in entries.chunks(options.entries_per_block).enumerate() {
        let mut builder = BlockBuilder::new(options.restart_interval);
        let base = chunk_index * options.entries_per_block;
        let mut separator = Vec::new();
        for (position, (key, value)) in chunk.iter().enumerate() {
            let stored = internal_key(key, (base + position) as u64, 1);
            builder.add(&stored, value);
            separator = stored;
        }
        let handle = append_block(&mut file, &builder.finish());
        data_index.push((separator, handle));
    }

    // Index: either one level, or leaves plus a top level pointing at them.
    let top_index: Vec<(Vec<u8>, BlockHandle)> = if options.two_level {
        let mut top = Vec::new();
        for leaf_entries in data_index.chunks(options.blocks_per_leaf) {
            let payload = build_index_block(leaf_entries);
            let handle = append_block(&mut file, &payload);
            let separator = leaf_entries.last().unwrap().0.clone();
            top.push((separator, handle));
        }
        top
    } else {
        data_index
    };

    // Properties block: names sorted, values are varints.
    let mut index_type_value = Vec::new();
    put_uvarint(&mut index_type_value, if options.two_level { 2 } else { 0 });
    let mut num_entries_value = Vec::new();
    put_uvarint(&mut num_entries_value, entries.len() as u64);

    let mut props = BlockBuilder::new(1);
    props.add(b"rocksdb.block.based.table.index.type", &index_type_value);
    props.add(b"rocksdb.num.entries", &num_entries_value);
    let properties_handle = append_block(&mut file, &props.finish());

    // Meta-index block naming the properties block.
    let mut handle_value = Vec::new();
    put_handle(&mut handle_value, &properties_handle);
    let mut metaindex = BlockBuilder::new(1);
    metaindex.add(b"rocksdb.properties", &handle_value);
    let metaindex_handle = append_block(&mut file, &metaindex.finish());

    let index_handle = append_block(&mut file, &build_index_block(&top_index));

    // Footer: handles, padding, version, checksum kind, magic.
    let footer_start = file.len();
    put_handle(&mut file, &metaindex_handle);
    put_handle(&mut file, &index_handle);
    file.resize(footer_start + FOOTER_SIZE - 16, 0);
    file.extend_from_slice(&2u32.to_le_bytes());
    file.extend_from_slice(&1u32.to_le_bytes());
    file.extend_from_slice(&MAGIC_NUMBER.to_le_bytes());
    assert_eq!(file.len(), footer_start + FOOTER_SIZE);

    file
}
