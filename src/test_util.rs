//! Shared encoding helpers for unit tests.

use crate::block::INTERNAL_KEY_TRAILER_SIZE;
use crate::footer::BlockHandle;

/// Append an unsigned varint.
pub(crate) fn put_uvarint(buf: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        buf.push((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Append an encoded block handle (offset, then size).
pub(crate) fn put_handle(buf: &mut Vec<u8>, handle: &BlockHandle) {
    put_uvarint(buf, handle.offset);
    put_uvarint(buf, handle.size);
}

/// Build an on-disk key: user key followed by the packed sequence/kind trailer.
pub(crate) fn internal_key(user_key: &[u8], sequence: u64, kind: u8) -> Vec<u8> {
    let mut key = Vec::with_capacity(user_key.len() + INTERNAL_KEY_TRAILER_SIZE);
    key.extend_from_slice(user_key);
    let trailer = (u64::from(kind) << 56) | (sequence & 0x00FF_FFFF_FFFF_FFFF);
    key.extend_from_slice(&trailer.to_le_bytes());
    key
}

/// Build a block payload from sorted entries with the given restart interval.
pub(crate) fn build_block(entries: &[(&[u8], &[u8])], restart_interval: usize) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut restarts = vec![0u32];
    let mut counter = 0usize;
    let mut last_key: Vec<u8> = Vec::new();

    for (key, value) in entries {
        let mut shared = 0;
        if counter >= restart_interval {
            restarts.push(buf.len() as u32);
            counter = 0;
        } else {
            let limit = last_key.len().min(key.len());
            while shared < limit && last_key[shared] == key[shared] {
                shared += 1;
            }
        }

        put_uvarint(&mut buf, shared as u64);
        put_uvarint(&mut buf, (key.len() - shared) as u64);
        put_uvarint(&mut buf, value.len() as u64);
        buf.extend_from_slice(&key[shared..]);
        buf.extend_from_slice(value);

        last_key.clear();
        last_key.extend_from_slice(key);
        counter += 1;
    }

    for restart in &restarts {
        buf.extend_from_slice(&restart.to_le_bytes());
    }
    buf.extend_from_slice(&(restarts.len() as u32).to_le_bytes());
    buf
}

/// Append a block payload plus its trailer to a file buffer, returning the
/// handle that locates it.
pub(crate) fn append_block(file: &mut Vec<u8>, payload: &[u8]) -> BlockHandle {
    let handle = BlockHandle::new(file.len() as u64, payload.len() as u64);
    file.extend_from_slice(payload);
    file.push(0); // no compression
    file.extend_from_slice(&crc32fast::hash(payload).to_le_bytes());
    handle
}
