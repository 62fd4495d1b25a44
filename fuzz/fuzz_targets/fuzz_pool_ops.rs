//! Drives a pool through byte-decoded alloc/free sequences.
//!
//! Opcode layout per 4-byte record: low two bits of byte 0 pick the
//! operation, bytes 1-2 are a little-endian size, byte 3 picks a live
//! allocation for out-of-order frees.

#![no_main]

use std::ptr::NonNull;

use libfuzzer_sys::fuzz_target;
use pagepool::PagePool;

const MAX_LIVE: usize = 64;

fuzz_target!(|data: &[u8]| {
    let mut pool = match PagePool::with_capacity(0) {
        Ok(pool) => pool,
        Err(_) => return,
    };
    let mut live: Vec<(NonNull<u8>, usize)> = Vec::with_capacity(MAX_LIVE);

    let mut i = 0;
    while i + 4 <= data.len() {
        let opcode = data[i] & 0x03;
        let size = u16::from_le_bytes([data[i + 1], data[i + 2]]) as usize;
        let pick = data[i + 3] as usize;
        i += 4;

        match opcode {
            0 | 1 => {
                // Allocation; opcode 1 biases toward record-sized requests.
                let size = if opcode == 1 { size & 0x3F } else { size };
                if live.len() == MAX_LIVE {
                    continue;
                }
                let ptr = match pool.alloc(size) {
                    Ok(ptr) => ptr,
                    Err(_) => continue,
                };
                assert_eq!(ptr.as_ptr() as usize % 8, 0, "misaligned allocation");

                // Zero-size allocations occupy no bytes and share their
                // address with the cursor, so only sized pairs can clash.
                let new = ptr.as_ptr() as usize;
                if size > 0 {
                    for &(q, q_size) in &live {
                        if q_size == 0 {
                            continue;
                        }
                        let q = q.as_ptr() as usize;
                        assert!(
                            new + size <= q || q + q_size <= new,
                            "allocation overlaps a live one"
                        );
                    }
                    unsafe { ptr.as_ptr().write_bytes(0xA5, size) };
                }
                live.push((ptr, size));
            }
            2 => {
                // Trailing free of the most recent allocation.
                if let Some((ptr, size)) = live.pop() {
                    unsafe { pool.free(ptr, size) };
                }
            }
            3 => {
                // Out-of-order free; a no-op unless it happens to trail
                // its chunk.
                if live.is_empty() {
                    continue;
                }
                let idx = pick % live.len();
                let (ptr, size) = live.remove(idx);
                unsafe { pool.free(ptr, size) };
            }
            _ => unreachable!(),
        }
    }
});
