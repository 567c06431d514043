//! Jenkins96: the 64-bit path hash used by CASC archives
//!
//! This is Bob Jenkins' lookup3 `hashlittle2` with both seeds zero, returning
//! `(c << 32) | b`. CASC feeds it the upper-cased path with `\` separators.
//!
//! The input is treated as zero-padded to a multiple of 12 bytes, which is
//! equivalent to lookup3's masked tail reads and lets the kernel hash a
//! pre-padded template in place. The initial state always uses the
//! *unpadded* length.

use crate::constants::BLOCK_SIZE;
use crate::mask::normalise;

const INIT: u32 = 0xdead_beef;

#[derive(Clone, Copy)]
struct State {
    a: u32,
    b: u32,
    c: u32,
}

impl State {
    fn new(len: usize) -> Self {
        let init = INIT.wrapping_add(len as u32);
        Self {
            a: init,
            b: init,
            c: init,
        }
    }

    #[inline(always)]
    fn absorb(&mut self, block: &[u8]) {
        self.a = self.a.wrapping_add(read_u32(block, 0));
        self.b = self.b.wrapping_add(read_u32(block, 4));
        self.c = self.c.wrapping_add(read_u32(block, 8));
    }

    #[inline(always)]
    fn mix(&mut self) {
        let State { a, b, c } = self;
        *a = a.wrapping_sub(*c);
        *a ^= c.rotate_left(4);
        *c = c.wrapping_add(*b);
        *b = b.wrapping_sub(*a);
        *b ^= a.rotate_left(6);
        *a = a.wrapping_add(*c);
        *c = c.wrapping_sub(*b);
        *c ^= b.rotate_left(8);
        *b = b.wrapping_add(*a);
        *a = a.wrapping_sub(*c);
        *a ^= c.rotate_left(16);
        *c = c.wrapping_add(*b);
        *b = b.wrapping_sub(*a);
        *b ^= a.rotate_left(19);
        *a = a.wrapping_add(*c);
        *c = c.wrapping_sub(*b);
        *c ^= b.rotate_left(4);
        *b = b.wrapping_add(*a);
    }

    #[inline(always)]
    fn finalize(&mut self) {
        let State { a, b, c } = self;
        *c ^= *b;
        *c = c.wrapping_sub(b.rotate_left(14));
        *a ^= *c;
        *a = a.wrapping_sub(c.rotate_left(11));
        *b ^= *a;
        *b = b.wrapping_sub(a.rotate_left(25));
        *c ^= *b;
        *c = c.wrapping_sub(b.rotate_left(16));
        *a ^= *c;
        *a = a.wrapping_sub(c.rotate_left(4));
        *b ^= *a;
        *b = b.wrapping_sub(a.rotate_left(14));
        *c ^= *b;
        *c = c.wrapping_sub(b.rotate_left(24));
    }

    fn value(&self) -> u64 {
        ((self.c as u64) << 32) | self.b as u64
    }
}

#[inline(always)]
fn read_u32(block: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([block[at], block[at + 1], block[at + 2], block[at + 3]])
}

/// Length rounded up to the next multiple of the block size
pub fn padded_len(len: usize) -> usize {
    len + (BLOCK_SIZE - len % BLOCK_SIZE) % BLOCK_SIZE
}

/// Hash raw bytes (no normalisation)
pub fn jenkins96(data: &[u8]) -> u64 {
    let mut state = State::new(data.len());
    if data.is_empty() {
        return state.value();
    }

    let mut rest = data;
    while rest.len() > BLOCK_SIZE {
        let (block, tail) = rest.split_at(BLOCK_SIZE);
        state.absorb(block);
        state.mix();
        rest = tail;
    }

    let mut last = [0u8; BLOCK_SIZE];
    last[..rest.len()].copy_from_slice(rest);
    state.absorb(&last);
    state.finalize();
    state.value()
}

/// Hash the first `len` bytes of a buffer that is already zero-padded.
///
/// `buf` must hold at least `padded_len(len)` bytes and every byte in
/// `buf[len..padded_len(len)]` must be zero. Equal to `jenkins96(&buf[..len])`.
#[inline]
pub fn jenkins96_padded(buf: &[u8], len: usize) -> u64 {
    let mut state = State::new(len);
    if len == 0 {
        return state.value();
    }

    let end = padded_len(len);
    let last = end - BLOCK_SIZE;
    for block in buf[..last].chunks_exact(BLOCK_SIZE) {
        state.absorb(block);
        state.mix();
    }
    state.absorb(&buf[last..end]);
    state.finalize();
    state.value()
}

/// Normalise a path the way CASC does and hash it
pub fn hash_path(path: &str) -> u64 {
    jenkins96(normalise(path).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(jenkins96(b""), 0xdeadbeef_deadbeef);
    }

    #[test]
    fn test_lookup3_reference_vector() {
        // hashlittle2("Four score and seven years ago", 30, 0, 0) -> c=17770551 b=ce7226e6
        assert_eq!(
            jenkins96(b"Four score and seven years ago"),
            0x17770551_ce7226e6
        );
    }

    #[test]
    fn test_padded_matches_unpadded() {
        let inputs: [&[u8]; 5] = [
            b"A",
            b"INTERFACE\\",
            b"WORLD\\MAPS\\AZEROTH",
            b"123456789012",
            b"123456789012345678901234",
        ];
        for input in inputs {
            let mut buf = input.to_vec();
            buf.resize(padded_len(input.len()), 0);
            assert_eq!(jenkins96_padded(&buf, input.len()), jenkins96(input));
        }
    }

    #[test]
    fn test_padded_len() {
        assert_eq!(padded_len(0), 0);
        assert_eq!(padded_len(1), 12);
        assert_eq!(padded_len(12), 12);
        assert_eq!(padded_len(13), 24);
    }

    #[test]
    fn test_hash_path_normalises() {
        assert_eq!(
            hash_path("interface/icons/foo.blp"),
            jenkins96(b"INTERFACE\\ICONS\\FOO.BLP")
        );
    }

    #[test]
    fn test_length_affects_hash() {
        // Trailing zero bytes are padding, so only the seed tells these apart
        assert_ne!(jenkins96(b"AB"), jenkins96(b"AB\0"));
    }
}
