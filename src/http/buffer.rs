//! Growable byte buffer backing the incremental request parser.
//!
//! Bytes are appended at the end of the valid region and consumed from the
//! front. Consuming compacts the remainder back to offset 0, so the valid
//! region always starts at the beginning of the allocation. When the
//! allocation is full it doubles, which keeps parsing amortized linear no
//! matter how small the individual reads are.

pub struct ParseBuffer {
    buf: Vec<u8>,
    len: usize,
}

impl ParseBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity.max(1)],
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Unconsumed bytes, without consuming them.
    pub fn filled(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Writable tail of the buffer. Doubles the capacity first if there is
    /// no room left, so the returned slice is never empty.
    pub fn spare_mut(&mut self) -> &mut [u8] {
        if self.len == self.buf.len() {
            self.grow(self.len + 1);
        }
        &mut self.buf[self.len..]
    }

    /// Marks `n` bytes of the slice returned by [`spare_mut`](Self::spare_mut)
    /// as valid.
    pub fn commit(&mut self, n: usize) {
        debug_assert!(self.len + n <= self.buf.len(), "commit past end of buffer");
        self.len += n;
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        let needed = self.len + bytes.len();
        if needed > self.buf.len() {
            self.grow(needed);
        }
        self.buf[self.len..needed].copy_from_slice(bytes);
        self.len = needed;
    }

    /// Drops the first `n` unconsumed bytes and shifts the rest to offset 0.
    pub fn consume(&mut self, n: usize) {
        let n = n.min(self.len);
        self.buf.copy_within(n..self.len, 0);
        self.len -= n;
    }

    fn grow(&mut self, needed: usize) {
        let mut cap = self.buf.len();
        while cap < needed {
            cap *= 2;
        }
        self.buf.resize(cap, 0);
    }
}
