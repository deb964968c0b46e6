//! # Byte Ring Buffer
//!
//! Fixed-capacity FIFO byte queue that stages inbound datagrams before frame
//! extraction. When full, pushing evicts the oldest bytes so only the most
//! recent `capacity` bytes are kept.

/// Default ring capacity in bytes
pub const DEFAULT_RING_CAPACITY: usize = 256;

/// Fixed-capacity byte queue with overwrite-on-overflow
#[derive(Debug, Clone)]
pub struct RingBuffer {
    /// Pre-allocated storage
    buf: Box<[u8]>,
    /// Next write position
    head: usize,
    /// Oldest byte position
    tail: usize,
    /// Bytes currently stored
    count: usize,
}

impl RingBuffer {
    /// Create a ring buffer holding at most `capacity` bytes
    ///
    /// A zero capacity is rounded up to one byte so indexing stays valid.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0u8; capacity.max(1)].into_boxed_slice(),
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    /// Append bytes, evicting the oldest ones when full
    pub fn push(&mut self, data: &[u8]) {
        let capacity = self.buf.len();

        for &byte in data {
            if self.count == capacity {
                self.tail = (self.tail + 1) % capacity;
                self.count -= 1;
            }
            self.buf[self.head] = byte;
            self.head = (self.head + 1) % capacity;
            self.count += 1;
        }
    }

    /// Remove and return the oldest byte
    pub fn read(&mut self) -> Option<u8> {
        if self.count == 0 {
            return None;
        }

        let byte = self.buf[self.tail];
        self.tail = (self.tail + 1) % self.buf.len();
        self.count -= 1;
        Some(byte)
    }

    /// Return the oldest byte without removing it
    pub fn peek(&self) -> Option<u8> {
        self.peek_at(0)
    }

    /// Return the byte `offset` positions after the oldest one
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        if offset >= self.count {
            return None;
        }
        Some(self.buf[(self.tail + offset) % self.buf.len()])
    }

    /// Drop up to `n` of the oldest bytes, returning how many were dropped
    pub fn discard(&mut self, n: usize) -> usize {
        let n = n.min(self.count);
        self.tail = (self.tail + n) % self.buf.len();
        self.count -= n;
        n
    }

    /// Number of bytes currently stored
    pub fn available(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Drop all stored bytes
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.count = 0;
    }
}

impl Default for RingBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_RING_CAPACITY)
    }
}
