use std::collections::TryReserveError;

use bytes::BytesMut;
use thiserror::Error;

/// Backing storage could not be sized. The ring is left unconfigured.
#[derive(Error, Debug)]
#[error("failed to allocate {requested} bytes of ring storage")]
pub struct AllocError {
    pub requested: usize,
    #[source]
    source: TryReserveError,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("write of {requested} bytes exceeds the {available} bytes of free space")]
pub struct CapacityError {
    pub requested: usize,
    pub available: usize,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("ring buffer is empty")]
pub struct Empty;

/// Fixed-capacity byte ring addressed by two wrapping cursors.
///
/// `occupied` is tracked separately from the cursors because
/// `(write_cursor - read_cursor) % capacity` cannot distinguish empty from
/// full once the cursors coincide.
#[derive(Debug, Default)]
pub struct RingBuf {
    storage: Box<[u8]>,
    write_cursor: usize,
    read_cursor: usize,
    occupied: usize,
}

impl RingBuf {
    /// Creates an unconfigured ring. All operations except [`Self::configure`]
    /// are no-ops or errors until a capacity is set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Result<Self, AllocError> {
        let mut ring = Self::new();
        ring.configure(capacity)?;
        Ok(ring)
    }

    /// Replaces the backing storage and resets both cursors and the occupancy
    /// count. Unread bytes are discarded. On allocation failure the old
    /// storage has already been released and the ring is unconfigured.
    pub fn configure(&mut self, capacity: usize) -> Result<(), AllocError> {
        // release the old allocation first so a failed configure cannot
        // expose stale bytes
        self.storage = Box::default();
        self.write_cursor = 0;
        self.read_cursor = 0;
        self.occupied = 0;

        let mut storage = Vec::new();
        storage
            .try_reserve_exact(capacity)
            .map_err(|source| AllocError {
                requested: capacity,
                source,
            })?;
        storage.resize(capacity, 0);
        self.storage = storage.into_boxed_slice();
        Ok(())
    }

    /// Copies `src` in at the write cursor, splitting into two runs when the
    /// span crosses the physical end of storage.
    pub fn write(&mut self, src: &[u8]) -> Result<(), CapacityError> {
        let available = self.space_available();
        if src.len() > available {
            return Err(CapacityError {
                requested: src.len(),
                available,
            });
        }
        if src.is_empty() {
            return Ok(());
        }

        let capacity = self.storage.len();
        let first = src.len().min(capacity - self.write_cursor);
        self.storage[self.write_cursor..self.write_cursor + first]
            .copy_from_slice(&src[..first]);
        self.storage[..src.len() - first].copy_from_slice(&src[first..]);

        self.write_cursor = (self.write_cursor + src.len()) % capacity;
        self.occupied += src.len();
        Ok(())
    }

    /// Copies up to `dst.len()` bytes out at the read cursor and returns the
    /// count actually read. Asking for more than is stored is not an error;
    /// the read comes up short instead.
    pub fn read_into(&mut self, dst: &mut [u8]) -> Result<usize, Empty> {
        if self.occupied == 0 {
            return Err(Empty);
        }
        let n = dst.len().min(self.occupied);
        let capacity = self.storage.len();
        let first = n.min(capacity - self.read_cursor);
        dst[..first].copy_from_slice(&self.storage[self.read_cursor..self.read_cursor + first]);
        dst[first..n].copy_from_slice(&self.storage[..n - first]);

        self.read_cursor = (self.read_cursor + n) % capacity;
        self.occupied -= n;
        Ok(n)
    }

    /// Owned-buffer variant of [`Self::read_into`].
    pub fn read(&mut self, max_len: usize) -> Result<BytesMut, Empty> {
        let n = max_len.min(self.occupied);
        let mut out = BytesMut::zeroed(n);
        let read = self.read_into(&mut out)?;
        debug_assert_eq!(read, n);
        Ok(out)
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    #[must_use]
    pub const fn occupied(&self) -> usize {
        self.occupied
    }

    #[must_use]
    pub fn space_available(&self) -> usize {
        self.storage.len() - self.occupied
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.occupied == self.storage.len()
    }
}
