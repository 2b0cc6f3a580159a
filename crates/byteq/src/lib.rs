//! Blocking byte queue over a fixed-capacity ring buffer.
//!
//! One mutex serializes every operation; two condition variables carry the
//! "data available" and "space available" wakeups. Any number of producer
//! and consumer threads may share a single queue.
//!
//! ```
//! let queue = byteq::ByteQueue::new();
//! queue.configure(8)?;
//! queue.push(b"hi")?;
//! let out = queue.pop(2)?;
//! assert_eq!(&out[..], b"hi");
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::time::Instant;

use bytes::BytesMut;
use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace, warn};

pub use byteq_ring::{AllocError, CapacityError, Empty, RingBuf};

mod error;

pub use error::{PopError, PushError};

struct State {
    ring: RingBuf,
    closed: bool,
}

/// Shared producer/consumer handle. The ring and the closed flag live under
/// one mutex; no field is ever touched outside it.
pub struct ByteQueue {
    state: Mutex<State>,
    data_available: Condvar,
    space_available: Condvar,
}

impl Default for ByteQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteQueue {
    /// Creates an unconfigured queue. `push`/`pop` fail with `NotConfigured`
    /// until [`Self::configure`] sets a capacity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                ring: RingBuf::new(),
                closed: false,
            }),
            data_available: Condvar::new(),
            space_available: Condvar::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Result<Self, AllocError> {
        let queue = Self::new();
        queue.configure(capacity)?;
        Ok(queue)
    }

    /// Resizes the queue, discarding any unread bytes. Both conditions are
    /// broadcast afterwards so blocked callers re-validate against the reset
    /// ring instead of sleeping on a stale predicate.
    pub fn configure(&self, capacity: usize) -> Result<(), AllocError> {
        let mut state = self.state.lock();
        let discarded = state.ring.occupied();
        if discarded > 0 {
            warn!(discarded, "reconfigure discards unread bytes");
        }
        let result = state.ring.configure(capacity);
        debug!(capacity, "configured");
        drop(state);

        self.data_available.notify_all();
        self.space_available.notify_all();
        result
    }

    /// Writes all of `src`, waiting for space as needed. All-or-nothing: no
    /// failure path leaves a partial write behind.
    pub fn push(&self, src: &[u8]) -> Result<(), PushError> {
        self.push_inner(src, None)
    }

    /// [`Self::push`] with a deadline. A timeout has the same contract as
    /// cancellation: the buffer is untouched.
    pub fn push_deadline(&self, src: &[u8], deadline: Instant) -> Result<(), PushError> {
        self.push_inner(src, Some(deadline))
    }

    /// Non-waiting [`Self::push`]; a full queue yields [`PushError::Full`].
    pub fn try_push(&self, src: &[u8]) -> Result<(), PushError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(PushError::Interrupted);
        }
        let capacity = state.ring.capacity();
        if capacity == 0 {
            return Err(PushError::NotConfigured);
        }
        if src.len() > capacity {
            return Err(PushError::Oversized {
                len: src.len(),
                capacity,
            });
        }
        state.ring.write(src).map_err(|err| PushError::Full {
            available: err.available,
        })?;
        drop(state);

        self.data_available.notify_one();
        Ok(())
    }

    fn push_inner(&self, src: &[u8], deadline: Option<Instant>) -> Result<(), PushError> {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return Err(PushError::Interrupted);
            }
            let capacity = state.ring.capacity();
            if capacity == 0 {
                return Err(PushError::NotConfigured);
            }
            if src.len() > capacity {
                return Err(PushError::Oversized {
                    len: src.len(),
                    capacity,
                });
            }
            match state.ring.write(src) {
                Ok(()) => break,
                Err(err) => {
                    trace!(
                        requested = err.requested,
                        available = err.available,
                        "push waiting for space"
                    );
                    match deadline {
                        Some(deadline) => {
                            if self
                                .space_available
                                .wait_until(&mut state, deadline)
                                .timed_out()
                            {
                                return Err(PushError::TimedOut);
                            }
                        }
                        None => self.space_available.wait(&mut state),
                    }
                }
            }
        }
        drop(state);

        self.data_available.notify_one();
        Ok(())
    }

    /// Reads up to `max_len` bytes, waiting while the queue is empty. A short
    /// read is a normal result; callers inspect `len()` of what comes back.
    pub fn pop(&self, max_len: usize) -> Result<BytesMut, PopError> {
        self.pop_with(None, |ring| ring.read(max_len))
    }

    /// [`Self::pop`] with a deadline.
    pub fn pop_deadline(&self, max_len: usize, deadline: Instant) -> Result<BytesMut, PopError> {
        self.pop_with(Some(deadline), |ring| ring.read(max_len))
    }

    /// Reads into a caller-provided buffer, returning the count actually
    /// copied. This is the no-extra-allocation path a framing layer would
    /// drive.
    pub fn pop_into(&self, dst: &mut [u8]) -> Result<usize, PopError> {
        self.pop_with(None, |ring| ring.read_into(dst))
    }

    /// Non-waiting [`Self::pop`]; an empty queue yields [`PopError::Empty`].
    pub fn try_pop(&self, max_len: usize) -> Result<BytesMut, PopError> {
        let mut state = self.state.lock();
        match state.ring.read(max_len) {
            Ok(out) => {
                drop(state);
                self.space_available.notify_one();
                Ok(out)
            }
            Err(Empty) => {
                if state.closed {
                    return Err(PopError::Interrupted);
                }
                if state.ring.capacity() == 0 {
                    return Err(PopError::NotConfigured);
                }
                Err(PopError::Empty)
            }
        }
    }

    fn pop_with<T>(
        &self,
        deadline: Option<Instant>,
        mut read: impl FnMut(&mut RingBuf) -> Result<T, Empty>,
    ) -> Result<T, PopError> {
        let mut state = self.state.lock();
        loop {
            match read(&mut state.ring) {
                Ok(out) => {
                    drop(state);
                    self.space_available.notify_one();
                    return Ok(out);
                }
                Err(Empty) => {
                    // a closed queue still drains; only an empty one refuses
                    if state.closed {
                        return Err(PopError::Interrupted);
                    }
                    if state.ring.capacity() == 0 {
                        return Err(PopError::NotConfigured);
                    }
                    trace!("pop waiting for data");
                    match deadline {
                        Some(deadline) => {
                            if self
                                .data_available
                                .wait_until(&mut state, deadline)
                                .timed_out()
                            {
                                return Err(PopError::TimedOut);
                            }
                        }
                        None => self.data_available.wait(&mut state),
                    }
                }
            }
        }
    }

    /// Closes the queue and wakes every waiter. Blocked and subsequent
    /// `push`es fail with [`PushError::Interrupted`]; `pop` keeps draining
    /// what is already buffered, then fails the same way.
    pub fn close(&self) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        debug!("queue closed");
        drop(state);

        self.data_available.notify_all();
        self.space_available.notify_all();
    }

    #[must_use]
    pub fn occupied(&self) -> usize {
        self.state.lock().ring.occupied()
    }

    #[must_use]
    pub fn space_available(&self) -> usize {
        self.state.lock().ring.space_available()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.state.lock().ring.capacity()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().ring.is_empty()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}
