use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushError {
    #[error("queue has not been configured with a capacity")]
    NotConfigured,

    /// The payload exceeds the configured capacity outright, so no amount of
    /// draining would ever make room for it.
    #[error("payload of {len} bytes can never fit in a queue of capacity {capacity}")]
    Oversized { len: usize, capacity: usize },

    /// Returned by [`ByteQueue::try_push`](crate::ByteQueue::try_push) in
    /// place of waiting.
    #[error("queue is full ({available} bytes free)")]
    Full { available: usize },

    #[error("timed out waiting for free space")]
    TimedOut,

    /// The queue was closed before or while the call was waiting. Nothing was
    /// written.
    #[error("queue was closed")]
    Interrupted,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopError {
    #[error("queue has not been configured with a capacity")]
    NotConfigured,

    /// Returned by [`ByteQueue::try_pop`](crate::ByteQueue::try_pop) in place
    /// of waiting.
    #[error("queue is empty")]
    Empty,

    #[error("timed out waiting for data")]
    TimedOut,

    /// The queue was closed and holds no more data.
    #[error("queue was closed")]
    Interrupted,
}
