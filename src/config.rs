//! Program configuration.

/// Capacity used by [`ProgramConfig::default`].
pub const DEFAULT_CAPACITY: usize = 1024;

/// What a producer does when the bounded message channel is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Wait until the loop makes room. Async producers yield, sync producers block.
    #[default]
    Block,
    /// Discard the incoming message and log a warning.
    DropNewest,
}

/// Tuning for the message channel between producers and the loop.
///
/// ```rust
/// use mvu_program::{OverflowPolicy, ProgramConfig};
///
/// let config = ProgramConfig::default()
///     .with_capacity(64)
///     .with_overflow(OverflowPolicy::DropNewest);
/// assert_eq!(config.capacity, Some(64));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramConfig {
    /// Channel bound. `None` lets the queue grow without limit.
    pub capacity: Option<usize>,
    /// Behavior of producers when a bounded channel is full.
    pub overflow: OverflowPolicy,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            capacity: Some(DEFAULT_CAPACITY),
            overflow: OverflowPolicy::Block,
        }
    }
}

impl ProgramConfig {
    /// An unbounded channel. The overflow policy never applies.
    pub fn unbounded() -> Self {
        Self {
            capacity: None,
            ..Self::default()
        }
    }

    /// Bound the channel. Zero is raised to one so a producer never needs a
    /// rendezvous with the loop.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity.max(1));
        self
    }

    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    pub(crate) fn channel<T>(&self) -> (flume::Sender<T>, flume::Receiver<T>) {
        match self.capacity {
            Some(capacity) => flume::bounded(capacity.max(1)),
            None => flume::unbounded(),
        }
    }
}
