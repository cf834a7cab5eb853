//! Executors that run commands off the loop thread.

use std::io;

use futures::executor::ThreadPool;
use futures::future::BoxFuture;
use futures::task::{SpawnError, SpawnExt};

#[cfg(any(test, feature = "testing"))]
use std::collections::VecDeque;

#[cfg(any(test, feature = "testing"))]
use portable_atomic_util::Arc;
#[cfg(any(test, feature = "testing"))]
use spin::Mutex;

/// A spawner trait for executing command tasks on an async runtime.
///
/// This abstraction allows you to use whatever concurrency model you want
/// (a futures thread pool, tokio, async-std, ...). The program never awaits
/// what it spawns.
///
/// Function pointers and closures automatically implement this trait via the
/// blanket implementation and are assumed to always accept the task.
pub trait Spawner {
    /// Spawn a future. An `Err` is a runtime fault and stops the program.
    fn spawn(&self, future: BoxFuture<'static, ()>) -> Result<(), SpawnError>;
}

/// Implement Spawner for any callable type that matches the signature.
///
/// This includes function pointers, closures, and function items.
impl<F> Spawner for F
where
    F: Fn(BoxFuture<'static, ()>),
{
    fn spawn(&self, future: BoxFuture<'static, ()>) -> Result<(), SpawnError> {
        self(future);
        Ok(())
    }
}

/// Runs commands on a `futures` thread pool.
///
/// This is the default choice for programs that do not otherwise run an
/// async runtime.
#[derive(Clone)]
pub struct ThreadPoolSpawner(ThreadPool);

impl ThreadPoolSpawner {
    /// Create a pool with one worker per CPU.
    pub fn new() -> io::Result<Self> {
        ThreadPool::new().map(Self)
    }

    /// Create a pool with a fixed number of workers.
    pub fn with_workers(workers: usize) -> io::Result<Self> {
        ThreadPool::builder()
            .pool_size(workers.max(1))
            .name_prefix("mvu-command-")
            .create()
            .map(Self)
    }
}

impl From<ThreadPool> for ThreadPoolSpawner {
    fn from(pool: ThreadPool) -> Self {
        Self(pool)
    }
}

impl Spawner for ThreadPoolSpawner {
    fn spawn(&self, future: BoxFuture<'static, ()>) -> Result<(), SpawnError> {
        self.0.spawn(future)
    }
}

/// Runs commands on a Tokio runtime.
///
/// Required for [`Command::timeout`](crate::Command::timeout).
#[cfg(feature = "tokio")]
#[derive(Clone)]
pub struct TokioSpawner(tokio::runtime::Handle);

#[cfg(feature = "tokio")]
impl TokioSpawner {
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self(handle)
    }

    /// Spawner for the runtime the caller is currently inside of.
    ///
    /// Fails with a shutdown error when called outside a Tokio runtime.
    pub fn current() -> Result<Self, SpawnError> {
        tokio::runtime::Handle::try_current()
            .map(Self)
            .map_err(|_| SpawnError::shutdown())
    }
}

#[cfg(feature = "tokio")]
impl Spawner for TokioSpawner {
    fn spawn(&self, future: BoxFuture<'static, ()>) -> Result<(), SpawnError> {
        // Detached: the join handle is dropped on purpose.
        drop(self.0.spawn(future));
        Ok(())
    }
}

#[cfg(any(test, feature = "testing"))]
/// Test spawner that queues tasks until the test releases them.
///
/// Only available with the `testing` feature or during tests.
///
/// Use it to decide exactly when, and in which order, commands complete
/// relative to other messages. Released tasks run to completion on the
/// calling thread, so pair it with a [`TestProgram`](crate::TestProgram),
/// whose channel never makes a released task wait for room.
#[derive(Clone)]
pub struct DeferredSpawner {
    queue: Arc<Mutex<VecDeque<BoxFuture<'static, ()>>>>,
}

#[cfg(any(test, feature = "testing"))]
impl Default for DeferredSpawner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "testing"))]
impl Spawner for DeferredSpawner {
    fn spawn(&self, future: BoxFuture<'static, ()>) -> Result<(), SpawnError> {
        self.queue.lock().push_back(future);
        Ok(())
    }
}

#[cfg(any(test, feature = "testing"))]
impl DeferredSpawner {
    pub fn new() -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Number of tasks waiting to be released.
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Run the oldest queued task. Returns `false` if none was queued.
    pub fn run_next(&self) -> bool {
        let next = self.queue.lock().pop_front();
        Self::run(next)
    }

    /// Run the most recently queued task, letting later work overtake earlier work.
    pub fn run_latest(&self) -> bool {
        let latest = self.queue.lock().pop_back();
        Self::run(latest)
    }

    /// Run queued tasks until none remain. Returns how many ran.
    pub fn run_all(&self) -> usize {
        let mut ran = 0;
        while self.run_next() {
            ran += 1;
        }
        ran
    }

    fn run(task: Option<BoxFuture<'static, ()>>) -> bool {
        match task {
            Some(task) => {
                futures::executor::block_on(task);
                true
            }
            None => false,
        }
    }
}
