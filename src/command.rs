//! Deferred units of work that resolve to at most one message.

use core::fmt::Display;
use core::future::Future;

use futures::future::{self, BoxFuture};
use futures::FutureExt;

use crate::message::{CommandError, Message};

/// Deferred description of side-effecting work.
///
/// Commands are returned from [`ProgramLogic::init`](crate::ProgramLogic::init)
/// and [`ProgramLogic::update`](crate::ProgramLogic::update) alongside the new
/// model. Building one is cheap and synchronous: the wrapped future is not
/// polled until the program schedules it on its [`Spawner`](crate::Spawner),
/// so every parameter is captured at creation time and all I/O happens inside
/// the task.
///
/// A task command produces at most one [`Message`]. [`Command::batch`] groups
/// several commands that are scheduled independently.
///
/// # Example
///
/// ```rust
/// use mvu_program::{Command, CommandError};
///
/// #[derive(Debug, Clone)]
/// enum Msg { Status(u16) }
///
/// fn check(url: String) -> Command<Msg> {
///     Command::attempt(async move {
///         if url.is_empty() {
///             Err(CommandError::failed("no url"))
///         } else {
///             Ok(Msg::Status(200))
///         }
///     })
/// }
///
/// let cmd = Command::batch([check("https://example.com".into()), Command::quit()]);
/// assert!(!cmd.is_quit());
/// ```
pub struct Command<M>(pub(crate) Inner<M>);

pub(crate) enum Inner<M> {
    Task(BoxFuture<'static, Option<Message<M>>>),
    Batch(Vec<Command<M>>),
    Quit,
}

impl<M: Send + 'static> Command<M> {
    /// Run `future` and deliver its output as [`Message::App`].
    pub fn perform<F>(future: F) -> Self
    where
        F: Future<Output = M> + Send + 'static,
    {
        Self::task(future.map(|msg| Some(Message::App(msg))))
    }

    /// Run `future` and deliver whatever message it yields.
    pub fn deliver<F>(future: F) -> Self
    where
        F: Future<Output = Message<M>> + Send + 'static,
    {
        Self::task(future.map(Some))
    }

    /// Run `future`; `None` means the command has nothing to report.
    pub fn optional<F>(future: F) -> Self
    where
        F: Future<Output = Option<M>> + Send + 'static,
    {
        Self::task(future.map(|msg| msg.map(Message::App)))
    }

    /// Run a fallible `future`. An `Err` becomes [`Message::Error`].
    pub fn attempt<F, E>(future: F) -> Self
    where
        F: Future<Output = Result<M, E>> + Send + 'static,
        E: Display,
    {
        Self::task(future.map(|result| {
            Some(match result {
                Ok(msg) => Message::App(msg),
                Err(error) => Message::Error(CommandError::Failed(error.to_string())),
            })
        }))
    }

    /// Deliver `msg` as soon as the command is scheduled.
    pub fn message(msg: M) -> Self {
        Self::task(future::ready(Some(Message::App(msg))))
    }

    /// Ask the program to stop.
    ///
    /// The loop stops as soon as it schedules this command. It is never spawned.
    pub fn quit() -> Self {
        Command(Inner::Quit)
    }

    /// Combine several commands.
    ///
    /// Members are scheduled in order, each as its own task. Scheduling stops
    /// at the first [`Command::quit`].
    pub fn batch<I>(commands: I) -> Self
    where
        I: IntoIterator<Item = Command<M>>,
    {
        Command(Inner::Batch(commands.into_iter().collect()))
    }

    /// Whether this command is the quit instruction itself.
    pub fn is_quit(&self) -> bool {
        matches!(self.0, Inner::Quit)
    }

    /// Lift the command into another application message type.
    pub fn map<N, F>(self, f: F) -> Command<N>
    where
        N: Send + 'static,
        F: Fn(M) -> N + Clone + Send + 'static,
    {
        match self.0 {
            Inner::Task(future) => Command(Inner::Task(
                future.map(move |msg| msg.map(|msg| msg.map(f))).boxed(),
            )),
            Inner::Batch(commands) => Command(Inner::Batch(
                commands
                    .into_iter()
                    .map(|command| command.map(f.clone()))
                    .collect(),
            )),
            Inner::Quit => Command(Inner::Quit),
        }
    }

    /// Bound every task in this command by `duration`.
    ///
    /// An expired task yields [`CommandError::TimedOut`] instead of hanging.
    /// Needs a Tokio timer, so the program must be driven by a Tokio-backed
    /// spawner.
    ///
    /// # Panics
    ///
    /// On a spawner without a Tokio runtime, such as
    /// [`ThreadPoolSpawner`](crate::ThreadPoolSpawner), arming the timer
    /// panics when the task is first polled. The panic is contained like any
    /// other command panic: `update` receives
    /// `Message::Error(CommandError::Panicked(..))`, never
    /// [`CommandError::TimedOut`], and the wrapped work does not run.
    #[cfg(feature = "tokio")]
    pub fn timeout(self, duration: core::time::Duration) -> Self {
        match self.0 {
            // The timer is armed inside the task, not on the loop thread.
            Inner::Task(future) => Self::task(async move {
                match tokio::time::timeout(duration, future).await {
                    Ok(msg) => msg,
                    Err(_) => Some(Message::Error(CommandError::TimedOut(duration))),
                }
            }),
            Inner::Batch(commands) => Command(Inner::Batch(
                commands
                    .into_iter()
                    .map(|command| command.timeout(duration))
                    .collect(),
            )),
            Inner::Quit => Command(Inner::Quit),
        }
    }

    fn task<F>(future: F) -> Self
    where
        F: Future<Output = Option<Message<M>>> + Send + 'static,
    {
        Command(Inner::Task(future.boxed()))
    }
}

impl<M> core::fmt::Debug for Command<M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.0 {
            Inner::Task(_) => f.write_str("Command::Task"),
            Inner::Batch(commands) => f.debug_tuple("Command::Batch").field(commands).finish(),
            Inner::Quit => f.write_str("Command::Quit"),
        }
    }
}
