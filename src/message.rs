//! Messages delivered to the program loop.

use core::time::Duration;

use thiserror::Error;

/// Something that happened, delivered to [`ProgramLogic::update`](crate::ProgramLogic::update).
///
/// The runtime owns a small closed set of variants. Applications extend it
/// through the [`App`](Message::App) payload, so adding variants never requires
/// touching the runtime.
///
/// # Example
///
/// ```rust
/// use mvu_program::{Key, Message};
///
/// #[derive(Debug, Clone, PartialEq)]
/// enum StatusMsg { Received(u16) }
///
/// let msg: Message<StatusMsg> = StatusMsg::Received(200).into();
/// assert_eq!(msg, Message::App(StatusMsg::Received(200)));
/// assert!(Message::<StatusMsg>::Key(Key::Interrupt).is_interrupt());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message<M> {
    /// Terminates the loop. Never reaches `update`.
    Quit,
    /// A decoded key press from an input source.
    Key(Key),
    /// A command failed.
    Error(CommandError),
    /// Application-defined payload.
    App(M),
}

impl<M> Message<M> {
    /// Static label for the variant, suitable for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Quit => "quit",
            Message::Key(_) => "key",
            Message::Error(_) => "error",
            Message::App(_) => "app",
        }
    }

    /// Whether this is the pure termination signal.
    pub fn is_quit(&self) -> bool {
        matches!(self, Message::Quit)
    }

    /// Whether this is a Ctrl+C key event.
    pub fn is_interrupt(&self) -> bool {
        matches!(self, Message::Key(key) if key.is_interrupt())
    }

    /// Convert the application payload, leaving runtime variants untouched.
    pub fn map<N, F>(self, f: F) -> Message<N>
    where
        F: FnOnce(M) -> N,
    {
        match self {
            Message::Quit => Message::Quit,
            Message::Key(key) => Message::Key(key),
            Message::Error(error) => Message::Error(error),
            Message::App(msg) => Message::App(f(msg)),
        }
    }
}

impl<M> From<M> for Message<M> {
    fn from(msg: M) -> Self {
        Message::App(msg)
    }
}

/// A key event produced by an input source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Tab,
    Up,
    Down,
    Left,
    Right,
    /// Ctrl+C.
    Interrupt,
}

impl Key {
    pub fn is_interrupt(&self) -> bool {
        matches!(self, Key::Interrupt)
    }
}

/// Failure of a command, carried back to the loop as [`Message::Error`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The command reported an application-level failure.
    #[error("{0}")]
    Failed(String),

    /// The command did not finish within its own deadline.
    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    /// The command's task panicked and the scheduler contained it.
    #[error("command panicked: {0}")]
    Panicked(String),
}

impl CommandError {
    pub fn failed(detail: impl Into<String>) -> Self {
        CommandError::Failed(detail.into())
    }
}
