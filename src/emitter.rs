//! Producer handle for the program's message channel.

use flume::{Sender, TrySendError};

use crate::config::OverflowPolicy;
use crate::message::Message;

/// Handle that pushes messages onto a program's channel.
///
/// Clone it into input sources or background producers. Every clone feeds
/// the same loop, and messages are processed in the order they arrive.
///
/// `Emitter` wraps a `flume` sender, making it cheap to clone and safe to use
/// from any thread. When the channel is bounded, the program's
/// [`OverflowPolicy`] decides whether a full queue makes the producer wait
/// or drops the message.
///
/// Once the program has stopped, emitted messages are silently discarded.
///
/// # Example
///
/// ```rust
/// use mvu_program::{create_test_spawner, from_fns, Command, Key, Message, TestProgram, TestRenderer};
///
/// let logic = from_fns(
///     || (0u32, None),
///     |presses: u32, msg: Message<()>| match msg {
///         Message::Key(Key::Interrupt) => (presses, Some(Command::quit())),
///         Message::Key(_) => (presses + 1, None),
///         _ => (presses, None),
///     },
///     |presses: &u32| format!("{presses} keys"),
/// );
///
/// let mut driver = TestProgram::new(logic, TestRenderer::new(), create_test_spawner())
///     .run()
///     .unwrap();
/// let input = driver.emitter();
/// input.emit(Message::Key(Key::Char('a')));
/// input.emit(Message::Key(Key::Interrupt));
/// driver.process_messages().unwrap();
///
/// assert!(driver.is_finished());
/// assert_eq!(driver.model(), Some(&1));
/// ```
pub struct Emitter<M> {
    sender: Sender<Message<M>>,
    overflow: OverflowPolicy,
}

impl<M> Clone for Emitter<M> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            overflow: self.overflow,
        }
    }
}

impl<M> Emitter<M> {
    pub(crate) fn new(sender: Sender<Message<M>>, overflow: OverflowPolicy) -> Self {
        Self { sender, overflow }
    }

    /// Emit a message from synchronous code.
    ///
    /// Under [`OverflowPolicy::Block`] this blocks the calling thread while
    /// the channel is full. Async producers should use
    /// [`emit_async`](Self::emit_async) instead.
    pub fn emit(&self, message: Message<M>) {
        match self.overflow {
            OverflowPolicy::Block => {
                self.sender.send(message).ok();
            }
            OverflowPolicy::DropNewest => self.try_emit(message),
        }
    }

    /// Emit a message, yielding instead of blocking while the channel is full.
    pub async fn emit_async(&self, message: Message<M>) {
        match self.overflow {
            OverflowPolicy::Block => {
                self.sender.send_async(message).await.ok();
            }
            OverflowPolicy::DropNewest => self.try_emit(message),
        }
    }

    fn try_emit(&self, message: Message<M>) {
        match self.sender.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(message)) => {
                tracing::warn!(kind = message.kind(), "message channel full, dropping message");
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}
