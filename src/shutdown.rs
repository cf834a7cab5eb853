//! Best-effort cancellation of in-flight work when a program stops.

use core::future::Future;
use core::pin::Pin;
use core::sync::atomic::{AtomicBool, Ordering};
use core::task::{Context, Poll};

use futures::channel::oneshot;
use futures::future::Shared;
use futures::FutureExt;
use portable_atomic_util::Arc;

/// Fires the paired [`ShutdownSignal`]s. Dropping the trigger fires it too.
pub(crate) struct ShutdownTrigger {
    fired: Arc<AtomicBool>,
    sender: Option<oneshot::Sender<()>>,
}

/// Resolves once the program has stopped.
///
/// Cloned into every spawned task so the task can abandon its work.
#[derive(Clone)]
pub(crate) struct ShutdownSignal {
    fired: Arc<AtomicBool>,
    notified: Shared<oneshot::Receiver<()>>,
}

pub(crate) fn channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (sender, receiver) = oneshot::channel();
    let fired = Arc::new(AtomicBool::new(false));

    (
        ShutdownTrigger {
            fired: fired.clone(),
            sender: Some(sender),
        },
        ShutdownSignal {
            fired,
            notified: receiver.shared(),
        },
    )
}

impl ShutdownTrigger {
    pub(crate) fn fire(&mut self) {
        self.fired.store(true, Ordering::Release);
        if let Some(sender) = self.sender.take() {
            // Waiters resolve whether or not the send lands.
            sender.send(()).ok();
        }
    }
}

impl Drop for ShutdownTrigger {
    fn drop(&mut self) {
        self.fire();
    }
}

impl ShutdownSignal {
    pub(crate) fn is_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

impl Future for ShutdownSignal {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        self.notified.poll_unpin(cx).map(|_| ())
    }
}
