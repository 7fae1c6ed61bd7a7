//! Deferred completion of a grid render pass.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

/// Resolves once a header/body render pass has finished.
///
/// Mutations on the grid happen synchronously; the `Refresh` they return only
/// tells the caller when the render caught up. A dropped sender counts as
/// completion, so a `Refresh` always eventually resolves.
#[derive(Debug)]
pub enum Refresh {
    /// Nothing needed rendering
    Ready,
    /// Waiting for the body to signal the end of its render pass
    Pending(oneshot::Receiver<()>),
}

impl Refresh {
    /// An already-resolved refresh
    pub fn ready() -> Self {
        Refresh::Ready
    }

    /// Create a pending refresh plus the handle the renderer completes
    pub fn pending() -> (RenderDone, Self) {
        let (tx, rx) = oneshot::channel();
        (RenderDone { tx: Some(tx) }, Refresh::Pending(rx))
    }

    /// Check without polling whether the render pass already completed
    pub fn is_ready(&mut self) -> bool {
        match self {
            Refresh::Ready => true,
            Refresh::Pending(rx) => match rx.try_recv() {
                Ok(()) | Err(oneshot::error::TryRecvError::Closed) => {
                    *self = Refresh::Ready;
                    true
                }
                Err(oneshot::error::TryRecvError::Empty) => false,
            },
        }
    }
}

impl Future for Refresh {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();
        match this {
            Refresh::Ready => Poll::Ready(()),
            Refresh::Pending(rx) => {
                let polled = Pin::new(rx).poll(cx);
                if polled.is_ready() {
                    *this = Refresh::Ready;
                    return Poll::Ready(());
                }
                Poll::Pending
            }
        }
    }
}

/// Completion handle held by whoever performs the render pass
#[derive(Debug)]
pub struct RenderDone {
    tx: Option<oneshot::Sender<()>>,
}

impl RenderDone {
    pub fn complete(mut self) {
        if let Some(tx) = self.tx.take() {
            // Receiver may already be gone if the caller dropped its Refresh
            let _ = tx.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ready_resolves_immediately() {
        Refresh::ready().await;
    }

    #[tokio::test]
    async fn test_pending_resolves_after_complete() {
        let (done, mut refresh) = Refresh::pending();
        assert!(!refresh.is_ready());
        done.complete();
        assert!(refresh.is_ready());
        refresh.await;
    }

    #[tokio::test]
    async fn test_dropped_handle_still_resolves() {
        let (done, refresh) = Refresh::pending();
        drop(done);
        refresh.await;
    }
}
