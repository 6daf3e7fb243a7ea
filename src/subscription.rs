use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// A live server-pushed event stream, cancellable at any time.
///
/// Once [`cancel`](Subscription::cancel) is called (or the subscription is
/// dropped), [`next`](Subscription::next) returns `None` and no further event
/// is ever delivered, even if events were already queued. Producers observe the
/// same token and stop forwarding.
pub struct Subscription<T> {
    rx: mpsc::UnboundedReceiver<T>,
    token: CancellationToken,
}

impl<T> Subscription<T> {
    pub fn new(rx: mpsc::UnboundedReceiver<T>, token: CancellationToken) -> Self {
        Subscription { rx, token }
    }

    /// Next event, or `None` when the subscription is cancelled or the
    /// producer side has gone away.
    pub async fn next(&mut self) -> Option<T> {
        // Biased so a cancellation seen before the call wins over queued events.
        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            event = self.rx.recv() => event,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_queued_events_in_order() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut sub = Subscription::new(rx, CancellationToken::new());
        tx.send(1).unwrap();
        tx.send(2).unwrap();
        assert_eq!(sub.next().await, Some(1));
        assert_eq!(sub.next().await, Some(2));
    }

    #[tokio::test]
    async fn cancelled_subscription_drops_queued_events() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut sub = Subscription::new(rx, CancellationToken::new());
        tx.send(1).unwrap();
        sub.cancel();
        assert!(sub.is_cancelled());
        assert_eq!(sub.next().await, None);
    }

    #[tokio::test]
    async fn closed_sender_ends_the_stream() {
        let (tx, rx) = mpsc::unbounded_channel::<u8>();
        let mut sub = Subscription::new(rx, CancellationToken::new());
        drop(tx);
        assert_eq!(sub.next().await, None);
    }
}
