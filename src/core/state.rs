use tokio::sync::watch;

/// Observable holder of an immutable snapshot. Every publish replaces the
/// snapshot and wakes subscribers.
pub struct StateHolder<T> {
    sender: watch::Sender<T>,
}

impl<T: Clone + PartialEq + Send + Sync> StateHolder<T> {
    pub fn new(initial: T) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    pub fn snapshot(&self) -> T {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.sender.subscribe()
    }

    /// Publishes `value`. Subscribers are only notified when it differs from
    /// the current snapshot. Returns whether a notification was sent.
    pub fn publish(&self, value: T) -> bool {
        self.sender.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        })
    }
}

impl<T: Clone + PartialEq + Send + Sync + Default> Default for StateHolder<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
