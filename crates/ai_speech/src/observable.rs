//! Mutex-guarded state mirrored into a watch channel

use parking_lot::Mutex;
use tokio::sync::watch;

/// State that publishes a snapshot after every update
#[derive(Debug)]
pub(crate) struct Published<T> {
    state: Mutex<T>,
    tx: watch::Sender<T>,
}

impl<T: Clone> Published<T> {
    pub(crate) fn new(initial: T) -> Self {
        let (tx, _) = watch::channel(initial.clone());
        Self {
            state: Mutex::new(initial),
            tx,
        }
    }

    /// Apply `f` under the lock, then publish the resulting snapshot
    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let (result, snapshot) = {
            let mut state = self.state.lock();
            let result = f(&mut state);
            (result, state.clone())
        };
        self.tx.send_replace(snapshot);
        result
    }

    pub(crate) fn get(&self) -> T {
        self.state.lock().clone()
    }

    /// Read a projection without cloning the whole state
    pub(crate) fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.state.lock())
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_publishes_snapshot() {
        let published = Published::new(0_u32);
        let rx = published.subscribe();

        let returned = published.update(|n| {
            *n += 2;
            *n * 10
        });

        assert_eq!(returned, 20);
        assert_eq!(*rx.borrow(), 2);
        assert_eq!(published.get(), 2);
        assert!(published.read(|n| *n == 2));
    }
}
