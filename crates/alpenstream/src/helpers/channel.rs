use crossbeam_channel::{unbounded, Receiver as CbReceiver, Sender as CbSender};
use std::time::Duration;

pub use crossbeam_channel::RecvTimeoutError;

pub struct Sender<T> {
    inner: CbSender<T>,
}

pub struct Receiver<T> {
    inner: CbReceiver<T>,
}

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        Sender {
            inner: self.inner.clone(),
        }
    }
}

pub fn unbounded_channel<T>() -> (Sender<T>, Receiver<T>) {
    let (tx, rx) = unbounded();
    (Sender { inner: tx }, Receiver { inner: rx })
}

impl<T> Sender<T> {
    pub fn send(&self, item: T) -> Result<(), ()> {
        self.inner.send(item).map_err(|_| ())
    }
}

impl<T> Receiver<T> {
    pub fn recv(&self) -> Result<T, ()> {
        self.inner.recv().map_err(|_| ())
    }

    pub fn try_recv(&self) -> Result<T, ()> {
        self.inner.try_recv().map_err(|_| ())
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<T, RecvTimeoutError> {
        self.inner.recv_timeout(timeout)
    }
}
