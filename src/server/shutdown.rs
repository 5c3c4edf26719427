//! Server-wide shutdown signalling.
//!
//! `stop()` fires the notifier; the acceptor, every control loop and every
//! data-transfer task hold a [`Listener`] and wind down when it fires. Each
//! listener also carries a completion sender whose drop lets `linger` observe
//! that all tasks have finished.

use std::sync::Mutex as StdMutex;

use tokio::sync::{broadcast, mpsc, Mutex};

pub struct Notifier {
    trigger_tx: StdMutex<Option<broadcast::Sender<()>>>,
    done_tx: StdMutex<Option<mpsc::Sender<()>>>,
    done_rx: Mutex<mpsc::Receiver<()>>,
}

impl Notifier {
    pub fn new() -> Notifier {
        let (trigger_tx, _) = broadcast::channel(1);
        let (done_tx, done_rx) = mpsc::channel(1);
        Notifier {
            trigger_tx: StdMutex::new(Some(trigger_tx)),
            done_tx: StdMutex::new(Some(done_tx)),
            done_rx: Mutex::new(done_rx),
        }
    }

    // Fires the shutdown signal. Dropping the broadcast sender wakes every
    // subscribed listener; dropping our completion sender lets linger()
    // terminate once the listeners' clones are gone too.
    pub fn notify(&self) {
        drop(self.trigger_tx.lock().expect("shutdown lock poisoned").take());
        drop(self.done_tx.lock().expect("shutdown lock poisoned").take());
    }

    // Waits until every task holding a Listener has dropped it.
    pub async fn linger(&self) {
        let _ = self.done_rx.lock().await.recv().await;
    }

    pub fn subscribe(&self) -> Listener {
        let trigger = self.trigger_tx.lock().expect("shutdown lock poisoned");
        let done = self.done_tx.lock().expect("shutdown lock poisoned");
        Listener {
            fired: trigger.is_none(),
            trigger_rx: trigger.as_ref().map(|tx| tx.subscribe()),
            _done_tx: done.clone(),
        }
    }
}

pub struct Listener {
    fired: bool,
    trigger_rx: Option<broadcast::Receiver<()>>,
    // Held only so its drop marks this task as finished.
    _done_tx: Option<mpsc::Sender<()>>,
}

impl Listener {
    // Resolves when shutdown is requested; immediately if it already was.
    pub async fn listen(&mut self) {
        if self.fired {
            return;
        }
        if let Some(rx) = self.trigger_rx.as_mut() {
            // Only the sender drop ever reaches us; the payload is irrelevant.
            let _ = rx.recv().await;
        }
        self.fired = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn listeners_fire_on_notify() {
        let notifier = Notifier::new();
        let mut listener = notifier.subscribe();
        notifier.notify();
        // Must resolve without external help.
        listener.listen().await;
        listener.listen().await;
    }

    #[tokio::test]
    async fn linger_waits_for_listeners() {
        let notifier = std::sync::Arc::new(Notifier::new());
        let mut listener = notifier.subscribe();
        let task = tokio::spawn(async move {
            listener.listen().await;
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            drop(listener);
        });
        notifier.notify();
        notifier.linger().await;
        task.await.unwrap();
    }

    #[tokio::test]
    async fn late_subscription_fires_immediately() {
        let notifier = Notifier::new();
        notifier.notify();
        let mut listener = notifier.subscribe();
        listener.listen().await;
    }
}
