//! crates/ignite_core/src/debounce.rs
//!
//! A small debouncer for autosaving free-text fields.
//!
//! Every `push` replaces the pending value and restarts the timer. When the
//! timer runs out the latest value is written once. `flush` writes the pending
//! value right away, which is what a field losing focus should call.

use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Async writer invoked with each settled value.
pub type DebounceSink<T> = Arc<dyn Fn(T) -> BoxFuture<'static, ()> + Send + Sync>;

struct Pending<T> {
    value: Option<T>,
    timer: Option<CancellationToken>,
}

pub struct Debouncer<T> {
    delay: Duration,
    sink: DebounceSink<T>,
    pending: Arc<Mutex<Pending<T>>>,
    // Held across each sink call so writes land in the order values were taken.
    write_lock: Arc<Mutex<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration, sink: DebounceSink<T>) -> Self {
        Self {
            delay,
            sink,
            pending: Arc::new(Mutex::new(Pending {
                value: None,
                timer: None,
            })),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn has_pending(&self) -> bool {
        self.pending.lock().await.value.is_some()
    }

    /// True when nothing is queued, no timer is running and no write is in flight.
    /// A contended lock counts as busy.
    pub fn is_idle(&self) -> bool {
        match self.pending.try_lock() {
            Ok(state) => {
                state.value.is_none() && state.timer.is_none() && self.write_lock.try_lock().is_ok()
            }
            Err(_) => false,
        }
    }

    /// Replaces the pending value and restarts the countdown.
    pub async fn push(&self, value: T) {
        let token = CancellationToken::new();
        {
            let mut pending = self.pending.lock().await;
            if let Some(previous) = pending.timer.replace(token.clone()) {
                previous.cancel();
            }
            pending.value = Some(value);
        }

        let delay = self.delay;
        let sink = self.sink.clone();
        let pending = self.pending.clone();
        let write_lock = self.write_lock.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let (value, _write) = {
                        let mut state = pending.lock().await;
                        // A push or flush may have won the race for the lock.
                        if token.is_cancelled() {
                            return;
                        }
                        state.timer = None;
                        (state.value.take(), write_lock.lock_owned().await)
                    };
                    if let Some(value) = value {
                        sink(value).await;
                    }
                }
            }
        });
    }

    /// Writes the pending value now and cancels the countdown.
    /// Does nothing when no value is pending.
    pub async fn flush(&self) {
        let (value, _write) = {
            let mut state = self.pending.lock().await;
            if let Some(timer) = state.timer.take() {
                timer.cancel();
            }
            (state.value.take(), self.write_lock.clone().lock_owned().await)
        };
        if let Some(value) = value {
            (self.sink)(value).await;
        }
    }
}
