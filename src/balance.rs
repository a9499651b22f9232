//! Cached, address-keyed contract balance plus the manual refetch trigger.

use alloy_primitives::{Address, U256};
use smol::channel::{Receiver, Sender, TrySendError};

/// Latest known balance for the tracked owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceCache {
    owner: Option<Address>,
    value: Option<U256>,
    last_error: Option<String>,
}

impl BalanceCache {
    pub fn owner(&self) -> Option<Address> {
        self.owner
    }

    pub fn value(&self) -> Option<U256> {
        self.value
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Point the cache at `owner`. A different owner drops the cached value.
    pub fn track(&mut self, owner: Option<Address>) -> bool {
        if self.owner == owner {
            return false;
        }
        self.owner = owner;
        self.value = None;
        self.last_error = None;
        true
    }

    /// Apply a read for `owner`. Reads for an owner that is no longer tracked
    /// are dropped; a failed read keeps the previous value.
    pub fn apply(&mut self, owner: Address, result: Result<U256, String>) -> bool {
        if self.owner != Some(owner) {
            log::debug!("[Balance] dropping read for stale owner {}", owner);
            return false;
        }
        match result {
            Ok(value) => {
                let changed = self.value != Some(value) || self.last_error.is_some();
                self.value = Some(value);
                self.last_error = None;
                changed
            }
            Err(err) => {
                log::warn!("[Balance] balances({}) read failed: {}", owner, err);
                self.last_error = Some(err);
                true
            }
        }
    }
}

/// Cloneable trigger that wakes the balance poll loop for an immediate read.
#[derive(Debug, Clone)]
pub struct RefetchHandle {
    tx: Sender<()>,
}

impl RefetchHandle {
    /// Request a re-read. Requests made while one is already queued coalesce.
    pub fn refetch(&self) {
        match self.tx.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => {}
            Err(TrySendError::Closed(())) => {
                log::debug!("[Balance] refetch requested after the poller stopped");
            }
        }
    }
}

pub fn refetch_channel() -> (RefetchHandle, Receiver<()>) {
    let (tx, rx) = smol::channel::bounded(1);
    (RefetchHandle { tx }, rx)
}

/// Wait until the next poll is due: either `interval` elapsed or a refetch
/// was requested. A closed channel falls back to the interval alone.
pub async fn wait_for_next_read(rx: &Receiver<()>, interval: std::time::Duration) {
    let tick = async {
        smol::Timer::after(interval).await;
    };
    let manual = async {
        if rx.recv().await.is_err() {
            smol::future::pending::<()>().await;
        }
    };
    smol::future::or(tick, manual).await;
}
