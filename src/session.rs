//! Wallet session: who is connected and how transactions get approved.
//!
//! The bank view only sees the [`WalletSession`] trait. Two backends exist:
//! - [`BrowserWalletSession`]: opens the wallet page in the system browser and
//!   waits for a callback POST (connect and every transaction approval)
//! - [`LocalKeySession`]: signs in-process with a local key via `ethers`
//!
//! All trait methods block; callers run them through `smol::unblock`.

mod browser;
mod callback_flow;
mod local_key;
mod persistence;

use std::sync::Arc;

use alloy_primitives::{Address, B256};

use crate::config::{AppConfig, WalletKind};
use crate::contract::ContractCall;

pub use browser::BrowserWalletSession;
pub use local_key::LocalKeySession;
pub use persistence::{PersistedSession, SessionStore};

/// Read-only view of the session as the UI consumes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub address: Option<Address>,
}

impl SessionSnapshot {
    pub fn connected(address: Address) -> Self {
        Self {
            address: Some(address),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }
}

pub trait WalletSession: Send + Sync {
    fn kind(&self) -> WalletKind;

    fn snapshot(&self) -> SessionSnapshot;

    /// Re-establish the last connected account from disk, if still valid.
    fn restore(&self) -> Option<Address> {
        None
    }

    fn connect(&self) -> Result<Address, String>;

    fn disconnect(&self);

    /// Resolves with the transaction hash once the wallet approved and
    /// broadcast the call. User rejection and network failures are `Err`.
    fn submit_transaction(&self, call: &ContractCall) -> Result<B256, String>;
}

pub fn build_session(config: &AppConfig, store: SessionStore) -> Result<Arc<dyn WalletSession>, String> {
    let session: Arc<dyn WalletSession> = match config.wallet_kind {
        WalletKind::Browser => Arc::new(BrowserWalletSession::new(config, store)?),
        WalletKind::LocalKey => Arc::new(LocalKeySession::new(config, store)?),
    };
    Ok(session)
}

fn now_epoch_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
