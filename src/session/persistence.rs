use std::path::{Path, PathBuf};

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::config::WalletKind;
use crate::shared::address::parse_evm_address;

const SESSION_FILE: &str = "etherbank-session.json";
const SESSION_VERSION: u32 = 1;

/// Last connected account, as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    pub version: u32,
    pub wallet_kind: String,
    pub address: String,
    pub chain_id: u64,
    #[serde(default)]
    pub connected_at_sec: u64,
}

impl PersistedSession {
    pub fn new(kind: WalletKind, address: Address, chain_id: u64) -> Self {
        Self {
            version: SESSION_VERSION,
            wallet_kind: kind.as_str().to_string(),
            address: address.to_string(),
            chain_id,
            connected_at_sec: super::now_epoch_secs(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// Store under the platform data dir (`~/.local/share/etherbank` etc.).
    pub fn app_data() -> Self {
        Self::in_dir(app_data_dir())
    }

    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    pub fn save(&self, session: &PersistedSession) -> Result<(), String> {
        std::fs::create_dir_all(&self.dir).map_err(|e| format!("Failed to create dir: {e}"))?;
        let json = serde_json::to_string_pretty(session)
            .map_err(|e| format!("Failed to serialize: {e}"))?;
        let path = self.path();
        std::fs::write(&path, json).map_err(|e| format!("Failed to write: {e}"))?;
        log::info!(
            "[Wallet] Saved session to {:?}: kind={} address={} chainId={}",
            path,
            session.wallet_kind,
            session.address,
            session.chain_id
        );
        Ok(())
    }

    pub fn load(&self) -> Option<PersistedSession> {
        let path = self.path();
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str::<PersistedSession>(&contents) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                log::warn!("[Wallet] Ignoring unreadable session file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Last account for this backend and chain, ignoring anything else on disk.
    pub fn load_for(&self, kind: WalletKind, chain_id: u64) -> Option<Address> {
        let persisted = self.load()?;
        if persisted.wallet_kind != kind.as_str() || persisted.chain_id != chain_id {
            log::debug!(
                "[Wallet] Persisted session is for kind={} chainId={}, wanted kind={} chainId={}",
                persisted.wallet_kind,
                persisted.chain_id,
                kind.as_str(),
                chain_id
            );
            return None;
        }
        match parse_evm_address(&persisted.address, "persisted wallet address") {
            Ok(address) => Some(address),
            Err(e) => {
                log::warn!("[Wallet] {e}");
                None
            }
        }
    }

    pub fn delete(&self) {
        let path = self.path();
        if !path.exists() {
            return;
        }
        match std::fs::remove_file(&path) {
            Ok(_) => log::info!("[Wallet] Removed persisted session file: {:?}", path),
            Err(e) => log::warn!("[Wallet] Failed to remove session file {:?}: {}", path, e),
        }
    }
}

fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("etherbank")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> Address {
        "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed".parse().unwrap()
    }

    #[test]
    fn round_trips_last_account() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SessionStore::in_dir(tmp.path().join("nested"));
        assert!(store.load().is_none());

        store
            .save(&PersistedSession::new(WalletKind::Browser, addr(), 11_155_111))
            .unwrap();
        assert_eq!(store.load_for(WalletKind::Browser, 11_155_111), Some(addr()));

        store.delete();
        assert!(store.load().is_none());
    }

    #[test]
    fn ignores_other_chain_or_backend() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SessionStore::in_dir(tmp.path());
        store
            .save(&PersistedSession::new(WalletKind::LocalKey, addr(), 1))
            .unwrap();
        assert_eq!(store.load_for(WalletKind::Browser, 1), None);
        assert_eq!(store.load_for(WalletKind::LocalKey, 11_155_111), None);
        assert_eq!(store.load_for(WalletKind::LocalKey, 1), Some(addr()));
    }

    #[test]
    fn corrupt_file_reads_as_absent() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(SESSION_FILE), "{not json").unwrap();
        assert!(SessionStore::in_dir(tmp.path()).load().is_none());
    }
}
