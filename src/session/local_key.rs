use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

use alloy_primitives::{Address, B256};
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{
    Address as EthersAddress, BlockId, Bytes as EthersBytes, TransactionRequest,
    U256 as EthersU256,
};

use super::{PersistedSession, SessionSnapshot, SessionStore, WalletSession};
use crate::config::{AppConfig, WalletKind};
use crate::contract::ContractCall;

const LOCAL_KEY_DIR: &str = "local_keys";
const LOCAL_KEY_FILE: &str = "default.key";

/// Signs in-process with a secp256k1 key from `ETHERBANK_PRIVATE_KEY` or a
/// key file generated on first connect.
pub struct LocalKeySession {
    runtime: tokio::runtime::Runtime,
    rpc_url: String,
    chain_id: u64,
    configured_key: Option<String>,
    store: SessionStore,
    wallet: Mutex<Option<LocalWallet>>,
}

impl LocalKeySession {
    pub fn new(config: &AppConfig, store: SessionStore) -> Result<Self, String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {e}"))?;
        Ok(Self {
            runtime,
            rpc_url: config.rpc_url.clone(),
            chain_id: config.chain_id,
            configured_key: config.private_key.clone(),
            store,
            wallet: Mutex::new(None),
        })
    }

    fn load_wallet(&self) -> Result<LocalWallet, String> {
        let key_hex = match self.configured_key.as_deref() {
            Some(key) => normalize_private_key_hex(key)?,
            None => load_or_create_private_key_hex(&self.store.dir().join(LOCAL_KEY_DIR))?,
        };
        LocalWallet::from_str(&key_hex)
            .map(|wallet| wallet.with_chain_id(self.chain_id))
            .map_err(|e| format!("Invalid local private key: {e}"))
    }

    fn current(&self) -> Option<LocalWallet> {
        self.wallet
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    fn set_current(&self, wallet: Option<LocalWallet>) {
        *self.wallet.lock().unwrap_or_else(|p| p.into_inner()) = wallet;
    }
}

impl WalletSession for LocalKeySession {
    fn kind(&self) -> WalletKind {
        WalletKind::LocalKey
    }

    fn snapshot(&self) -> SessionSnapshot {
        self.current()
            .map(|wallet| SessionSnapshot::connected(from_ethers_address(wallet.address())))
            .unwrap_or_default()
    }

    fn restore(&self) -> Option<Address> {
        let remembered = self.store.load_for(WalletKind::LocalKey, self.chain_id)?;
        let wallet = match self.load_wallet() {
            Ok(wallet) => wallet,
            Err(e) => {
                log::warn!("[Wallet] Could not restore local key session: {}", e);
                return None;
            }
        };
        let address = from_ethers_address(wallet.address());
        if address != remembered {
            log::warn!(
                "[Wallet] Local key is {} but session file remembers {}; staying disconnected",
                address,
                remembered
            );
            return None;
        }
        self.set_current(Some(wallet));
        log::info!("[Wallet] Restored local key session for {}", address);
        Some(address)
    }

    fn connect(&self) -> Result<Address, String> {
        let wallet = self.load_wallet()?;
        let address = from_ethers_address(wallet.address());
        self.set_current(Some(wallet));
        if let Err(e) = self
            .store
            .save(&PersistedSession::new(WalletKind::LocalKey, address, self.chain_id))
        {
            log::warn!("[Wallet] Could not persist session: {}", e);
        }
        log::info!("[Wallet] Local key connected: {}", address);
        Ok(address)
    }

    fn disconnect(&self) {
        self.set_current(None);
        self.store.delete();
        log::info!("[Wallet] Local key disconnected");
    }

    fn submit_transaction(&self, call: &ContractCall) -> Result<B256, String> {
        let wallet = self.current().ok_or("Wallet is not connected")?;
        let rpc_url = self.rpc_url.clone();
        let expected_chain_id = self.chain_id;
        let from_address = wallet.address();
        let to_address = to_ethers_address(call.to);
        let value = EthersU256::from_big_endian(&call.value.to_be_bytes::<32>());
        let data = EthersBytes::from(call.data.clone());
        let label = call.label;

        self.runtime.block_on(async move {
            let provider = Provider::<Http>::try_from(rpc_url.as_str())
                .map_err(|e| format!("Invalid EVM RPC URL: {e}"))?;
            let chain_id = provider
                .get_chainid()
                .await
                .map_err(|e| format!("Failed to read chain id from RPC: {e}"))?
                .as_u64();
            if chain_id != expected_chain_id {
                return Err(format!(
                    "Unexpected chain id from RPC: got {chain_id}, expected {expected_chain_id}"
                ));
            }

            let signer_client = SignerMiddleware::new(provider, wallet);
            let tx = TransactionRequest::new()
                .from(from_address)
                .to(to_address)
                .value(value)
                .data(data)
                .chain_id(chain_id);

            let pending = signer_client
                .send_transaction(tx, Option::<BlockId>::None)
                .await
                .map_err(|e| format!("Failed to broadcast {label} tx: {e}"))?;
            let tx_hash = pending.tx_hash();
            log::info!(
                "[Wallet] {} broadcast: txHash={:#x} from={:#x} valueWei={}",
                label,
                tx_hash,
                from_address,
                value
            );
            Ok(B256::from(tx_hash.0))
        })
    }
}

fn to_ethers_address(address: Address) -> EthersAddress {
    EthersAddress::from_slice(address.as_slice())
}

fn from_ethers_address(address: EthersAddress) -> Address {
    Address::from_slice(address.as_bytes())
}

fn load_or_create_private_key_hex(keys_dir: &Path) -> Result<String, String> {
    let key_path = keys_dir.join(LOCAL_KEY_FILE);
    if key_path.exists() {
        let stored = fs::read_to_string(&key_path)
            .map_err(|e| format!("read {}: {e}", key_path.display()))?;
        return normalize_private_key_hex(&stored);
    }

    fs::create_dir_all(keys_dir).map_err(|e| format!("mkdir {}: {e}", keys_dir.display()))?;
    let wallet = LocalWallet::new(&mut rand::thread_rng());
    let key_hex = hex::encode(wallet.signer().to_bytes());
    write_private_key_hex(&key_path, &key_hex)?;
    log::info!(
        "[Wallet] Generated local key {:#x} at {}",
        wallet.address(),
        key_path.display()
    );
    Ok(key_hex)
}

fn normalize_private_key_hex(raw: &str) -> Result<String, String> {
    let clean = raw.trim().trim_start_matches("0x").trim_start_matches("0X");
    if clean.len() != 64 || !clean.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err("Invalid local private key format (expected 32-byte hex)".to_string());
    }
    Ok(clean.to_ascii_lowercase())
}

fn write_private_key_hex(path: &Path, private_key_hex: &str) -> Result<(), String> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;

        let mut file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .mode(0o600)
            .open(path)
            .map_err(|e| format!("open {}: {e}", path.display()))?;
        file.write_all(private_key_hex.as_bytes())
            .map_err(|e| format!("write {}: {e}", path.display()))?;
        return Ok(());
    }

    #[cfg(not(unix))]
    {
        fs::write(path, private_key_hex).map_err(|e| format!("write {}: {e}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known development key (anvil/hardhat account #0).
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

    fn config(private_key: Option<&str>) -> AppConfig {
        let key = private_key.map(str::to_string);
        AppConfig::from_lookup(move |name| match name {
            "ETHERBANK_CONTRACT_ADDRESS" => {
                Some("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed".to_string())
            }
            "ETHERBANK_WALLET" => Some("local".to_string()),
            "ETHERBANK_PRIVATE_KEY" => key.clone(),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn connect_uses_configured_key_and_persists() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SessionStore::in_dir(tmp.path());
        let session = LocalKeySession::new(&config(Some(DEV_KEY)), store.clone()).unwrap();
        assert!(!session.snapshot().is_connected());

        let address = session.connect().unwrap();
        assert_eq!(address, DEV_ADDRESS.parse::<Address>().unwrap());
        assert_eq!(session.snapshot(), SessionSnapshot::connected(address));
        assert_eq!(store.load_for(WalletKind::LocalKey, 11_155_111), Some(address));

        let again = LocalKeySession::new(&config(Some(DEV_KEY)), store).unwrap();
        assert_eq!(again.restore(), Some(address));
    }

    #[test]
    fn generated_key_is_reused() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SessionStore::in_dir(tmp.path());
        let first = LocalKeySession::new(&config(None), store.clone())
            .unwrap()
            .connect()
            .unwrap();

        let key_file = tmp.path().join(LOCAL_KEY_DIR).join(LOCAL_KEY_FILE);
        let stored = fs::read_to_string(&key_file).unwrap();
        assert_eq!(stored.len(), 64);

        let second = LocalKeySession::new(&config(None), store).unwrap();
        assert_eq!(second.restore(), Some(first));
    }

    #[test]
    fn restore_refuses_mismatched_key() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SessionStore::in_dir(tmp.path());
        let other: Address = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed".parse().unwrap();
        store
            .save(&PersistedSession::new(WalletKind::LocalKey, other, 11_155_111))
            .unwrap();

        let session = LocalKeySession::new(&config(Some(DEV_KEY)), store).unwrap();
        assert_eq!(session.restore(), None);
        assert!(!session.snapshot().is_connected());
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(normalize_private_key_hex("0x1234").is_err());
        assert!(normalize_private_key_hex(&"g".repeat(64)).is_err());
        assert_eq!(
            normalize_private_key_hex(&format!("  {DEV_KEY}\n")).unwrap(),
            DEV_KEY.trim_start_matches("0x")
        );
    }

    #[test]
    fn disconnect_forgets_wallet() {
        let tmp = tempfile::tempdir().unwrap();
        let session =
            LocalKeySession::new(&config(Some(DEV_KEY)), SessionStore::in_dir(tmp.path())).unwrap();
        session.connect().unwrap();
        session.disconnect();
        assert!(!session.snapshot().is_connected());
        let call = crate::contract::BankContract::new(Address::ZERO, "http://127.0.0.1:1")
            .withdraw_call();
        assert!(session.submit_transaction(&call).is_err());
    }
}
