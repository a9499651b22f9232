//! Startup configuration, read from the process environment (after `.env`).

use std::env;
use std::time::Duration;

use alloy_primitives::Address;

use crate::shared::address::parse_evm_address;

pub const APP_NAME: &str = "EtherBank";
pub const NATIVE_SYMBOL: &str = "ETH";

const DEFAULT_RPC_URL: &str = "https://sepolia.drpc.org";
const DEFAULT_CHAIN_ID: u64 = 11_155_111;
const DEFAULT_NETWORK_NAME: &str = "Sepolia";
const DEFAULT_WALLET_PAGE_URL: &str = "http://localhost:5173/#/wallet";
const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;
const DEFAULT_REFETCH_DELAY_MS: u64 = 3_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletKind {
    /// Wallet approval happens in the system browser through a callback page.
    Browser,
    /// Transactions are signed in-process with a local secp256k1 key.
    LocalKey,
}

impl WalletKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::LocalKey => "local",
        }
    }

    fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "browser" => Ok(Self::Browser),
            "local" | "local-key" => Ok(Self::LocalKey),
            other => Err(format!(
                "Unknown ETHERBANK_WALLET '{other}' (expected 'browser' or 'local')"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub contract_address: Address,
    pub rpc_url: String,
    pub chain_id: u64,
    pub network_name: String,
    pub wallet_kind: WalletKind,
    pub wallet_page_url: String,
    pub project_id: Option<String>,
    pub private_key: Option<String>,
    pub poll_interval: Duration,
    pub refetch_delay: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let contract_raw = get("ETHERBANK_CONTRACT_ADDRESS")
            .ok_or("Missing ETHERBANK_CONTRACT_ADDRESS (deployed bank contract)")?;
        let contract_address = parse_evm_address(&contract_raw, "ETHERBANK_CONTRACT_ADDRESS")?;

        let rpc_url = get("ETHERBANK_RPC_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());

        let chain_id = match get("ETHERBANK_CHAIN_ID") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|e| format!("Invalid ETHERBANK_CHAIN_ID '{raw}': {e}"))?,
            None => DEFAULT_CHAIN_ID,
        };

        let wallet_kind = match get("ETHERBANK_WALLET") {
            Some(raw) => WalletKind::parse(&raw)?,
            None => WalletKind::Browser,
        };

        let project_id = get("ETHERBANK_WALLETCONNECT_PROJECT_ID");
        if wallet_kind == WalletKind::Browser && project_id.is_none() {
            return Err(
                "Missing ETHERBANK_WALLETCONNECT_PROJECT_ID (required by the browser wallet page)"
                    .to_string(),
            );
        }

        Ok(Self {
            contract_address,
            rpc_url,
            chain_id,
            network_name: get("ETHERBANK_NETWORK_NAME")
                .unwrap_or_else(|| DEFAULT_NETWORK_NAME.to_string()),
            wallet_kind,
            wallet_page_url: get("ETHERBANK_WALLET_PAGE_URL")
                .unwrap_or_else(|| DEFAULT_WALLET_PAGE_URL.to_string()),
            project_id,
            private_key: get("ETHERBANK_PRIVATE_KEY"),
            poll_interval: millis_or(&get, "ETHERBANK_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS)?,
            refetch_delay: millis_or(&get, "ETHERBANK_REFETCH_DELAY_MS", DEFAULT_REFETCH_DELAY_MS)?,
        })
    }

    pub fn log_summary(&self) {
        log::info!(
            "[Config] contract={} chainId={} network={} rpc={} wallet={} poll={}ms refetchDelay={}ms",
            self.contract_address,
            self.chain_id,
            self.network_name,
            self.rpc_url,
            self.wallet_kind.as_str(),
            self.poll_interval.as_millis(),
            self.refetch_delay.as_millis(),
        );
    }
}

fn millis_or<G>(get: &G, key: &str, default_ms: u64) -> Result<Duration, String>
where
    G: Fn(&str) -> Option<String>,
{
    let Some(raw) = get(key) else {
        return Ok(Duration::from_millis(default_ms));
    };
    let ms = raw
        .parse::<u64>()
        .map_err(|e| format!("Invalid {key} '{raw}': {e}"))?;
    if ms == 0 {
        return Err(format!("{key} must be greater than zero"));
    }
    Ok(Duration::from_millis(ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const CONTRACT: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_target_sepolia_with_fixed_timings() {
        let cfg = config_from(&[
            ("ETHERBANK_CONTRACT_ADDRESS", CONTRACT),
            ("ETHERBANK_WALLETCONNECT_PROJECT_ID", "demo-project"),
        ])
        .unwrap();
        assert_eq!(cfg.chain_id, 11_155_111);
        assert_eq!(cfg.rpc_url, DEFAULT_RPC_URL);
        assert_eq!(cfg.network_name, "Sepolia");
        assert_eq!(cfg.wallet_kind, WalletKind::Browser);
        assert_eq!(cfg.poll_interval, Duration::from_secs(5));
        assert_eq!(cfg.refetch_delay, Duration::from_secs(3));
        assert_eq!(cfg.project_id.as_deref(), Some("demo-project"));
    }

    #[test]
    fn contract_address_is_required_and_validated() {
        let err = config_from(&[]).unwrap_err();
        assert!(err.contains("ETHERBANK_CONTRACT_ADDRESS"), "{err}");

        let err = config_from(&[
            ("ETHERBANK_CONTRACT_ADDRESS", "0x1234"),
            ("ETHERBANK_WALLET", "local"),
        ])
        .unwrap_err();
        assert!(err.contains("Invalid ETHERBANK_CONTRACT_ADDRESS"), "{err}");
    }

    #[test]
    fn browser_wallet_requires_project_id() {
        let err = config_from(&[("ETHERBANK_CONTRACT_ADDRESS", CONTRACT)]).unwrap_err();
        assert!(err.contains("PROJECT_ID"), "{err}");

        let cfg = config_from(&[
            ("ETHERBANK_CONTRACT_ADDRESS", CONTRACT),
            ("ETHERBANK_WALLET", "local"),
            ("ETHERBANK_WALLETCONNECT_PROJECT_ID", "   "),
        ])
        .unwrap();
        assert_eq!(cfg.wallet_kind, WalletKind::LocalKey);
        assert!(cfg.project_id.is_none());
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = config_from(&[
            ("ETHERBANK_CONTRACT_ADDRESS", CONTRACT),
            ("ETHERBANK_WALLET", "LOCAL"),
            ("ETHERBANK_RPC_URL", "http://127.0.0.1:8545/"),
            ("ETHERBANK_CHAIN_ID", "31337"),
            ("ETHERBANK_POLL_INTERVAL_MS", "250"),
            ("ETHERBANK_REFETCH_DELAY_MS", "100"),
        ])
        .unwrap();
        assert_eq!(cfg.rpc_url, "http://127.0.0.1:8545");
        assert_eq!(cfg.chain_id, 31337);
        assert_eq!(cfg.poll_interval, Duration::from_millis(250));
        assert_eq!(cfg.refetch_delay, Duration::from_millis(100));
    }

    #[test]
    fn rejects_bad_numbers_and_wallet_kinds() {
        let base = [
            ("ETHERBANK_CONTRACT_ADDRESS", CONTRACT),
            ("ETHERBANK_WALLET", "local"),
        ];
        let mut bad_chain = base.to_vec();
        bad_chain.push(("ETHERBANK_CHAIN_ID", "sepolia"));
        assert!(config_from(&bad_chain).is_err());

        let mut zero_delay = base.to_vec();
        zero_delay.push(("ETHERBANK_REFETCH_DELAY_MS", "0"));
        assert!(config_from(&zero_delay).is_err());

        let err = config_from(&[
            ("ETHERBANK_CONTRACT_ADDRESS", CONTRACT),
            ("ETHERBANK_WALLET", "ledger"),
        ])
        .unwrap_err();
        assert!(err.contains("ledger"), "{err}");
    }
}
