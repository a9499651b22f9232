//! Startup composition: everything the bank view needs, built once in `main`
//! and handed to the view explicitly.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::contract::{BalanceSource, BankContract};
use crate::session::{build_session, SessionStore, WalletSession};

pub struct BankContext {
    pub config: AppConfig,
    pub contract: BankContract,
    pub session: Arc<dyn WalletSession>,
    pub balances: Arc<dyn BalanceSource>,
}

impl BankContext {
    pub fn from_config(config: AppConfig) -> Result<Self, String> {
        Self::with_store(config, SessionStore::app_data())
    }

    pub fn with_store(config: AppConfig, store: SessionStore) -> Result<Self, String> {
        let contract = BankContract::new(config.contract_address, config.rpc_url.clone());
        let session = build_session(&config, store)?;
        log::info!(
            "[Bank] context ready: contract={} wallet={}",
            contract.address(),
            session.kind().as_str()
        );
        Ok(Self {
            balances: Arc::new(contract.clone()),
            contract,
            session,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WalletKind;

    fn config(wallet: &'static str, project_id: Option<&'static str>) -> AppConfig {
        AppConfig::from_lookup(move |key| match key {
            "ETHERBANK_CONTRACT_ADDRESS" => {
                Some("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed".to_string())
            }
            "ETHERBANK_WALLET" => Some(wallet.to_string()),
            "ETHERBANK_WALLETCONNECT_PROJECT_ID" => project_id.map(str::to_string),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn builds_selected_wallet_backend() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = BankContext::with_store(
            config("browser", Some("demo")),
            SessionStore::in_dir(tmp.path()),
        )
        .unwrap();
        assert_eq!(ctx.session.kind(), WalletKind::Browser);
        assert_eq!(ctx.contract.address(), ctx.config.contract_address);
        assert!(!ctx.session.snapshot().is_connected());

        let ctx = BankContext::with_store(config("local", None), SessionStore::in_dir(tmp.path()))
            .unwrap();
        assert_eq!(ctx.session.kind(), WalletKind::LocalKey);
    }
}
