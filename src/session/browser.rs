use std::sync::Mutex;
use std::time::Duration;

use alloy_primitives::{Address, B256};
use serde::Deserialize;

use super::callback_flow::{run_callback_flow, CallbackRequest};
use super::{PersistedSession, SessionSnapshot, SessionStore, WalletSession};
use crate::config::{AppConfig, WalletKind, APP_NAME};
use crate::contract::ContractCall;
use crate::shared::address::parse_evm_address;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(120);
const APPROVAL_TIMEOUT: Duration = Duration::from_secs(180);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectReply {
    address: Option<String>,
    #[serde(default)]
    chain_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendReply {
    tx_hash: Option<String>,
}

/// Wallet approval through the browser wallet page.
pub struct BrowserWalletSession {
    page_url: String,
    project_id: String,
    chain_id: u64,
    store: SessionStore,
    address: Mutex<Option<Address>>,
}

impl BrowserWalletSession {
    pub fn new(config: &AppConfig, store: SessionStore) -> Result<Self, String> {
        let project_id = config
            .project_id
            .clone()
            .ok_or("Browser wallet requires ETHERBANK_WALLETCONNECT_PROJECT_ID")?;
        Ok(Self {
            page_url: config.wallet_page_url.clone(),
            project_id,
            chain_id: config.chain_id,
            store,
            address: Mutex::new(None),
        })
    }

    fn current(&self) -> Option<Address> {
        *self.address.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn set_current(&self, value: Option<Address>) {
        *self.address.lock().unwrap_or_else(|p| p.into_inner()) = value;
    }

    fn base_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("chainId", self.chain_id.to_string()),
            ("projectId", self.project_id.clone()),
            ("appName", APP_NAME.to_string()),
        ]
    }
}

impl WalletSession for BrowserWalletSession {
    fn kind(&self) -> WalletKind {
        WalletKind::Browser
    }

    fn snapshot(&self) -> SessionSnapshot {
        self.current()
            .map(SessionSnapshot::connected)
            .unwrap_or_default()
    }

    fn restore(&self) -> Option<Address> {
        let address = self.store.load_for(WalletKind::Browser, self.chain_id)?;
        log::info!("[Wallet] Restored browser wallet session for {}", address);
        self.set_current(Some(address));
        Some(address)
    }

    fn connect(&self) -> Result<Address, String> {
        let body = smol::block_on(run_callback_flow(CallbackRequest {
            page_url: &self.page_url,
            action: "connect",
            params: self.base_params(),
            timeout: CONNECT_TIMEOUT,
        }))?;
        let address = parse_connect_reply(body, self.chain_id)?;

        self.set_current(Some(address));
        if let Err(e) = self
            .store
            .save(&PersistedSession::new(WalletKind::Browser, address, self.chain_id))
        {
            log::warn!("[Wallet] Could not persist session: {}", e);
        }
        log::info!("[Wallet] Browser wallet connected: {}", address);
        Ok(address)
    }

    fn disconnect(&self) {
        self.set_current(None);
        self.store.delete();
        log::info!("[Wallet] Browser wallet disconnected");
    }

    fn submit_transaction(&self, call: &ContractCall) -> Result<B256, String> {
        let from = self.current().ok_or("Wallet is not connected")?;
        let mut params = self.base_params();
        params.extend([
            ("from", from.to_string()),
            ("to", call.to.to_string()),
            ("value", call.value.to_string()),
            ("data", format!("0x{}", hex::encode(&call.data))),
            ("label", call.label.to_string()),
        ]);

        log::info!(
            "[Wallet] Requesting approval for {}: from={} to={} valueWei={}",
            call.label,
            from,
            call.to,
            call.value
        );
        let body = smol::block_on(run_callback_flow(CallbackRequest {
            page_url: &self.page_url,
            action: "send",
            params,
            timeout: APPROVAL_TIMEOUT,
        }))?;
        parse_send_reply(body)
    }
}

fn parse_connect_reply(body: serde_json::Value, expected_chain_id: u64) -> Result<Address, String> {
    let reply: ConnectReply =
        serde_json::from_value(body).map_err(|e| format!("Invalid connect reply: {e}"))?;
    let raw = reply
        .address
        .ok_or("Connect reply is missing the wallet address")?;
    if let Some(chain_id) = reply.chain_id {
        if chain_id != expected_chain_id {
            return Err(format!(
                "Wallet is on chain {chain_id}, expected {expected_chain_id}"
            ));
        }
    }
    parse_evm_address(&raw, "wallet address")
}

fn parse_send_reply(body: serde_json::Value) -> Result<B256, String> {
    let reply: SendReply =
        serde_json::from_value(body).map_err(|e| format!("Invalid send reply: {e}"))?;
    let raw = reply.tx_hash.ok_or("Send reply is missing txHash")?;
    raw.trim()
        .parse::<B256>()
        .map_err(|e| format!("Invalid transaction hash '{raw}': {e}"))
}
