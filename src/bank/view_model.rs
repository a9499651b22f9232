use alloy_primitives::Address;

use super::state::{BankAction, BankState};
use crate::config::NATIVE_SYMBOL;
use crate::shared::address::abbreviate_address;
use crate::units::balance_display;

/// What the bank screen shows, derived from [`BankState`] on every render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BankScreen {
    Disconnected { connecting: bool },
    Connected(ConnectedPanel),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedPanel {
    pub address: Address,
    pub address_label: String,
    pub network_name: String,
    pub balance_text: String,
    pub symbol: &'static str,
    pub amount_error: Option<String>,
    pub busy: Option<BankAction>,
    pub footer: String,
}

/// Project the state onto a screen. No balance leaves this function unless
/// an account is connected.
pub fn view_model(state: &BankState, network_name: &str) -> BankScreen {
    let Some(address) = state.session().address else {
        return BankScreen::Disconnected {
            connecting: state.is_connecting(),
        };
    };

    BankScreen::Connected(ConnectedPanel {
        address,
        address_label: abbreviate_address(&address),
        network_name: network_name.to_string(),
        balance_text: balance_display(state.balance().value()),
        symbol: NATIVE_SYMBOL,
        amount_error: state.amount_error().map(str::to_string),
        busy: state.submitting(),
        footer: footer_text(state),
    })
}

fn footer_text(state: &BankState) -> String {
    if let Some(action) = state.submitting() {
        return format!("{}: waiting for wallet approval...", action.title());
    }
    if let Some(err) = state.balance().last_error() {
        return format!("Balance refresh issue: {err}");
    }
    match state.last_tx() {
        Some((action, hash)) => {
            let hex = format!("{hash:#x}");
            format!(
                "{} sent: {}...{}",
                action.title(),
                &hex[..10],
                &hex[hex.len() - 6..]
            )
        }
        None => "Balance refreshes automatically.".to_string(),
    }
}
