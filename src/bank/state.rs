use std::fmt;

use alloy_primitives::{B256, U256};

use crate::balance::BalanceCache;
use crate::session::SessionSnapshot;
use crate::units::{parse_units, UnitsError, ETH_DECIMALS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankAction {
    Deposit,
    Withdraw,
}

impl BankAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Deposit => "Deposit",
            Self::Withdraw => "Withdraw",
        }
    }
}

/// Reasons a deposit or withdraw is refused before reaching the wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BankError {
    NotConnected,
    Busy(BankAction),
    InvalidAmount(UnitsError),
    ZeroAmount,
}

impl fmt::Display for BankError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "Connect a wallet first"),
            Self::Busy(action) => write!(f, "A {} is already awaiting approval", action.as_str()),
            Self::InvalidAmount(e) => write!(f, "Invalid amount: {e}"),
            Self::ZeroAmount => write!(f, "Amount must be greater than zero"),
        }
    }
}

impl std::error::Error for BankError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidAmount(e) => Some(e),
            _ => None,
        }
    }
}

/// A validated request, ready to be turned into a contract call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionPlan {
    pub action: BankAction,
    pub value: U256,
}

/// Everything the bank panel renders from. Owned by the view; no toolkit types.
#[derive(Debug, Default)]
pub struct BankState {
    session: SessionSnapshot,
    balance: BalanceCache,
    pending_amount: String,
    amount_error: Option<String>,
    submitting: Option<BankAction>,
    connecting: bool,
    last_tx: Option<(BankAction, B256)>,
    reset_amount_input: bool,
}

impl BankState {
    pub fn session(&self) -> SessionSnapshot {
        self.session
    }

    pub fn balance(&self) -> &BalanceCache {
        &self.balance
    }

    pub fn balance_mut(&mut self) -> &mut BalanceCache {
        &mut self.balance
    }

    pub fn pending_amount(&self) -> &str {
        &self.pending_amount
    }

    pub fn amount_error(&self) -> Option<&str> {
        self.amount_error.as_deref()
    }

    pub fn submitting(&self) -> Option<BankAction> {
        self.submitting
    }

    pub fn is_connecting(&self) -> bool {
        self.connecting
    }

    pub fn last_tx(&self) -> Option<(BankAction, B256)> {
        self.last_tx
    }

    /// Adopt a new session snapshot. Returns true when the account changed.
    pub fn set_session(&mut self, snapshot: SessionSnapshot) -> bool {
        if self.session == snapshot {
            return false;
        }
        self.session = snapshot;
        self.balance.track(snapshot.address);
        self.last_tx = None;
        self.amount_error = None;
        true
    }

    pub fn set_connecting(&mut self, connecting: bool) {
        self.connecting = connecting;
    }

    pub fn set_pending_amount(&mut self, amount: impl Into<String>) {
        self.pending_amount = amount.into();
        self.amount_error = None;
    }

    /// Validate and mark `action` as in flight.
    pub fn begin_submission(&mut self, action: BankAction) -> Result<SubmissionPlan, BankError> {
        if !self.session.is_connected() {
            return Err(BankError::NotConnected);
        }
        if let Some(in_flight) = self.submitting {
            return Err(BankError::Busy(in_flight));
        }

        let value = match action {
            BankAction::Deposit => match parse_deposit_amount(&self.pending_amount) {
                Ok(value) => value,
                Err(err) => {
                    log::warn!("[Bank] rejected deposit amount '{}': {}", self.pending_amount, err);
                    self.amount_error = Some(err.to_string());
                    return Err(err);
                }
            },
            BankAction::Withdraw => U256::ZERO,
        };

        self.submitting = Some(action);
        Ok(SubmissionPlan { action, value })
    }

    /// Record the wallet's answer. Returns true when a delayed balance
    /// refetch is due (successful submissions only).
    pub fn finish_submission(&mut self, action: BankAction, result: Result<B256, String>) -> bool {
        self.submitting = None;
        match result {
            Ok(tx_hash) => {
                log::info!("[Bank] {} submitted: txHash={:#x}", action.as_str(), tx_hash);
                if action == BankAction::Deposit {
                    self.pending_amount.clear();
                    self.reset_amount_input = true;
                }
                self.last_tx = Some((action, tx_hash));
                true
            }
            Err(err) => {
                log::error!("[Bank] {} failed: {}", action.as_str(), err);
                false
            }
        }
    }

    /// True once after a deposit cleared the amount, so the input widget can follow.
    pub fn take_amount_input_reset(&mut self) -> bool {
        std::mem::take(&mut self.reset_amount_input)
    }
}

fn parse_deposit_amount(raw: &str) -> Result<U256, BankError> {
    let value = parse_units(raw, ETH_DECIMALS).map_err(BankError::InvalidAmount)?;
    if value.is_zero() {
        return Err(BankError::ZeroAmount);
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;

    fn owner() -> Address {
        "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed".parse().unwrap()
    }

    fn connected_state() -> BankState {
        let mut state = BankState::default();
        state.set_session(SessionSnapshot::connected(owner()));
        state
    }

    fn hash() -> B256 {
        B256::repeat_byte(0xab)
    }

    #[test]
    fn requires_connection() {
        let mut state = BankState::default();
        state.set_pending_amount("1");
        assert_eq!(
            state.begin_submission(BankAction::Deposit),
            Err(BankError::NotConnected)
        );
        assert_eq!(state.submitting(), None);
    }

    #[test]
    fn deposit_plan_carries_exact_value() {
        let mut state = connected_state();
        state.set_pending_amount("0.123456789012345678");
        let plan = state.begin_submission(BankAction::Deposit).unwrap();
        assert_eq!(plan.value, U256::from(123_456_789_012_345_678u64));
        assert_eq!(state.submitting(), Some(BankAction::Deposit));
    }

    #[test]
    fn invalid_deposit_is_never_submitted() {
        let mut state = connected_state();
        for bad in ["", "abc", "-1", "0", "0.0000"] {
            state.set_pending_amount(bad);
            assert!(state.begin_submission(BankAction::Deposit).is_err(), "{bad}");
            assert_eq!(state.submitting(), None);
            assert!(state.amount_error().is_some());
        }
        state.set_pending_amount("1");
        assert_eq!(state.amount_error(), None);
    }

    #[test]
    fn withdraw_ignores_amount_field() {
        let mut state = connected_state();
        state.set_pending_amount("not a number");
        let plan = state.begin_submission(BankAction::Withdraw).unwrap();
        assert_eq!(plan.value, U256::ZERO);
    }

    #[test]
    fn second_submission_is_refused_while_in_flight() {
        let mut state = connected_state();
        state.begin_submission(BankAction::Withdraw).unwrap();
        state.set_pending_amount("1");
        assert_eq!(
            state.begin_submission(BankAction::Deposit),
            Err(BankError::Busy(BankAction::Withdraw))
        );
    }

    #[test]
    fn successful_deposit_clears_amount_and_requests_refetch() {
        let mut state = connected_state();
        state.set_pending_amount("1");
        state.begin_submission(BankAction::Deposit).unwrap();
        assert!(state.finish_submission(BankAction::Deposit, Ok(hash())));
        assert_eq!(state.pending_amount(), "");
        assert_eq!(state.submitting(), None);
        assert_eq!(state.last_tx(), Some((BankAction::Deposit, hash())));
        assert!(state.take_amount_input_reset());
        assert!(!state.take_amount_input_reset());
    }

    #[test]
    fn successful_withdraw_keeps_amount() {
        let mut state = connected_state();
        state.set_pending_amount("2.5");
        state.begin_submission(BankAction::Withdraw).unwrap();
        assert!(state.finish_submission(BankAction::Withdraw, Ok(hash())));
        assert_eq!(state.pending_amount(), "2.5");
        assert!(!state.take_amount_input_reset());
    }

    #[test]
    fn failed_submission_leaves_state_untouched() {
        let mut state = connected_state();
        state
            .balance_mut()
            .apply(owner(), Ok(U256::from(3_000_000_000_000_000_000u128)));
        state.set_pending_amount("1");
        state.begin_submission(BankAction::Deposit).unwrap();

        let refetch = state.finish_submission(
            BankAction::Deposit,
            Err("User rejected the request.".to_string()),
        );
        assert!(!refetch);
        assert_eq!(state.pending_amount(), "1");
        assert_eq!(
            state.balance().value(),
            Some(U256::from(3_000_000_000_000_000_000u128))
        );
        assert_eq!(state.submitting(), None);
        assert_eq!(state.last_tx(), None);
    }

    #[test]
    fn account_switch_resets_balance() {
        let mut state = connected_state();
        state.balance_mut().apply(owner(), Ok(U256::from(1u64)));
        assert!(state.set_session(SessionSnapshot::default()));
        assert_eq!(state.balance().value(), None);
        assert!(!state.set_session(SessionSnapshot::default()));
    }

    #[test]
    fn errors_render_for_users() {
        assert_eq!(
            BankError::InvalidAmount(UnitsError::Negative).to_string(),
            "Invalid amount: amount must not be negative"
        );
        assert_eq!(
            BankError::Busy(BankAction::Deposit).to_string(),
            "A deposit is already awaiting approval"
        );
    }
}
