//! Bank contract bindings: ABI encoding of the three entry points and the
//! `balances` read over JSON-RPC.

use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolCall};

use crate::shared::rpc::eth_call;

sol! {
    function balances(address owner) view returns (uint256);
    function deposit() payable;
    function withdraw();
}

/// A transaction request handed to the wallet session for approval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub label: &'static str,
    pub to: Address,
    pub value: U256,
    pub data: Vec<u8>,
}

/// Read side of the balance field, keyed by owner address.
pub trait BalanceSource: Send + Sync {
    fn balance_of(&self, owner: Address) -> Result<U256, String>;
}

#[derive(Debug, Clone)]
pub struct BankContract {
    address: Address,
    rpc_url: String,
}

impl BankContract {
    pub fn new(address: Address, rpc_url: impl Into<String>) -> Self {
        Self {
            address,
            rpc_url: rpc_url.into(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn deposit_call(&self, value: U256) -> ContractCall {
        ContractCall {
            label: "deposit",
            to: self.address,
            value,
            data: depositCall {}.abi_encode(),
        }
    }

    pub fn withdraw_call(&self) -> ContractCall {
        ContractCall {
            label: "withdraw",
            to: self.address,
            value: U256::ZERO,
            data: withdrawCall {}.abi_encode(),
        }
    }
}

impl BalanceSource for BankContract {
    fn balance_of(&self, owner: Address) -> Result<U256, String> {
        let data = balancesCall { owner }.abi_encode();
        let out = eth_call(&self.rpc_url, self.address, &data)?;
        decode_uint_word(&out).map_err(|e| format!("balances({owner}) {e}"))
    }
}

fn decode_uint_word(out: &[u8]) -> Result<U256, String> {
    if out.len() < 32 {
        return Err(format!(
            "eth_call result too short: expected 32 bytes, got {}",
            out.len()
        ));
    }
    Ok(U256::from_be_slice(&out[..32]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank() -> BankContract {
        let addr: Address = "0x00000000000000000000000000000000000000b4".parse().unwrap();
        BankContract::new(addr, "http://127.0.0.1:8545")
    }

    #[test]
    fn deposit_carries_value_and_selector() {
        let value = U256::from(1_000_000_000_000_000_000u128);
        let call = bank().deposit_call(value);
        assert_eq!(call.value, value);
        assert_eq!(call.to, bank().address());
        assert_eq!(hex::encode(&call.data), "d0e30db0");
    }

    #[test]
    fn withdraw_has_no_value() {
        let call = bank().withdraw_call();
        assert_eq!(call.value, U256::ZERO);
        assert_eq!(hex::encode(&call.data), "3ccfd60b");
    }

    #[test]
    fn balances_call_encodes_owner_word() {
        let owner: Address = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed".parse().unwrap();
        let data = balancesCall { owner }.abi_encode();
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(hex::encode(&data[..4]), "27e235e3");
        assert_eq!(&data[16..], owner.as_slice());
    }

    #[test]
    fn decodes_balance_word() {
        let mut word = [0u8; 32];
        word[31] = 0x2a;
        assert_eq!(decode_uint_word(&word).unwrap(), U256::from(42u64));
        assert!(decode_uint_word(&word[..8]).is_err());
    }
}
