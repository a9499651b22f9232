use alloy_primitives::Address;

/// Abbreviate an address as 0x1234...abcd for compact UI display.
pub fn abbreviate_address(addr: &Address) -> String {
    let full = addr.to_checksum(None);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

/// Return true for strict 20-byte EVM addresses in 0x-prefixed hex format.
pub fn is_evm_address(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.len() != 42 || !trimmed.starts_with("0x") {
        return false;
    }
    trimmed.bytes().skip(2).all(|b| b.is_ascii_hexdigit())
}

pub fn parse_evm_address(value: &str, label: &str) -> Result<Address, String> {
    let trimmed = value.trim();
    if !is_evm_address(trimmed) {
        return Err(format!("Invalid {label}: expected 0x-prefixed 20-byte hex, got '{trimmed}'"));
    }
    trimmed
        .parse::<Address>()
        .map_err(|e| format!("Invalid {label}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviates_checksummed_address() {
        let addr: Address = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed".parse().unwrap();
        assert_eq!(abbreviate_address(&addr), "0x5aAe...eAed");
    }

    #[test]
    fn rejects_short_and_unprefixed_addresses() {
        assert!(!is_evm_address("0x1234"));
        assert!(!is_evm_address("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed00"));
        assert!(!is_evm_address("0xzzaeb6053f3e94c9b9a09f33669435e7ef1beaed"));
        assert!(is_evm_address(" 0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed "));
    }

    #[test]
    fn parse_reports_label() {
        let err = parse_evm_address("nope", "contract address").unwrap_err();
        assert!(err.contains("contract address"), "{err}");
    }
}
