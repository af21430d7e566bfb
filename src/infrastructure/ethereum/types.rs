//! Conversions between user-facing strings and Alloy types

use std::str::FromStr;

use alloy::primitives::{Address, U256};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("not connected to a node")]
    NotConnected,
    #[error("invalid node URL {0}")]
    InvalidUrl(String),
    #[error("invalid address {0:?}")]
    InvalidAddress(String),
    #[error("invalid token ID {0:?}")]
    InvalidTokenId(String),
    #[error("no key in the wallet for {0}")]
    UnknownSigner(String),
    /// RPC, revert or transport failure; message text as reported by the client
    #[error("{0}")]
    Rpc(String),
    #[error("metadata fetch failed: {0}")]
    Metadata(String),
}

impl From<alloy::contract::Error> for ChainError {
    fn from(err: alloy::contract::Error) -> Self {
        ChainError::Rpc(err.to_string())
    }
}

impl From<alloy::providers::PendingTransactionError> for ChainError {
    fn from(err: alloy::providers::PendingTransactionError) -> Self {
        ChainError::Rpc(err.to_string())
    }
}

pub fn parse_address(value: &str) -> Result<Address, ChainError> {
    Address::from_str(value.trim()).map_err(|_| ChainError::InvalidAddress(value.to_string()))
}

/// Decimal or 0x-prefixed hex
pub fn parse_token_id(value: &str) -> Result<U256, ChainError> {
    U256::from_str(value.trim()).map_err(|_| ChainError::InvalidTokenId(value.to_string()))
}

/// EIP-55 checksummed form, as node clients report owners
pub fn format_address(address: Address) -> String {
    address.to_checksum(None)
}

/// Case-insensitive comparison of two hex addresses
pub fn same_address(a: &str, b: &str) -> bool {
    match (parse_address(a), parse_address(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a.trim().eq_ignore_ascii_case(b.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token_id_forms() {
        assert_eq!(parse_token_id("42").unwrap(), U256::from(42u64));
        assert_eq!(parse_token_id("0x2a").unwrap(), U256::from(42u64));
        assert!(matches!(parse_token_id("abc"), Err(ChainError::InvalidTokenId(_))));
    }

    #[test]
    fn test_same_address_ignores_case() {
        let lower = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
        let checksummed = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
        assert!(same_address(lower, checksummed));
        assert_eq!(format_address(parse_address(lower).unwrap()), checksummed);
        assert!(!same_address(lower, "0x0000000000000000000000000000000000000001"));
    }
}
