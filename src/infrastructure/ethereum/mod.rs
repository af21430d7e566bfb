//! Ethereum infrastructure - Alloy provider implementations

mod erc721;
mod provider;
pub(crate) mod types;

pub use provider::{
    AlloyChainClient, AlloyConnector, ChainClient, ChainConnector, SubmittedTransfer,
    TransferReceipt, TransferRequest,
};
pub use types::{format_address, parse_address, parse_token_id, same_address, ChainError};
