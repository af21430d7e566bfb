//! Chain collaborator: ERC-721 reads and transfers over an Alloy provider

use std::sync::Arc;

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use futures::future::BoxFuture;
use futures::FutureExt;

use crate::infrastructure::ethereum::erc721::IERC721;
use crate::infrastructure::ethereum::types::{
    format_address, parse_address, parse_token_id, ChainError,
};

/// `safeTransferFrom(from, to, tokenId)` on one contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub contract: String,
    pub token_id: String,
    pub from: String,
    pub to: String,
}

/// Mined transaction outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub transaction_hash: String,
    pub status: bool,
}

/// A transfer the node accepted: hash now, receipt later
pub struct SubmittedTransfer {
    pub hash: String,
    pub receipt: BoxFuture<'static, Result<TransferReceipt, ChainError>>,
}

/// Abstract chain client
///
/// Everything the wallet needs from a node, independent of transport and
/// signing backend.
#[async_trait::async_trait]
pub trait ChainClient: Send + Sync + 'static {
    /// `ownerOf(tokenId)`
    async fn owner_of(&self, contract: &str, token_id: &str) -> Result<String, ChainError>;

    /// `tokenURI(tokenId)`
    async fn token_uri(&self, contract: &str, token_id: &str) -> Result<String, ChainError>;

    async fn estimate_transfer_gas(&self, request: &TransferRequest) -> Result<u64, ChainError>;

    /// Sign and broadcast with the given gas limit
    async fn send_transfer(
        &self,
        request: &TransferRequest,
        gas: u64,
    ) -> Result<SubmittedTransfer, ChainError>;

    fn endpoint(&self) -> String;
}

/// Builds a [`ChainClient`] for an endpoint and the current wallet keys.
///
/// Called on every reconfigure and whenever the wallet changes.
pub trait ChainConnector: Send + Sync + 'static {
    fn connect(
        &self,
        url: &str,
        signers: &[PrivateKeySigner],
    ) -> Result<Arc<dyn ChainClient>, ChainError>;
}

/// HTTP JSON-RPC connector
#[derive(Debug, Default, Clone, Copy)]
pub struct AlloyConnector;

impl ChainConnector for AlloyConnector {
    fn connect(
        &self,
        url: &str,
        signers: &[PrivateKeySigner],
    ) -> Result<Arc<dyn ChainClient>, ChainError> {
        Ok(Arc::new(AlloyChainClient::connect(url, signers)?))
    }
}

pub struct AlloyChainClient {
    provider: DynProvider,
    signers: Vec<Address>,
    endpoint: String,
}

impl AlloyChainClient {
    pub fn connect(url: &str, signers: &[PrivateKeySigner]) -> Result<Self, ChainError> {
        let rpc_url: reqwest::Url = url
            .trim()
            .parse()
            .map_err(|err| ChainError::InvalidUrl(format!("{url}: {err}")))?;

        let provider = match signers.split_first() {
            Some((first, rest)) => {
                let mut wallet = EthereumWallet::new(first.clone());
                for signer in rest {
                    wallet.register_signer(signer.clone());
                }
                ProviderBuilder::new()
                    .wallet(wallet)
                    .connect_http(rpc_url)
                    .erased()
            }
            None => ProviderBuilder::new().connect_http(rpc_url).erased(),
        };

        Ok(Self {
            provider,
            signers: signers.iter().map(|signer| signer.address()).collect(),
            endpoint: url.trim().to_string(),
        })
    }

    fn signer_for(&self, from: &str) -> Result<Address, ChainError> {
        let from = parse_address(from)?;
        if self.signers.contains(&from) {
            Ok(from)
        } else {
            Err(ChainError::UnknownSigner(format_address(from)))
        }
    }
}

#[async_trait::async_trait]
impl ChainClient for AlloyChainClient {
    async fn owner_of(&self, contract: &str, token_id: &str) -> Result<String, ChainError> {
        let nft = IERC721::new(parse_address(contract)?, self.provider.clone());
        let owner = nft.ownerOf(parse_token_id(token_id)?).call().await?;
        Ok(format_address(owner))
    }

    async fn token_uri(&self, contract: &str, token_id: &str) -> Result<String, ChainError> {
        let nft = IERC721::new(parse_address(contract)?, self.provider.clone());
        Ok(nft.tokenURI(parse_token_id(token_id)?).call().await?)
    }

    async fn estimate_transfer_gas(&self, request: &TransferRequest) -> Result<u64, ChainError> {
        let from = parse_address(&request.from)?;
        let to = parse_address(&request.to)?;
        let nft = IERC721::new(parse_address(&request.contract)?, self.provider.clone());
        let gas = nft
            .safeTransferFrom(from, to, parse_token_id(&request.token_id)?)
            .from(from)
            .estimate_gas()
            .await?;
        Ok(gas)
    }

    async fn send_transfer(
        &self,
        request: &TransferRequest,
        gas: u64,
    ) -> Result<SubmittedTransfer, ChainError> {
        let from = self.signer_for(&request.from)?;
        let to = parse_address(&request.to)?;
        let nft = IERC721::new(parse_address(&request.contract)?, self.provider.clone());
        let pending = nft
            .safeTransferFrom(from, to, parse_token_id(&request.token_id)?)
            .from(from)
            .gas(gas)
            .send()
            .await?;

        let hash = format!("{:?}", pending.tx_hash());
        let receipt = async move {
            let receipt = pending.get_receipt().await?;
            Ok(TransferReceipt {
                transaction_hash: format!("{:?}", receipt.transaction_hash),
                status: receipt.status(),
            })
        }
        .boxed();

        Ok(SubmittedTransfer { hash, receipt })
    }

    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }
}
