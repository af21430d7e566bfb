//! Async worker - runs in the Tokio runtime and owns every chain/keystore call

use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::infrastructure::ethereum::{ChainClient, ChainConnector, ChainError, TransferRequest};
use crate::infrastructure::keystore::Keystore;
use crate::infrastructure::metadata::MetadataSource;
use crate::infrastructure::runtime::bridge::{RuntimeCommand, RuntimeEvent, WorkerSettings};
use crate::state::{OwnerLookup, Secret, TokenKey};

struct Worker {
    settings: WorkerSettings,
    connector: Arc<dyn ChainConnector>,
    metadata: Arc<dyn MetadataSource>,
    evt_tx: Sender<RuntimeEvent>,
    endpoint: Option<String>,
    keystore: Option<Keystore>,
    client: Option<Arc<dyn ChainClient>>,
}

/// Run the async worker loop
///
/// Commands are taken in order; keystore work happens inline, chain requests
/// are spawned so slow nodes never hold up the queue.
pub async fn run_async_worker(
    settings: WorkerSettings,
    connector: Arc<dyn ChainConnector>,
    metadata: Arc<dyn MetadataSource>,
    cmd_rx: Receiver<RuntimeCommand>,
    evt_tx: Sender<RuntimeEvent>,
) -> Result<()> {
    let mut worker = Worker {
        settings,
        connector,
        metadata,
        evt_tx,
        endpoint: None,
        keystore: None,
        client: None,
    };

    loop {
        match cmd_rx.try_recv() {
            Ok(RuntimeCommand::Shutdown) | Err(TryRecvError::Disconnected) => return Ok(()),
            Ok(cmd) => worker.handle(cmd),
            Err(TryRecvError::Empty) => tokio::time::sleep(Duration::from_millis(10)).await,
        }
    }
}

impl Worker {
    fn handle(&mut self, cmd: RuntimeCommand) {
        match cmd {
            RuntimeCommand::Shutdown => {}
            RuntimeCommand::Reconfigure { url } => {
                self.endpoint = Some(url);
                if self.rebuild_client() {
                    if let Some(client) = &self.client {
                        self.emit(RuntimeEvent::Reconfigured {
                            endpoint: client.endpoint(),
                        });
                    }
                }
            }
            RuntimeCommand::LoadWallet { secret, reset } => self.load_wallet(&secret, reset),
            RuntimeCommand::AddAccount { private_key } => self.add_account(&private_key),
            RuntimeCommand::RemoveAccount { address } => self.remove_account(&address),
            RuntimeCommand::LookupOwner { lookup } => self.lookup_owner(lookup),
            RuntimeCommand::FetchDetails { key } => self.fetch_details(key),
            RuntimeCommand::Transfer { key, from, to } => self.transfer(key, from, to),
        }
    }

    fn emit(&self, event: RuntimeEvent) {
        let _ = self.evt_tx.send(event);
    }

    fn emit_error(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        self.emit(RuntimeEvent::Error { message });
    }

    /// Recreate the client for the current endpoint and signer set.
    fn rebuild_client(&mut self) -> bool {
        let Some(url) = self.endpoint.as_deref() else {
            return false;
        };
        let signers = self
            .keystore
            .as_ref()
            .map(Keystore::signers)
            .unwrap_or_default();

        match self.connector.connect(url, &signers) {
            Ok(client) => {
                tracing::info!(endpoint = url, signers = signers.len(), "chain client ready");
                self.client = Some(client);
                true
            }
            Err(err) => {
                self.client = None;
                self.emit_error(err.to_string());
                false
            }
        }
    }

    fn client(&self) -> Result<Arc<dyn ChainClient>, ChainError> {
        self.client.clone().ok_or(ChainError::NotConnected)
    }

    fn load_wallet(&mut self, secret: &Secret, reset: bool) {
        let dir = self.settings.keystore_dir.clone();
        if reset {
            if let Err(err) = Keystore::reset(&dir) {
                self.emit_error(err.to_string());
                return;
            }
        }

        match Keystore::load(dir, secret) {
            Ok(keystore) => {
                let accounts = keystore.accounts();
                self.keystore = Some(keystore);
                self.rebuild_client();
                self.emit(RuntimeEvent::WalletLoaded { accounts });
            }
            Err(err) => {
                self.keystore = None;
                self.emit_error(err.to_string());
            }
        }
    }

    fn add_account(&mut self, private_key: &Secret) {
        let Some(keystore) = self.keystore.as_mut() else {
            self.emit_error("wallet is not unlocked");
            return;
        };
        match keystore.add_account(private_key.expose()) {
            Ok(address) => {
                let accounts = keystore.accounts();
                self.rebuild_client();
                self.emit(RuntimeEvent::AccountAdded { address, accounts });
            }
            Err(err) => self.emit_error(err.to_string()),
        }
    }

    fn remove_account(&mut self, address: &str) {
        let Some(keystore) = self.keystore.as_mut() else {
            self.emit_error("wallet is not unlocked");
            return;
        };
        match keystore.remove_account(address) {
            Ok(()) => {
                let accounts = keystore.accounts();
                self.rebuild_client();
                self.emit(RuntimeEvent::AccountRemoved {
                    address: address.to_string(),
                    accounts,
                });
            }
            Err(err) => self.emit_error(err.to_string()),
        }
    }

    fn lookup_owner(&self, lookup: OwnerLookup) {
        let evt_tx = self.evt_tx.clone();
        let client = match self.client() {
            Ok(client) => client,
            Err(err) => {
                let _ = evt_tx.send(RuntimeEvent::OwnerFailed {
                    lookup,
                    message: err.to_string(),
                });
                return;
            }
        };

        tokio::spawn(async move {
            let event = match client.owner_of(&lookup.key.contract, &lookup.key.token_id).await {
                Ok(owner) => RuntimeEvent::OwnerResolved { lookup, owner },
                Err(err) => RuntimeEvent::OwnerFailed {
                    lookup,
                    message: err.to_string(),
                },
            };
            let _ = evt_tx.send(event);
        });
    }

    fn fetch_details(&self, key: TokenKey) {
        let client = match self.client() {
            Ok(client) => client,
            Err(err) => return self.emit_error(err.to_string()),
        };

        let owner_tx = self.evt_tx.clone();
        let owner_client = Arc::clone(&client);
        let owner_key = key.clone();
        tokio::spawn(async move {
            let event = match owner_client
                .owner_of(&owner_key.contract, &owner_key.token_id)
                .await
            {
                Ok(owner) => RuntimeEvent::DetailsOwner {
                    key: owner_key,
                    owner,
                },
                Err(err) => RuntimeEvent::Error {
                    message: err.to_string(),
                },
            };
            let _ = owner_tx.send(event);
        });

        let meta_tx = self.evt_tx.clone();
        let metadata = Arc::clone(&self.metadata);
        tokio::spawn(async move {
            let result = match client.token_uri(&key.contract, &key.token_id).await {
                Ok(uri) => metadata.fetch(&uri).await,
                Err(err) => Err(err),
            };
            let event = match result {
                Ok(metadata) => RuntimeEvent::MetadataReady { key, metadata },
                Err(err) => RuntimeEvent::Error {
                    message: err.to_string(),
                },
            };
            let _ = meta_tx.send(event);
        });
    }

    fn transfer(&self, key: TokenKey, from: String, to: String) {
        let client = match self.client() {
            Ok(client) => client,
            Err(err) => return self.emit_error(err.to_string()),
        };
        let evt_tx = self.evt_tx.clone();

        tokio::spawn(async move {
            let request = TransferRequest {
                contract: key.contract.clone(),
                token_id: key.token_id.clone(),
                from,
                to: to.clone(),
            };
            if let Err(err) = run_transfer(client.as_ref(), &request, &key, &evt_tx).await {
                tracing::warn!(%key, "transfer failed: {err}");
                let _ = evt_tx.send(RuntimeEvent::Error {
                    message: err.to_string(),
                });
                return;
            }
            let _ = evt_tx.send(RuntimeEvent::TransferFinished { key });
        });
    }
}

async fn run_transfer(
    client: &dyn ChainClient,
    request: &TransferRequest,
    key: &TokenKey,
    evt_tx: &Sender<RuntimeEvent>,
) -> Result<(), ChainError> {
    let gas = client.estimate_transfer_gas(request).await?;
    tracing::debug!(%key, gas, "transfer gas estimated");

    let submitted = client.send_transfer(request, gas).await?;
    tracing::info!(%key, hash = %submitted.hash, "transfer submitted");
    let _ = evt_tx.send(RuntimeEvent::TransferSubmitted {
        key: key.clone(),
        to: request.to.clone(),
        hash: submitted.hash,
    });

    let receipt = submitted.receipt.await?;
    let _ = evt_tx.send(RuntimeEvent::TransferMined {
        hash: receipt.transaction_hash,
        success: receipt.status,
    });
    Ok(())
}
