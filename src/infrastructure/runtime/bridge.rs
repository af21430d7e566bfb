//! Runtime bridge - connects the sync TUI thread with the async Tokio runtime
//!
//! The UI never blocks on the node. It queues [`RuntimeCommand`]s and drains
//! [`RuntimeEvent`]s once per frame.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tokio::runtime::Runtime;

use crate::infrastructure::ethereum::{AlloyConnector, ChainConnector};
use crate::infrastructure::metadata::{HttpMetadata, MetadataSource, TokenMetadata};
use crate::infrastructure::runtime::worker::run_async_worker;
use crate::state::{OwnerLookup, Secret, TokenKey};

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCommand {
    /// Point the chain client at a new node
    Reconfigure { url: String },
    /// Unlock the keystore; `reset` wipes it first
    LoadWallet { secret: Secret, reset: bool },
    AddAccount { private_key: Secret },
    RemoveAccount { address: String },
    /// `ownerOf` for a watchlist entry
    LookupOwner { lookup: OwnerLookup },
    /// Owner plus tokenURI metadata for the details screen
    FetchDetails { key: TokenKey },
    /// Estimate, sign and send `safeTransferFrom`
    Transfer {
        key: TokenKey,
        from: String,
        to: String,
    },
    /// Shutdown the worker
    Shutdown,
}

/// Events sent from the async worker to the TUI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    Reconfigured { endpoint: String },
    /// Keystore unlocked (or re-unlocked); full account list
    WalletLoaded { accounts: Vec<String> },
    AccountAdded { address: String, accounts: Vec<String> },
    AccountRemoved { address: String, accounts: Vec<String> },
    OwnerResolved { lookup: OwnerLookup, owner: String },
    OwnerFailed { lookup: OwnerLookup, message: String },
    DetailsOwner { key: TokenKey, owner: String },
    MetadataReady { key: TokenKey, metadata: TokenMetadata },
    /// Node accepted the transfer
    TransferSubmitted {
        key: TokenKey,
        to: String,
        hash: String,
    },
    /// Receipt arrived
    TransferMined { hash: String, success: bool },
    /// Transfer flow completed without error
    TransferFinished { key: TokenKey },
    /// Error occurred
    Error { message: String },
}

/// Worker settings that do not change during a session
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub keystore_dir: PathBuf,
    pub metadata_timeout: Duration,
}

/// Bridge between sync TUI thread and async Tokio runtime
pub struct RuntimeBridge {
    cmd_tx: Sender<RuntimeCommand>,
    evt_rx: Receiver<RuntimeEvent>,
}

impl RuntimeBridge {
    /// Bridge backed by HTTP JSON-RPC and HTTP metadata fetches
    pub fn new(settings: WorkerSettings) -> anyhow::Result<Self> {
        let metadata = HttpMetadata::new(settings.metadata_timeout)?;
        Ok(Self::with_parts(
            settings,
            Arc::new(AlloyConnector),
            Arc::new(metadata),
        ))
    }

    /// Bridge with caller-supplied collaborators
    pub fn with_parts(
        settings: WorkerSettings,
        connector: Arc<dyn ChainConnector>,
        metadata: Arc<dyn MetadataSource>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<RuntimeCommand>();
        let (evt_tx, evt_rx) = mpsc::channel::<RuntimeEvent>();

        // Spawn the worker thread with its own Tokio runtime
        thread::spawn(move || {
            let rt = match Runtime::new() {
                Ok(rt) => rt,
                Err(err) => {
                    let _ = evt_tx.send(RuntimeEvent::Error {
                        message: format!("Failed to create Tokio runtime: {err}"),
                    });
                    return;
                }
            };
            rt.block_on(async {
                if let Err(err) =
                    run_async_worker(settings, connector, metadata, cmd_rx, evt_tx.clone()).await
                {
                    let _ = evt_tx.send(RuntimeEvent::Error {
                        message: format!("Worker exited: {:#}", err),
                    });
                }
            });
        });

        Self { cmd_tx, evt_rx }
    }

    /// Send a command to the async worker
    pub fn send(&self, cmd: RuntimeCommand) -> anyhow::Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| anyhow::anyhow!("Worker channel closed"))
    }

    /// Poll for events (non-blocking)
    pub fn poll_events(&self) -> Vec<RuntimeEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.evt_rx.try_recv() {
            events.push(evt);
        }
        events
    }

    /// Wait up to `timeout` for the next event
    pub fn recv_timeout(&self, timeout: Duration) -> Option<RuntimeEvent> {
        match self.evt_rx.recv_timeout(timeout) {
            Ok(evt) => Some(evt),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl Drop for RuntimeBridge {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(RuntimeCommand::Shutdown);
    }
}
