//! Core application state and the reducers that mutate it.
//!
//! Handlers never perform IO. They mutate [`AppState`] in place and return the
//! [`Effect`]s the caller has to execute (persist, chain requests, ...).

pub mod chain_events;
pub mod error_channel;
pub mod session;
pub mod transactions;
pub mod watchlist;

use thiserror::Error;

pub use chain_events::{ChainEventCounter, ChainEventCursor};
pub use error_channel::ErrorChannel;
pub use session::{Credentials, Secret, Session, SessionError, SessionStart, SessionState};
pub use transactions::{PendingTransaction, StatusUpdate, TransactionList, TxStatus};
pub use watchlist::{LookupPurpose, OwnerApplied, OwnerLookup, TokenKey, WatchedToken, Watchlist};

/// Side effects requested by a state transition, in execution order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Write the node URL to the store
    SaveNodeUrl(String),
    /// Point the chain collaborator at a new endpoint
    Reconfigure(String),
    /// Open the keystore, deleting it first when `reset` is set
    LoadWallet { secret: Secret, reset: bool },
    /// Restore the watchlist from the store (session start only)
    LoadWatchlist,
    /// Full re-serialization of the watchlist
    PersistWatchlist,
    /// Independent `ownerOf` requests
    LookupOwners(Vec<OwnerLookup>),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("contract address is empty")]
    EmptyContract,
    #[error("token ID is empty")]
    EmptyTokenId,
}

#[derive(Debug, Default)]
pub struct AppState {
    pub session: Session,
    pub watchlist: Watchlist,
    pub transactions: TransactionList,
    pub chain_events: ChainEventCounter,
    pub error: ErrorChannel,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Login command. On success the session-start hooks are returned; the
    /// endpoint switch always precedes the keystore load.
    pub fn login(
        &mut self,
        secret: &str,
        node_url: &str,
        reset: bool,
    ) -> Result<Vec<Effect>, SessionError> {
        let start = self.session.login(secret, node_url, reset)?;
        tracing::info!(node_url = %start.node_url, reset = start.reset, "session started");
        Ok(vec![
            Effect::SaveNodeUrl(start.node_url.clone()),
            Effect::Reconfigure(start.node_url),
            Effect::LoadWallet {
                secret: start.secret,
                reset: start.reset,
            },
            Effect::LoadWatchlist,
        ])
    }

    /// Called once the persisted watchlist has been restored
    pub fn watchlist_loaded(&mut self) -> Vec<Effect> {
        let lookups = self.watchlist.refresh_all();
        if lookups.is_empty() {
            return Vec::new();
        }
        vec![Effect::LookupOwners(lookups)]
    }

    /// Add command: validate, then look up the owner before inserting.
    pub fn request_add_token(
        &mut self,
        contract: &str,
        token_id: &str,
    ) -> Result<Vec<Effect>, InputError> {
        let contract = contract.trim();
        let token_id = token_id.trim();
        if contract.is_empty() {
            return Err(InputError::EmptyContract);
        }
        if token_id.is_empty() {
            return Err(InputError::EmptyTokenId);
        }
        let lookup = self
            .watchlist
            .begin_lookup(TokenKey::new(contract, token_id), LookupPurpose::Add);
        Ok(vec![Effect::LookupOwners(vec![lookup])])
    }

    pub fn remove_token(&mut self, key: &TokenKey) -> Vec<Effect> {
        let before = self.watchlist.len();
        self.watchlist.remove(key);
        if self.watchlist.len() == before {
            return Vec::new();
        }
        vec![Effect::PersistWatchlist]
    }

    pub fn owner_resolved(&mut self, lookup: &OwnerLookup, owner: String) -> Vec<Effect> {
        match self.watchlist.apply_owner(lookup, owner) {
            OwnerApplied::Applied => {
                if lookup.purpose == LookupPurpose::Add {
                    self.error.clear();
                }
                vec![Effect::PersistWatchlist]
            }
            outcome => {
                tracing::debug!(key = %lookup.key, id = lookup.id, ?outcome, "owner response dropped");
                Vec::new()
            }
        }
    }

    /// A failed lookup leaves the entry at its last known owner.
    pub fn owner_failed(&mut self, lookup: &OwnerLookup, message: &str) {
        tracing::warn!(key = %lookup.key, "ownerOf failed: {message}");
        self.error.set(message);
    }

    pub fn transaction_submitted(&mut self, hash: &str, label: &str) {
        self.transactions.append(hash, label);
        self.error.clear();
    }

    /// Terminal receipt: record the status and raise a chain event, which
    /// refreshes every watched owner.
    pub fn transaction_receipt(&mut self, hash: &str, success: bool) -> Vec<Effect> {
        let outcome = self
            .transactions
            .update_status(hash, TxStatus::from_receipt(success));
        let value = self.chain_events.notify();
        self.error.clear();
        tracing::info!(%hash, success, ?outcome, chain_events = value, "receipt received");

        let lookups = self.watchlist.refresh_all();
        if lookups.is_empty() {
            return Vec::new();
        }
        vec![Effect::LookupOwners(lookups)]
    }

    pub fn remove_transaction(&mut self, hash: &str) {
        self.transactions.remove(hash);
    }

    pub fn report_error(&mut self, message: impl Into<String>) {
        self.error.set(message);
    }

    pub fn dismiss_error(&mut self) {
        self.error.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logged_in() -> AppState {
        let mut state = AppState::new();
        state.login("pw", "http://node", false).unwrap();
        state
    }

    #[test]
    fn test_login_effect_order() {
        let mut state = AppState::new();
        let effects = state.login("pw", "http://node", true).unwrap();
        assert_eq!(
            effects,
            vec![
                Effect::SaveNodeUrl("http://node".into()),
                Effect::Reconfigure("http://node".into()),
                Effect::LoadWallet {
                    secret: Secret::new("pw"),
                    reset: true
                },
                Effect::LoadWatchlist,
            ]
        );
        assert!(state.login("pw", "http://node", false).is_err());
    }

    #[test]
    fn test_add_validates_input() {
        let mut state = logged_in();
        assert_eq!(state.request_add_token(" ", "1"), Err(InputError::EmptyContract));
        assert_eq!(state.request_add_token("0xA", ""), Err(InputError::EmptyTokenId));
    }

    #[test]
    fn test_add_flow_clears_error() {
        let mut state = logged_in();
        state.report_error("boom");
        let effects = state.request_add_token("0xA", "1").unwrap();
        let Effect::LookupOwners(lookups) = &effects[0] else {
            panic!("expected lookup");
        };
        assert!(state.watchlist.is_empty());

        let effects = state.owner_resolved(&lookups[0], "0xB".into());
        assert_eq!(effects, vec![Effect::PersistWatchlist]);
        assert!(state.error.is_empty());
        assert_eq!(state.watchlist.tokens()[0].owner, "0xB");
    }

    #[test]
    fn test_failed_lookup_keeps_owner() {
        let mut state = logged_in();
        state.watchlist.upsert(WatchedToken::new("0xA", "1", "0xOLD"));
        let lookups = state.watchlist.refresh_all();
        state.owner_failed(&lookups[0], "execution reverted");
        assert_eq!(state.error.current(), "execution reverted");
        assert_eq!(state.watchlist.tokens()[0].owner, "0xOLD");
    }

    #[test]
    fn test_receipt_notifies_and_refreshes() {
        let mut state = logged_in();
        state.watchlist.upsert(WatchedToken::new("0xA", "1", ""));
        state.watchlist.upsert(WatchedToken::new("0xA", "2", ""));
        state.transaction_submitted("0xhash1", "transfer");

        let effects = state.transaction_receipt("0xhash1", true);
        assert_eq!(state.transactions.get("0xhash1").unwrap().status, TxStatus::Mined);
        assert_eq!(state.chain_events.value(), 1);
        match effects.as_slice() {
            [Effect::LookupOwners(lookups)] => assert_eq!(lookups.len(), 2),
            other => panic!("unexpected effects {other:?}"),
        }
    }

    #[test]
    fn test_receipt_for_removed_tx_still_counts() {
        let mut state = logged_in();
        state.transaction_submitted("0x1", "");
        state.remove_transaction("0x1");
        state.transaction_receipt("0x1", false);
        assert!(state.transactions.is_empty());
        assert_eq!(state.chain_events.value(), 1);
    }

    #[test]
    fn test_remove_absent_token_requests_nothing() {
        let mut state = logged_in();
        state.watchlist.upsert(WatchedToken::new("0xA", "1", ""));
        assert!(state.remove_token(&TokenKey::new("0xA", "2")).is_empty());
        assert_eq!(
            state.remove_token(&TokenKey::new("0xA", "1")),
            vec![Effect::PersistWatchlist]
        );
    }
}
