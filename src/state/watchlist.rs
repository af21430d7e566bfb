//! Watchlist of ERC-721 tokens keyed by (contract, token id)

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::store::{KeyValueStore, StorageKey, StoreError};

/// Identity of a watched token
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenKey {
    pub contract: String,
    pub token_id: String,
}

impl TokenKey {
    pub fn new(contract: impl Into<String>, token_id: impl Into<String>) -> Self {
        Self {
            contract: contract.into(),
            token_id: token_id.into(),
        }
    }
}

impl fmt::Display for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.contract, self.token_id)
    }
}

/// A token on the watchlist. Serialized form matches the persisted blob:
/// `{"contractAddress": .., "tokenID": .., "owner": ..}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedToken {
    #[serde(rename = "contractAddress", alias = "contract")]
    pub contract_address: String,
    #[serde(rename = "tokenID")]
    pub token_id: String,
    #[serde(default)]
    pub owner: String,
}

impl WatchedToken {
    pub fn new(
        contract_address: impl Into<String>,
        token_id: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            contract_address: contract_address.into(),
            token_id: token_id.into(),
            owner: owner.into(),
        }
    }

    pub fn key(&self) -> TokenKey {
        TokenKey::new(self.contract_address.clone(), self.token_id.clone())
    }

    fn matches(&self, key: &TokenKey) -> bool {
        self.contract_address == key.contract && self.token_id == key.token_id
    }
}

/// Why an owner lookup was issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupPurpose {
    /// Token is being added; the entry does not exist yet
    Add,
    /// Entry already exists and its owner is being refreshed
    Refresh,
}

/// An in-flight `ownerOf` request, stamped with a watchlist-wide sequence id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerLookup {
    pub id: u64,
    pub key: TokenKey,
    pub purpose: LookupPurpose,
}

/// Result of applying an owner lookup response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerApplied {
    Applied,
    /// A newer response for the same key was already applied
    Stale,
    /// Refresh response for a key that is no longer watched
    Missing,
}

#[derive(Debug, Default)]
pub struct Watchlist {
    tokens: Vec<WatchedToken>,
    loaded: bool,
    next_lookup: u64,
    applied: HashMap<TokenKey, u64>,
}

impl Watchlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tokens(&self) -> &[WatchedToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn get(&self, key: &TokenKey) -> Option<&WatchedToken> {
        self.tokens.iter().find(|token| token.matches(key))
    }

    pub fn contains(&self, key: &TokenKey) -> bool {
        self.get(key).is_some()
    }

    /// Restore the persisted watchlist. Runs once; later calls return `None`
    /// and leave the in-memory collection untouched.
    ///
    /// Absent, malformed or empty blobs (and read failures) load as an empty list.
    pub fn load_initial(&mut self, store: &dyn KeyValueStore) -> Option<&[WatchedToken]> {
        if self.loaded {
            return None;
        }
        self.loaded = true;

        let raw = match store.get(StorageKey::Watchlist) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!("watchlist read failed, starting empty: {err}");
                None
            }
        };
        let tokens = raw
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .and_then(|raw| match serde_json::from_str::<Vec<WatchedToken>>(raw) {
                Ok(tokens) => Some(tokens),
                Err(err) => {
                    tracing::debug!("ignoring malformed watchlist blob: {err}");
                    None
                }
            })
            .unwrap_or_default();

        tracing::info!(count = tokens.len(), "watchlist loaded");
        Some(self.replace_all(tokens))
    }

    /// Insert or replace by key. The token ends up last.
    pub fn upsert(&mut self, token: WatchedToken) -> &[WatchedToken] {
        let key = token.key();
        self.tokens.retain(|existing| !existing.matches(&key));
        self.tokens.push(token);
        &self.tokens
    }

    /// Remove by key; absent keys are ignored.
    pub fn remove(&mut self, key: &TokenKey) -> &[WatchedToken] {
        self.tokens.retain(|existing| !existing.matches(key));
        self.applied.remove(key);
        &self.tokens
    }

    /// Overwrite the collection. Duplicate keys collapse to the last occurrence.
    pub fn replace_all(&mut self, tokens: Vec<WatchedToken>) -> &[WatchedToken] {
        self.tokens.clear();
        self.applied.clear();
        for token in tokens {
            self.upsert(token);
        }
        &self.tokens
    }

    /// Serialize the full collection to the store. No-op until the initial
    /// load has run, so an empty startup list never clobbers saved data.
    pub fn persist(&self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        if !self.loaded {
            return Ok(());
        }
        let json = serde_json::to_string(&self.tokens).map_err(|source| StoreError::Serialize {
            key: StorageKey::Watchlist.as_str(),
            source,
        })?;
        store.set(StorageKey::Watchlist, &json)
    }

    pub fn begin_lookup(&mut self, key: TokenKey, purpose: LookupPurpose) -> OwnerLookup {
        self.next_lookup += 1;
        OwnerLookup {
            id: self.next_lookup,
            key,
            purpose,
        }
    }

    /// One refresh lookup per current entry
    pub fn refresh_all(&mut self) -> Vec<OwnerLookup> {
        let keys: Vec<TokenKey> = self.tokens.iter().map(WatchedToken::key).collect();
        keys.into_iter()
            .map(|key| self.begin_lookup(key, LookupPurpose::Refresh))
            .collect()
    }

    /// Apply an `ownerOf` response through [`Watchlist::upsert`].
    pub fn apply_owner(&mut self, lookup: &OwnerLookup, owner: String) -> OwnerApplied {
        if lookup.purpose == LookupPurpose::Refresh && !self.contains(&lookup.key) {
            return OwnerApplied::Missing;
        }
        if self
            .applied
            .get(&lookup.key)
            .is_some_and(|last| *last >= lookup.id)
        {
            return OwnerApplied::Stale;
        }

        self.upsert(WatchedToken::new(
            lookup.key.contract.clone(),
            lookup.key.token_id.clone(),
            owner,
        ));
        self.applied.insert(lookup.key.clone(), lookup.id);
        OwnerApplied::Applied
    }
}
