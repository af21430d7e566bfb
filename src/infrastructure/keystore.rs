//! Encrypted account store
//!
//! One Web3 Secret Storage file per account, all sealed with the session
//! password. The directory is the wallet; deleting it resets the wallet.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use alloy::signers::local::{LocalSignerError, PrivateKeySigner};
use thiserror::Error;

use crate::infrastructure::ethereum::{format_address, parse_address};
use crate::state::Secret;

#[derive(Debug, Error)]
pub enum KeystoreError {
    #[error("keystore directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot unlock {path}: wrong password or corrupt file")]
    Decrypt {
        path: PathBuf,
        #[source]
        source: LocalSignerError,
    },
    #[error("cannot encrypt account: {0}")]
    Encrypt(#[source] LocalSignerError),
    #[error("invalid private key")]
    InvalidPrivateKey,
    #[error("account {0} is already in the wallet")]
    DuplicateAccount(String),
    #[error("account {0} is not in the wallet")]
    UnknownAccount(String),
}

struct Entry {
    path: PathBuf,
    signer: PrivateKeySigner,
}

pub struct Keystore {
    dir: PathBuf,
    secret: Secret,
    entries: Vec<Entry>,
}

impl std::fmt::Debug for Keystore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keystore")
            .field("dir", &self.dir)
            .field("accounts", &self.accounts())
            .finish()
    }
}

impl Keystore {
    /// Unlock every account file in `dir`, creating the directory if needed
    pub fn load(dir: impl Into<PathBuf>, secret: &Secret) -> Result<Self, KeystoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| KeystoreError::Io {
            path: dir.clone(),
            source,
        })?;

        let mut paths = fs::read_dir(&dir)
            .map_err(|source| KeystoreError::Io {
                path: dir.clone(),
                source,
            })?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .collect::<Vec<_>>();
        paths.sort();

        let mut entries = Vec::with_capacity(paths.len());
        for path in paths {
            let signer = PrivateKeySigner::decrypt_keystore(&path, secret.expose())
                .map_err(|source| KeystoreError::Decrypt {
                    path: path.clone(),
                    source,
                })?;
            entries.push(Entry { path, signer });
        }

        tracing::info!(dir = %dir.display(), accounts = entries.len(), "keystore unlocked");
        Ok(Self {
            dir,
            secret: secret.clone(),
            entries,
        })
    }

    /// Delete the whole wallet directory. Missing directory is fine.
    pub fn reset(dir: &Path) -> Result<(), KeystoreError> {
        match fs::remove_dir_all(dir) {
            Ok(()) => {
                tracing::warn!(dir = %dir.display(), "keystore reset");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(KeystoreError::Io {
                path: dir.to_path_buf(),
                source,
            }),
        }
    }

    /// Import a hex private key; returns the checksummed address
    pub fn add_account(&mut self, private_key: &str) -> Result<String, KeystoreError> {
        let parsed = PrivateKeySigner::from_str(private_key.trim())
            .map_err(|_| KeystoreError::InvalidPrivateKey)?;
        let address = format_address(parsed.address());
        if self.position(&address).is_some() {
            return Err(KeystoreError::DuplicateAccount(address));
        }

        let name = format!("{}.json", address.to_lowercase());
        let (signer, _uuid) = PrivateKeySigner::encrypt_keystore(
            &self.dir,
            &mut rand::thread_rng(),
            parsed.to_bytes(),
            self.secret.expose(),
            Some(&name),
        )
        .map_err(KeystoreError::Encrypt)?;

        self.entries.push(Entry {
            path: self.dir.join(&name),
            signer,
        });
        tracing::info!(%address, "account added");
        Ok(address)
    }

    pub fn remove_account(&mut self, address: &str) -> Result<(), KeystoreError> {
        let index = self
            .position(address)
            .ok_or_else(|| KeystoreError::UnknownAccount(address.to_string()))?;
        let entry = self.entries.remove(index);
        if let Err(source) = fs::remove_file(&entry.path) {
            if source.kind() != io::ErrorKind::NotFound {
                self.entries.insert(index, entry);
                return Err(KeystoreError::Io {
                    path: self.dir.clone(),
                    source,
                });
            }
        }
        tracing::info!(address, "account removed");
        Ok(())
    }

    /// Checksummed addresses, in load/import order
    pub fn accounts(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| format_address(entry.signer.address()))
            .collect()
    }

    pub fn signers(&self) -> Vec<PrivateKeySigner> {
        self.entries.iter().map(|entry| entry.signer.clone()).collect()
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn position(&self, address: &str) -> Option<usize> {
        let address = parse_address(address).ok()?;
        self.entries
            .iter()
            .position(|entry| entry.signer.address() == address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // anvil's first dev account
    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn test_add_then_reload() {
        let dir = tempfile::tempdir().unwrap();
        let secret = Secret::new("hunter2");

        let mut keystore = Keystore::load(dir.path().join("ks"), &secret).unwrap();
        assert!(keystore.accounts().is_empty());
        assert_eq!(keystore.add_account(KEY).unwrap(), ADDRESS);
        assert!(matches!(
            keystore.add_account(KEY),
            Err(KeystoreError::DuplicateAccount(_))
        ));

        let reloaded = Keystore::load(dir.path().join("ks"), &secret).unwrap();
        assert_eq!(reloaded.accounts(), vec![ADDRESS.to_string()]);

        let wrong = Keystore::load(dir.path().join("ks"), &Secret::new("nope"));
        assert!(matches!(wrong, Err(KeystoreError::Decrypt { .. })));
    }

    #[test]
    fn test_remove_and_reset() {
        let dir = tempfile::tempdir().unwrap();
        let ks_dir = dir.path().join("ks");
        let secret = Secret::new("pw");

        let mut keystore = Keystore::load(&ks_dir, &secret).unwrap();
        keystore.add_account(KEY).unwrap();
        keystore.remove_account(&ADDRESS.to_lowercase()).unwrap();
        assert!(keystore.accounts().is_empty());
        assert!(matches!(
            keystore.remove_account(ADDRESS),
            Err(KeystoreError::UnknownAccount(_))
        ));

        keystore.add_account(KEY).unwrap();
        Keystore::reset(&ks_dir).unwrap();
        assert!(!ks_dir.exists());
        Keystore::reset(&ks_dir).unwrap();
    }

    #[test]
    fn test_rejects_garbage_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut keystore = Keystore::load(dir.path(), &Secret::new("pw")).unwrap();
        assert!(matches!(
            keystore.add_account("not a key"),
            Err(KeystoreError::InvalidPrivateKey)
        ));
    }
}
